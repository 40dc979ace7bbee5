//! Interactive dashboard.
//!
//! The UI thread owns the [`Dashboard`] and is the only writer of the history
//! file. Captures run on a background thread and come back over a channel;
//! quitting sets the cancel flag so an in-flight capture stops waiting.

mod render;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::DefaultTerminal;
use tracing::{debug, error};

use crate::config::Config;
use crate::dashboard::Dashboard;
use crate::error::Result;
use crate::probe::{ProbeReport, ProbeScheduler};
use crate::store::HistoryStore;
use crate::volume::VolumeSource;

const TICK: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Quit,
    Refresh,
    ToggleView,
    Previous,
    Next,
    Ignore,
}

fn action_for(key: KeyEvent) -> Action {
    if key.kind != KeyEventKind::Press {
        return Action::Ignore;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Tab => Action::ToggleView,
        KeyCode::Char('r') => Action::Refresh,
        KeyCode::Up | KeyCode::Char('k') => Action::Previous,
        KeyCode::Down | KeyCode::Char('j') => Action::Next,
        _ => Action::Ignore,
    }
}

struct Session {
    source: Arc<dyn VolumeSource>,
    timeout: Duration,
    cancel: Arc<AtomicBool>,
    tx: Sender<Result<ProbeReport>>,
    rx: Receiver<Result<ProbeReport>>,
}

impl Session {
    fn start_capture(&self, dashboard: &mut Dashboard) {
        if !dashboard.begin_refresh() {
            return;
        }

        let source = Arc::clone(&self.source);
        let scheduler = ProbeScheduler::new(self.timeout).with_cancel(Arc::clone(&self.cancel));
        let tx = self.tx.clone();

        let spawned = thread::Builder::new()
            .name("capture".to_string())
            .spawn(move || {
                let result = source
                    .list_fixed_volumes()
                    .and_then(|volumes| scheduler.probe_all(&source, &volumes));
                // the session may have ended while probing
                let _ = tx.send(result);
            });

        if let Err(e) = spawned {
            error!(error = %e, "failed to start capture thread");
            dashboard.finish_refresh(Err(e.into()));
        }
    }
}

pub fn run(config: &Config, source: Arc<dyn VolumeSource>) -> Result<()> {
    let mut dashboard = Dashboard::open(HistoryStore::new(&config.history_path));
    let (tx, rx) = mpsc::channel();
    let session = Session {
        source,
        timeout: config.probe_timeout,
        cancel: Arc::new(AtomicBool::new(false)),
        tx,
        rx,
    };

    let mut terminal = ratatui::try_init()?;
    session.start_capture(&mut dashboard);

    let result = event_loop(&mut terminal, &mut dashboard, &session);

    session.cancel.store(true, Ordering::Relaxed);
    ratatui::try_restore()?;
    result
}

fn event_loop(
    terminal: &mut DefaultTerminal,
    dashboard: &mut Dashboard,
    session: &Session,
) -> Result<()> {
    loop {
        if let Ok(result) = session.rx.try_recv() {
            dashboard.finish_refresh(result);
        }

        terminal.draw(|frame| render::draw(frame, &*dashboard))?;

        if !event::poll(TICK)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };

        match action_for(key) {
            Action::Quit => {
                debug!("dashboard closed");
                return Ok(());
            }
            Action::Refresh => session.start_capture(dashboard),
            Action::ToggleView => dashboard.toggle_view(),
            Action::Previous => dashboard.select_previous(),
            Action::Next => dashboard.select_next(),
            Action::Ignore => {}
        }
    }
}
