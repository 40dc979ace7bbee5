use std::sync::Arc;

use clap::Parser;
use disktrend::capture;
use disktrend::cli::Cli;
use disktrend::config::Config;
use disktrend::logging;
use disktrend::probe::ProbeScheduler;
use disktrend::report;
use disktrend::store::HistoryStore;
use disktrend::volume::system::SystemVolumes;
use disktrend::volume::VolumeSource;

fn main() {
    let cli = Cli::parse();

    let config = match Config::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = logging::init(&config) {
        eprintln!("warning: logging disabled: {e}");
    }

    let source: Arc<dyn VolumeSource> = Arc::new(SystemVolumes);

    if config.dashboard {
        run_dashboard(&config, source);
        return;
    }

    let store = HistoryStore::new(&config.history_path);
    let scheduler = ProbeScheduler::new(config.probe_timeout);

    let result = match capture::run(&source, &store, &scheduler) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = report::print(&result, &config) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    // the measurement was still reported above
    if let Some(e) = &result.persist_error {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

#[cfg(feature = "tui")]
fn run_dashboard(config: &Config, source: Arc<dyn VolumeSource>) {
    if let Err(e) = disktrend::tui::run(config, source) {
        eprintln!("Error running dashboard: {e}");
        std::process::exit(1);
    }
}

#[cfg(not(feature = "tui"))]
fn run_dashboard(_config: &Config, _source: Arc<dyn VolumeSource>) {
    eprintln!("Error: this build has no dashboard (rebuild with --features tui)");
    std::process::exit(1);
}
