pub mod capture;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod platform;
pub mod probe;
pub mod report;
pub mod series;
pub mod snapshot;
pub mod store;
pub mod util;
pub mod volume;

#[cfg(feature = "tui")]
pub mod tui;
