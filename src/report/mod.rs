pub mod table;
pub mod json;

use crate::capture::Capture;
use crate::config::Config;
use crate::error::Result;

pub fn print(capture: &Capture, config: &Config) -> Result<()> {
    if config.json_output {
        println!("{}", json::render(capture)?);
    } else {
        print!("{}", table::render(capture));
    }
    print_diagnostics(capture, config.verbose);
    Ok(())
}

/// Probe failures go to stderr so stdout stays parseable with --json.
fn print_diagnostics(capture: &Capture, verbose: bool) {
    if capture.failures.is_empty() {
        return;
    }

    if verbose {
        eprintln!("Diagnostics:");
        eprintln!("{}", "-".repeat(40));
        for failure in &capture.failures {
            eprintln!("  {failure}");
        }
    } else {
        for failure in &capture.failures {
            eprintln!("[diagnostic] {failure}");
        }
    }
}
