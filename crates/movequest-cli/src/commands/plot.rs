//! `movequest plot`: chart a CSV log in the terminal.

use movequest_core::{Snapshot, read_log};

use crate::tui::app::{App, Feed};

pub fn run(input: &str) {
    let contents = match read_log(input) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error reading {input}: {e}");
            std::process::exit(1);
        }
    };

    let n = contents.samples.len();
    let skipped = contents.skipped;
    let snapshot = Snapshot::from_samples(contents.samples);

    let header = format!("{input}  ({n} rows)");
    let mut app = App::new(Feed::Static(snapshot), header, super::millis(500))
        .with_axes(contents.axes);
    if let Err(e) = app.run() {
        eprintln!("TUI error: {e}");
        std::process::exit(1);
    }

    if skipped > 0 {
        println!("Skipped {skipped} unparsable rows in {input}");
    }
}
