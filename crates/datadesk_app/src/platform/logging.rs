//! Logger setup for the terminal front end.
//!
//! Logs go to `datadesk.log` in the data directory at `info` and up. Each
//! `-v` mirrors them on the terminal and raises the level.

use std::path::Path;

use datadesk_logging::{level_from_verbosity, LevelFilter, LogDestination};

const LOG_FILENAME: &str = "datadesk.log";

pub fn initialize(data_dir: &Path, verbosity: u8) {
    let level = level_from_verbosity(verbosity).max(LevelFilter::Info);
    let destination = if verbosity == 0 {
        LogDestination::File
    } else {
        LogDestination::Both
    };
    datadesk_logging::initialize(destination, level, &data_dir.join(LOG_FILENAME));
}
