//! hero-log - multi-destination logger for an editor extension
//!
//! Routes leveled log calls to the console, a rotating log file and the host's
//! output panel, depending on the environment the extension runs in.

pub mod config;
pub mod host;
pub mod logging;
