//! Storage infrastructure: `settings.conf` persistence.
//!
//! The `config` sub-module reads the key=value settings file from the
//! directory given on the command line, writes defaults on first run, and
//! converts the result into engine parameters.

pub mod config;
