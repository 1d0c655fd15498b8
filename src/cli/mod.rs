//! Command line parsing and output formatting for `fbk`

pub mod args;
pub mod output;
