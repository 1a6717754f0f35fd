pub mod completions;
pub mod config;
pub mod schedule;
