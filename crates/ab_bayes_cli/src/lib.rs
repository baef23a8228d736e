pub mod args;
pub mod commands;
pub mod output;
pub mod report;
pub mod tracing_utils;
