pub mod commands;
pub mod report;
pub mod runner;
pub mod state;
