pub mod app;
pub mod books;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod mongo;
pub mod security;
pub mod utils;
