pub mod aggregation;
pub mod client;
pub mod crud;
pub mod cursor_engine;
pub mod index;
pub mod performance;
pub mod query;
