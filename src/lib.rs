pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod global;
pub mod indicator;
pub mod logging;
pub mod state;
