//! API route modules.

pub mod state;
