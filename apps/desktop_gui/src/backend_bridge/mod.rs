//! Bridge between the UI thread and the backend worker that owns the lists client.

pub mod commands;
pub mod runtime;
