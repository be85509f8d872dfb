//! Table document model, commands and derived views for a notion-like table
//! editor embedded in a note-taking host.

pub mod config;
pub mod error;
pub mod io;
pub mod state;
