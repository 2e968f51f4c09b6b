//! Helpers shared by the command handlers and views.

pub mod table;
