//! taskpad — single-resource task CRUD.
//!
//! The crate ships both halves of the system: the HTTP task server
//! ([`server`]) and the consumers of its `/task` resource — a typed
//! transport client ([`client`]), the view controllers and terminal
//! front-end ([`ui`]), and one-shot CLI commands (in `main.rs`).

pub mod client;
pub mod config;
pub mod model;
pub mod server;
pub mod ui;
