//! `taskdeck` reference task-storage service.
//!
//! Exposes the server for use in tests and embedding. Tasks are kept in
//! memory and served over the JSON envelope protocol in `taskdeck-proto`.

pub mod book;
pub mod config;
pub mod server;
