//! `taskdeck` -- a task list kept in sync with a remote task-storage service.

pub mod cli;
pub mod config;
pub mod remote;
pub mod render;
pub mod tasks;
