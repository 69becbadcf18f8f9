//! Prompt workbench: enhance, analyze and compare prompts against a remote
//! enhancement service, and keep a searchable local history of results.

pub mod config;
pub mod controllers;
pub mod error;
pub mod history;
pub mod intent;
pub mod lifecycle;
pub mod models;
pub mod notify;
pub mod repl;
pub mod service;
pub mod shared;
pub mod storage;
pub mod tabs;
pub mod workbench;

#[cfg(test)]
mod test_support;

pub use error::{RemoteError, WorkbenchError};
pub use workbench::Workbench;
