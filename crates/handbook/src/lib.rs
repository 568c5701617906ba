//! `handbook` - A paged terminal handbook with a persisted checklist
//!
//! This library parses handbook files into pages, drives page navigation and
//! checklist state through [`HandbookController`], and persists the checklist
//! per handbook in a local `SQLite` database.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod checklist;
pub mod cli;
pub mod config;
pub mod controller;
pub mod document;
pub mod effects;
pub mod error;
pub mod input;
pub mod logging;
pub mod pagination;
pub mod platform;
pub mod storage;
pub mod tui;

pub use checklist::{Checklist, ChecklistStore};
pub use config::Config;
pub use controller::{HandbookController, Settings};
pub use document::Handbook;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use pagination::Pager;
pub use storage::{Storage, StorageStats};
