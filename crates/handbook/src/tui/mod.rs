//! Terminal reader.
//!
//! One page at a time in a bordered panel, with a footer holding the
//! previous/next controls and the page indicator. Arrow keys, mouse drags
//! and clicks drive the [`HandbookController`](crate::HandbookController).

pub mod event;
pub mod terminal;
pub mod ui;

pub use terminal::run;
