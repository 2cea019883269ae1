//! Data models for the posture monitor.
//!
//! Field names match what the browser client sends and what the history file
//! has always contained, so existing files and clients keep working.

mod document;
mod landmark;
mod posture;
mod requests;

pub use document::*;
pub use landmark::*;
pub use posture::*;
pub use requests::*;
