//! REST API module.
//!
//! Routes keep the paths and body shapes the browser client already uses.

mod analyze;
mod posture;

pub use analyze::*;
pub use posture::*;
