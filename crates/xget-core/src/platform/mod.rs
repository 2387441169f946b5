//! Platform Registry and Detector
//!
//! This module provides the immutable table of supported platforms and the
//! lookup that maps a URL back to its platform key.

mod detect;
mod registry;

pub use registry::*;
