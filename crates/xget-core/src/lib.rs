//! Xget Core Library
//!
//! This crate decides whether a clicked link on a supported code or model
//! hosting site is a file download, and rewrites eligible links so the
//! request goes through the user's Xget proxy instead.
//!
//! # Architecture
//!
//! Everything here is pure and allocation-light: a [`Registry`] of platforms
//! is built once and borrowed by the [`Classifier`], the [`Rewriter`] and the
//! [`Interceptor`]. The DOM, the extension messaging and navigation are
//! behind small traits implemented by the wasm bindings.
//!
//! # Modules
//!
//! - `platform`: platform registry and URL → platform detection
//! - `classifier`: ordered download-link heuristics
//! - `rewrite`: proxy URL construction
//! - `settings`: extension settings model
//! - `message`: runtime messages exchanged with the background page
//! - `notification`: banner model and the `Notifier` seam
//! - `controller`: sans-IO click interception
//! - `url`: allocation-free URL slicing
//! - `types`: shared type definitions

pub mod classifier;
pub mod controller;
pub mod message;
pub mod notification;
pub mod platform;
pub mod rewrite;
pub mod settings;
pub mod types;
pub mod url;

// Re-export commonly used types
pub use classifier::Classifier;
pub use controller::{ClickAction, Interceptor, InterceptorConfig, NavigateError, Navigator};
pub use message::{Ack, Message};
pub use notification::{Notification, Notifier, NotifyError};
pub use platform::{PlatformDescriptor, Registry};
pub use rewrite::Rewriter;
pub use settings::{Settings, SettingsError};
pub use types::{Classification, ClassificationInput, PlatformKey, Reason, Verdict};
