//! In-page notification banner model
//!
//! The DOM work lives in the bindings; this module owns what the banner says
//! and how long it stays.

use std::time::Duration;

/// Banner CSS class. Existing banners with this class are removed first.
pub const NOTIFICATION_CLASS: &str = "xget-notification";
/// Id of the injected `<style>` element holding the slide animations.
pub const STYLE_ELEMENT_ID: &str = "xget-notification-styles";
/// Shown after a download has been redirected.
pub const REDIRECT_NOTICE: &str = "Download redirected via Xget";
/// Label of the optional refresh button.
pub const REFRESH_LABEL: &str = "🔄 Refresh page";

pub const DISMISS_AFTER: Duration = Duration::from_millis(4000);
pub const DISMISS_AFTER_WITH_REFRESH: Duration = Duration::from_millis(8000);
pub const SLIDE_OUT: Duration = Duration::from_millis(300);

/// Error type for notification delivery.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("notification failed: {0}")]
pub struct NotifyError(pub String);

/// A transient banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    /// Offer a button that reloads the page
    pub show_refresh_button: bool,
}

impl Notification {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            show_refresh_button: false,
        }
    }

    pub fn with_refresh(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            show_refresh_button: true,
        }
    }

    pub fn redirected() -> Self {
        Self::new(REDIRECT_NOTICE)
    }

    /// Time before the slide-out starts.
    pub fn dismiss_after(&self) -> Duration {
        if self.show_refresh_button {
            DISMISS_AFTER_WITH_REFRESH
        } else {
            DISMISS_AFTER
        }
    }
}

/// Surface that can display a banner. Best effort.
pub trait Notifier {
    fn show(&self, notification: &Notification) -> Result<(), NotifyError>;
}
