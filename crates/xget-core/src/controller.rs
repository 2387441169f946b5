//! Click interception, without the DOM
//!
//! The bindings feed this controller plain values and implement the
//! [`Notifier`] and [`Navigator`] seams; the controller never blocks and
//! holds no state between clicks.
//!
//! A click flows through two steps. [`Interceptor::on_click`] runs
//! synchronously inside the capturing listener and decides whether to
//! suppress the default action. [`Interceptor::complete`] runs once the
//! settings round-trip has resolved and performs the redirect.
//!
//! A link that is classified as a download is suppressed before settings
//! are known, so a disabled extension leaves such links inert.

use std::time::Duration;

use log::{debug, info, warn};

use crate::classifier::Classifier;
use crate::notification::{Notification, Notifier};
use crate::platform::Registry;
use crate::rewrite::Rewriter;
use crate::settings::{Settings, SettingsError};
use crate::types::ClassificationInput;

/// Default bound on the settings round-trip.
pub const DEFAULT_SETTINGS_TIMEOUT: Duration = Duration::from_secs(5);

/// Error type for document navigation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("navigation failed: {0}")]
pub struct NavigateError(pub String);

/// Replaces the current document with another URL.
pub trait Navigator {
    fn navigate(&self, url: &str) -> Result<(), NavigateError>;
}

/// What the capturing click listener should do with the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickAction {
    /// Leave the event alone
    PassThrough,
    /// Prevent default and stop propagation, then call `complete`
    Suppress,
}

/// Tunables for the bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterceptorConfig {
    pub settings_timeout: Duration,
}

impl Default for InterceptorConfig {
    fn default() -> Self {
        Self {
            settings_timeout: DEFAULT_SETTINGS_TIMEOUT,
        }
    }
}

/// Orchestrates classifier and rewriter for one document.
pub struct Interceptor<'r> {
    registry: &'r Registry,
    classifier: Classifier<'r>,
    rewriter: Rewriter<'r>,
    config: InterceptorConfig,
}

impl<'r> Interceptor<'r> {
    pub fn new(registry: &'r Registry, config: InterceptorConfig) -> Self {
        Self {
            registry,
            classifier: Classifier::new(registry),
            rewriter: Rewriter::new(registry),
            config,
        }
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    pub fn config(&self) -> &InterceptorConfig {
        &self.config
    }

    pub fn classifier(&self) -> &Classifier<'r> {
        &self.classifier
    }

    pub fn rewriter(&self) -> &Rewriter<'r> {
        &self.rewriter
    }

    /// Should the click hook be installed on this page at all?
    pub fn should_intercept_page(&self, page_url: &str, settings: &Settings) -> bool {
        if !settings.is_active() {
            debug!("interception off: extension disabled or unconfigured");
            return false;
        }

        match self.registry.detect(page_url) {
            Some(key) if settings.platform_enabled(key) => true,
            Some(key) => {
                debug!("interception off: platform {} disabled", key);
                false
            }
            None => false,
        }
    }

    /// Decide synchronously what to do with a click on a link.
    pub fn on_click(&self, input: &ClassificationInput<'_>) -> ClickAction {
        let classification = self.classifier.classify(input);
        if classification.is_download {
            debug!("download link {} ({})", input.url, classification.reason);
            ClickAction::Suppress
        } else {
            ClickAction::PassThrough
        }
    }

    /// Finish a suppressed click once the settings round-trip resolved.
    ///
    /// Returns the destination when a redirect was issued.
    pub fn complete(
        &self,
        url: &str,
        settings: Result<Settings, SettingsError>,
        notifier: &dyn Notifier,
        navigator: &dyn Navigator,
    ) -> Option<String> {
        let settings = Settings::or_disabled(settings);
        if !settings.is_active() {
            return None;
        }

        let target = self.rewriter.rewrite(url, &settings)?;

        let notice = Notification::redirected();
        if let Err(e) = notifier.show(&notice) {
            warn!("{}", e);
            info!("Xget notice: {}", notice.message);
        }

        if let Err(e) = navigator.navigate(&target) {
            warn!("{}", e);
            return None;
        }

        Some(target)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::notification::NotifyError;
    use crate::types::PlatformKey;

    #[derive(Default)]
    struct RecordingNotifier {
        shown: RefCell<Vec<Notification>>,
        fail: bool,
    }

    impl Notifier for RecordingNotifier {
        fn show(&self, notification: &Notification) -> Result<(), NotifyError> {
            if self.fail {
                return Err(NotifyError("no document body".to_string()));
            }
            self.shown.borrow_mut().push(notification.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingNavigator {
        visited: RefCell<Vec<String>>,
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&self, url: &str) -> Result<(), NavigateError> {
            self.visited.borrow_mut().push(url.to_string());
            Ok(())
        }
    }

    const ASSET: &str = "https://github.com/o/r/releases/download/v1/a.zip";

    fn settings() -> Settings {
        Settings::with_domain("mirror.example")
    }

    #[test]
    fn test_page_gate() {
        let registry = Registry::builtin();
        let interceptor = Interceptor::new(&registry, InterceptorConfig::default());

        assert!(interceptor.should_intercept_page("https://github.com/o/r", &settings()));
        assert!(!interceptor.should_intercept_page("https://example.com/", &settings()));
        assert!(!interceptor.should_intercept_page("https://github.com/o/r", &Settings::disabled()));

        let mut partial = settings();
        partial.set_platform(PlatformKey::Gh, false);
        assert!(!interceptor.should_intercept_page("https://github.com/o/r", &partial));
        assert!(interceptor.should_intercept_page("https://huggingface.co/m", &partial));
    }

    #[test]
    fn test_on_click() {
        let registry = Registry::builtin();
        let interceptor = Interceptor::new(&registry, InterceptorConfig::default());

        let asset = ClassificationInput::new(ASSET, false, "a.zip");
        assert_eq!(interceptor.on_click(&asset), ClickAction::Suppress);

        let listing = ClassificationInput::new("https://github.com/o/r/releases", false, "Releases");
        assert_eq!(interceptor.on_click(&listing), ClickAction::PassThrough);
    }

    #[test]
    fn test_complete_redirects_and_notifies() {
        let registry = Registry::builtin();
        let interceptor = Interceptor::new(&registry, InterceptorConfig::default());
        let notifier = RecordingNotifier::default();
        let navigator = RecordingNavigator::default();

        let target = interceptor.complete(ASSET, Ok(settings()), &notifier, &navigator);

        let expected = "https://mirror.example/gh/o/r/releases/download/v1/a.zip";
        assert_eq!(target.as_deref(), Some(expected));
        assert_eq!(*notifier.shown.borrow(), vec![Notification::redirected()]);
        assert_eq!(*navigator.visited.borrow(), vec![expected.to_string()]);
    }

    #[test]
    fn test_complete_settings_failure_does_nothing() {
        let registry = Registry::builtin();
        let interceptor = Interceptor::new(&registry, InterceptorConfig::default());
        let notifier = RecordingNotifier::default();
        let navigator = RecordingNavigator::default();

        let target = interceptor.complete(
            ASSET,
            Err(SettingsError::Transport("receiving end does not exist".to_string())),
            &notifier,
            &navigator,
        );

        assert_eq!(target, None);
        assert!(notifier.shown.borrow().is_empty());
        assert!(navigator.visited.borrow().is_empty());
    }

    #[test]
    fn test_complete_not_eligible_does_nothing() {
        let registry = Registry::builtin();
        let interceptor = Interceptor::new(&registry, InterceptorConfig::default());
        let notifier = RecordingNotifier::default();
        let navigator = RecordingNavigator::default();

        let target = interceptor.complete("https://example.com/a.zip", Ok(settings()), &notifier, &navigator);

        assert_eq!(target, None);
        assert!(navigator.visited.borrow().is_empty());
    }

    #[test]
    fn test_notification_failure_still_navigates() {
        let registry = Registry::builtin();
        let interceptor = Interceptor::new(&registry, InterceptorConfig::default());
        let notifier = RecordingNotifier {
            fail: true,
            ..Default::default()
        };
        let navigator = RecordingNavigator::default();

        let target = interceptor.complete(ASSET, Ok(settings()), &notifier, &navigator);

        assert!(target.is_some());
        assert_eq!(navigator.visited.borrow().len(), 1);
    }
}
