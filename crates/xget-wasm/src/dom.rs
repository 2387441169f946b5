//! DOM side of the content script: click capture, banner, navigation

use std::time::Duration;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlAnchorElement, Window};

use xget_core::notification::{
    Notification, Notifier, NotifyError, NOTIFICATION_CLASS, REFRESH_LABEL, SLIDE_OUT, STYLE_ELEMENT_ID,
};
use xget_core::{ClassificationInput, ClickAction, Interceptor, NavigateError, Navigator};

use crate::runtime::{self, describe};

const BANNER_STYLE: &str = "position: fixed; top: 20px; right: 20px; \
    background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; \
    padding: 12px 16px; border-radius: 8px; font-size: 14px; font-weight: 500; \
    box-shadow: 0 4px 12px rgba(0,0,0,0.2); z-index: 2147483647; \
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; \
    max-width: 280px; word-wrap: break-word;";

const BUTTON_STYLE: &str = "border: 1px solid rgba(255, 255, 255, 0.3); color: white; \
    padding: 4px 8px; border-radius: 4px; font-size: 12px; cursor: pointer; \
    margin-top: 4px; width: 100%; transition: background 0.2s;";

const ANIMATIONS: &str = "@keyframes xgetSlideIn { \
    from { transform: translateX(100%); opacity: 0; } \
    to { transform: translateX(0); opacity: 1; } } \
    @keyframes xgetSlideOut { \
    from { transform: translateX(0); opacity: 1; } \
    to { transform: translateX(100%); opacity: 0; } }";

fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window"))
}

fn document() -> Result<Document, JsValue> {
    window()?
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))
}

fn millis(duration: Duration) -> i32 {
    duration.as_millis().min(i32::MAX as u128) as i32
}

fn button_style(alpha: f32) -> String {
    format!("background: rgba(255, 255, 255, {}); {}", alpha, BUTTON_STYLE)
}

// =============================================================================
// Notification Banner
// =============================================================================

/// Renders banners into the current document.
pub struct DomNotifier;

impl Notifier for DomNotifier {
    fn show(&self, notification: &Notification) -> Result<(), NotifyError> {
        render_banner(notification).map_err(|e| NotifyError(describe(&e)))
    }
}

fn render_banner(notification: &Notification) -> Result<(), JsValue> {
    let window = window()?;
    let document = document()?;

    let existing = document.query_selector_all(&format!(".{}", NOTIFICATION_CLASS))?;
    for i in 0..existing.length() {
        if let Some(element) = existing.get(i).and_then(|node| node.dyn_into::<Element>().ok()) {
            element.remove();
        }
    }

    let banner = document.create_element("div")?;
    banner.set_class_name(NOTIFICATION_CLASS);

    let text = document.create_element("div")?;
    text.set_text_content(Some(&notification.message));
    let margin = if notification.show_refresh_button { "8px" } else { "0" };
    text.set_attribute("style", &format!("margin-bottom: {};", margin))?;
    banner.append_child(&text)?;

    if notification.show_refresh_button {
        let button = refresh_button(&document)?;
        banner.append_child(&button)?;
    }

    banner.set_attribute("style", &format!("{} animation: xgetSlideIn 0.3s ease-out;", BANNER_STYLE))?;
    ensure_animation_styles(&document)?;

    document
        .body()
        .ok_or_else(|| JsValue::from_str("no document body"))?
        .append_child(&banner)?;

    schedule_dismiss(&window, banner, notification.dismiss_after())
}

fn refresh_button(document: &Document) -> Result<Element, JsValue> {
    let button = document.create_element("button")?;
    button.set_text_content(Some(REFRESH_LABEL));
    button.set_attribute("style", &button_style(0.2))?;

    for (event, alpha) in [("mouseenter", 0.3), ("mouseleave", 0.2)] {
        let target = button.clone();
        let hover = Closure::<dyn FnMut()>::new(move || {
            let _ = target.set_attribute("style", &button_style(alpha));
        });
        button.add_event_listener_with_callback(event, hover.as_ref().unchecked_ref())?;
        hover.forget();
    }

    let reload = Closure::<dyn FnMut()>::new(|| {
        if let Ok(window) = window() {
            let _ = window.location().reload();
        }
    });
    button.add_event_listener_with_callback("click", reload.as_ref().unchecked_ref())?;
    reload.forget();

    Ok(button)
}

fn ensure_animation_styles(document: &Document) -> Result<(), JsValue> {
    if document.get_element_by_id(STYLE_ELEMENT_ID).is_some() {
        return Ok(());
    }

    let style = document.create_element("style")?;
    style.set_id(STYLE_ELEMENT_ID);
    style.set_text_content(Some(ANIMATIONS));
    if let Some(head) = document.head() {
        head.append_child(&style)?;
    }
    Ok(())
}

fn schedule_dismiss(window: &Window, banner: Element, after: Duration) -> Result<(), JsValue> {
    let slide_out = Closure::once_into_js(move || {
        let _ = banner.set_attribute("style", &format!("{} animation: xgetSlideOut 0.3s ease-in;", BANNER_STYLE));
        let remove = Closure::once_into_js(move || {
            if banner.parent_node().is_some() {
                banner.remove();
            }
        });
        if let Ok(window) = self::window() {
            let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(remove.unchecked_ref(), millis(SLIDE_OUT));
        }
    });

    window.set_timeout_with_callback_and_timeout_and_arguments_0(slide_out.unchecked_ref(), millis(after))?;
    Ok(())
}

// =============================================================================
// Navigation
// =============================================================================

/// Replaces the current document through `window.location`.
pub struct LocationNavigator;

impl Navigator for LocationNavigator {
    fn navigate(&self, url: &str) -> Result<(), NavigateError> {
        window()
            .and_then(|window| window.location().set_href(url))
            .map_err(|e| NavigateError(describe(&e)))
    }
}

// =============================================================================
// Click Capture
// =============================================================================

/// Install the capturing click listener on the document.
pub fn install_click_listener(interceptor: &'static Interceptor<'static>) -> Result<(), JsValue> {
    let listener = Closure::<dyn FnMut(Event)>::new(move |event: Event| handle_click(interceptor, event));
    document()?.add_event_listener_with_callback_and_bool("click", listener.as_ref().unchecked_ref(), true)?;
    listener.forget();
    Ok(())
}

fn handle_click(interceptor: &'static Interceptor<'static>, event: Event) {
    let Some(anchor) = event
        .target()
        .and_then(|target| target.dyn_into::<Element>().ok())
        .and_then(|element| element.closest("a").ok().flatten())
        .and_then(|element| element.dyn_into::<HtmlAnchorElement>().ok())
    else {
        return;
    };

    let href = anchor.href();
    if href.is_empty() {
        return;
    }
    let text = anchor.text_content().unwrap_or_default();
    let input = ClassificationInput::new(&href, anchor.has_attribute("download"), &text);

    if interceptor.on_click(&input) != ClickAction::Suppress {
        return;
    }

    event.prevent_default();
    event.stop_propagation();

    let timeout = interceptor.config().settings_timeout;
    wasm_bindgen_futures::spawn_local(async move {
        let settings = runtime::get_settings(timeout).await;
        interceptor.complete(&href, settings, &DomNotifier, &LocationNavigator);
    });
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use wasm_bindgen_test::*;

    use super::*;

    fn banners() -> u32 {
        document()
            .unwrap()
            .query_selector_all(&format!(".{}", NOTIFICATION_CLASS))
            .unwrap()
            .length()
    }

    #[wasm_bindgen_test]
    fn test_banner_with_refresh_button() {
        DomNotifier
            .show(&Notification::with_refresh("Settings saved"))
            .unwrap();

        let document = document().unwrap();
        let banner = document
            .query_selector(&format!(".{}", NOTIFICATION_CLASS))
            .unwrap()
            .unwrap();
        assert_eq!(banner.query_selector_all("button").unwrap().length(), 1);
        assert!(banner.text_content().unwrap().contains(REFRESH_LABEL));
        assert!(document.get_element_by_id(STYLE_ELEMENT_ID).is_some());
    }

    #[wasm_bindgen_test]
    fn test_new_banner_replaces_existing() {
        DomNotifier.show(&Notification::new("first")).unwrap();
        DomNotifier.show(&Notification::redirected()).unwrap();
        assert_eq!(banners(), 1);

        let document = document().unwrap();
        let banner = document
            .query_selector(&format!(".{}", NOTIFICATION_CLASS))
            .unwrap()
            .unwrap();
        assert!(banner.query_selector("button").unwrap().is_none());
    }
}
