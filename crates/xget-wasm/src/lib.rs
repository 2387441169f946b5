//! WebAssembly bindings for Xget
//!
//! Pure exports of the core (classification, detection, rewriting) plus the
//! content script entry point [`start`].

mod dom;
mod logger;
mod runtime;

#[cfg(all(test, target_arch = "wasm32"))]
wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

use std::sync::OnceLock;
use std::time::Duration;

use log::{info, LevelFilter};
use wasm_bindgen::prelude::*;
use xget_core::{ClassificationInput, Classifier, Interceptor, InterceptorConfig, Registry, Rewriter, Settings};

static REGISTRY: OnceLock<Registry> = OnceLock::new();
static INTERCEPTOR: OnceLock<Interceptor<'static>> = OnceLock::new();

fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::builtin)
}

/// The content script interceptor, with the default config unless `init`
/// ran first. The pure exports never create it.
fn interceptor() -> &'static Interceptor<'static> {
    INTERCEPTOR.get_or_init(|| Interceptor::new(registry(), InterceptorConfig::default()))
}

/// Configure the content script. Must run before `start`; the pure exports
/// may be called at any time.
#[wasm_bindgen]
pub fn init(settings_timeout_ms: Option<u32>, verbose: bool) -> Result<(), JsValue> {
    logger::init(if verbose { LevelFilter::Debug } else { LevelFilter::Info });

    if INTERCEPTOR.get().is_some() {
        return Err(JsValue::from_str("Already initialized. Reload the page to reinitialize."));
    }

    let mut config = InterceptorConfig::default();
    if let Some(ms) = settings_timeout_ms {
        config.settings_timeout = Duration::from_millis(u64::from(ms));
    }

    INTERCEPTOR
        .set(Interceptor::new(registry(), config))
        .map_err(|_| JsValue::from_str("Failed to set interceptor state"))
}

#[wasm_bindgen]
pub fn is_initialized() -> bool {
    INTERCEPTOR.get().is_some()
}

/// Content script entry point.
///
/// Registers the message listener, then installs the click hook when the
/// extension is active for the current page. Resolves to whether the hook
/// was installed.
#[wasm_bindgen]
pub async fn start() -> Result<bool, JsValue> {
    logger::init(log::max_level().max(LevelFilter::Info));
    info!("content script loaded");

    let interceptor = interceptor();
    runtime::listen_for_messages();

    let settings = Settings::or_disabled(runtime::get_settings(interceptor.config().settings_timeout).await);
    let page_url = web_sys::window()
        .ok_or_else(|| JsValue::from_str("no window"))?
        .location()
        .href()?;

    if !interceptor.should_intercept_page(&page_url, &settings) {
        return Ok(false);
    }

    dom::install_click_listener(interceptor)?;
    Ok(true)
}

#[wasm_bindgen]
pub fn is_download_link(url: &str, has_download_attribute: bool, text: &str) -> bool {
    Classifier::new(registry()).is_download(&ClassificationInput::new(url, has_download_attribute, text))
}

/// Classification with the deciding heuristic, as `{ isDownload, reason }`.
#[wasm_bindgen]
pub fn classify_link(url: &str, has_download_attribute: bool, text: &str) -> JsValue {
    let classification = Classifier::new(registry()).classify(&ClassificationInput::new(url, has_download_attribute, text));

    let result = js_sys::Object::new();
    let _ = js_sys::Reflect::set(&result, &"isDownload".into(), &JsValue::from(classification.is_download));
    let _ = js_sys::Reflect::set(&result, &"reason".into(), &JsValue::from_str(&classification.reason.to_string()));
    result.into()
}

#[wasm_bindgen]
pub fn detect_platform(url: &str) -> Option<String> {
    registry().detect(url).map(|key| key.as_str().to_string())
}

/// Proxied URL for `url` under `settings` (the stored settings object), or
/// `undefined` when not eligible.
#[wasm_bindgen]
pub fn transform_url(url: &str, settings: JsValue) -> Option<String> {
    let settings: Settings = match runtime::from_js(&settings) {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("transform_url: malformed settings: {}", e);
            return None;
        }
    };
    Rewriter::new(registry()).rewrite(url, &settings)
}

/// Registered platforms as `[{ key, origin, name }]`.
#[wasm_bindgen]
pub fn platforms() -> JsValue {
    let list = js_sys::Array::new();
    for desc in registry().all() {
        let entry = js_sys::Object::new();
        let _ = js_sys::Reflect::set(&entry, &"key".into(), &JsValue::from_str(desc.key.as_str()));
        let _ = js_sys::Reflect::set(&entry, &"origin".into(), &JsValue::from_str(desc.origin));
        let _ = js_sys::Reflect::set(&entry, &"name".into(), &JsValue::from_str(desc.name));
        list.push(&entry);
    }
    list.into()
}
