//! Extension runtime messaging

use std::cell::Cell;
use std::time::Duration;

use js_sys::{Array, Function, Promise};
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use xget_core::message::{Ack, Message};
use xget_core::notification::{Notification, Notifier};
use xget_core::settings::{Settings, SettingsError};

use crate::dom::DomNotifier;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = ["chrome", "runtime"], js_name = sendMessage)]
    fn send_message(message: &JsValue, callback: &Function) -> Result<(), JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "runtime", "onMessage"], js_name = addListener)]
    fn add_message_listener(listener: &Function);
}

const TIMEOUT_SENTINEL: &str = "__xget_settings_timeout__";

pub(crate) fn describe(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| js_sys::JSON::stringify(value).ok().and_then(|s| s.as_string()))
        .unwrap_or_else(|| format!("{:?}", value))
}

pub(crate) fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let json = serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))?;
    js_sys::JSON::parse(&json)
}

pub(crate) fn from_js<T: DeserializeOwned>(value: &JsValue) -> Result<T, String> {
    let json = js_sys::JSON::stringify(value)
        .map_err(|e| describe(&e))?
        .as_string()
        .ok_or_else(|| "value is not JSON serializable".to_string())?;
    serde_json::from_str(&json).map_err(|e| e.to_string())
}

/// Ask the background page for the current settings, giving up after
/// `timeout`.
pub async fn get_settings(timeout: Duration) -> Result<Settings, SettingsError> {
    let window = web_sys::window().ok_or_else(|| SettingsError::Transport("no window".to_string()))?;
    let request = to_js(&Message::GetSettings).map_err(|e| SettingsError::Transport(describe(&e)))?;

    let reply = Promise::new(&mut |resolve, reject| {
        if let Err(e) = send_message(&request, &resolve) {
            let _ = reject.call1(&JsValue::NULL, &e);
        }
    });

    let millis = timeout.as_millis().min(i32::MAX as u128) as i32;
    let timer_handle = Cell::new(None);
    let timer = Promise::new(&mut |resolve, _reject| {
        let fire = Closure::once_into_js(move || {
            let _ = resolve.call1(&JsValue::NULL, &JsValue::from_str(TIMEOUT_SENTINEL));
        });
        timer_handle.set(
            window
                .set_timeout_with_callback_and_timeout_and_arguments_0(fire.unchecked_ref(), millis)
                .ok(),
        );
    });

    let winner = JsFuture::from(Promise::race(&Array::of2(&reply, &timer))).await;
    if let Some(handle) = timer_handle.get() {
        window.clear_timeout_with_handle(handle);
    }

    let winner = winner.map_err(|e| SettingsError::Transport(describe(&e)))?;
    settings_from_reply(&winner, millis as u64)
}

/// Map the value that won the settings race to settings or an error.
pub(crate) fn settings_from_reply(reply: &JsValue, timeout_ms: u64) -> Result<Settings, SettingsError> {
    if reply.as_string().as_deref() == Some(TIMEOUT_SENTINEL) {
        return Err(SettingsError::Timeout(timeout_ms));
    }
    if reply.is_undefined() || reply.is_null() {
        return Err(SettingsError::Transport("empty response".to_string()));
    }

    from_js(reply).map_err(SettingsError::Malformed)
}

/// Handle one inbound runtime message. Returns the reply, if any.
pub(crate) fn handle_message(request: &JsValue, notifier: &dyn Notifier) -> Option<JsValue> {
    let Ok(Message::ShowNotification { message, show_refresh_button }) = from_js::<Message>(request) else {
        return None;
    };

    let notification = Notification {
        message,
        show_refresh_button,
    };
    if let Err(e) = notifier.show(&notification) {
        log::error!("{}", e);
        log::info!("Xget notice: {}", notification.message);
    }

    to_js(&Ack::OK).ok()
}

/// Answer `showNotification` requests from the background page.
pub fn listen_for_messages() {
    let listener = Closure::<dyn FnMut(JsValue, JsValue, Function)>::new(
        |request: JsValue, _sender: JsValue, send_response: Function| {
            if let Some(ack) = handle_message(&request, &DomNotifier) {
                let _ = send_response.call1(&JsValue::NULL, &ack);
            }
        },
    );

    add_message_listener(listener.as_ref().unchecked_ref());
    listener.forget();
}
