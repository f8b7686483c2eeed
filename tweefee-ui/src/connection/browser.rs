//! Browser transport and timer
//!
//! `web_sys::WebSocket` behind [`Transport`], `gloo_timers` behind
//! [`Scheduler`].

use gloo_timers::callback::Timeout;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, MessageEvent, WebSocket};

use super::manager::{CloseInfo, Scheduler, Transport, TransportCallbacks, TransportError};
use crate::console;

/// A socket together with the closures registered on it. The closures live
/// exactly as long as the socket is bound.
struct BoundSocket {
    ws: WebSocket,
    _on_open: Closure<dyn FnMut(JsValue)>,
    _on_message: Closure<dyn FnMut(MessageEvent)>,
    _on_close: Closure<dyn FnMut(CloseEvent)>,
    _on_error: Closure<dyn FnMut(JsValue)>,
}

impl BoundSocket {
    fn detach(&self) {
        self.ws.set_onopen(None);
        self.ws.set_onmessage(None);
        self.ws.set_onclose(None);
        self.ws.set_onerror(None);
    }
}

#[derive(Default)]
pub struct WebSocketTransport {
    socket: Option<BoundSocket>,
}

impl WebSocketTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transport for WebSocketTransport {
    fn open(&mut self, url: &str, callbacks: TransportCallbacks) -> Result<(), TransportError> {
        self.close();

        let ws = WebSocket::new(url).map_err(|e| TransportError::Open {
            url: url.to_string(),
            reason: format!("{:?}", e),
        })?;

        let TransportCallbacks {
            mut on_open,
            mut on_message,
            mut on_close,
        } = callbacks;

        let open_cb = Closure::wrap(Box::new(move |_: JsValue| {
            on_open();
        }) as Box<dyn FnMut(JsValue)>);
        ws.set_onopen(Some(open_cb.as_ref().unchecked_ref()));

        let message_cb = Closure::wrap(Box::new(move |event: MessageEvent| {
            match event.data().dyn_into::<js_sys::JsString>() {
                Ok(text) => on_message(text.into()),
                Err(_) => console::warn("Ignoring non-text frame"),
            }
        }) as Box<dyn FnMut(MessageEvent)>);
        ws.set_onmessage(Some(message_cb.as_ref().unchecked_ref()));

        let close_cb = Closure::wrap(Box::new(move |event: CloseEvent| {
            on_close(CloseInfo {
                code: event.code(),
                reason: event.reason(),
                clean: event.was_clean(),
            });
        }) as Box<dyn FnMut(CloseEvent)>);
        ws.set_onclose(Some(close_cb.as_ref().unchecked_ref()));

        // A close event always follows an error, so only log here.
        let error_cb = Closure::wrap(Box::new(move |e: JsValue| {
            console::error(&format!("WebSocket error: {:?}", e));
        }) as Box<dyn FnMut(JsValue)>);
        ws.set_onerror(Some(error_cb.as_ref().unchecked_ref()));

        self.socket = Some(BoundSocket {
            ws,
            _on_open: open_cb,
            _on_message: message_cb,
            _on_close: close_cb,
            _on_error: error_cb,
        });
        Ok(())
    }

    fn close(&mut self) {
        if let Some(socket) = self.socket.take() {
            socket.detach();
            if let Err(e) = socket.ws.close() {
                console::warn(&format!("WebSocket close failed: {:?}", e));
            }
        }
    }
}

impl Drop for WebSocketTransport {
    fn drop(&mut self) {
        self.close();
    }
}

/// Reconnect timer backed by `setTimeout`; dropping the handle clears it
#[derive(Debug, Default, Clone, Copy)]
pub struct TimeoutScheduler;

impl Scheduler for TimeoutScheduler {
    type Handle = Timeout;

    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Timeout {
        Timeout::new(delay_ms, task)
    }
}
