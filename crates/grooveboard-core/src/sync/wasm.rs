//! WebSocket client for the browser.

use super::{ConnectionState, SyncError, SyncEvent, SyncResult, Transport, parse_server_frame};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CloseEvent, ErrorEvent, MessageEvent, WebSocket};

/// WebSocket client for WASM.
///
/// Browser callbacks queue events; drain them with `poll_events()`.
pub struct WasmWebSocket {
    ws: Option<WebSocket>,
    state: ConnectionState,
    events: Rc<RefCell<Vec<SyncEvent>>>,
    // Store closures to prevent them from being dropped
    _on_open: Option<Closure<dyn Fn()>>,
    _on_message: Option<Closure<dyn Fn(MessageEvent)>>,
    _on_close: Option<Closure<dyn Fn(CloseEvent)>>,
    _on_error: Option<Closure<dyn Fn(ErrorEvent)>>,
}

impl WasmWebSocket {
    /// Create a new disconnected WebSocket client.
    pub fn new() -> Self {
        Self {
            ws: None,
            state: ConnectionState::Disconnected,
            events: Rc::new(RefCell::new(Vec::new())),
            _on_open: None,
            _on_message: None,
            _on_close: None,
            _on_error: None,
        }
    }
}

impl Transport for WasmWebSocket {
    fn connect(&mut self, url: &str) -> SyncResult<()> {
        if self.ws.is_some() {
            return Err(SyncError::AlreadyConnected);
        }

        let ws = WebSocket::new(url).map_err(|e| SyncError::InvalidUrl(format!("{:?}", e)))?;
        ws.set_binary_type(web_sys::BinaryType::Arraybuffer);

        self.state = ConnectionState::Connecting;
        let events = self.events.clone();

        // onopen
        let events_open = events.clone();
        let on_open = Closure::wrap(Box::new(move || {
            events_open.borrow_mut().push(SyncEvent::Connected);
        }) as Box<dyn Fn()>);
        ws.set_onopen(Some(on_open.as_ref().unchecked_ref()));

        // onmessage
        let events_msg = events.clone();
        let on_message = Closure::wrap(Box::new(move |e: MessageEvent| {
            let Ok(txt) = e.data().dyn_into::<js_sys::JsString>() else {
                return;
            };
            let s: String = txt.into();
            match parse_server_frame(&s) {
                Ok(event) => events_msg.borrow_mut().push(event),
                Err(err) => log::warn!("Failed to parse server message: {}", err),
            }
        }) as Box<dyn Fn(MessageEvent)>);
        ws.set_onmessage(Some(on_message.as_ref().unchecked_ref()));

        // onclose
        let events_close = events.clone();
        let on_close = Closure::wrap(Box::new(move |_e: CloseEvent| {
            events_close.borrow_mut().push(SyncEvent::Disconnected);
        }) as Box<dyn Fn(CloseEvent)>);
        ws.set_onclose(Some(on_close.as_ref().unchecked_ref()));

        // onerror
        let events_err = events;
        let on_error = Closure::wrap(Box::new(move |_e: ErrorEvent| {
            events_err.borrow_mut().push(SyncEvent::Error {
                message: "WebSocket error".to_string(),
            });
        }) as Box<dyn Fn(ErrorEvent)>);
        ws.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        self.ws = Some(ws);
        self._on_open = Some(on_open);
        self._on_message = Some(on_message);
        self._on_close = Some(on_close);
        self._on_error = Some(on_error);

        Ok(())
    }

    fn disconnect(&mut self) {
        if let Some(ws) = self.ws.take() {
            let _ = ws.close();
        }
        self.state = ConnectionState::Disconnected;
        self._on_open = None;
        self._on_message = None;
        self._on_close = None;
        self._on_error = None;
    }

    fn send(&self, msg: &str) -> SyncResult<()> {
        match self.ws {
            Some(ref ws) if self.state == ConnectionState::Connected => ws
                .send_with_str(msg)
                .map_err(|e| SyncError::Send(format!("{:?}", e))),
            _ => Err(SyncError::TransportUnavailable),
        }
    }

    fn poll_events(&mut self) -> Vec<SyncEvent> {
        let events = std::mem::take(&mut *self.events.borrow_mut());

        for event in &events {
            match event {
                SyncEvent::Connected => self.state = ConnectionState::Connected,
                SyncEvent::Disconnected => self.state = ConnectionState::Disconnected,
                SyncEvent::Error { .. } => self.state = ConnectionState::Error,
                _ => {}
            }
        }

        if self.state == ConnectionState::Disconnected && self.ws.is_some() {
            self.disconnect();
        }

        events
    }

    fn state(&self) -> ConnectionState {
        self.state
    }
}

impl Default for WasmWebSocket {
    fn default() -> Self {
        Self::new()
    }
}
