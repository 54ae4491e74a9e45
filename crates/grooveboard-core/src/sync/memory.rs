//! In-process transport.

use super::{ConnectionState, SyncError, SyncEvent, SyncResult, Transport};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(Debug, Default)]
struct Inner {
    state: ConnectionState,
    sent: Vec<String>,
    inbound: VecDeque<SyncEvent>,
}

/// A transport that never leaves the process.
///
/// Clones share the same connection, so a host (or a test) can keep a handle
/// to read what was sent and to inject inbound events after giving the
/// transport to a session.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    inner: Rc<RefCell<Inner>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain the frames sent so far.
    pub fn take_sent(&self) -> Vec<String> {
        std::mem::take(&mut self.inner.borrow_mut().sent)
    }

    /// Queue an event for the next `poll_events`.
    pub fn push_event(&self, event: SyncEvent) {
        self.inner.borrow_mut().inbound.push_back(event);
    }

    /// Simulate the remote end closing the connection.
    pub fn close_remote(&self) {
        self.push_event(SyncEvent::Disconnected);
    }
}

impl Transport for MemoryTransport {
    fn connect(&mut self, _url: &str) -> SyncResult<()> {
        let mut inner = self.inner.borrow_mut();
        if inner.state == ConnectionState::Connected {
            return Err(SyncError::AlreadyConnected);
        }
        inner.state = ConnectionState::Connecting;
        inner.inbound.push_back(SyncEvent::Connected);
        Ok(())
    }

    fn disconnect(&mut self) {
        let mut inner = self.inner.borrow_mut();
        inner.state = ConnectionState::Disconnected;
        inner.inbound.clear();
    }

    fn send(&self, msg: &str) -> SyncResult<()> {
        let mut inner = self.inner.borrow_mut();
        if inner.state != ConnectionState::Connected {
            return Err(SyncError::TransportUnavailable);
        }
        inner.sent.push(msg.to_string());
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<SyncEvent> {
        let mut inner = self.inner.borrow_mut();
        let events: Vec<SyncEvent> = inner.inbound.drain(..).collect();
        for event in &events {
            match event {
                SyncEvent::Connected => inner.state = ConnectionState::Connected,
                SyncEvent::Disconnected => inner.state = ConnectionState::Disconnected,
                SyncEvent::Error { .. } => inner.state = ConnectionState::Error,
                _ => {}
            }
        }
        events
    }

    fn state(&self) -> ConnectionState {
        self.inner.borrow().state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_then_poll() {
        let mut transport = MemoryTransport::new();
        transport.connect("memory://").unwrap();
        assert_eq!(transport.state(), ConnectionState::Connecting);
        assert!(transport.send("early").is_err());

        assert_eq!(transport.poll_events(), vec![SyncEvent::Connected]);
        assert!(transport.is_connected());
        transport.send("hello").unwrap();
        assert_eq!(transport.take_sent(), vec!["hello".to_string()]);
    }

    #[test]
    fn test_clones_share_connection() {
        let mut transport = MemoryTransport::new();
        let handle = transport.clone();
        transport.connect("memory://").unwrap();
        transport.poll_events();

        handle.push_event(SyncEvent::PeerJoined { peer_id: "p".to_string() });
        assert_eq!(transport.poll_events().len(), 1);

        handle.close_remote();
        transport.poll_events();
        assert!(!handle.is_connected());
        assert!(matches!(transport.send("late"), Err(SyncError::TransportUnavailable)));
    }
}
