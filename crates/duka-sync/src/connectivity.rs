//! # Connectivity State Machine
//!
//! Tracks the ONLINE ⇄ OFFLINE state that decides how mutations are routed.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Connectivity Transitions                              │
//! │                                                                         │
//! │            set_offline()                                                │
//! │   ┌────────┐ ─────────────► ┌─────────┐                                │
//! │   │ ONLINE │                │ OFFLINE │                                │
//! │   └────────┘ ◄───────────── └─────────┘                                │
//! │            set_online()                                                 │
//! │                                                                         │
//! │  The OFFLINE → ONLINE edge is the sync trigger: the coordinator        │
//! │  observes it and runs a replay pass over the buffered commands.        │
//! │                                                                         │
//! │  Signals are INJECTED (browser events, OS callbacks, a health probe);  │
//! │  this module never probes the network itself.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tokio::sync::watch;
use tracing::info;

/// Whether the engine currently has a usable network path to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityState {
    Online,
    Offline,
}

impl ConnectivityState {
    /// Returns true when the state is [`ConnectivityState::Online`].
    #[inline]
    pub fn is_online(&self) -> bool {
        matches!(self, ConnectivityState::Online)
    }
}

impl std::fmt::Display for ConnectivityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectivityState::Online => write!(f, "online"),
            ConnectivityState::Offline => write!(f, "offline"),
        }
    }
}

/// Observable connectivity state, driven by injected platform signals.
///
/// Observers subscribe through a `watch` channel, so a late subscriber
/// always sees the current state rather than a missed event.
#[derive(Debug)]
pub struct ConnectivityMonitor {
    tx: watch::Sender<ConnectivityState>,
}

impl ConnectivityMonitor {
    /// Creates a monitor starting in the given state.
    pub fn new(initial: ConnectivityState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        ConnectivityMonitor { tx }
    }

    /// Current state.
    pub fn state(&self) -> ConnectivityState {
        *self.tx.borrow()
    }

    /// Convenience: is the engine online right now?
    pub fn is_online(&self) -> bool {
        self.state().is_online()
    }

    /// Records a connectivity signal.
    ///
    /// ## Returns
    /// `true` when this call changed the state (an actual edge), `false`
    /// when the signal repeated the current state.
    pub fn set_state(&self, next: ConnectivityState) -> bool {
        let previous = self.state();
        if previous == next {
            return false;
        }

        info!(from = %previous, to = %next, "Connectivity transition");

        // send_replace never fails; the sender keeps the value even with
        // zero receivers.
        self.tx.send_replace(next);
        true
    }

    /// Marks the engine online. Returns true on the OFFLINE → ONLINE edge.
    pub fn set_online(&self) -> bool {
        self.set_state(ConnectivityState::Online)
    }

    /// Marks the engine offline. Returns true on the ONLINE → OFFLINE edge.
    pub fn set_offline(&self) -> bool {
        self.set_state(ConnectivityState::Offline)
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<ConnectivityState> {
        self.tx.subscribe()
    }
}

impl Default for ConnectivityMonitor {
    /// Starts online; the platform signal flips it off when the network
    /// actually drops.
    fn default() -> Self {
        Self::new(ConnectivityState::Online)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_are_reported_once() {
        let monitor = ConnectivityMonitor::default();
        assert!(monitor.is_online());

        assert!(monitor.set_offline());
        assert!(!monitor.set_offline()); // repeated signal, no edge
        assert_eq!(monitor.state(), ConnectivityState::Offline);

        assert!(monitor.set_online());
        assert!(!monitor.set_online());
        assert!(monitor.is_online());
    }

    #[tokio::test]
    async fn test_subscriber_observes_transition() {
        let monitor = ConnectivityMonitor::default();
        let mut rx = monitor.subscribe();

        monitor.set_offline();

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), ConnectivityState::Offline);
    }

    #[test]
    fn test_late_subscriber_sees_current_state() {
        let monitor = ConnectivityMonitor::default();
        monitor.set_offline();

        let rx = monitor.subscribe();
        assert_eq!(*rx.borrow(), ConnectivityState::Offline);
    }
}
