//! Poll events and the worker-to-consumer notification channel.
//!
//! The poll worker produces events from its own task; consumers (the
//! frontend, a logger, storage) receive them without ever being able to
//! block the worker. The channel is an unbounded tokio mpsc pair: `send`
//! never waits, and a closed receiver simply drops events on the floor.
//! Worker termination is observable as channel close.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// One event per completed poll cycle, delivered in cycle order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum PollEvent {
    /// A successful reading: the register values as space-separated
    /// decimals, in read order.
    DataReceived(String),

    /// A failed connect or read cycle; the text is a non-empty diagnostic.
    Error(String),
}

impl PollEvent {
    /// The event payload text.
    pub fn text(&self) -> &str {
        match self {
            PollEvent::DataReceived(text) | PollEvent::Error(text) => text,
        }
    }

    /// Whether this event reports a failure.
    pub fn is_error(&self) -> bool {
        matches!(self, PollEvent::Error(_))
    }
}

/// Sending half of the notification channel (held by the worker).
pub type EventSender = mpsc::UnboundedSender<PollEvent>;

/// Receiving half of the notification channel (held by the consumer).
pub type EventReceiver = mpsc::UnboundedReceiver<PollEvent>;

/// Create a fresh notification channel for one worker run.
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Render a register block as its display representation: decimal values
/// in read order, separated by single spaces.
pub fn format_registers(values: &[u16]) -> String {
    let mut out = String::with_capacity(values.len() * 6);
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&value.to_string());
    }
    out
}
