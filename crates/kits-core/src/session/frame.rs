//! Outbound frames and the sink they are delivered to.

use super::identity::SessionId;
use crate::error::{KitsError, Result};
use crate::ui::{CommandBatch, EventBindings};
use serde::Serialize;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::mpsc::UnboundedSender;

pub const CHAT_PREFIX: &str = "[Kits] ";
pub const COLOR_ERROR: &str = "#FF6B6B";
pub const COLOR_SUCCESS: &str = "#4CAF50";
pub const COLOR_VIP: &str = "#FFD700";

/// A colored chat line sent to the subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub text: String,
    pub color: String,
}

impl ChatMessage {
    fn prefixed(body: impl AsRef<str>, color: &str) -> Self {
        Self {
            text: format!("{}{}", CHAT_PREFIX, body.as_ref()),
            color: color.to_string(),
        }
    }

    pub fn error(body: impl AsRef<str>) -> Self {
        Self::prefixed(body, COLOR_ERROR)
    }

    pub fn success(body: impl AsRef<str>) -> Self {
        Self::prefixed(body, COLOR_SUCCESS)
    }

    pub fn vip(body: impl AsRef<str>) -> Self {
        Self::prefixed(body, COLOR_VIP)
    }
}

/// Everything a session sends to its client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageFrame {
    Open {
        session_id: SessionId,
        commands: CommandBatch,
        bindings: EventBindings,
    },
    Update {
        session_id: SessionId,
        commands: CommandBatch,
    },
    Message {
        message: ChatMessage,
    },
    Closed {
        session_id: SessionId,
    },
}

impl PageFrame {
    pub fn is_closed(&self) -> bool {
        matches!(self, PageFrame::Closed { .. })
    }
}

/// Where a session's frames go.
pub trait PageSink: Send + Sync {
    fn deliver(&self, frame: PageFrame) -> Result<()>;
}

impl PageSink for UnboundedSender<PageFrame> {
    fn deliver(&self, frame: PageFrame) -> Result<()> {
        self.send(frame)
            .map_err(|_| KitsError::session_closed("client receiver dropped"))
    }
}

/// Open/closed flag that every emission goes through.
///
/// `close` takes the same lock as `deliver`, so once `close` returns no
/// frame other than the ones passed to `close_with` can reach the sink.
#[derive(Debug)]
pub struct LifetimeGate {
    open: Mutex<bool>,
}

impl Default for LifetimeGate {
    fn default() -> Self {
        Self {
            open: Mutex::new(true),
        }
    }
}

impl LifetimeGate {
    pub fn new() -> Self {
        Self::default()
    }

    fn open(&self) -> MutexGuard<'_, bool> {
        self.open.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_open(&self) -> bool {
        *self.open()
    }

    /// Delivers `frame` if the gate is still open. Returns whether it was sent.
    pub fn deliver(&self, sink: &dyn PageSink, frame: PageFrame) -> Result<bool> {
        let open = self.open();
        if !*open {
            return Ok(false);
        }
        sink.deliver(frame)?;
        Ok(true)
    }

    /// Closes the gate. Returns false if it was already closed.
    pub fn close(&self) -> bool {
        std::mem::replace(&mut *self.open(), false)
    }

    /// Closes the gate after delivering one last frame, atomically.
    pub fn close_with(&self, sink: &dyn PageSink, frame: PageFrame) -> Result<bool> {
        let mut open = self.open();
        if !*open {
            return Ok(false);
        }
        *open = false;
        sink.deliver(frame)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_chat_messages_are_prefixed_and_colored() {
        let msg = ChatMessage::vip("You received the VIP Kit!");
        assert_eq!(msg.text, "[Kits] You received the VIP Kit!");
        assert_eq!(msg.color, COLOR_VIP);
        assert_eq!(ChatMessage::error("x").color, COLOR_ERROR);
    }

    #[test]
    fn test_gate_blocks_frames_after_close() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let gate = LifetimeGate::new();
        let id = SessionId::new();

        assert!(gate.deliver(&tx, PageFrame::Update { session_id: id, commands: CommandBatch::new() }).unwrap());
        assert!(gate.close_with(&tx, PageFrame::Closed { session_id: id }).unwrap());
        assert!(!gate.deliver(&tx, PageFrame::Update { session_id: id, commands: CommandBatch::new() }).unwrap());
        assert!(!gate.close());

        assert!(matches!(rx.try_recv(), Ok(PageFrame::Update { .. })));
        assert!(matches!(rx.try_recv(), Ok(PageFrame::Closed { .. })));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_sender_reports_dropped_receiver() {
        let (tx, rx) = mpsc::unbounded_channel::<PageFrame>();
        drop(rx);
        let err = tx
            .deliver(PageFrame::Message { message: ChatMessage::success("hi") })
            .unwrap_err();
        assert!(matches!(err, KitsError::SessionClosed(_)));
    }

    #[test]
    fn test_frame_serialization_is_tagged() {
        let frame = PageFrame::Message {
            message: ChatMessage::error("Kit not found!"),
        };
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["type"], "message");
        assert_eq!(json["message"]["text"], "[Kits] Kit not found!");
    }
}
