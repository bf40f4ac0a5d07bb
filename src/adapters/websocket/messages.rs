//! Conversion between axum WebSocket messages and relay frames.
//!
//! The pumps only speak [`Frame`]. This is the one place that knows how those
//! map onto the WebSocket protocol types axum exposes.

use axum::extract::ws::{CloseFrame, Message};

use crate::domain::relay::Frame;

impl From<Message> for Frame {
    fn from(message: Message) -> Self {
        match message {
            Message::Text(text) => Frame::Text(text),
            Message::Binary(data) => Frame::Binary(data),
            Message::Ping(data) => Frame::Ping(data),
            Message::Pong(data) => Frame::Pong(data),
            Message::Close(close) => Frame::Close {
                code: close.map(|c| c.code),
            },
        }
    }
}

impl From<Frame> for Message {
    fn from(frame: Frame) -> Self {
        match frame {
            Frame::Text(text) => Message::Text(text),
            Frame::Binary(data) => Message::Binary(data),
            Frame::Ping(data) => Message::Ping(data),
            Frame::Pong(data) => Message::Pong(data),
            Frame::Close { code } => Message::Close(code.map(|code| CloseFrame {
                code,
                reason: "".into(),
            })),
        }
    }
}
