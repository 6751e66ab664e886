//! ride-relay: a Telegram bot for intercity ride sharing.
//!
//! Passengers and drivers answer a short question flow; each completed
//! request is formatted and posted to the passenger or driver group chat,
//! waiting out Telegram rate limits when needed.
//!
//! See `DESIGN.md` for architecture notes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod logging;

pub mod dispatch;
pub mod flow;
pub mod relay;
pub mod session;

pub mod telegram;
