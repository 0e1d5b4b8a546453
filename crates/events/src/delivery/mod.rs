//! Outbound delivery channels for change events.

pub mod webhook;
