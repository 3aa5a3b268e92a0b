//! Shared types for deepchat.

pub mod message;

pub use message::{Message, Role};
