//! Conversation domain module

pub mod entities;
pub mod reply;
pub mod usage;
