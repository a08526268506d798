//! Use cases (application services)

pub mod conversation;
