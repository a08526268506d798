//! Tool registration and dispatch

pub mod invoker;
pub mod registry;

pub use invoker::RegistryInvoker;
pub use registry::{ToolHandler, ToolRegistry};
