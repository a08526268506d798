//! Tool invoker port
//!
//! The orchestrator dispatches model-requested tool calls through this port.
//! Invocation never fails the conversation: every outcome, including
//! unparseable arguments or a handler error, comes back as an ordinary
//! [`ToolExecutionResult`].

use async_trait::async_trait;
use synapse_domain::{ToolCallRequest, ToolDescriptor, ToolExecutionResult};

/// Executes one requested tool call against the registered handlers.
#[async_trait]
pub trait ToolInvokerPort: Send + Sync {
    /// The descriptors of every registered tool, in registration order.
    fn descriptors(&self) -> Vec<ToolDescriptor>;

    /// Invoke the named tool with the raw argument payload.
    ///
    /// Infallible by contract: argument parse failures, enum violations and
    /// handler errors are all reported inside the result envelope.
    async fn invoke(&self, call: &ToolCallRequest) -> ToolExecutionResult;
}
