//! Console progress reporting for the conversation loop

use synapse_application::ConversationProgress;
use synapse_domain::{ToolCallRequest, ToolExecutionResult};

/// Prints tool activity to stderr so it never mixes with assistant prose.
pub struct ConsoleProgress;

impl ConversationProgress for ConsoleProgress {
    fn on_tool_call(&self, call: &ToolCallRequest) {
        eprintln!("  [tool] {} {}", call.name, call.raw_arguments);
    }

    fn on_tool_result(&self, call: &ToolCallRequest, result: &ToolExecutionResult) {
        if result.is_ok() {
            eprintln!("  [ok]   {}: {}", call.name, result.message);
        } else {
            eprintln!("  [fail] {}: {}", call.name, result.message);
        }
    }

    fn on_turn_limit(&self, limit: usize) {
        eprintln!("  [stop] tool turn limit ({limit}) reached");
    }
}
