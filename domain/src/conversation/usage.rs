//! Token usage accounting

use serde::{Deserialize, Serialize};

/// Token counts reported by a provider for one request/response pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    /// Input tokens served from the provider's prompt cache
    pub cached_tokens: u64,
}

impl TokenUsage {
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
            cached_tokens: 0,
        }
    }

    pub fn with_cached(mut self, cached_tokens: u64) -> Self {
        self.cached_tokens = cached_tokens;
        self
    }

    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

/// Running total across every provider round-trip of a conversation.
///
/// Counters only ever grow; a failed round keeps whatever was recorded
/// before the failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageAccumulator {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cached_tokens: u64,
    /// Number of provider round-trips that reported usage
    pub requests: u64,
}

impl UsageAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, usage: TokenUsage) {
        self.input_tokens += usage.input_tokens;
        self.output_tokens += usage.output_tokens;
        self.cached_tokens += usage.cached_tokens;
        self.requests += 1;
    }

    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_across_requests() {
        let mut acc = UsageAccumulator::new();
        acc.add(TokenUsage::new(100, 20));
        acc.add(TokenUsage::new(250, 75).with_cached(200));

        assert_eq!(acc.input_tokens, 350);
        assert_eq!(acc.output_tokens, 95);
        assert_eq!(acc.cached_tokens, 200);
        assert_eq!(acc.requests, 2);
        assert_eq!(acc.total(), 445);
    }
}
