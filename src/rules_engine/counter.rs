//! Counter exchange: peers pass an incrementing decimal integer back and forth.

use super::{DecodeError, RulesEngine, RulesError};
use tracing::{debug, info, instrument};

/// Counter game that ends once the value reaches `limit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterRules {
    value: u64,
    limit: u64,
}

impl CounterRules {
    /// Starts at zero.
    #[instrument]
    pub fn new(limit: u64) -> Self {
        Self { value: 0, limit }
    }

    /// Current counter value.
    pub fn value(&self) -> u64 {
        self.value
    }
}

impl RulesEngine for CounterRules {
    fn encode_next_move(&mut self) -> Result<Vec<u8>, RulesError> {
        self.value += 1;
        info!(counter = self.value, "Sending counter");
        Ok(self.value.to_string().into_bytes())
    }

    fn apply_opponent_move(&mut self, payload: &[u8]) -> Result<(), DecodeError> {
        let text = std::str::from_utf8(payload).map_err(|_| DecodeError::NotUtf8)?;
        self.value = text.trim().parse().map_err(|_| DecodeError::NotANumber {
            payload: text.to_string(),
        })?;
        debug!(counter = self.value, "Received counter");
        Ok(())
    }

    fn is_win(&self) -> bool {
        self.value >= self.limit
    }

    fn is_draw(&self) -> bool {
        false
    }
}
