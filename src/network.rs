use crate::controller::Controller;
use crate::message::{Message, MessageResult};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Uniform latency band for a single hop, in milliseconds.
    pub latency_range_ms: (f64, f64),
    pub loss_probability: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            latency_range_ms: (10.0, 100.0),
            loss_probability: 0.05,
        }
    }
}

/// Simulates the transport between a device and the controller: every
/// message pays a latency drawn from the configured band, and some fraction
/// never arrives at all. Latency is a number, not a real wait.
#[derive(Debug, Clone)]
pub struct NetworkSimulator {
    config: NetworkConfig,
}

impl NetworkSimulator {
    pub fn new(config: NetworkConfig) -> Self {
        Self { config }
    }

    /// Route one message to the controller, possibly dropping it on the way.
    ///
    /// Loss is terminal for the send, there are no retries and the
    /// controller never sees a dropped message. Delivered messages pay the
    /// base latency plus whatever security overhead the controller reports.
    pub fn send(
        &self,
        message: &Message,
        controller: &Controller,
        rng: &mut impl Rng,
    ) -> MessageResult {
        let (min_ms, max_ms) = self.config.latency_range_ms;
        let base_latency_ms = rng.gen_range(min_ms..=max_ms);

        if rng.gen_range(0.0..1.0) < self.config.loss_probability {
            return MessageResult::dropped(base_latency_ms);
        }

        let decision = controller.process_message(message, rng);

        MessageResult {
            delivered: true,
            latency_ms: base_latency_ms + decision.security_overhead_ms,
            accepted: decision.accepted,
            authorised: decision.authorised,
            reason: decision.reason,
        }
    }
}
