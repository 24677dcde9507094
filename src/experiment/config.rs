use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub name: String,
    pub num_legit_devices: u32,
    pub num_legit_messages_per_device: u32,
    pub num_rogue_messages: u32,
    pub latency_range_ms: (f64, f64),
    pub loss_probability: f64,
    pub security_overhead_ms: f64,
    pub rogue_device_id: String,
    pub rogue_role: String,
    pub rogue_api_key: String,
    /// Seed for the run's RNG. None draws one from the OS, which makes the
    /// run non-reproducible but independent across invocations.
    pub seed: Option<u64>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            name: "warehouse".to_string(),
            num_legit_devices: 3,
            num_legit_messages_per_device: 100,
            num_rogue_messages: 100,
            latency_range_ms: (10.0, 100.0),
            loss_probability: 0.05,
            security_overhead_ms: 5.0,
            rogue_device_id: "rogue_1".to_string(),
            rogue_role: "robot".to_string(),
            rogue_api_key: "invalid-key".to_string(),
            seed: None,
        }
    }
}

impl ExperimentConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_loss(mut self, loss_probability: f64) -> Self {
        self.loss_probability = loss_probability;
        self
    }

    pub fn with_traffic(
        mut self,
        devices: u32,
        messages_per_device: u32,
        rogue_messages: u32,
    ) -> Self {
        self.num_legit_devices = devices;
        self.num_legit_messages_per_device = messages_per_device;
        self.num_rogue_messages = rogue_messages;
        self
    }

    pub fn total_messages(&self) -> u64 {
        self.num_legit_devices as u64 * self.num_legit_messages_per_device as u64
            + self.num_rogue_messages as u64
    }
}
