pub mod config;
pub use config::ExperimentConfig;

use crate::controller::{Controller, Mode};
use crate::device::Device;
use crate::message::MessageResult;
use crate::network::{NetworkConfig, NetworkSimulator};
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// Roles handed out round-robin to the legitimate fleet.
const ROLE_CYCLE: [&str; 3] = ["sensor", "robot", "viewer"];

/// The action a rogue device keeps probing with.
const MALICIOUS_ACTION: &str = "shutdown";

/// Flat per-message record, the shape the CSV export and summaries consume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecord {
    pub source: String,
    pub device_id: String,
    pub role: String,
    pub action: String,
    pub delivered: bool,
    pub latency_ms: f64,
    pub accepted: bool,
    pub authorised: bool,
    pub reason: String,
}

impl MessageRecord {
    fn from_result(device: &Device, action: &str, result: &MessageResult) -> Self {
        Self {
            source: device.origin.as_str().to_string(),
            device_id: device.device_id.clone(),
            role: device.role.clone(),
            action: action.to_string(),
            delivered: result.delivered,
            latency_ms: result.latency_ms,
            accepted: result.accepted,
            authorised: result.authorised,
            reason: result.reason.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExperimentResults {
    pub mode: Mode,
    pub records: Vec<MessageRecord>,
}

/// One full run of legitimate plus rogue traffic against a controller in a
/// given security mode.
pub struct Experiment {
    mode: Mode,
    config: ExperimentConfig,
}

impl Experiment {
    pub fn new(mode: Mode, config: ExperimentConfig) -> Self {
        Self { mode, config }
    }

    /// Build controller, network and devices from the config.
    fn setup(&self) -> (Controller, NetworkSimulator, Vec<Device>, Device) {
        let network = NetworkSimulator::new(NetworkConfig {
            latency_range_ms: self.config.latency_range_ms,
            loss_probability: self.config.loss_probability,
        });

        let mut controller = Controller::new(self.mode, self.config.security_overhead_ms);

        let mut legit_devices = Vec::with_capacity(self.config.num_legit_devices as usize);
        for i in 0..self.config.num_legit_devices {
            let device_id = format!("device_{}", i + 1);
            let role = ROLE_CYCLE[i as usize % ROLE_CYCLE.len()];

            // Per-device API keys only exist in secure mode.
            let api_key = match self.mode {
                Mode::Secure => Some(format!("key-{}", device_id)),
                Mode::Weak => None,
            };

            controller.register_device(&device_id, role, api_key.as_deref());
            legit_devices.push(Device::legitimate(device_id, role, api_key));
        }

        // The rogue device claims a role and, in secure mode, presents a
        // spoofed key. It is never registered.
        let rogue_key = match self.mode {
            Mode::Secure => Some(self.config.rogue_api_key.clone()),
            Mode::Weak => None,
        };
        let rogue = Device::rogue(
            self.config.rogue_device_id.clone(),
            self.config.rogue_role.clone(),
            rogue_key,
        );

        (controller, network, legit_devices, rogue)
    }

    pub fn run(&self) -> Result<ExperimentResults> {
        info!("Starting experiment: {}", self.config.name);
        info!("Mode: {}", self.mode);
        info!(
            "Devices: {} legit, {} msgs each, {} rogue msgs",
            self.config.num_legit_devices,
            self.config.num_legit_messages_per_device,
            self.config.num_rogue_messages
        );

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let (controller, network, legit_devices, rogue) = self.setup();

        let pb = ProgressBar::new(self.config.total_messages());
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.orange/yellow} {pos}/{len} {msg}")?
                .progress_chars("█▓░"),
        );

        let mut records =
            Vec::with_capacity(self.config.total_messages() as usize);

        for device in &legit_devices {
            let action = legitimate_action(&device.role);
            for _ in 0..self.config.num_legit_messages_per_device {
                let result =
                    device.send_action(action, HashMap::new(), &network, &controller, &mut rng);
                debug!(
                    "{} {} -> {} ({})",
                    device.device_id, action, result.accepted, result.reason
                );
                records.push(MessageRecord::from_result(device, action, &result));
                pb.inc(1);
            }
        }

        for _ in 0..self.config.num_rogue_messages {
            let result =
                rogue.send_action(MALICIOUS_ACTION, HashMap::new(), &network, &controller, &mut rng);
            debug!(
                "{} {} -> {} ({})",
                rogue.device_id, MALICIOUS_ACTION, result.accepted, result.reason
            );
            records.push(MessageRecord::from_result(&rogue, MALICIOUS_ACTION, &result));
            pb.inc(1);
        }

        pb.finish_and_clear();
        info!("Experiment complete: {} messages", records.len());

        Ok(ExperimentResults {
            mode: self.mode,
            records,
        })
    }
}

/// Typical benign action for a role. Robots default to movement.
fn legitimate_action(role: &str) -> &'static str {
    match role {
        "sensor" => "send_status",
        "viewer" => "read_status",
        _ => "move",
    }
}
