use crate::controller::Controller;
use crate::message::{Message, MessageResult};
use crate::network::NetworkSimulator;
use rand::Rng;
use std::collections::HashMap;

/// Whether a device is part of the legitimate fleet or an attacker probing
/// the hub. Purely a label for reporting, the send path is identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Legitimate,
    Rogue,
}

impl Origin {
    pub fn as_str(self) -> &'static str {
        match self {
            Origin::Legitimate => "legitimate",
            Origin::Rogue => "rogue",
        }
    }
}

/// A client device in the warehouse. Legitimate devices carry their real
/// role and key; rogue devices carry whatever role and credentials they
/// choose to claim, and are typically never registered with the controller.
#[derive(Debug, Clone)]
pub struct Device {
    pub device_id: String,
    pub role: String,
    pub api_key: Option<String>,
    pub origin: Origin,
}

impl Device {
    pub fn legitimate(
        device_id: impl Into<String>,
        role: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            role: role.into(),
            api_key,
            origin: Origin::Legitimate,
        }
    }

    pub fn rogue(
        device_id: impl Into<String>,
        claimed_role: impl Into<String>,
        spoofed_credentials: Option<String>,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            role: claimed_role.into(),
            api_key: spoofed_credentials,
            origin: Origin::Rogue,
        }
    }

    /// Build a message from this device's stored identity and push it
    /// through the network to the controller.
    pub fn send_action(
        &self,
        action: &str,
        payload: HashMap<String, String>,
        network: &NetworkSimulator,
        controller: &Controller,
        rng: &mut impl Rng,
    ) -> MessageResult {
        let message = Message::new(
            self.device_id.clone(),
            self.role.clone(),
            action,
            payload,
            self.api_key.clone(),
        );
        network.send(&message, controller, rng)
    }
}
