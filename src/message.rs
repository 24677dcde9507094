use std::collections::HashMap;
use std::fmt;

/// Request from a device to the controller. Built fresh for every send,
/// never reused.
#[derive(Debug, Clone)]
pub struct Message {
    pub device_id: String,
    pub role: String,
    pub action: String,
    pub payload: HashMap<String, String>,
    // e.g. API key or shared secret
    pub credentials: Option<String>,
}

impl Message {
    pub fn new(
        device_id: impl Into<String>,
        role: impl Into<String>,
        action: impl Into<String>,
        payload: HashMap<String, String>,
        credentials: Option<String>,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            role: role.into(),
            action: action.into(),
            payload,
            credentials,
        }
    }
}

/// Why a message ended up accepted, rejected or lost.
///
/// The rendered tags are a fixed vocabulary consumed by downstream analysis
/// scripts, so `Display` output must stay stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    NetworkDrop,
    AuthOkWeak,
    UnknownDevice,
    AuthOkSecure,
    MissingApiKey,
    InvalidApiKey,
    AcceptedWithoutAuth(Box<Reason>),
    ForbiddenAction,
    SecureAccept,
    WeakAcceptNoRbac,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::NetworkDrop => write!(f, "network_drop"),
            Reason::AuthOkWeak => write!(f, "auth_ok_weak"),
            Reason::UnknownDevice => write!(f, "unknown_device"),
            Reason::AuthOkSecure => write!(f, "auth_ok_secure"),
            Reason::MissingApiKey => write!(f, "missing_api_key"),
            Reason::InvalidApiKey => write!(f, "invalid_api_key"),
            Reason::AcceptedWithoutAuth(inner) => write!(f, "accepted_without_auth:{}", inner),
            Reason::ForbiddenAction => write!(f, "forbidden_action"),
            Reason::SecureAccept => write!(f, "secure_accept"),
            Reason::WeakAcceptNoRbac => write!(f, "weak_accept_no_rbac"),
        }
    }
}

/// Outcome of one send through the network and controller.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageResult {
    pub delivered: bool,
    pub latency_ms: f64,
    pub accepted: bool,
    pub authorised: bool,
    pub reason: Reason,
}

impl MessageResult {
    /// A message the network lost before it reached the controller.
    pub fn dropped(latency_ms: f64) -> Self {
        Self {
            delivered: false,
            latency_ms,
            accepted: false,
            authorised: false,
            reason: Reason::NetworkDrop,
        }
    }
}
