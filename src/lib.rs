pub mod controller;
pub mod device;
pub mod experiment;
pub mod message;
pub mod metrics;
pub mod network;

pub use controller::{Controller, Mode};
pub use device::Device;
pub use experiment::{Experiment, ExperimentConfig};
pub use message::{Message, MessageResult};
pub use network::NetworkSimulator;

pub mod prelude {
    pub use crate::controller::{Controller, Mode, RbacPolicy};
    pub use crate::device::{Device, Origin};
    pub use crate::experiment::{Experiment, ExperimentConfig, MessageRecord};
    pub use crate::message::{Message, MessageResult, Reason};
    pub use crate::metrics::Summary;
    pub use crate::network::{NetworkConfig, NetworkSimulator};
}
