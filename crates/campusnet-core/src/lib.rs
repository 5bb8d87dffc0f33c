// campusnet-core: domain model, telemetry storage, and the simulator that
// feeds a campus Wi-Fi dashboard with synthetic load.

pub mod error;
pub mod model;
pub mod simulator;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use error::CoreError;
pub use simulator::{Entropy, RngEntropy, ScriptedEntropy, Simulator, SimulatorStatus};
pub use store::{MemoryStore, RegistryMerge, StoreSnapshot, TelemetryStore};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    Alert, AlertSeverity, AlertStatus, Device, DeviceStatus, EntityId, MacAddress, NewDevice,
    TrafficSample,
};
