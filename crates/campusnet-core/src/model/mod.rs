// ── Domain model ──
//
// Canonical record types shared by the store, the simulator, and the CLI.

pub mod alert;
pub mod device;
pub mod entity_id;
pub mod traffic;

pub use alert::{Alert, AlertSeverity, AlertStatus};
pub use device::{Device, DeviceStatus, NewDevice};
pub use entity_id::{EntityId, MacAddress};
pub use traffic::TrafficSample;
