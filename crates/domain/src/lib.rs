//! Domain model for verification attempt tracking and blocking.

#![forbid(unsafe_code)]

mod admission;
mod attempt;
mod block_policy;
mod device;
mod record;
mod stats;
mod window;

pub use admission::{AdmissionDecision, DenyReason};
pub use attempt::Attempt;
pub use block_policy::{BlockPolicy, BlockTransition};
pub use device::DeviceClass;
pub use record::{BlockStatus, EffectiveState, VerificationRecord};
pub use stats::{CacheStats, RecordStats};
pub use window::WindowCounts;
