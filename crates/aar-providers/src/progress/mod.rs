//! [`aar_domain::ports::ProgressBus`] adapters.

mod broadcast;

pub use broadcast::BroadcastProgressBus;
