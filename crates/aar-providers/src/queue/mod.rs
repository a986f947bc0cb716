//! [`aar_domain::ports::DurableQueue`] adapters.

mod cloud_stub;
mod in_memory;

pub use cloud_stub::CloudQueueStub;
pub use in_memory::InMemoryQueue;
