//! [`aar_domain::ports::BlobStore`] adapters.

mod local;

pub use local::LocalBlobStore;
