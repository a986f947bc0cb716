//! [`aar_domain::ports::RemoteSourceFetcher`] adapters.

mod git_clone;

pub use git_clone::GitShallowCloneFetcher;
