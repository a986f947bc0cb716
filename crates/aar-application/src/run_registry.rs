//! Tracks the cancellation token for each project's in-flight Orchestrator
//! run, so an external request (`resetAnalysis`) can cancel a running
//! analysis rather than only flipping persisted state underneath it.

use std::sync::Arc;

use dashmap::DashMap;
use tokio_util::sync::CancellationToken;

use aar_domain::value_objects::ProjectId;

/// Shared registry of in-flight run tokens, keyed by project.
#[derive(Debug, Clone, Default)]
pub struct RunRegistry {
    inner: Arc<DashMap<ProjectId, CancellationToken>>,
}

impl RunRegistry {
    /// Construct an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a run for `project_id`, as a child of `parent`, replacing any
    /// stale entry left behind by a run that didn't unregister itself.
    pub fn register(&self, project_id: ProjectId, parent: &CancellationToken) -> CancellationToken {
        let token = parent.child_token();
        self.inner.insert(project_id, token.clone());
        token
    }

    /// Remove the entry for `project_id` once its run has finished.
    pub fn unregister(&self, project_id: ProjectId) {
        self.inner.remove(&project_id);
    }

    /// Cancel the in-flight run for `project_id`, if one is registered.
    /// Returns whether a run was found.
    pub fn cancel(&self, project_id: ProjectId) -> bool {
        match self.inner.get(&project_id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_fires_the_registered_token() {
        let registry = RunRegistry::new();
        let project_id = ProjectId::new();
        let parent = CancellationToken::new();
        let token = registry.register(project_id, &parent);

        assert!(!token.is_cancelled());
        assert!(registry.cancel(project_id));
        assert!(token.is_cancelled());
    }

    #[test]
    fn cancel_on_unknown_project_is_a_no_op() {
        let registry = RunRegistry::new();
        assert!(!registry.cancel(ProjectId::new()));
    }

    #[test]
    fn unregister_removes_the_entry() {
        let registry = RunRegistry::new();
        let project_id = ProjectId::new();
        registry.register(project_id, &CancellationToken::new());
        registry.unregister(project_id);
        assert!(!registry.cancel(project_id));
    }
}
