//! In-memory [`ProjectRepository`].

use async_trait::async_trait;
use dashmap::DashMap;

use aar_domain::entities::Project;
use aar_domain::error::{Error, Result};
use aar_domain::ports::ProjectRepository;
use aar_domain::value_objects::{OwnerId, ProjectId};

/// `DashMap`-backed project store.
#[derive(Default)]
pub struct InMemoryProjectRepository {
    rows: DashMap<ProjectId, Project>,
}

impl InMemoryProjectRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepository {
    async fn create(&self, project: &Project) -> Result<()> {
        self.rows.insert(project.id, project.clone());
        Ok(())
    }

    async fn get(&self, id: ProjectId) -> Result<Project> {
        self.rows
            .get(&id)
            .map(|r| r.clone())
            .ok_or_else(|| Error::not_found(format!("project {id}")))
    }

    async fn list(&self, owner: Option<OwnerId>, page: u32, page_size: u32) -> Result<Vec<Project>> {
        let mut all: Vec<Project> = self
            .rows
            .iter()
            .map(|r| r.clone())
            .filter(|p| owner.is_none_or(|o| p.owner == o))
            .collect();
        all.sort_by_key(|p| p.created_at);
        let start = (page as usize) * (page_size as usize);
        Ok(all.into_iter().skip(start).take(page_size as usize).collect())
    }

    async fn update(&self, project: &Project) -> Result<()> {
        if !self.rows.contains_key(&project.id) {
            return Err(Error::not_found(format!("project {}", project.id)));
        }
        self.rows.insert(project.id, project.clone());
        Ok(())
    }

    async fn delete(&self, id: ProjectId) -> Result<()> {
        self.rows.remove(&id);
        Ok(())
    }
}
