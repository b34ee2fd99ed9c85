use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use nimbus_core::models::{Project, ProjectStatus};

use crate::client::BoxFuture;
use crate::error::ReconcilerError;

/// Where declarative objects live. The reconciler reads specs from here and
/// writes statuses back.
pub trait ObjectStore: Send + Sync {
    fn get<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<Option<Project>, ReconcilerError>>;

    /// All objects, sorted by name.
    fn list(&self) -> BoxFuture<'_, Result<Vec<Project>, ReconcilerError>>;

    /// Replace the status of an existing object. The spec is left alone.
    fn patch_status<'a>(
        &'a self,
        name: &'a str,
        status: &'a ProjectStatus,
    ) -> BoxFuture<'a, Result<(), ReconcilerError>>;
}

/// In-memory object index.
///
/// Dry runs write statuses here instead of to the real store, so later
/// reads within the same run see the projected state.
#[derive(Debug, Default)]
pub struct ObjectIndex {
    objects: RwLock<HashMap<String, Project>>,
}

impl ObjectIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an object by name.
    pub fn upsert(&self, project: Project) {
        self.objects
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(project.name.clone(), project);
    }

    pub fn remove(&self, name: &str) -> Option<Project> {
        self.objects
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
    }

    pub fn lookup(&self, name: &str) -> Option<Project> {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ObjectStore for ObjectIndex {
    fn get<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<Option<Project>, ReconcilerError>> {
        Box::pin(async move { Ok(self.lookup(name)) })
    }

    fn list(&self) -> BoxFuture<'_, Result<Vec<Project>, ReconcilerError>> {
        Box::pin(async move {
            let mut projects: Vec<Project> = self
                .objects
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .values()
                .cloned()
                .collect();
            projects.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(projects)
        })
    }

    fn patch_status<'a>(
        &'a self,
        name: &'a str,
        status: &'a ProjectStatus,
    ) -> BoxFuture<'a, Result<(), ReconcilerError>> {
        Box::pin(async move {
            let mut objects = self.objects.write().unwrap_or_else(PoisonError::into_inner);
            let project = objects
                .get_mut(name)
                .ok_or_else(|| ReconcilerError::ObjectNotFound {
                    name: name.to_string(),
                })?;
            project.status = status.clone();
            Ok(())
        })
    }
}
