use std::path::{Path, PathBuf};

use nimbus_core::models::{Project, ProjectStatus};

use crate::client::BoxFuture;
use crate::error::ReconcilerError;
use crate::store::ObjectStore;

/// Directory-backed object store: one `<name>.json` file per object.
///
/// Writes are atomic (tmp + rename), so a crash mid-write leaves the
/// previous version in place.
pub struct FileObjectStore {
    dir: PathBuf,
}

impl FileObjectStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, ReconcilerError> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !name.starts_with('.');
        if !valid {
            return Err(ReconcilerError::InvalidName(name.to_string()));
        }
        Ok(self.dir.join(format!("{name}.json")))
    }

    fn read(&self, path: &Path) -> Result<Option<Project>, ReconcilerError> {
        if !path.exists() {
            return Ok(None);
        }
        let json = std::fs::read(path)?;
        let project: Project = serde_json::from_slice(&json)?;
        Ok(Some(project))
    }

    fn write(&self, path: &Path, project: &Project) -> Result<(), ReconcilerError> {
        let json = serde_json::to_vec_pretty(project)?;
        std::fs::create_dir_all(&self.dir)?;
        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &json)?;
        std::fs::rename(&tmp_path, path)?;

        tracing::debug!(path = %path.display(), "object written");
        Ok(())
    }

    /// Create or replace an object, spec and status alike.
    pub fn put(&self, project: &Project) -> Result<(), ReconcilerError> {
        let path = self.path_for(&project.name)?;
        self.write(&path, project)
    }
}

impl ObjectStore for FileObjectStore {
    fn get<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<Option<Project>, ReconcilerError>> {
        Box::pin(async move {
            let path = self.path_for(name)?;
            self.read(&path)
        })
    }

    fn list(&self) -> BoxFuture<'_, Result<Vec<Project>, ReconcilerError>> {
        Box::pin(async move {
            if !self.dir.exists() {
                return Ok(Vec::new());
            }
            let mut projects = Vec::new();
            for entry in std::fs::read_dir(&self.dir)? {
                let path = entry?.path();
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }
                match self.read(&path) {
                    Ok(Some(project)) => projects.push(project),
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "skipping unreadable object");
                    }
                }
            }
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
            let path = self.path_for(name)?;
            let mut project = self
                .read(&path)?
                .ok_or_else(|| ReconcilerError::ObjectNotFound {
                    name: name.to_string(),
                })?;
            project.status = status.clone();
            self.write(&path, &project)
        })
    }
}
