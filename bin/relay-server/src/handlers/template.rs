//! File-backed template store.
//!
//! Each template is one pretty-printed JSON object at `<dir>/<id>.json`.
//! Writes are plain overwrites: concurrent saves to the same id race and the
//! last one to land wins.

use std::path::{Path, PathBuf};

use relay_types::{TemplateId, TypesError};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::info;

/// Field that selects update-in-place instead of create.
pub const SEATING_ID_FIELD: &str = "seating_id";

#[derive(Debug, Error)]
pub enum TemplateError {
    /// The body parsed as JSON but is not an object.
    #[error("template body must be a JSON object")]
    NotAnObject,

    /// `seating_id` was present with a type other than string or null.
    #[error("seating_id must be a string")]
    SeatingIdType,

    #[error(transparent)]
    InvalidId(#[from] TypesError),

    #[error("failed to create template directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write template {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to encode template: {0}")]
    Encode(#[from] serde_json::Error),
}

impl TemplateError {
    /// `true` when the caller sent something unusable, as opposed to a
    /// server-side filesystem failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            TemplateError::NotAnObject | TemplateError::SeatingIdType | TemplateError::InvalidId(_)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveKind {
    Created,
    Updated,
}

#[derive(Debug, Clone)]
pub struct SavedTemplate {
    pub id: TemplateId,
    pub kind: SaveKind,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Pick the target file for `body`.
    ///
    /// A non-empty string `seating_id` names an existing template to
    /// overwrite; a missing, `null` or empty one means a new template with a
    /// freshly generated id.
    pub fn resolve_target(body: &Map<String, Value>) -> Result<(TemplateId, SaveKind), TemplateError> {
        match body.get(SEATING_ID_FIELD) {
            None | Some(Value::Null) => Ok((TemplateId::generate(), SaveKind::Created)),
            Some(Value::String(s)) if s.is_empty() => Ok((TemplateId::generate(), SaveKind::Created)),
            Some(Value::String(s)) => Ok((TemplateId::parse(s)?, SaveKind::Updated)),
            Some(_) => Err(TemplateError::SeatingIdType),
        }
    }

    /// Write `body` to its target file, creating the directory if needed.
    pub async fn save(&self, body: Value) -> Result<SavedTemplate, TemplateError> {
        let Value::Object(object) = body else {
            return Err(TemplateError::NotAnObject);
        };
        let (id, kind) = Self::resolve_target(&object)?;
        let contents = serde_json::to_string_pretty(&Value::Object(object))?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| TemplateError::CreateDir {
                path: self.dir.clone(),
                source,
            })?;

        let path = self.dir.join(id.file_name());
        tokio::fs::write(&path, contents)
            .await
            .map_err(|source| TemplateError::Write {
                path: path.clone(),
                source,
            })?;

        match kind {
            SaveKind::Created => info!(template_id = %id, "template created"),
            SaveKind::Updated => info!(template_id = %id, "template updated"),
        }
        Ok(SavedTemplate { id, kind, path })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    async fn read_json(path: &Path) -> Value {
        let raw = tokio::fs::read_to_string(path).await.unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[tokio::test]
    async fn create_generates_distinct_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = TemplateStore::new(dir.path().join("template_json"));

        let first = store.save(json!({ "a": 1 })).await.unwrap();
        let second = store.save(json!({ "a": 1 })).await.unwrap();

        assert_eq!(first.kind, SaveKind::Created);
        assert_ne!(first.id, second.id);
        assert_eq!(first.id.as_str().len(), TemplateId::GENERATED_LEN);
        assert_eq!(read_json(&first.path).await, json!({ "a": 1 }));
        assert_eq!(read_json(&second.path).await, json!({ "a": 1 }));
    }

    #[tokio::test]
    async fn update_overwrites_without_merging() {
        let dir = tempfile::tempdir().unwrap();
        let store = TemplateStore::new(dir.path());

        let first = store
            .save(json!({ "seating_id": "abc123", "x": true }))
            .await
            .unwrap();
        assert_eq!(first.kind, SaveKind::Updated);
        assert_eq!(first.path, dir.path().join("abc123.json"));

        store
            .save(json!({ "seating_id": "abc123", "y": 2 }))
            .await
            .unwrap();
        assert_eq!(
            read_json(&first.path).await,
            json!({ "seating_id": "abc123", "y": 2 })
        );
    }

    #[tokio::test]
    async fn file_holds_the_object_not_an_encoded_string() {
        let dir = tempfile::tempdir().unwrap();
        let store = TemplateStore::new(dir.path());
        let saved = store
            .save(json!({ "seating_id": "s1", "name": "hall" }))
            .await
            .unwrap();
        let raw = tokio::fs::read_to_string(&saved.path).await.unwrap();
        assert!(raw.starts_with('{'));
        assert!(raw.contains("\n  \"name\": \"hall\""));
    }

    #[tokio::test]
    async fn empty_or_null_seating_id_creates() {
        let dir = tempfile::tempdir().unwrap();
        let store = TemplateStore::new(dir.path());
        for body in [json!({ "seating_id": "" }), json!({ "seating_id": null })] {
            let saved = store.save(body).await.unwrap();
            assert_eq!(saved.kind, SaveKind::Created);
        }
    }

    #[tokio::test]
    async fn path_escaping_id_is_rejected_and_nothing_written() {
        let dir = tempfile::tempdir().unwrap();
        let store = TemplateStore::new(dir.path().join("templates"));
        let err = store
            .save(json!({ "seating_id": "../escape" }))
            .await
            .unwrap_err();
        assert!(err.is_client_error());
        assert!(!dir.path().join("escape.json").exists());
        assert!(!dir.path().join("templates").exists());
    }

    #[tokio::test]
    async fn non_object_body_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = TemplateStore::new(dir.path());
        let err = store.save(json!([1, 2, 3])).await.unwrap_err();
        assert!(matches!(err, TemplateError::NotAnObject));
    }

    #[tokio::test]
    async fn numeric_seating_id_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = TemplateStore::new(dir.path());
        let err = store.save(json!({ "seating_id": 42 })).await.unwrap_err();
        assert!(matches!(err, TemplateError::SeatingIdType));
    }

    #[tokio::test]
    async fn existing_directory_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let store = TemplateStore::new(dir.path());
        for _ in 0..3 {
            store.save(json!({ "k": "v" })).await.unwrap();
        }
        let count = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(count, 3);
    }

    #[tokio::test]
    async fn directory_blocked_by_file_is_a_server_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("template_json");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let store = TemplateStore::new(&blocker);
        let err = store.save(json!({ "k": "v" })).await.unwrap_err();
        assert!(!err.is_client_error());
    }
}
