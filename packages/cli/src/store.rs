//! Directory of JSON files implementing the editor's store boundary.
//!
//! ```text
//! <root>/
//!   templates/<templateId>.json
//!   batches/<batchId>.json
//!   snapshots/<templateId>/<version>.json
//!   previews/<templateId>.html
//! ```

use mailforge_editor::{ChangeBatch, ChangeStatus, DocumentStore, StoreError};
use mailforge_model::Template;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the directory layout
    pub fn init(&self) -> std::io::Result<()> {
        for dir in ["templates", "batches", "snapshots", "previews"] {
            fs::create_dir_all(self.root.join(dir))?;
        }
        Ok(())
    }

    fn template_path(&self, template_id: &str) -> Result<PathBuf, StoreError> {
        Ok(self.root.join("templates").join(format!("{}.json", key(template_id)?)))
    }

    fn batch_path(&self, batch_id: &str) -> Result<PathBuf, StoreError> {
        Ok(self.root.join("batches").join(format!("{}.json", key(batch_id)?)))
    }

    pub fn snapshot_path(&self, template_id: &str, version: u64) -> Result<PathBuf, StoreError> {
        Ok(self
            .root
            .join("snapshots")
            .join(key(template_id)?)
            .join(format!("{}.json", version)))
    }

    pub fn preview_path(&self, template_id: &str) -> Result<PathBuf, StoreError> {
        Ok(self.root.join("previews").join(format!("{}.html", key(template_id)?)))
    }

    /// Every stored batch of a template
    pub fn batches_for(&self, template_id: &str) -> Result<Vec<ChangeBatch>, StoreError> {
        let dir = self.root.join("batches");
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut batches = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                let batch: ChangeBatch = read_json(&path)?;
                if batch.template_id == template_id {
                    batches.push(batch);
                }
            }
        }
        Ok(batches)
    }

    /// Stored snapshot versions of a template, oldest first
    pub fn snapshot_versions(&self, template_id: &str) -> Result<Vec<u64>, StoreError> {
        let dir = self.root.join("snapshots").join(key(template_id)?);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut versions = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if let Some(version) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<u64>().ok())
            {
                versions.push(version);
            }
        }
        versions.sort_unstable();
        Ok(versions)
    }
}

/// Ids become file names, so they must stay inside their directory
fn key(id: &str) -> Result<&str, StoreError> {
    if id.is_empty() || id == "." || id.contains("..") || id.contains(['/', '\\']) {
        return Err(StoreError::InvalidId(id.to_string()));
    }
    Ok(id)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn read_optional<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    if path.exists() {
        read_json(path).map(Some)
    } else {
        Ok(None)
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    debug!(path = %path.display(), "Wrote store file");
    Ok(())
}

impl DocumentStore for JsonFileStore {
    fn load_template(&self, template_id: &str) -> Result<Option<Template>, StoreError> {
        read_optional(&self.template_path(template_id)?)
    }

    fn load_change_batch(&self, batch_id: &str) -> Result<Option<ChangeBatch>, StoreError> {
        read_optional(&self.batch_path(batch_id)?)
    }

    fn load_pending_batch(&self, template_id: &str) -> Result<Option<ChangeBatch>, StoreError> {
        Ok(self
            .batches_for(template_id)?
            .into_iter()
            .find(ChangeBatch::is_open))
    }

    fn save_template(&mut self, template: &Template) -> Result<(), StoreError> {
        write_json(&self.template_path(&template.id)?, template)
    }

    fn save_change_batch(&mut self, batch: &ChangeBatch) -> Result<(), StoreError> {
        write_json(&self.batch_path(&batch.id)?, batch)
    }

    fn save_change_record_statuses(&mut self, record_ids: &[String], status: ChangeStatus) -> Result<(), StoreError> {
        let mut by_batch: BTreeMap<&str, Vec<&String>> = BTreeMap::new();
        let mut unknown = Vec::new();
        for id in record_ids {
            match ChangeBatch::batch_id_of(id) {
                Some(batch_id) => by_batch.entry(batch_id).or_default().push(id),
                None => unknown.push(id.clone()),
            }
        }

        for (batch_id, ids) in by_batch {
            let Some(mut batch) = self.load_change_batch(batch_id)? else {
                unknown.extend(ids.into_iter().cloned());
                continue;
            };
            for id in ids {
                match batch.record_mut(id) {
                    Some(record) => record.status = status,
                    None => unknown.push(id.clone()),
                }
            }
            self.save_change_batch(&batch)?;
        }

        if unknown.is_empty() {
            Ok(())
        } else {
            Err(StoreError::UnknownRecords(unknown))
        }
    }

    fn append_version_snapshot(&mut self, template_id: &str, version: u64, template: &Template) -> Result<(), StoreError> {
        let path = self.snapshot_path(template_id, version)?;
        if path.exists() {
            return Err(StoreError::Backend(format!(
                "snapshot {} of {} already exists",
                version, template_id
            )));
        }
        write_json(&path, template)
    }

    fn save_preview(&mut self, template_id: &str, html: &str) -> Result<(), StoreError> {
        let path = self.preview_path(template_id)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, html)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailforge_editor::{ChangeOperation, ReviewService};
    use serde_json::json;

    #[test]
    fn test_review_cycle_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("store"));
        store.init().unwrap();

        let mut service = ReviewService::new(store);
        let draft = json!({
            "id": "promo",
            "sections": [{ "id": "s1", "elements": [{ "id": "h1", "type": "header", "content": "Hello" }] }]
        });
        let proposed = service.propose("promo", &draft).unwrap();
        let batch_id = proposed.resolution.batch.unwrap().id;

        let store = service.store();
        assert!(store.template_path("promo").unwrap().exists());
        assert!(store.preview_path("promo").unwrap().exists());
        assert_eq!(store.load_pending_batch("promo").unwrap().unwrap().id, batch_id);

        service
            .execute("promo", &ChangeOperation::AcceptBatch(batch_id.clone()))
            .unwrap();

        let store = service.store();
        assert!(store.load_pending_batch("promo").unwrap().is_none());
        assert_eq!(store.snapshot_versions("promo").unwrap(), vec![2]);
        let batch = store.load_change_batch(&batch_id).unwrap().unwrap();
        assert!(batch.records.iter().all(|r| r.status == ChangeStatus::Accepted));
    }

    #[test]
    fn test_missing_files_read_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        assert!(store.load_template("nope").unwrap().is_none());
        assert!(store.load_change_batch("nope").unwrap().is_none());
        assert!(store.load_pending_batch("nope").unwrap().is_none());
    }

    #[test]
    fn test_ids_cannot_escape_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("store"));
        store.init().unwrap();

        let escaping = Template::new("../x", "Escape");
        assert!(matches!(
            store.save_template(&escaping),
            Err(StoreError::InvalidId(id)) if id == "../x"
        ));
        assert!(matches!(store.load_change_batch("a/b"), Err(StoreError::InvalidId(_))));
        assert!(matches!(store.save_preview("..", "<p></p>"), Err(StoreError::InvalidId(_))));
        assert!(!dir.path().join("x.json").exists());

        store.save_template(&Template::new("ok-id", "Fine")).unwrap();
        assert!(store.load_template("ok-id").unwrap().is_some());
    }
}
