use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use uuid::Uuid;

use super::{delete_in, update_in, MedicationStore, StoreError};
use crate::config::STORAGE_KEY;
use crate::models::{Medication, MedicationInput, MedicationUpdate};

/// Medication list persisted as a JSON array in `<dir>/medications.json`.
///
/// Every operation reads the file, applies the change and writes it back
/// through a temp file + rename. A file that cannot be decoded is treated
/// as an empty list; it is overwritten by the next successful write.
pub struct JsonFileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(format!("{STORAGE_KEY}.json")),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<Medication>, StoreError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice::<Vec<Medication>>(&bytes) {
            Ok(medications) => Ok(medications),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Stored medication list is corrupted, starting from an empty list"
                );
                Ok(Vec::new())
            }
        }
    }

    fn save(&self, medications: &[Medication]) -> Result<(), StoreError> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)?;

        let json = serde_json::to_vec_pretty(medications)?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;

        tracing::debug!(count = medications.len(), "Medication list saved");
        Ok(())
    }

    fn modify<R>(
        &self,
        f: impl FnOnce(&mut Vec<Medication>) -> (R, bool),
    ) -> Result<R, StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::LockPoisoned)?;
        let mut medications = self.load()?;
        let (result, changed) = f(&mut medications);
        if changed {
            self.save(&medications)?;
        }
        Ok(result)
    }
}

impl MedicationStore for JsonFileStore {
    fn list(&self) -> Result<Vec<Medication>, StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::LockPoisoned)?;
        self.load()
    }

    fn add(&self, input: MedicationInput) -> Result<Medication, StoreError> {
        let med = Medication::new(input);
        self.modify(|list| {
            list.push(med.clone());
            ((), true)
        })?;
        tracing::info!(id = %med.id, "Medication added");
        Ok(med)
    }

    fn update(
        &self,
        id: &Uuid,
        update: MedicationUpdate,
    ) -> Result<Option<Medication>, StoreError> {
        self.modify(|list| {
            let updated = update_in(list, id, update);
            let changed = updated.is_some();
            (updated, changed)
        })
    }

    fn delete(&self, id: &Uuid) -> Result<bool, StoreError> {
        self.modify(|list| {
            let removed = delete_in(list, id);
            (removed, removed)
        })
    }
}
