//! Medication list persistence.
//!
//! `MedicationStore` is the only way the rest of the crate touches the
//! medication list. Two implementations:
//! - `JsonFileStore`: one JSON file under a fixed storage key (production)
//! - `InMemoryStore`: process-local list (tests, ephemeral runs)

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::InMemoryStore;

use thiserror::Error;
use uuid::Uuid;

use crate::models::{Medication, MedicationInput, MedicationUpdate};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal lock error")]
    LockPoisoned,
}

/// CRUD over the user's medication list. Order of `list()` is insertion order.
pub trait MedicationStore: Send + Sync {
    fn list(&self) -> Result<Vec<Medication>, StoreError>;

    fn get(&self, id: &Uuid) -> Result<Option<Medication>, StoreError> {
        Ok(self.list()?.into_iter().find(|m| &m.id == id))
    }

    /// Insert a new record with a fresh id and `created_at == updated_at`.
    fn add(&self, input: MedicationInput) -> Result<Medication, StoreError>;

    /// Returns `None` when no record has this id.
    fn update(
        &self,
        id: &Uuid,
        update: MedicationUpdate,
    ) -> Result<Option<Medication>, StoreError>;

    /// Returns `false` when no record has this id.
    fn delete(&self, id: &Uuid) -> Result<bool, StoreError>;
}

// Shared list mutations, used by both implementations.

fn update_in(
    list: &mut [Medication],
    id: &Uuid,
    update: MedicationUpdate,
) -> Option<Medication> {
    let med = list.iter_mut().find(|m| &m.id == id)?;
    med.apply(update);
    Some(med.clone())
}

fn delete_in(list: &mut Vec<Medication>, id: &Uuid) -> bool {
    let before = list.len();
    list.retain(|m| &m.id != id);
    list.len() != before
}

#[cfg(test)]
pub(crate) mod contract {
    //! Behaviour every `MedicationStore` must share.

    use super::*;

    pub fn add_list_update_delete(store: &dyn MedicationStore) {
        let med = store
            .add(MedicationInput::new("Warfarin", "5mg", "1x denně"))
            .unwrap();

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0], med);
        assert_eq!(listed[0].created_at, listed[0].updated_at);

        std::thread::sleep(std::time::Duration::from_millis(5));
        let updated = store
            .update(
                &med.id,
                MedicationUpdate {
                    dosage: Some("2.5mg".into()),
                    ..Default::default()
                },
            )
            .unwrap()
            .expect("record exists");
        assert_eq!(updated.dosage, "2.5mg");
        assert_eq!(updated.created_at, med.created_at);
        assert!(updated.updated_at > med.updated_at);
        assert_eq!(store.get(&med.id).unwrap(), Some(updated));

        assert!(store.delete(&med.id).unwrap());
        assert!(store.list().unwrap().is_empty());
        assert!(!store.delete(&med.id).unwrap());
    }

    pub fn update_missing_returns_none(store: &dyn MedicationStore) {
        let result = store
            .update(&Uuid::new_v4(), MedicationUpdate::default())
            .unwrap();
        assert!(result.is_none());
    }

    pub fn preserves_insertion_order(store: &dyn MedicationStore) {
        for name in ["Warfarin", "Ibuprofen", "Omeprazol"] {
            store.add(MedicationInput::new(name, "1 tableta", "denně")).unwrap();
        }
        let names: Vec<String> = store.list().unwrap().into_iter().map(|m| m.name).collect();
        assert_eq!(names, ["Warfarin", "Ibuprofen", "Omeprazol"]);
    }

    pub fn ids_are_unique(store: &dyn MedicationStore) {
        let a = store.add(MedicationInput::new("Paralen", "500mg", "3x denně")).unwrap();
        let b = store.add(MedicationInput::new("Paralen", "500mg", "3x denně")).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(store.list().unwrap().len(), 2);
    }
}
