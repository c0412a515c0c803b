use std::sync::Mutex;

use uuid::Uuid;

use super::{delete_in, update_in, MedicationStore, StoreError};
use crate::models::{Medication, MedicationInput, MedicationUpdate};

/// Process-local store. Contents are lost when the process exits.
#[derive(Default)]
pub struct InMemoryStore {
    medications: Mutex<Vec<Medication>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing list (kept in the given order).
    pub fn with_medications(medications: Vec<Medication>) -> Self {
        Self {
            medications: Mutex::new(medications),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Medication>>, StoreError> {
        self.medications.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

impl MedicationStore for InMemoryStore {
    fn list(&self) -> Result<Vec<Medication>, StoreError> {
        Ok(self.lock()?.clone())
    }

    fn add(&self, input: MedicationInput) -> Result<Medication, StoreError> {
        let med = Medication::new(input);
        self.lock()?.push(med.clone());
        Ok(med)
    }

    fn update(
        &self,
        id: &Uuid,
        update: MedicationUpdate,
    ) -> Result<Option<Medication>, StoreError> {
        Ok(update_in(&mut self.lock()?, id, update))
    }

    fn delete(&self, id: &Uuid) -> Result<bool, StoreError> {
        Ok(delete_in(&mut *self.lock()?, id))
    }
}
