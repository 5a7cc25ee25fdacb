use super::records::Records;
use crate::{
    NewRegistration, Page, PaymentUpdate, Registration, RegistrationStore, Result, ThreadRandom,
};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashSet;

/// A process-local store.
///
/// Used for development and tests, and as the sample-data backend when no
/// persistent store is configured. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Records>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with existing records, keyed by their
    /// `id`.
    pub fn with_registrations(registrations: Vec<Registration>) -> Self {
        Self {
            records: RwLock::new(Records::from_vec(registrations)),
        }
    }
}

impl RegistrationStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn insert(&self, new: NewRegistration) -> Result<Registration> {
        self.records.write().insert(new, &ThreadRandom)
    }

    fn get(&self, id: &str) -> Result<Option<Registration>> {
        Ok(self.records.read().get(id))
    }

    fn list(&self, page: Page) -> Result<Vec<Registration>> {
        Ok(self.records.read().page(page))
    }

    fn all(&self) -> Result<Vec<Registration>> {
        Ok(self.records.read().sorted())
    }

    fn update_payment(&self, id: &str, update: &PaymentUpdate) -> Result<Option<Registration>> {
        Ok(self.records.write().update_payment(id, update))
    }

    fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.records.write().delete(id))
    }

    fn list_all_sin_codes(&self) -> Result<HashSet<String>> {
        Ok(self.records.read().sin_codes())
    }

    fn apply_sin(&self, id: &str, sin: &str, generated_at: DateTime<Utc>) -> Result<bool> {
        let outcome = self.records.write().apply_sin(id, sin, generated_at)?;
        Ok(outcome.found())
    }
}
