use crate::{NewRegistration, Page, PaymentUpdate, Registration, Result};
use chrono::{DateTime, Utc};
use std::{collections::HashSet, sync::Arc};

/// Persistence for registrations.
///
/// The allocator only ever calls [`Self::list_all_sin_codes`], [`Self::get`],
/// [`Self::all`], [`Self::update_payment`] and [`Self::apply_sin`]; it never
/// knows which backend it is talking to. Implementations synchronise
/// internally and are shared across request handlers.
pub trait RegistrationStore: Send + Sync {
    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;

    /// Validates and stores a new submission, assigning its id.
    fn insert(&self, new: NewRegistration) -> Result<Registration>;

    fn get(&self, id: &str) -> Result<Option<Registration>>;

    /// Registrations ordered by `createdAt`, newest first.
    fn list(&self, page: Page) -> Result<Vec<Registration>>;

    /// Every stored registration, newest first.
    fn all(&self) -> Result<Vec<Registration>>;

    /// Records a payment confirmation. Returns `None` when the registration
    /// does not exist.
    fn update_payment(&self, id: &str, update: &PaymentUpdate) -> Result<Option<Registration>>;

    /// Removes a registration. Returns `false` when it did not exist.
    ///
    /// A SIN held by the removed registration stays reserved and keeps
    /// appearing in [`Self::list_all_sin_codes`].
    fn delete(&self, id: &str) -> Result<bool>;

    /// Every SIN ever issued, including codes of deleted registrations.
    fn list_all_sin_codes(&self) -> Result<HashSet<String>>;

    /// Writes `sin` onto a registration.
    ///
    /// Returns `Ok(false)` when the registration does not exist. Writing the
    /// code a registration already holds is a no-op returning `Ok(true)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SinConflict`] when the registration already holds a
    /// different code; assigned codes are immutable.
    ///
    /// [`Error::SinConflict`]: crate::Error::SinConflict
    fn apply_sin(&self, id: &str, sin: &str, generated_at: DateTime<Utc>) -> Result<bool>;
}

impl<S: RegistrationStore + ?Sized> RegistrationStore for Arc<S> {
    fn backend(&self) -> &'static str {
        (**self).backend()
    }

    fn insert(&self, new: NewRegistration) -> Result<Registration> {
        (**self).insert(new)
    }

    fn get(&self, id: &str) -> Result<Option<Registration>> {
        (**self).get(id)
    }

    fn list(&self, page: Page) -> Result<Vec<Registration>> {
        (**self).list(page)
    }

    fn all(&self) -> Result<Vec<Registration>> {
        (**self).all()
    }

    fn update_payment(&self, id: &str, update: &PaymentUpdate) -> Result<Option<Registration>> {
        (**self).update_payment(id, update)
    }

    fn delete(&self, id: &str) -> Result<bool> {
        (**self).delete(id)
    }

    fn list_all_sin_codes(&self) -> Result<HashSet<String>> {
        (**self).list_all_sin_codes()
    }

    fn apply_sin(&self, id: &str, sin: &str, generated_at: DateTime<Utc>) -> Result<bool> {
        (**self).apply_sin(id, sin, generated_at)
    }
}
