use crate::{
    Allocation, BackfillReport, Error, NewRegistration, PaymentUpdate, Registration,
    RegistrationStore, Result, SinGenerator, backfill, is_eligible,
};
use chrono::Utc;
use parking_lot::Mutex;
#[cfg(feature = "tracing")]
use tracing::instrument;

/// Issues SINs against a [`RegistrationStore`].
///
/// Every operation that reads the issued codes, mints a new one and writes it
/// back runs under a single mutex, so concurrent requests in one process can
/// never observe the same working set and hand out the same code. Stores are
/// still free to serve unrelated reads and writes concurrently.
///
/// # Example
/// ```
/// use admission_sin::{
///     Allocation, MemoryStore, NewRegistration, RandomSinGenerator, RegistrationStore,
///     SinAllocator,
/// };
///
/// let allocator = SinAllocator::new(MemoryStore::new(), RandomSinGenerator::default());
/// let reg = allocator
///     .store()
///     .insert(NewRegistration {
///         program: "ug".into(),
///         course: "bca".into(),
///         student_name: "Asha".into(),
///         transaction_id: Some("TXN1".into()),
///         payment_amount: Some(25000.0.into()),
///         ..Default::default()
///     })
///     .unwrap();
///
/// let first = allocator.allocate(&reg.id).unwrap();
/// assert!(first.sin().unwrap().starts_with("UG-BCA-"));
/// assert_eq!(
///     allocator.allocate(&reg.id).unwrap(),
///     Allocation::Existing { sin: first.sin().unwrap().to_owned() }
/// );
/// ```
#[derive(Debug)]
pub struct SinAllocator<S, G> {
    store: S,
    generator: G,
    lock: Mutex<()>,
}

impl<S, G> SinAllocator<S, G>
where
    S: RegistrationStore,
    G: SinGenerator,
{
    pub fn new(store: S, generator: G) -> Self {
        Self {
            store,
            generator,
            lock: Mutex::new(()),
        }
    }

    /// The underlying store, for operations that never touch SINs.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Ensures registration `id` has a SIN if it is eligible.
    ///
    /// The generator is only consulted when the registration is eligible and
    /// has no code yet; calling this repeatedly is safe.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] when the registration does not exist.
    /// - [`Error::Exhausted`] when its tag pair has no free code.
    /// - Any store error from reading or writing.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self)))]
    pub fn allocate(&self, id: &str) -> Result<Allocation> {
        let _guard = self.lock.lock();
        let registration = self.store.get(id)?.ok_or_else(|| not_found(id))?;
        self.assign(&registration)
    }

    /// Records a payment confirmation and allocates a SIN in the same
    /// critical section.
    ///
    /// Returns the registration as stored after the update together with the
    /// allocation outcome. The returned registration carries the new SIN when
    /// one was assigned.
    ///
    /// # Errors
    ///
    /// As [`Self::allocate`].
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, update), fields(txn = %update.transaction_id))
    )]
    pub fn confirm_payment(
        &self,
        id: &str,
        update: &PaymentUpdate,
    ) -> Result<(Registration, Allocation)> {
        let _guard = self.lock.lock();
        let registration = self
            .store
            .update_payment(id, update)?
            .ok_or_else(|| not_found(id))?;
        self.assign_and_reload(registration)
    }

    /// Stores a new submission and, when it arrives already paid and
    /// eligible, issues its SIN in the same critical section.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRegistration`] for an incomplete submission,
    /// [`Error::Exhausted`] when the tag pair has no free code, or any store
    /// error.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
    pub fn register(&self, new: NewRegistration) -> Result<(Registration, Allocation)> {
        let _guard = self.lock.lock();
        let registration = self.store.insert(new)?;
        self.assign_and_reload(registration)
    }

    /// Issues SINs to every eligible registration that lacks one.
    ///
    /// Per-registration failures are collected in the report; only failing to
    /// read the store aborts the pass.
    #[cfg_attr(feature = "tracing", instrument(level = "info", skip(self)))]
    pub fn backfill(&self) -> Result<BackfillReport> {
        let _guard = self.lock.lock();
        let registrations = self.store.all()?;
        let mut existing = self.store.list_all_sin_codes()?;
        Ok(backfill(
            &registrations,
            &mut existing,
            &self.generator,
            |registration, code| {
                self.store
                    .apply_sin(&registration.id, &code.to_string(), Utc::now())
            },
        ))
    }

    /// Runs [`Self::assign`] and returns the record as stored afterwards.
    /// Must be called with `self.lock` held.
    fn assign_and_reload(
        &self,
        mut registration: Registration,
    ) -> Result<(Registration, Allocation)> {
        let allocation = self.assign(&registration)?;
        if let Allocation::Assigned { sin } = &allocation {
            match self.store.get(&registration.id)? {
                Some(stored) => registration = stored,
                None => registration.sin_number = Some(sin.clone()),
            }
        }
        Ok((registration, allocation))
    }

    /// Must be called with `self.lock` held.
    fn assign(&self, registration: &Registration) -> Result<Allocation> {
        if let Some(sin) = registration.sin() {
            return Ok(Allocation::Existing {
                sin: sin.to_owned(),
            });
        }
        if !is_eligible(registration) {
            return Ok(Allocation::Ineligible);
        }

        let existing = self.store.list_all_sin_codes()?;
        let sin = self
            .generator
            .generate_unique(&registration.program, &registration.course, &existing)?
            .to_string();
        if !self.store.apply_sin(&registration.id, &sin, Utc::now())? {
            return Err(not_found(&registration.id));
        }

        #[cfg(feature = "tracing")]
        tracing::info!(id = %registration.id, sin = %sin, "SIN assigned");
        Ok(Allocation::Assigned { sin })
    }
}

fn not_found(id: &str) -> Error {
    Error::NotFound { id: id.to_owned() }
}
