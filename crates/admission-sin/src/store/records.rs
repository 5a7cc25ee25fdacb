//! Backend-independent record bookkeeping shared by every store.

use crate::{
    Error, NewRegistration, Page, PaymentUpdate, RandSource, Registration, Result,
    base32::encode_base32_string,
};
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap, HashSet};

const TIMESTAMP_CHARS: usize = 10;
const RANDOM_CHARS: usize = 16;
const RANDOM_BITS: u32 = 80;

/// Builds a 26 character registration id: 48 bits of milliseconds since the
/// Unix epoch followed by 80 random bits, both Crockford base32.
///
/// Ids sort by creation time and are safe to embed in URLs.
pub fn new_registration_id<R>(now: DateTime<Utc>, rng: &R) -> String
where
    R: RandSource<u128> + ?Sized,
{
    let millis = u128::try_from(now.timestamp_millis()).unwrap_or_default();
    let random = rng.rand() & ((1_u128 << RANDOM_BITS) - 1);
    let mut id = encode_base32_string(millis, TIMESTAMP_CHARS);
    id.push_str(&encode_base32_string(random, RANDOM_CHARS));
    id
}

/// In-memory registration table.
///
/// Codes held by deleted registrations move to `retired` and stay reserved,
/// so a SIN is never issued twice even after its record is gone.
#[derive(Clone, Debug, Default)]
pub(crate) struct Records {
    by_id: HashMap<String, Registration>,
    retired: BTreeSet<String>,
}

impl Records {
    pub(crate) fn from_vec(registrations: Vec<Registration>) -> Self {
        Self::from_parts(registrations, BTreeSet::new())
    }

    pub(crate) fn from_parts(registrations: Vec<Registration>, retired: BTreeSet<String>) -> Self {
        Self {
            by_id: registrations
                .into_iter()
                .map(|r| (r.id.clone(), r))
                .collect(),
            retired,
        }
    }

    pub(crate) fn retired(&self) -> &BTreeSet<String> {
        &self.retired
    }

    pub(crate) fn insert<R>(&mut self, new: NewRegistration, rng: &R) -> Result<Registration>
    where
        R: RandSource<u128> + ?Sized,
    {
        new.validate()?;
        let now = Utc::now();
        let mut id = new_registration_id(now, rng);
        while self.by_id.contains_key(&id) {
            id = new_registration_id(now, rng);
        }
        let registration = Registration::from_new(id.clone(), new, now);
        self.by_id.insert(id, registration.clone());
        Ok(registration)
    }

    pub(crate) fn get(&self, id: &str) -> Option<Registration> {
        self.by_id.get(id).cloned()
    }

    /// Newest first; ties broken by id so pages are stable.
    pub(crate) fn sorted(&self) -> Vec<Registration> {
        let mut all: Vec<Registration> = self.by_id.values().cloned().collect();
        all.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        all
    }

    pub(crate) fn page(&self, page: Page) -> Vec<Registration> {
        self.sorted()
            .into_iter()
            .skip(page.offset)
            .take(page.limit)
            .collect()
    }

    pub(crate) fn update_payment(
        &mut self,
        id: &str,
        update: &PaymentUpdate,
    ) -> Option<Registration> {
        let registration = self.by_id.get_mut(id)?;
        registration.apply_payment(update, Utc::now());
        Some(registration.clone())
    }

    pub(crate) fn delete(&mut self, id: &str) -> bool {
        let Some(removed) = self.by_id.remove(id) else {
            return false;
        };
        if let Some(sin) = removed.sin_number {
            self.retired.insert(sin);
        }
        true
    }

    /// Every code ever issued: live assignments plus retired ones.
    pub(crate) fn sin_codes(&self) -> HashSet<String> {
        self.by_id
            .values()
            .filter_map(|r| r.sin_number.clone())
            .chain(self.retired.iter().cloned())
            .collect()
    }

    /// Assigned codes are immutable: a different code already on the record
    /// is a conflict, the same code is left untouched.
    pub(crate) fn apply_sin(
        &mut self,
        id: &str,
        sin: &str,
        generated_at: DateTime<Utc>,
    ) -> Result<SinWrite> {
        let Some(registration) = self.by_id.get_mut(id) else {
            return Ok(SinWrite::Missing);
        };
        match registration.sin_number.as_deref() {
            Some(existing) if existing == sin => Ok(SinWrite::Unchanged),
            Some(existing) => Err(Error::SinConflict {
                id: id.to_owned(),
                existing: existing.to_owned(),
            }),
            None => {
                registration.sin_number = Some(sin.to_owned());
                registration.sin_generated_at = Some(generated_at);
                registration.updated_at = generated_at;
                Ok(SinWrite::Written)
            }
        }
    }
}

/// Outcome of writing a SIN onto the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SinWrite {
    Written,
    Unchanged,
    Missing,
}

impl SinWrite {
    /// Whether the registration exists, the boolean `apply_sin` reports.
    pub(crate) const fn found(self) -> bool {
        !matches!(self, Self::Missing)
    }
}
