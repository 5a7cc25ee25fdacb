//! Retroactive SIN issuance over a batch of stored registrations.

use crate::{Error, Registration, Result, SinCode, SinGenerator, is_eligible};
use serde::Serialize;
use std::collections::HashSet;

/// Summary of a backfill pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackfillReport {
    /// Candidates examined: eligible registrations that had no SIN.
    pub processed: usize,
    /// Candidates that received and stored a new SIN.
    pub generated: usize,
    /// Registrations that were not candidates (already assigned or not
    /// eligible).
    pub skipped: usize,
    /// Candidates that could not be completed.
    pub errors: Vec<BackfillFailure>,
}

/// A candidate the backfill could not complete.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BackfillFailure {
    /// The registration id.
    pub id: String,
    pub reason: String,
}

/// Issues SINs to every eligible registration in `registrations` that lacks
/// one.
///
/// Each generated code is inserted into `existing` *before* the next
/// candidate is considered, so one pass can never hand out the same code
/// twice. `existing` must start as the full set of codes ever issued; after
/// the call it also contains every code minted here.
///
/// `apply` persists a code and returns `Ok(false)` when the registration has
/// disappeared. Any failure (generation, persistence, missing record) is
/// recorded in [`BackfillReport::errors`] and the pass continues with the next
/// candidate. A code whose write failed stays in `existing`, since the write
/// may have partially landed.
pub fn backfill<G, F>(
    registrations: &[Registration],
    existing: &mut HashSet<String>,
    generator: &G,
    mut apply: F,
) -> BackfillReport
where
    G: SinGenerator + ?Sized,
    F: FnMut(&Registration, &SinCode) -> Result<bool>,
{
    let mut report = BackfillReport::default();

    for registration in registrations {
        if registration.sin().is_some() || !is_eligible(registration) {
            report.skipped += 1;
            continue;
        }
        report.processed += 1;

        let code = match generator.generate_unique(
            &registration.program,
            &registration.course,
            existing,
        ) {
            Ok(code) => code,
            Err(err) => {
                report.fail(registration, &err);
                continue;
            }
        };
        existing.insert(code.to_string());

        match apply(registration, &code) {
            Ok(true) => report.generated += 1,
            Ok(false) => report.fail(
                registration,
                &Error::NotFound {
                    id: registration.id.clone(),
                },
            ),
            Err(err) => report.fail(registration, &err),
        }
    }

    #[cfg(feature = "tracing")]
    tracing::info!(
        processed = report.processed,
        generated = report.generated,
        skipped = report.skipped,
        errors = report.errors.len(),
        "backfill finished"
    );
    report
}

impl BackfillReport {
    fn fail(&mut self, registration: &Registration, err: &Error) {
        #[cfg(feature = "tracing")]
        tracing::warn!(id = %registration.id, error = %err, "backfill candidate failed");
        self.errors.push(BackfillFailure {
            id: registration.id.clone(),
            reason: err.to_string(),
        });
    }
}
