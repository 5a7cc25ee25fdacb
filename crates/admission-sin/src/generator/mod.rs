mod interface;
mod random;
mod sequential;
#[cfg(test)]
mod tests;

pub use interface::*;
pub use random::*;
pub use sequential::*;

use crate::{Error, Result, SinCode, TagPair, sin::parse_discriminator};
use std::collections::HashSet;

/// Mints a code for `program`/`course` absent from `existing` using the
/// default random policy.
///
/// Shorthand for [`RandomSinGenerator::default`] followed by
/// [`SinGenerator::generate_unique`].
///
/// # Example
/// ```
/// use std::collections::HashSet;
///
/// let mut existing = HashSet::new();
/// let first = admission_sin::generate_unique_sin("ITI", "Fitter", &existing).unwrap();
/// existing.insert(first.to_string());
/// let second = admission_sin::generate_unique_sin("ITI", "Fitter", &existing).unwrap();
///
/// assert!(first.to_string().starts_with("ITI-FIT-"));
/// assert_ne!(first, second);
/// ```
pub fn generate_unique_sin(
    program: &str,
    course: &str,
    existing: &HashSet<String>,
) -> Result<SinCode> {
    RandomSinGenerator::default().generate_unique(program, course, existing)
}

/// Counts codes in `existing` that belong to `tags` and use a discriminator
/// below `space`.
///
/// Only canonical spellings are counted, so the result never exceeds the
/// number of distinct discriminators actually taken.
pub(crate) fn count_taken(tags: TagPair, space: u64, existing: &HashSet<String>) -> u64 {
    let prefix = tags.prefix();
    existing
        .iter()
        .filter_map(|code| code.strip_prefix(prefix.as_str()))
        .filter_map(parse_discriminator)
        .filter(|&d| d < space)
        .count() as u64
}

/// Walks the discriminator space from `start`, wrapping, and returns the
/// first code absent from `existing`.
///
/// Visits each discriminator at most once, so it terminates with
/// [`Error::Exhausted`] when every slot is taken.
pub(crate) fn first_free(
    tags: TagPair,
    start: u64,
    space: u64,
    existing: &HashSet<String>,
) -> Result<SinCode> {
    let start = start % space;
    for step in 0..space {
        let candidate = SinCode::new(tags, (start + step) % space);
        if !existing.contains(&candidate.to_string()) {
            return Ok(candidate);
        }
    }
    Err(exhausted(tags))
}

pub(crate) fn exhausted(tags: TagPair) -> Error {
    Error::Exhausted {
        prefix: tags.to_string(),
    }
}
