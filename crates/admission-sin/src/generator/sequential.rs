use super::{count_taken, exhausted, first_free};
use crate::{DISCRIMINATOR_SPACE, Result, SinCode, SinGenerator, TagPair};
use std::collections::HashSet;
#[cfg(feature = "tracing")]
use tracing::instrument;

/// A SIN generator that numbers codes per tag pair.
///
/// The first candidate is one past the count of codes already issued for the
/// tag pair, so a pair with no history starts at `00001`. Codes that do
/// not follow the count, such as imported ones, are skipped by walking forward
/// until a free discriminator is found.
#[derive(Clone, Debug)]
pub struct SequentialSinGenerator {
    space: u64,
}

impl Default for SequentialSinGenerator {
    fn default() -> Self {
        Self {
            space: DISCRIMINATOR_SPACE,
        }
    }
}

impl SequentialSinGenerator {
    /// Creates a generator restricted to discriminators in `0..space`.
    pub fn with_space(space: u64) -> Self {
        Self {
            space: space.clamp(1, DISCRIMINATOR_SPACE),
        }
    }
}

impl SinGenerator for SequentialSinGenerator {
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self, existing)))]
    fn generate_unique(
        &self,
        program: &str,
        course: &str,
        existing: &HashSet<String>,
    ) -> Result<SinCode> {
        let tags = TagPair::derive(program, course);
        let taken = count_taken(tags, self.space, existing);
        if taken >= self.space {
            return Err(exhausted(tags));
        }
        first_free(tags, taken + 1, self.space, existing)
    }
}
