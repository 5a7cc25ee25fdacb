use super::{count_taken, exhausted, first_free};
use crate::{
    DISCRIMINATOR_SPACE, RandSource, Result, SinCode, SinGenerator, TagPair, ThreadRandom,
};
use std::collections::HashSet;
#[cfg(feature = "tracing")]
use tracing::instrument;

/// Random draws attempted before falling back to a linear walk.
///
/// With fewer than half the space taken, the chance of 16 consecutive misses
/// is below 2^-16, so the walk only runs on nearly full tag pairs.
pub const MAX_RANDOM_ATTEMPTS: usize = 16;

/// A SIN generator that draws discriminators uniformly at random.
///
/// Expected attempts are O(1) while the tag pair is sparsely used. After
/// [`MAX_RANDOM_ATTEMPTS`] collisions it counts the codes already issued for
/// the tag pair, reports [`Error::Exhausted`] if none are left, and otherwise
/// walks the space from the last draw, so it always terminates.
///
/// [`Error::Exhausted`]: crate::Error::Exhausted
///
/// ## See Also
/// - [`SequentialSinGenerator`]
///
/// [`SequentialSinGenerator`]: crate::SequentialSinGenerator
#[derive(Clone, Debug)]
pub struct RandomSinGenerator<R = ThreadRandom> {
    rng: R,
    space: u64,
}

impl Default for RandomSinGenerator<ThreadRandom> {
    fn default() -> Self {
        Self::new(ThreadRandom)
    }
}

impl<R> RandomSinGenerator<R>
where
    R: RandSource<u64>,
{
    /// Creates a generator over the full discriminator space.
    ///
    /// # Example
    /// ```
    /// use admission_sin::{RandomSinGenerator, SinGenerator, ThreadRandom};
    /// use std::collections::HashSet;
    ///
    /// let generator = RandomSinGenerator::new(ThreadRandom);
    /// let code = generator
    ///     .generate_unique("polytechnic", "civil_engineering", &HashSet::new())
    ///     .unwrap();
    /// assert!(code.to_string().starts_with("POLY-CIV-"));
    /// ```
    pub fn new(rng: R) -> Self {
        Self::with_space(rng, DISCRIMINATOR_SPACE)
    }

    /// Creates a generator restricted to discriminators in `0..space`.
    ///
    /// `space` is clamped to `1..=DISCRIMINATOR_SPACE`.
    pub fn with_space(rng: R, space: u64) -> Self {
        Self {
            rng,
            space: space.clamp(1, DISCRIMINATOR_SPACE),
        }
    }
}

impl<R> SinGenerator for RandomSinGenerator<R>
where
    R: RandSource<u64>,
{
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self, existing)))]
    fn generate_unique(
        &self,
        program: &str,
        course: &str,
        existing: &HashSet<String>,
    ) -> Result<SinCode> {
        let tags = TagPair::derive(program, course);

        let mut draw = self.rng.rand() % self.space;
        for _ in 0..MAX_RANDOM_ATTEMPTS {
            let candidate = SinCode::new(tags, draw);
            if !existing.contains(&candidate.to_string()) {
                return Ok(candidate);
            }
            draw = self.rng.rand() % self.space;
        }

        // Counting is O(n), so it only runs once the cheap draws have failed.
        if count_taken(tags, self.space, existing) >= self.space {
            return Err(exhausted(tags));
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(%tags, "random draws collided, walking discriminator space");
        first_free(tags, draw, self.space, existing)
    }
}
