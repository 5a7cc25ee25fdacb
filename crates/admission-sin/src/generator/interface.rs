use crate::{Result, SinCode};
use std::collections::HashSet;

/// A minimal interface for minting SIN codes.
///
/// Implementations are pure with respect to their inputs: they read
/// `existing` but never modify it, and never consult global state. Callers
/// that mint several codes in one pass must insert each result into their
/// working set before the next call.
pub trait SinGenerator {
    /// Returns a code for `program`/`course` that is not in `existing`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Exhausted`] when every discriminator for the tag pair
    /// is already taken.
    ///
    /// [`Error::Exhausted`]: crate::Error::Exhausted
    fn generate_unique(
        &self,
        program: &str,
        course: &str,
        existing: &HashSet<String>,
    ) -> Result<SinCode>;
}

impl<G: SinGenerator + ?Sized> SinGenerator for &G {
    fn generate_unique(
        &self,
        program: &str,
        course: &str,
        existing: &HashSet<String>,
    ) -> Result<SinCode> {
        (**self).generate_unique(program, course, existing)
    }
}

impl<G: SinGenerator + ?Sized> SinGenerator for Box<G> {
    fn generate_unique(
        &self,
        program: &str,
        course: &str,
        existing: &HashSet<String>,
    ) -> Result<SinCode> {
        (**self).generate_unique(program, course, existing)
    }
}

/// How discriminators are chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SinPolicy {
    /// Uniformly random discriminators. Codes reveal nothing about
    /// enrolment order.
    #[default]
    Random,
    /// Discriminators counted up from the number of codes already issued for
    /// the tag pair.
    Sequential,
}

impl SinPolicy {
    /// Boxes the generator for this policy using the thread-local RNG.
    pub fn generator(self) -> Box<dyn SinGenerator + Send + Sync> {
        match self {
            Self::Random => Box::new(crate::RandomSinGenerator::default()),
            Self::Sequential => Box::new(crate::SequentialSinGenerator::default()),
        }
    }
}

impl core::str::FromStr for SinPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(Self::Random),
            "sequential" => Ok(Self::Sequential),
            other => Err(format!(
                "unknown SIN policy `{other}` (expected `random` or `sequential`)"
            )),
        }
    }
}
