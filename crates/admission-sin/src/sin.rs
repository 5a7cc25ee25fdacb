use crate::{
    Error, Result, TagPair,
    base32::{ALPHABET, decode_base32, encode_base32_string, space_for_width},
};
use core::{fmt, str::FromStr};
use serde::{Deserialize, Serialize};

/// Number of Crockford base32 characters in a discriminator.
pub const DISCRIMINATOR_WIDTH: usize = 5;

/// Distinct discriminators available to each tag pair (32^5).
pub const DISCRIMINATOR_SPACE: u64 = space_for_width(DISCRIMINATOR_WIDTH) as u64;

/// A Student Identification Number: `PROGRAM-COURSE-DISCRIMINATOR`, e.g.
/// `POLY-CIV-7K3QZ`.
///
/// The tags come from [`TagPair::derive`]; the discriminator is a fixed-width
/// Crockford base32 number that makes the code unique among every code ever
/// issued.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SinCode {
    program: String,
    course: String,
    discriminator: u64,
}

impl SinCode {
    /// Builds a code from a tag pair. Discriminators wider than
    /// [`DISCRIMINATOR_SPACE`] are reduced modulo the space.
    pub fn new(tags: TagPair, discriminator: u64) -> Self {
        Self {
            program: tags.program.to_owned(),
            course: tags.course.to_owned(),
            discriminator: discriminator % DISCRIMINATOR_SPACE,
        }
    }

    pub fn program_tag(&self) -> &str {
        &self.program
    }

    pub fn course_tag(&self) -> &str {
        &self.course
    }

    pub const fn discriminator(&self) -> u64 {
        self.discriminator
    }
}

impl fmt::Display for SinCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}",
            self.program,
            self.course,
            encode_base32_string(u128::from(self.discriminator), DISCRIMINATOR_WIDTH)
        )
    }
}

impl FromStr for SinCode {
    type Err = Error;

    /// Parses the canonical form. Tags must be upper-case alphanumeric and the
    /// discriminator exactly [`DISCRIMINATOR_WIDTH`] canonical characters.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidSin {
            input: s.to_owned(),
        };
        let mut parts = s.split('-');
        let (Some(program), Some(course), Some(disc), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        if !is_tag(program) || !is_tag(course) {
            return Err(invalid());
        }
        let discriminator = parse_discriminator(disc).ok_or_else(invalid)?;
        Ok(Self {
            program: program.to_owned(),
            course: course.to_owned(),
            discriminator,
        })
    }
}

impl TryFrom<String> for SinCode {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<SinCode> for String {
    fn from(code: SinCode) -> Self {
        code.to_string()
    }
}

/// Parses a canonical discriminator: exactly [`DISCRIMINATOR_WIDTH`]
/// upper-case alphabet characters. Aliases like `O` or lower-case input are
/// rejected so each discriminator has one spelling.
pub(crate) fn parse_discriminator(s: &str) -> Option<u64> {
    if s.len() != DISCRIMINATOR_WIDTH || !s.bytes().all(|b| ALPHABET.contains(&b)) {
        return None;
    }
    decode_base32(s).ok().map(|v| v as u64)
}

fn is_tag(s: &str) -> bool {
    !s.is_empty()
        && s.bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}
