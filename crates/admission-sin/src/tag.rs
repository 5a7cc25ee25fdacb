//! Deterministic program and course tags.
//!
//! Tags are the human-readable prefix of every SIN. They are a pure function
//! of the program and course strings stored on a registration: no randomness,
//! no configuration, so a SIN stays meaningful after restarts and audits.
//! Anything outside the known table maps to [`FALLBACK_TAG`].

use core::fmt;

/// Tag used for any program or course missing from the table.
pub const FALLBACK_TAG: &str = "GEN";

/// Programs offered by the admission form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Program {
    Polytechnic,
    Undergraduate,
    IndustrialTraining,
    Other,
}

impl Program {
    /// Parses a stored program value (`polytechnic`, `ug`, `iti`, `others`,
    /// and their long aliases).
    pub fn parse(raw: &str) -> Option<Self> {
        match normalize(raw).as_str() {
            "polytechnic" | "poly" | "diploma" => Some(Self::Polytechnic),
            "ug" | "undergraduate" => Some(Self::Undergraduate),
            "iti" | "industrial_training" => Some(Self::IndustrialTraining),
            "others" | "other" => Some(Self::Other),
            _ => None,
        }
    }

    /// Short tag for this program.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Polytechnic => "POLY",
            Self::Undergraduate => "UG",
            Self::IndustrialTraining => "ITI",
            Self::Other => "OTH",
        }
    }

    /// Short tag for a course offered under this program.
    pub fn course_tag(self, course: &str) -> Option<&'static str> {
        let key = course_key(course);
        let tag = match (self, key.as_str()) {
            (Self::Polytechnic, "civil" | "civil_engineering") => "CIV",
            (Self::Polytechnic, "electrical" | "electrical_engineering") => "EE",
            (Self::Polytechnic, "mechanical" | "mechanical_engineering") => "ME",
            (
                Self::Polytechnic,
                "cse" | "computer_science" | "computer_science_engineering",
            ) => "CSE",
            (Self::Undergraduate, "bca") => "BCA",
            (Self::IndustrialTraining, "fitter") => "FIT",
            (Self::IndustrialTraining, "electrician") => "ELE",
            (Self::IndustrialTraining, "copa") => "COPA",
            (Self::IndustrialTraining, "surveyor") => "SUR",
            (Self::Other, "not_applicable" | "na") => "NA",
            _ => return None,
        };
        Some(tag)
    }
}

/// Tag for a program, or [`FALLBACK_TAG`] when unrecognised.
pub fn program_tag(program: &str) -> &'static str {
    Program::parse(program).map_or(FALLBACK_TAG, Program::tag)
}

/// Tag for a course within a program, or [`FALLBACK_TAG`] when either is
/// unrecognised.
pub fn course_tag(program: &str, course: &str) -> &'static str {
    Program::parse(program)
        .and_then(|p| p.course_tag(course))
        .unwrap_or(FALLBACK_TAG)
}

/// The `PROGRAM-COURSE` pair every SIN starts with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TagPair {
    pub program: &'static str,
    pub course: &'static str,
}

impl TagPair {
    pub fn derive(program: &str, course: &str) -> Self {
        Self {
            program: program_tag(program),
            course: course_tag(program, course),
        }
    }

    /// `PROGRAM-COURSE-`, the prefix shared by every code for this pair.
    pub fn prefix(&self) -> String {
        format!("{}-{}-", self.program, self.course)
    }
}

impl fmt::Display for TagPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.program, self.course)
    }
}

// Lower-case with spaces and hyphens folded to underscores, matching how the
// form derives option values from labels.
fn normalize(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

// Labels such as "BCA (Bachelor of Computer Applications)" are keyed by the
// part before the parenthesis.
fn course_key(raw: &str) -> String {
    let normalized = normalize(raw);
    match normalized.split_once('(') {
        Some((head, _)) => head.trim_end_matches('_').to_owned(),
        None => normalized,
    }
}
