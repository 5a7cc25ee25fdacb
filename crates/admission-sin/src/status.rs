/// The outcome of asking the allocator for a registration's SIN.
///
/// - [`Allocation::Assigned`] a new code was generated and written.
/// - [`Allocation::Existing`] the registration already had a code; nothing was
///   generated.
/// - [`Allocation::Ineligible`] the registration does not qualify yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Allocation {
    /// A fresh SIN was minted for the registration.
    Assigned {
        /// The newly written code.
        sin: String,
    },
    /// The registration already carried a SIN.
    Existing {
        /// The code assigned earlier.
        sin: String,
    },
    /// No SIN: the registration lacks a transaction id or a positive amount.
    Ineligible,
}

impl Allocation {
    /// The registration's SIN, whether new or pre-existing.
    pub fn sin(&self) -> Option<&str> {
        match self {
            Self::Assigned { sin } | Self::Existing { sin } => Some(sin),
            Self::Ineligible => None,
        }
    }

    pub const fn is_new(&self) -> bool {
        matches!(self, Self::Assigned { .. })
    }

    /// Lower-case label for logs and API responses.
    pub const fn outcome(&self) -> &'static str {
        match self {
            Self::Assigned { .. } => "assigned",
            Self::Existing { .. } => "existing",
            Self::Ineligible => "ineligible",
        }
    }
}
