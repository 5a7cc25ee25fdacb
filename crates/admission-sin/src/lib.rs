#![doc = include_str!("../README.md")]

mod allocator;
mod backfill;
mod base32;
mod eligibility;
mod error;
mod generator;
mod rand;
mod registration;
mod sin;
mod status;
mod store;
mod tag;

pub use crate::allocator::*;
pub use crate::backfill::*;
pub use crate::base32::*;
pub use crate::eligibility::*;
pub use crate::error::*;
pub use crate::generator::*;
pub use crate::rand::*;
pub use crate::registration::*;
pub use crate::sin::*;
pub use crate::status::*;
pub use crate::store::*;
pub use crate::tag::*;
