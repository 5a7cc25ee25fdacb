mod crockford;
mod error;

pub use crockford::*;
pub use error::*;
