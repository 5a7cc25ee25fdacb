mod interface;
mod thread_random;
pub use interface::*;
pub use thread_random::*;
