mod interface;
mod json_file;
mod memory;
mod records;

pub use interface::*;
pub use json_file::*;
pub use memory::*;
pub use records::new_registration_id;
