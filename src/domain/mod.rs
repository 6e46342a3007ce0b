pub mod commands;
pub mod errors;
pub mod fine;
pub mod inventory;
pub mod loan;
pub mod value_objects;

pub use errors::*;
pub use value_objects::*;
