mod circulation_service;
mod errors;
mod queries;

pub use circulation_service::{
    ServiceDependencies, issue_book, pay_fine, register_book, return_book,
};
pub use errors::{CirculationError, Result};
pub use queries::{get_availability, get_fine_balance, list_open_loans, lookup_book};
