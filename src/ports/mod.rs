pub mod book_catalog;
pub mod circulation_store;
pub mod fine_ledger;
pub mod inventory_ledger;
pub mod loan_record_store;
pub mod member_directory;
pub mod store_error;

pub use book_catalog::{BookCatalog, BookMetadata};
pub use circulation_store::{CirculationStore, LedgerTransaction};
pub use fine_ledger::FineLedger;
pub use inventory_ledger::InventoryLedger;
pub use loan_record_store::LoanRecordStore;
pub use member_directory::MemberDirectory;
pub use store_error::StoreError;
