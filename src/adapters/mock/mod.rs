pub mod book_catalog;
pub mod member_directory;

pub use book_catalog::BookCatalog;
pub use member_directory::MemberDirectory;
