pub mod book_catalog;
pub mod circulation_store;
pub mod member_directory;

// パブリックに型を再エクスポート
pub use book_catalog::BookCatalog as PostgresBookCatalog;
pub use circulation_store::CirculationStore as PostgresCirculationStore;
pub use member_directory::MemberDirectory as PostgresMemberDirectory;
