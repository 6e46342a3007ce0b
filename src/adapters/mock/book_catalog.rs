use crate::domain::BookId;
use crate::ports::book_catalog::{BookCatalog as BookCatalogTrait, BookMetadata, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// BookCatalogのモック実装
///
/// 書籍を登録することで状態を持ったテストをサポート。
pub struct BookCatalog {
    books: RwLock<HashMap<BookId, (BookMetadata, u32)>>,
}

impl BookCatalog {
    pub fn new() -> Self {
        Self {
            books: RwLock::new(HashMap::new()),
        }
    }

    /// テスト用に書籍を登録
    pub fn add_book(&self, book_id: BookId, title: &str, total_copies: u32) {
        let metadata = BookMetadata {
            book_id,
            title: title.to_string(),
            author: "Mock Author".to_string(),
            isbn: None,
        };
        self.books
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(book_id, (metadata, total_copies));
    }
}

impl Default for BookCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookCatalogTrait for BookCatalog {
    async fn total_copies(&self, book_id: BookId) -> Result<Option<u32>> {
        Ok(self
            .books
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&book_id)
            .map(|(_, total)| *total))
    }

    async fn lookup_book(&self, book_id: BookId) -> Result<Option<BookMetadata>> {
        Ok(self
            .books
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&book_id)
            .map(|(metadata, _)| metadata.clone()))
    }
}
