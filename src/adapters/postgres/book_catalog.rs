use crate::domain::BookId;
use crate::ports::book_catalog::{BookCatalog as BookCatalogTrait, BookMetadata, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row};

/// BookCatalogのPostgreSQL実装
///
/// カタログサブシステムが管理する`books`テーブルを読み取り専用で参照する。
#[derive(Clone)]
pub struct BookCatalog {
    pool: PgPool,
}

impl BookCatalog {
    /// PostgreSQLコネクションプールから新しいBookCatalogを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookCatalogTrait for BookCatalog {
    async fn total_copies(&self, book_id: BookId) -> Result<Option<u32>> {
        let total: Option<i32> = sqlx::query_scalar(
            r#"
            SELECT total_copies
            FROM books
            WHERE book_id = $1
            "#,
        )
        .bind(book_id.value())
        .fetch_optional(&self.pool)
        .await?;

        // CHECK制約により負数は入らない
        Ok(total.map(u32::try_from).transpose()?)
    }

    async fn lookup_book(&self, book_id: BookId) -> Result<Option<BookMetadata>> {
        let row = sqlx::query(
            r#"
            SELECT book_id, title, author, isbn
            FROM books
            WHERE book_id = $1
            "#,
        )
        .bind(book_id.value())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(BookMetadata {
            book_id: BookId::from_uuid(row.try_get("book_id")?),
            title: row.try_get("title")?,
            author: row.try_get("author")?,
            isbn: row.try_get("isbn")?,
        }))
    }
}
