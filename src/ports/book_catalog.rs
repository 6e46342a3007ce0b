use crate::domain::BookId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 書籍の書誌情報（表示用）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookMetadata {
    pub book_id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
}

/// 書籍カタログポート
///
/// 貸出コンテキストとカタログコンテキストの境界を維持する。
#[async_trait]
pub trait BookCatalog: Send + Sync {
    /// 所蔵冊数を取得する
    ///
    /// 在庫台帳への登録時にのみ使用される。未知の書籍は`None`。
    async fn total_copies(&self, book_id: BookId) -> Result<Option<u32>>;

    /// 書誌情報を取得する
    async fn lookup_book(&self, book_id: BookId) -> Result<Option<BookMetadata>>;
}
