use crate::domain::{BookId, inventory::BookStock};
use async_trait::async_trait;

use super::store_error::Result;

/// 在庫台帳ポート
///
/// 書籍ごとの所蔵冊数と貸出可能冊数を管理する。
/// すべての操作は`LedgerTransaction`の中で実行される。
#[async_trait]
pub trait InventoryLedger: Send {
    /// 在庫を新規登録する（貸出可能冊数 = 所蔵冊数）
    ///
    /// 登録済みなら`StoreError::AlreadyRegistered`。
    async fn register(&mut self, stock: BookStock) -> Result<()>;

    /// 現在の在庫を取得する
    ///
    /// 未登録なら`StoreError::BookNotFound`。
    async fn get_availability(&mut self, book_id: BookId) -> Result<BookStock>;

    /// 貸出可能冊数を1減らす
    ///
    /// 0冊なら`StockError::Unavailable`。確認と減算は不可分に行うこと。
    async fn decrement(&mut self, book_id: BookId) -> Result<BookStock>;

    /// 貸出可能冊数を1増やす
    ///
    /// 所蔵冊数を超える場合は`StockError::InvariantViolation`。
    async fn increment(&mut self, book_id: BookId) -> Result<BookStock>;
}
