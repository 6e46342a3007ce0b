use crate::domain::{BookId, CloseLoanError, SettleFineError, StockError};
use thiserror::Error;

/// 台帳ポート共通のエラー
///
/// ビジネスルールによる拒否と、永続化層の障害（`Unavailable`）を区別する。
#[derive(Debug, Error)]
pub enum StoreError {
    /// 在庫台帳に書籍が存在しない
    #[error("book {0} is not registered in the inventory ledger")]
    BookNotFound(BookId),

    /// 在庫台帳に登録済み
    #[error("book {0} is already registered in the inventory ledger")]
    AlreadyRegistered(BookId),

    #[error(transparent)]
    Stock(#[from] StockError),

    #[error(transparent)]
    CloseLoan(#[from] CloseLoanError),

    #[error(transparent)]
    Settle(#[from] SettleFineError),

    /// 永続化層に到達できない、またはトランザクションが失敗した
    #[error("storage unavailable")]
    Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn unavailable<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        StoreError::Unavailable(err.into())
    }
}

/// 台帳ポートの Result型
pub type Result<T> = std::result::Result<T, StoreError>;
