use crate::domain::{BookId, CloseLoanError, MemberId, Money, SettleFineError, StockError};
use crate::ports::StoreError;
use thiserror::Error;

/// 貸出管理アプリケーション層のエラー
///
/// 呼び出し側が正確なメッセージを表示できるよう、失敗の種類ごとに区別する。
#[derive(Debug, Error)]
pub enum CirculationError {
    /// 会員が存在しない
    #[error("Member {0} not found")]
    MemberNotFound(MemberId),

    /// 書籍が存在しない（カタログ、または在庫台帳に未登録）
    #[error("Book {0} not found")]
    BookNotFound(BookId),

    /// 在庫台帳に登録済み
    #[error("Book {0} is already registered")]
    AlreadyRegistered(BookId),

    /// 貸出可能な冊数がない
    #[error("No copies of the book are available")]
    Unavailable,

    /// 未払いの延滞料金があるため貸出不可
    #[error("Member has an outstanding fine of {0}")]
    OutstandingFine(Money),

    /// 取引が存在しない、または返却済み
    #[error("Transaction not found or book already returned")]
    NotFoundOrAlreadyReturned,

    /// 返却処理が競合し、既に閉じられていた
    #[error("Loan is already closed")]
    AlreadyClosed,

    /// 貸出可能冊数が所蔵冊数を超える（上流の記帳ミス）
    #[error("Inventory invariant violated")]
    InvariantViolation,

    /// 延滞料金の残高がない
    #[error("No fine is due")]
    NoFineDue,

    /// 支払額が不正
    #[error("Invalid payment amount")]
    InvalidAmount,

    /// 支払額が残高を超えている
    #[error("Payment exceeds outstanding balance")]
    OverpaymentRejected,

    /// 永続化層のエラー
    #[error("Storage unavailable")]
    StorageUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// MemberDirectoryのエラー
    #[error("Member directory error")]
    MemberDirectoryError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// BookCatalogのエラー
    #[error("Book catalog error")]
    CatalogError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<StockError> for CirculationError {
    fn from(err: StockError) -> Self {
        match err {
            StockError::Unavailable => CirculationError::Unavailable,
            StockError::InvariantViolation => CirculationError::InvariantViolation,
        }
    }
}

impl From<CloseLoanError> for CirculationError {
    fn from(err: CloseLoanError) -> Self {
        match err {
            CloseLoanError::AlreadyClosed => CirculationError::AlreadyClosed,
        }
    }
}

impl From<SettleFineError> for CirculationError {
    fn from(err: SettleFineError) -> Self {
        match err {
            SettleFineError::NoFineDue => CirculationError::NoFineDue,
            SettleFineError::InvalidAmount => CirculationError::InvalidAmount,
            SettleFineError::OverpaymentRejected => CirculationError::OverpaymentRejected,
        }
    }
}

impl From<StoreError> for CirculationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::BookNotFound(book_id) => CirculationError::BookNotFound(book_id),
            StoreError::AlreadyRegistered(book_id) => CirculationError::AlreadyRegistered(book_id),
            StoreError::Stock(e) => e.into(),
            StoreError::CloseLoan(e) => e.into(),
            StoreError::Settle(e) => e.into(),
            StoreError::Unavailable(e) => CirculationError::StorageUnavailable(e),
        }
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, CirculationError>;
