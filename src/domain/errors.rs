use thiserror::Error;

/// 在庫操作のエラー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StockError {
    /// 貸出可能な冊数が0
    #[error("no copies available")]
    Unavailable,
    /// 貸出可能冊数が所蔵冊数を超える（過去の記帳ミスを示す）
    #[error("available copies would exceed total copies")]
    InvariantViolation,
}

/// 貸出記録を閉じる際のエラー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CloseLoanError {
    /// 既に返却済み
    #[error("loan is already closed")]
    AlreadyClosed,
}

/// 延滞料金の支払いエラー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SettleFineError {
    /// 未払い残高がない
    #[error("no fine is due")]
    NoFineDue,
    /// 支払額が不正（負の値）
    #[error("invalid payment amount")]
    InvalidAmount,
    /// 支払額が残高を超えている
    #[error("payment exceeds outstanding balance")]
    OverpaymentRejected,
}
