use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    BookId, MemberId, Money, TransactionId,
    commands::{IssueBook, PayFine, ReturnBook},
    fine::ReturnOutcome,
    inventory::BookStock,
    loan::{LoanRecord, OpenLoan},
};
use crate::ports::BookMetadata;

// ============================================================================
// Requests
// ============================================================================

/// 貸出リクエスト（POST /loans）
#[derive(Debug, Deserialize)]
pub struct IssueBookRequest {
    pub member_id: Uuid,
    pub book_id: Uuid,
}

impl IssueBookRequest {
    pub fn to_command(&self, today: NaiveDate) -> IssueBook {
        IssueBook {
            member_id: MemberId::from_uuid(self.member_id),
            book_id: BookId::from_uuid(self.book_id),
            issue_date: today,
        }
    }
}

/// 返却コマンドを組み立てる（POST /loans/:id/return）
pub fn return_command(transaction_id: Uuid, today: NaiveDate) -> ReturnBook {
    ReturnBook {
        transaction_id: TransactionId::from_uuid(transaction_id),
        return_date: today,
    }
}

/// 支払いリクエスト（POST /members/:id/fine/payments）
///
/// 負の金額も受け取り、アプリケーション層で拒否する。
#[derive(Debug, Deserialize)]
pub struct PayFineRequest {
    pub amount: i64,
}

impl PayFineRequest {
    pub fn to_command(&self, member_id: Uuid) -> PayFine {
        PayFine {
            member_id: MemberId::from_uuid(member_id),
            amount: self.amount,
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

/// 在庫登録レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct BookRegisteredResponse {
    pub book_id: Uuid,
    pub total_copies: u32,
    pub available_copies: u32,
}

impl From<BookStock> for BookRegisteredResponse {
    fn from(stock: BookStock) -> Self {
        Self {
            book_id: stock.book_id().value(),
            total_copies: stock.total_copies(),
            available_copies: stock.available_copies(),
        }
    }
}

/// 在庫照会レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub book_id: Uuid,
    pub available_copies: u32,
}

impl From<BookStock> for AvailabilityResponse {
    fn from(stock: BookStock) -> Self {
        Self {
            book_id: stock.book_id().value(),
            available_copies: stock.available_copies(),
        }
    }
}

/// 貸出作成レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct LoanCreatedResponse {
    pub transaction_id: Uuid,
    pub member_id: Uuid,
    pub book_id: Uuid,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
}

impl From<OpenLoan> for LoanCreatedResponse {
    fn from(loan: OpenLoan) -> Self {
        Self {
            transaction_id: loan.transaction_id.value(),
            member_id: loan.member_id.value(),
            book_id: loan.book_id.value(),
            issue_date: loan.issue_date,
            due_date: loan.due_date,
        }
    }
}

/// 返却レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct BookReturnedResponse {
    pub transaction_id: Uuid,
    pub outcome: String,
    pub days_overdue: u64,
    pub fine: Money,
}

impl BookReturnedResponse {
    pub fn new(transaction_id: Uuid, outcome: ReturnOutcome) -> Self {
        match outcome {
            ReturnOutcome::OnTime => Self {
                transaction_id,
                outcome: "on_time".into(),
                days_overdue: 0,
                fine: Money::ZERO,
            },
            ReturnOutcome::Late { days_overdue, fine } => Self {
                transaction_id,
                outcome: "late".into(),
                days_overdue,
                fine,
            },
        }
    }
}

/// 貸出中の記録（GET /members/:id/loans）
///
/// 書誌情報はカタログに存在する場合のみ付与する。
#[derive(Debug, Serialize, Deserialize)]
pub struct OpenLoanResponse {
    pub transaction_id: Uuid,
    pub book_id: Uuid,
    pub title: Option<String>,
    pub author: Option<String>,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
}

impl OpenLoanResponse {
    pub fn new(loan: &LoanRecord, metadata: Option<BookMetadata>) -> Self {
        let core = loan.core();
        let (title, author) = metadata
            .map(|m| (Some(m.title), Some(m.author)))
            .unwrap_or_default();
        Self {
            transaction_id: core.transaction_id.value(),
            book_id: core.book_id.value(),
            title,
            author,
            issue_date: core.issue_date,
            due_date: core.due_date,
        }
    }
}

/// 延滞料金残高レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct FineBalanceResponse {
    pub member_id: Uuid,
    pub outstanding_fine: Money,
}

/// エラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error_type.into(),
            message: message.into(),
        }
    }
}
