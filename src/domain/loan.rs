use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{BookId, CloseLoanError, MemberId, TransactionId};

/// 貸出期間（日数）
///
/// 会員種別にかかわらず一律。
pub const LOAN_PERIOD_DAYS: i64 = 14;

// ============================================================================
// 型安全な状態パターン
// ============================================================================

/// 貸出記録の共通フィールド
///
/// 貸出中（Open）と返却済み（Closed）で共有されるコアデータ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanCore {
    // 識別子
    pub transaction_id: TransactionId,

    // 他の集約への参照（IDのみ）
    pub member_id: MemberId,
    pub book_id: BookId,

    // 貸出管理の責務
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
}

/// 貸出中状態
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenLoan {
    #[serde(flatten)]
    pub core: LoanCore,
}

impl std::ops::Deref for OpenLoan {
    type Target = LoanCore;

    fn deref(&self) -> &Self::Target {
        &self.core
    }
}

/// 返却済み状態
///
/// return_dateが必須（型で保証）。以降の状態遷移はない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosedLoan {
    #[serde(flatten)]
    pub core: LoanCore,
    pub return_date: NaiveDate,
}

impl std::ops::Deref for ClosedLoan {
    type Target = LoanCore;

    fn deref(&self) -> &Self::Target {
        &self.core
    }
}

/// 貸出記録
///
/// Open → Closed の一方向のみ。削除はしない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum LoanRecord {
    Open(OpenLoan),
    Closed(ClosedLoan),
}

impl LoanRecord {
    /// 永続化された列から復元する
    pub fn from_parts(core: LoanCore, return_date: Option<NaiveDate>) -> Self {
        match return_date {
            None => LoanRecord::Open(OpenLoan { core }),
            Some(return_date) => LoanRecord::Closed(ClosedLoan { core, return_date }),
        }
    }

    pub fn core(&self) -> &LoanCore {
        match self {
            LoanRecord::Open(open) => &open.core,
            LoanRecord::Closed(closed) => &closed.core,
        }
    }

    pub fn return_date(&self) -> Option<NaiveDate> {
        match self {
            LoanRecord::Open(_) => None,
            LoanRecord::Closed(closed) => Some(closed.return_date),
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, LoanRecord::Open(_))
    }
}

/// 返却期限を計算する
pub fn due_date_for(issue_date: NaiveDate) -> NaiveDate {
    issue_date + Duration::days(LOAN_PERIOD_DAYS)
}

/// 純粋関数：貸出記録を作成する
///
/// ビジネスルール：
/// - 返却期限は貸出日 + 14日
/// - 取引IDはここで生成する
pub fn issue_loan(member_id: MemberId, book_id: BookId, issue_date: NaiveDate) -> OpenLoan {
    OpenLoan {
        core: LoanCore {
            transaction_id: TransactionId::new(),
            member_id,
            book_id,
            issue_date,
            due_date: due_date_for(issue_date),
        },
    }
}

/// 純粋関数：貸出記録を閉じる
///
/// 返却済みの記録は閉じられない（二重返却の防止）。
pub fn close_loan(loan: LoanRecord, return_date: NaiveDate) -> Result<ClosedLoan, CloseLoanError> {
    match loan {
        LoanRecord::Open(open) => Ok(ClosedLoan {
            core: open.core,
            return_date,
        }),
        LoanRecord::Closed(_) => Err(CloseLoanError::AlreadyClosed),
    }
}

/// 返却期限を過ぎた日数（期限内なら0）
pub fn days_overdue(due_date: NaiveDate, return_date: NaiveDate) -> u64 {
    let days = (return_date - due_date).num_days();
    u64::try_from(days).unwrap_or(0)
}
