use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{BookId, MemberId, TransactionId};

/// コマンド：書籍を貸し出す
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueBook {
    pub member_id: MemberId,
    pub book_id: BookId,
    pub issue_date: NaiveDate,
}

/// コマンド：書籍を返却する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnBook {
    pub transaction_id: TransactionId,
    pub return_date: NaiveDate,
}

/// コマンド：延滞料金を支払う
///
/// 金額は呼び出し側から受け取った生の値。検証はドメイン層で行う。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayFine {
    pub member_id: MemberId,
    pub amount: i64,
}

/// コマンド：書籍を在庫台帳に登録する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterBook {
    pub book_id: BookId,
}
