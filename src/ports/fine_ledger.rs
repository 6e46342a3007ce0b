use crate::domain::{MemberId, Money};
use async_trait::async_trait;

use super::store_error::Result;

/// 延滞料金台帳ポート
///
/// 記録のない会員の残高は0として扱う。
#[async_trait]
pub trait FineLedger: Send {
    /// 未払い残高を取得する
    async fn get_balance(&mut self, member_id: MemberId) -> Result<Money>;

    /// 残高に加算する。加算後の残高を返す
    async fn add(&mut self, member_id: MemberId, amount: Money) -> Result<Money>;

    /// 支払いを反映する。支払い後の残高を返す
    ///
    /// 支払額が残高を超える場合は`SettleFineError::OverpaymentRejected`で、残高は変わらない。
    async fn settle(&mut self, member_id: MemberId, payment: Money) -> Result<Money>;
}
