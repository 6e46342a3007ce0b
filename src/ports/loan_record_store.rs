use crate::domain::{
    MemberId, TransactionId,
    loan::{ClosedLoan, LoanRecord, OpenLoan},
};
use async_trait::async_trait;

use super::store_error::Result;

/// 貸出記録ポート
///
/// 記録は追加と返却日の設定のみ。削除しない。
#[async_trait]
pub trait LoanRecordStore: Send {
    /// 貸出中の記録を追加する
    async fn create(&mut self, loan: &OpenLoan) -> Result<TransactionId>;

    /// 貸出中の記録を取得する
    ///
    /// 存在しない、または返却済みの場合は`None`。
    /// 取得した記録はトランザクション終了まで他から変更されないこと。
    async fn find_open(&mut self, transaction_id: TransactionId) -> Result<Option<OpenLoan>>;

    /// 記録を閉じる（返却日を設定）
    ///
    /// 既に閉じられていれば`CloseLoanError::AlreadyClosed`。
    async fn close(&mut self, loan: &ClosedLoan) -> Result<()>;

    /// 会員の貸出中の記録（挿入順）
    async fn list_open_for_user(&mut self, member_id: MemberId) -> Result<Vec<LoanRecord>>;
}
