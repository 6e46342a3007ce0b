use async_trait::async_trait;

use super::{
    fine_ledger::FineLedger, inventory_ledger::InventoryLedger,
    loan_record_store::LoanRecordStore, store_error::Result,
};

/// 3つの台帳にまたがるトランザクション
///
/// `commit`するまでどの変更も外部から観測されない。
/// コミットせずに破棄した場合はすべての変更が取り消される。
#[async_trait]
pub trait LedgerTransaction: InventoryLedger + LoanRecordStore + FineLedger {
    /// 変更を確定する
    ///
    /// 一度コミットしたトランザクションは再利用できない。
    async fn commit(&mut self) -> Result<()>;
}

/// 貸出台帳のストレージハンドル
///
/// 操作ごとに`begin`でトランザクションを開始する。
#[async_trait]
pub trait CirculationStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>>;
}
