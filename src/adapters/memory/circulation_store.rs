use crate::domain::{
    BookId, CloseLoanError, MemberId, Money, SettleFineError, TransactionId,
    inventory::BookStock,
    loan::{ClosedLoan, LoanRecord, OpenLoan},
};
use crate::ports::{
    CirculationStore as CirculationStoreTrait, FineLedger, InventoryLedger, LedgerTransaction,
    LoanRecordStore, StoreError, store_error::Result,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError};
use tokio::sync::{Mutex, OwnedMutexGuard};

/// 台帳の全状態
#[derive(Debug, Clone, Default)]
struct LedgerState {
    stock: HashMap<BookId, BookStock>,
    // 挿入順を保持する
    loans: Vec<LoanRecord>,
    loan_index: HashMap<TransactionId, usize>,
    fines: HashMap<MemberId, Money>,
}

/// 障害を注入する操作
///
/// 次にその操作が呼ばれたとき、一度だけストレージ障害を返す。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultPoint {
    Decrement,
    Increment,
    CreateLoan,
    CloseLoan,
    AddFine,
    Settle,
    Commit,
}

type FaultSlot = Arc<std::sync::Mutex<Option<FaultPoint>>>;

/// In-memory implementation of CirculationStore
///
/// A transaction holds the ledger lock from `begin` until it is committed or dropped,
/// and works on a private copy of the state. Commit publishes the copy; dropping the
/// transaction discards it. Operations are therefore serialized and all-or-nothing.
#[derive(Clone)]
pub struct CirculationStore {
    state: Arc<Mutex<LedgerState>>,
    fault: FaultSlot,
}

impl CirculationStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(LedgerState::default())),
            fault: Arc::new(std::sync::Mutex::new(None)),
        }
    }

    /// Make the next call of `point` fail with a storage error
    pub fn inject_fault(&self, point: FaultPoint) {
        *self.fault.lock().unwrap_or_else(PoisonError::into_inner) = Some(point);
    }

    /// Number of loan records ever created (open and closed)
    pub async fn loan_count(&self) -> usize {
        self.state.lock().await.loans.len()
    }
}

impl Default for CirculationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CirculationStoreTrait for CirculationStore {
    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(Transaction {
            guard: Some(guard),
            working,
            fault: self.fault.clone(),
        }))
    }
}

struct Transaction {
    guard: Option<OwnedMutexGuard<LedgerState>>,
    working: LedgerState,
    fault: FaultSlot,
}

impl Transaction {
    fn state(&mut self) -> Result<&mut LedgerState> {
        if self.guard.is_none() {
            return Err(StoreError::unavailable("transaction already committed"));
        }
        Ok(&mut self.working)
    }

    fn trip(&self, point: FaultPoint) -> Result<()> {
        let mut slot = self.fault.lock().unwrap_or_else(PoisonError::into_inner);
        if *slot == Some(point) {
            *slot = None;
            return Err(StoreError::unavailable(format!(
                "injected storage fault at {:?}",
                point
            )));
        }
        Ok(())
    }

    fn stock(&mut self, book_id: BookId) -> Result<BookStock> {
        self.state()?
            .stock
            .get(&book_id)
            .copied()
            .ok_or(StoreError::BookNotFound(book_id))
    }
}

#[async_trait]
impl InventoryLedger for Transaction {
    async fn register(&mut self, stock: BookStock) -> Result<()> {
        let state = self.state()?;
        if state.stock.contains_key(&stock.book_id()) {
            return Err(StoreError::AlreadyRegistered(stock.book_id()));
        }
        state.stock.insert(stock.book_id(), stock);
        Ok(())
    }

    async fn get_availability(&mut self, book_id: BookId) -> Result<BookStock> {
        self.stock(book_id)
    }

    async fn decrement(&mut self, book_id: BookId) -> Result<BookStock> {
        self.trip(FaultPoint::Decrement)?;
        let stock = self.stock(book_id)?.checkout()?;
        self.state()?.stock.insert(book_id, stock);
        Ok(stock)
    }

    async fn increment(&mut self, book_id: BookId) -> Result<BookStock> {
        self.trip(FaultPoint::Increment)?;
        let stock = self.stock(book_id)?.checkin()?;
        self.state()?.stock.insert(book_id, stock);
        Ok(stock)
    }
}

#[async_trait]
impl LoanRecordStore for Transaction {
    async fn create(&mut self, loan: &OpenLoan) -> Result<TransactionId> {
        self.trip(FaultPoint::CreateLoan)?;
        let state = self.state()?;
        let index = state.loans.len();
        state.loan_index.insert(loan.transaction_id, index);
        state.loans.push(LoanRecord::Open(loan.clone()));
        Ok(loan.transaction_id)
    }

    async fn find_open(&mut self, transaction_id: TransactionId) -> Result<Option<OpenLoan>> {
        let state = self.state()?;
        let open = state
            .loan_index
            .get(&transaction_id)
            .and_then(|&i| match &state.loans[i] {
                LoanRecord::Open(open) => Some(open.clone()),
                LoanRecord::Closed(_) => None,
            });
        Ok(open)
    }

    async fn close(&mut self, loan: &ClosedLoan) -> Result<()> {
        self.trip(FaultPoint::CloseLoan)?;
        let state = self.state()?;
        let Some(&index) = state.loan_index.get(&loan.transaction_id) else {
            return Err(CloseLoanError::AlreadyClosed.into());
        };
        let record = &mut state.loans[index];
        if !record.is_open() {
            return Err(CloseLoanError::AlreadyClosed.into());
        }
        *record = LoanRecord::Closed(loan.clone());
        Ok(())
    }

    async fn list_open_for_user(&mut self, member_id: MemberId) -> Result<Vec<LoanRecord>> {
        Ok(self
            .state()?
            .loans
            .iter()
            .filter(|loan| loan.is_open() && loan.core().member_id == member_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl FineLedger for Transaction {
    async fn get_balance(&mut self, member_id: MemberId) -> Result<Money> {
        Ok(self
            .state()?
            .fines
            .get(&member_id)
            .copied()
            .unwrap_or(Money::ZERO))
    }

    async fn add(&mut self, member_id: MemberId, amount: Money) -> Result<Money> {
        self.trip(FaultPoint::AddFine)?;
        let balance = self.state()?.fines.entry(member_id).or_insert(Money::ZERO);
        *balance = balance.saturating_add(amount);
        Ok(*balance)
    }

    async fn settle(&mut self, member_id: MemberId, payment: Money) -> Result<Money> {
        self.trip(FaultPoint::Settle)?;
        let balance = self.state()?.fines.entry(member_id).or_insert(Money::ZERO);
        *balance = balance
            .checked_sub(payment)
            .ok_or(SettleFineError::OverpaymentRejected)?;
        Ok(*balance)
    }
}

#[async_trait]
impl LedgerTransaction for Transaction {
    async fn commit(&mut self) -> Result<()> {
        self.trip(FaultPoint::Commit)?;
        let mut guard = self
            .guard
            .take()
            .ok_or_else(|| StoreError::unavailable("transaction already committed"))?;
        *guard = std::mem::take(&mut self.working);
        Ok(())
    }
}
