use crate::domain::{
    BookId, CloseLoanError, MemberId, Money, SettleFineError, StockError, TransactionId,
    inventory::BookStock,
    loan::{ClosedLoan, LoanCore, LoanRecord, OpenLoan},
};
use crate::ports::{
    CirculationStore as CirculationStoreTrait, FineLedger, InventoryLedger, LedgerTransaction,
    LoanRecordStore, StoreError, store_error::Result,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool, Postgres};
use uuid::Uuid;

/// sqlxのエラーを台帳ポートのエラーに変換する
trait ConvertError {
    type Ok;
    fn convert_error(self) -> Result<Self::Ok>;
}

impl<T> ConvertError for std::result::Result<T, sqlx::Error> {
    type Ok = T;
    fn convert_error(self) -> Result<T> {
        self.map_err(StoreError::unavailable)
    }
}

fn to_db_amount(amount: Money) -> Result<i64> {
    i64::try_from(amount.value()).map_err(StoreError::unavailable)
}

fn from_db_amount(amount: i64) -> Result<Money> {
    Money::try_from(amount).map_err(StoreError::unavailable)
}

#[derive(sqlx::FromRow)]
struct StockRow {
    book_id: Uuid,
    total_copies: i32,
    available_copies: i32,
}

impl TryFrom<StockRow> for BookStock {
    type Error = StoreError;

    fn try_from(row: StockRow) -> Result<Self> {
        let total = u32::try_from(row.total_copies).map_err(StoreError::unavailable)?;
        let available = u32::try_from(row.available_copies)
            .map_err(|_| StoreError::Stock(StockError::InvariantViolation))?;
        Ok(BookStock::restore(
            BookId::from_uuid(row.book_id),
            total,
            available,
        )?)
    }
}

#[derive(sqlx::FromRow)]
struct LoanRow {
    transaction_id: Uuid,
    member_id: Uuid,
    book_id: Uuid,
    issue_date: NaiveDate,
    due_date: NaiveDate,
    return_date: Option<NaiveDate>,
}

impl From<LoanRow> for LoanRecord {
    fn from(row: LoanRow) -> Self {
        let core = LoanCore {
            transaction_id: TransactionId::from_uuid(row.transaction_id),
            member_id: MemberId::from_uuid(row.member_id),
            book_id: BookId::from_uuid(row.book_id),
            issue_date: row.issue_date,
            due_date: row.due_date,
        };
        LoanRecord::from_parts(core, row.return_date)
    }
}

/// PostgreSQL implementation of CirculationStore
///
/// Every engine operation runs inside one database transaction.
/// Guarded updates and row locks keep check-and-modify steps atomic
/// under concurrent callers.
#[derive(Clone)]
pub struct CirculationStore {
    pool: PgPool,
}

impl CirculationStore {
    /// Create a new store with a PostgreSQL connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CirculationStoreTrait for CirculationStore {
    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>> {
        let tx = self.pool.begin().await.convert_error()?;
        Ok(Box::new(Transaction { tx: Some(tx) }))
    }
}

/// A ledger transaction; dropping it without `commit` rolls back
struct Transaction {
    tx: Option<sqlx::Transaction<'static, Postgres>>,
}

impl Transaction {
    fn conn(&mut self) -> Result<&mut PgConnection> {
        self.tx
            .as_deref_mut()
            .ok_or_else(|| StoreError::unavailable("transaction already committed"))
    }

    async fn fetch_stock(&mut self, book_id: BookId) -> Result<Option<BookStock>> {
        let row = sqlx::query_as::<_, StockRow>(
            r#"
            SELECT book_id, total_copies, available_copies
            FROM book_stock
            WHERE book_id = $1
            "#,
        )
        .bind(book_id.value())
        .fetch_optional(self.conn()?)
        .await
        .convert_error()?;

        row.map(BookStock::try_from).transpose()
    }
}

#[async_trait]
impl InventoryLedger for Transaction {
    async fn register(&mut self, stock: BookStock) -> Result<()> {
        let total = i32::try_from(stock.total_copies()).map_err(StoreError::unavailable)?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO book_stock (book_id, total_copies, available_copies)
            VALUES ($1, $2, $2)
            ON CONFLICT (book_id) DO NOTHING
            "#,
        )
        .bind(stock.book_id().value())
        .bind(total)
        .execute(self.conn()?)
        .await
        .convert_error()?
        .rows_affected();

        if inserted == 0 {
            return Err(StoreError::AlreadyRegistered(stock.book_id()));
        }
        Ok(())
    }

    async fn get_availability(&mut self, book_id: BookId) -> Result<BookStock> {
        self.fetch_stock(book_id)
            .await?
            .ok_or(StoreError::BookNotFound(book_id))
    }

    /// 条件付きUPDATEで確認と減算を不可分に行う
    async fn decrement(&mut self, book_id: BookId) -> Result<BookStock> {
        let row = sqlx::query_as::<_, StockRow>(
            r#"
            UPDATE book_stock
            SET available_copies = available_copies - 1,
                updated_at = NOW()
            WHERE book_id = $1 AND available_copies > 0
            RETURNING book_id, total_copies, available_copies
            "#,
        )
        .bind(book_id.value())
        .fetch_optional(self.conn()?)
        .await
        .convert_error()?;

        match row {
            Some(row) => BookStock::try_from(row),
            None => {
                // 行がないのか、在庫が0なのかを区別する
                self.get_availability(book_id).await?;
                Err(StockError::Unavailable.into())
            }
        }
    }

    async fn increment(&mut self, book_id: BookId) -> Result<BookStock> {
        let row = sqlx::query_as::<_, StockRow>(
            r#"
            UPDATE book_stock
            SET available_copies = available_copies + 1,
                updated_at = NOW()
            WHERE book_id = $1 AND available_copies < total_copies
            RETURNING book_id, total_copies, available_copies
            "#,
        )
        .bind(book_id.value())
        .fetch_optional(self.conn()?)
        .await
        .convert_error()?;

        match row {
            Some(row) => BookStock::try_from(row),
            None => {
                self.get_availability(book_id).await?;
                Err(StockError::InvariantViolation.into())
            }
        }
    }
}

#[async_trait]
impl LoanRecordStore for Transaction {
    async fn create(&mut self, loan: &OpenLoan) -> Result<TransactionId> {
        sqlx::query(
            r#"
            INSERT INTO loans (
                transaction_id,
                member_id,
                book_id,
                issue_date,
                due_date,
                return_date
            )
            VALUES ($1, $2, $3, $4, $5, NULL)
            "#,
        )
        .bind(loan.transaction_id.value())
        .bind(loan.member_id.value())
        .bind(loan.book_id.value())
        .bind(loan.issue_date)
        .bind(loan.due_date)
        .execute(self.conn()?)
        .await
        .convert_error()?;

        Ok(loan.transaction_id)
    }

    /// 行ロック（FOR UPDATE）を取得し、同じ記録への同時返却を直列化する
    async fn find_open(&mut self, transaction_id: TransactionId) -> Result<Option<OpenLoan>> {
        let row = sqlx::query_as::<_, LoanRow>(
            r#"
            SELECT
                transaction_id,
                member_id,
                book_id,
                issue_date,
                due_date,
                return_date
            FROM loans
            WHERE transaction_id = $1 AND return_date IS NULL
            FOR UPDATE
            "#,
        )
        .bind(transaction_id.value())
        .fetch_optional(self.conn()?)
        .await
        .convert_error()?;

        Ok(row.map(LoanRecord::from).and_then(|record| match record {
            LoanRecord::Open(open) => Some(open),
            LoanRecord::Closed(_) => None,
        }))
    }

    async fn close(&mut self, loan: &ClosedLoan) -> Result<()> {
        let updated = sqlx::query(
            r#"
            UPDATE loans
            SET return_date = $2
            WHERE transaction_id = $1 AND return_date IS NULL
            "#,
        )
        .bind(loan.transaction_id.value())
        .bind(loan.return_date)
        .execute(self.conn()?)
        .await
        .convert_error()?
        .rows_affected();

        if updated == 0 {
            return Err(CloseLoanError::AlreadyClosed.into());
        }
        Ok(())
    }

    async fn list_open_for_user(&mut self, member_id: MemberId) -> Result<Vec<LoanRecord>> {
        let rows = sqlx::query_as::<_, LoanRow>(
            r#"
            SELECT
                transaction_id,
                member_id,
                book_id,
                issue_date,
                due_date,
                return_date
            FROM loans
            WHERE member_id = $1 AND return_date IS NULL
            ORDER BY created_at ASC, issue_date ASC
            "#,
        )
        .bind(member_id.value())
        .fetch_all(self.conn()?)
        .await
        .convert_error()?;

        Ok(rows.into_iter().map(LoanRecord::from).collect())
    }
}

#[async_trait]
impl FineLedger for Transaction {
    async fn get_balance(&mut self, member_id: MemberId) -> Result<Money> {
        let balance: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT outstanding_fine
            FROM fine_accounts
            WHERE member_id = $1
            FOR UPDATE
            "#,
        )
        .bind(member_id.value())
        .fetch_optional(self.conn()?)
        .await
        .convert_error()?;

        balance.map_or(Ok(Money::ZERO), from_db_amount)
    }

    async fn add(&mut self, member_id: MemberId, amount: Money) -> Result<Money> {
        let balance: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO fine_accounts (member_id, outstanding_fine)
            VALUES ($1, $2)
            ON CONFLICT (member_id)
            DO UPDATE SET
                outstanding_fine = fine_accounts.outstanding_fine + EXCLUDED.outstanding_fine,
                updated_at = NOW()
            RETURNING outstanding_fine
            "#,
        )
        .bind(member_id.value())
        .bind(to_db_amount(amount)?)
        .fetch_one(self.conn()?)
        .await
        .convert_error()?;

        from_db_amount(balance)
    }

    /// 残高以下の支払いのみ反映する（条件付きUPDATE）
    async fn settle(&mut self, member_id: MemberId, payment: Money) -> Result<Money> {
        let balance: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE fine_accounts
            SET outstanding_fine = outstanding_fine - $2,
                updated_at = NOW()
            WHERE member_id = $1 AND outstanding_fine >= $2
            RETURNING outstanding_fine
            "#,
        )
        .bind(member_id.value())
        .bind(to_db_amount(payment)?)
        .fetch_optional(self.conn()?)
        .await
        .convert_error()?;

        match balance {
            Some(balance) => from_db_amount(balance),
            None => Err(SettleFineError::OverpaymentRejected.into()),
        }
    }
}

#[async_trait]
impl LedgerTransaction for Transaction {
    async fn commit(&mut self) -> Result<()> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| StoreError::unavailable("transaction already committed"))?;
        tx.commit().await.convert_error()
    }
}
