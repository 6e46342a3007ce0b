use crate::domain::{
    self, MemberId, MembershipCategory, Money,
    commands::*,
    fine::ReturnOutcome,
    inventory::BookStock,
    loan::{LoanRecord, OpenLoan},
};
use crate::ports::*;
use std::sync::Arc;

use super::errors::{CirculationError, Result};

/// サービスの依存関係
///
/// 関数型DDDの原則に従い、データ構造として定義。
/// 振る舞い（メソッド）は持たず、純粋な関数に依存関係を渡す。
///
/// ストレージハンドル（`store`）は明示的に渡され、
/// 各操作はそこから1つのトランザクションを開始する。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub store: Arc<dyn CirculationStore>,
    pub member_directory: Arc<dyn MemberDirectory>,
    pub book_catalog: Arc<dyn BookCatalog>,
}

/// 会員種別を取得するヘルパー関数
///
/// # エラー
/// - MemberDirectoryError: 会員ディレクトリへの問い合わせ失敗
/// - MemberNotFound: 会員が存在しない
pub(super) async fn membership_of(
    deps: &ServiceDependencies,
    member_id: MemberId,
) -> Result<MembershipCategory> {
    deps.member_directory
        .membership_category(member_id)
        .await
        .map_err(CirculationError::MemberDirectoryError)?
        .ok_or(CirculationError::MemberNotFound(member_id))
}

/// 書籍を貸し出す
///
/// ビジネスルール：
/// - 会員が存在すること
/// - 未払いの延滞料金がないこと（職員を含むすべての会員種別）
/// - 貸出可能な冊数があること
/// - 返却期限は貸出日 + 14日
///
/// # 一貫性保証
///
/// 在庫の減算と貸出記録の作成は1つのトランザクションで確定する。
/// 在庫の減算は「残り1冊以上」を条件とした不可分な操作であり、
/// 最後の1冊に対する同時貸出は1件だけが成功する。
///
/// # 戻り値
/// 作成された貸出記録（取引IDを含む）
#[tracing::instrument(skip(deps))]
pub async fn issue_book(deps: &ServiceDependencies, cmd: IssueBook) -> Result<OpenLoan> {
    // 1. 会員の存在確認
    membership_of(deps, cmd.member_id).await?;

    let mut tx = deps.store.begin().await?;

    // 2. 延滞料金の確認
    let balance = tx.get_balance(cmd.member_id).await?;
    if !balance.is_zero() {
        tracing::warn!(%balance, "issue rejected: outstanding fine");
        return Err(CirculationError::OutstandingFine(balance));
    }

    // 3. 在庫の確認
    let stock = tx.get_availability(cmd.book_id).await?;
    if !stock.is_available() {
        tracing::warn!("issue rejected: no copies available");
        return Err(CirculationError::Unavailable);
    }

    // 4. ドメイン層の純粋関数で貸出記録を生成
    let loan = domain::loan::issue_loan(cmd.member_id, cmd.book_id, cmd.issue_date);

    // 5. 在庫の減算と記録の作成（同一トランザクション）
    let stock = tx.decrement(cmd.book_id).await?;
    tx.create(&loan).await?;
    tx.commit().await?;

    tracing::info!(
        transaction_id = %loan.transaction_id,
        due_date = %loan.due_date,
        available_copies = stock.available_copies(),
        "book issued"
    );

    Ok(loan)
}

/// 書籍を返却する
///
/// ビジネスルール：
/// - 貸出中の記録が存在すること（二重返却は不可）
/// - 職員は延滞料金の対象外
/// - 延滞日数 × 日額（一般10、学生5）を会員の残高に加算
///
/// # 一貫性保証
///
/// 記録のクローズ、延滞料金の加算、在庫の加算は1つのトランザクションで確定する。
/// 途中で失敗した場合はトランザクションを破棄し、部分的な状態は残らない。
///
/// 行ロックは貸出と同じ順序（延滞料金 → 在庫）で取得する。
#[tracing::instrument(skip(deps))]
pub async fn return_book(deps: &ServiceDependencies, cmd: ReturnBook) -> Result<ReturnOutcome> {
    let mut tx = deps.store.begin().await?;

    // 1. 貸出中の記録を取得（返却済みなら見つからない）
    let open = tx
        .find_open(cmd.transaction_id)
        .await?
        .ok_or(CirculationError::NotFoundOrAlreadyReturned)?;

    // 2. 記録を閉じる
    let closed = domain::loan::close_loan(LoanRecord::Open(open), cmd.return_date)?;
    tx.close(&closed).await?;

    // 3. 会員種別に応じて延滞料金を算定し、加算する
    let category = membership_of(deps, closed.member_id).await?;
    let outcome = domain::fine::assess_fine(category, &closed);

    let fine = outcome.fine();
    if !fine.is_zero() {
        tx.add(closed.member_id, fine).await?;
    }

    // 4. 在庫を戻す
    if let Err(err) = tx.increment(closed.book_id).await {
        if matches!(err, StoreError::Stock(_)) {
            tracing::error!(book_id = %closed.book_id, "inventory invariant violated on return");
        }
        return Err(err.into());
    }

    tx.commit().await?;

    tracing::info!(
        member_id = %closed.member_id,
        book_id = %closed.book_id,
        ?outcome,
        "book returned"
    );

    Ok(outcome)
}

/// 延滞料金を支払う
///
/// ビジネスルール：
/// - 残高が0なら支払い不可
/// - 負の金額は不正
/// - 残高を超える支払いは拒否
///
/// # 戻り値
/// 支払い後の残高
#[tracing::instrument(skip(deps))]
pub async fn pay_fine(deps: &ServiceDependencies, cmd: PayFine) -> Result<Money> {
    membership_of(deps, cmd.member_id).await?;

    let mut tx = deps.store.begin().await?;

    let balance = tx.get_balance(cmd.member_id).await?;
    let paid = domain::fine::settle_fine(balance, cmd.amount)
        .inspect_err(|e| tracing::warn!(%balance, error = %e, "payment rejected"))?;

    let new_balance = tx.settle(cmd.member_id, paid).await?;
    tx.commit().await?;

    tracing::info!(%paid, remaining = %new_balance, "fine paid");

    Ok(new_balance)
}

/// 書籍を在庫台帳に登録する
///
/// 所蔵冊数はカタログから取得し、全冊を貸出可能として登録する。
#[tracing::instrument(skip(deps))]
pub async fn register_book(deps: &ServiceDependencies, cmd: RegisterBook) -> Result<BookStock> {
    let total_copies = deps
        .book_catalog
        .total_copies(cmd.book_id)
        .await
        .map_err(CirculationError::CatalogError)?
        .ok_or(CirculationError::BookNotFound(cmd.book_id))?;

    let stock = BookStock::new(cmd.book_id, total_copies);

    let mut tx = deps.store.begin().await?;
    tx.register(stock).await?;
    tx.commit().await?;

    tracing::info!(total_copies, "book registered");

    Ok(stock)
}
