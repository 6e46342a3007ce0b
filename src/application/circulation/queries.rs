use crate::domain::{BookId, MemberId, Money, inventory::BookStock, loan::LoanRecord};
use crate::ports::*;

use super::circulation_service::{ServiceDependencies, membership_of};
use super::errors::{CirculationError, Result};

/// 会員の貸出中の記録を取得する
///
/// 現在の借用状況の表示に使用される。順序は貸出順。
pub async fn list_open_loans(
    deps: &ServiceDependencies,
    member_id: MemberId,
) -> Result<Vec<LoanRecord>> {
    membership_of(deps, member_id).await?;

    let mut tx = deps.store.begin().await?;
    let loans = tx.list_open_for_user(member_id).await?;
    tx.commit().await?;

    Ok(loans)
}

/// 会員の延滞料金残高を取得する
pub async fn get_fine_balance(deps: &ServiceDependencies, member_id: MemberId) -> Result<Money> {
    membership_of(deps, member_id).await?;

    let mut tx = deps.store.begin().await?;
    let balance = tx.get_balance(member_id).await?;
    tx.commit().await?;

    Ok(balance)
}

/// 書籍の在庫を取得する
pub async fn get_availability(deps: &ServiceDependencies, book_id: BookId) -> Result<BookStock> {
    let mut tx = deps.store.begin().await?;
    let stock = tx.get_availability(book_id).await?;
    tx.commit().await?;

    Ok(stock)
}

/// 書誌情報を取得する（表示用）
///
/// カタログへの問い合わせをそのまま返す。未知の書籍は`None`。
pub async fn lookup_book(
    deps: &ServiceDependencies,
    book_id: BookId,
) -> Result<Option<BookMetadata>> {
    deps.book_catalog
        .lookup_book(book_id)
        .await
        .map_err(CirculationError::CatalogError)
}
