use crate::application::circulation::{
    self, CirculationError, ServiceDependencies, get_availability as query_availability,
    get_fine_balance as query_fine_balance, issue_book as execute_issue_book,
    list_open_loans as query_open_loans, pay_fine as execute_pay_fine,
    register_book as execute_register_book, return_book as execute_return_book,
};
use crate::domain::{BookId, MemberId, commands::RegisterBook};
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
};
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use uuid::Uuid;

use super::{
    error::ApiError,
    types::{
        AvailabilityResponse, BookRegisteredResponse, BookReturnedResponse, FineBalanceResponse,
        IssueBookRequest, LoanCreatedResponse, OpenLoanResponse, PayFineRequest, return_command,
    },
};

/// 操作者を識別するヘッダー
pub const ACTOR_HEADER: &str = "x-actor-id";

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

/// 貸出日・返却日として使う「今日」（UTC）
fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// 操作者が司書または管理者であることを確認する
///
/// ヘッダーがない・不正・未知の会員なら401、ロールが不足していれば403。
async fn require_circulation_staff(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let actor_id = headers
        .get(ACTOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value).ok())
        .map(MemberId::from_uuid)
        .ok_or(ApiError::Unauthenticated)?;

    let role = state
        .service_deps
        .member_directory
        .role(actor_id)
        .await
        .map_err(CirculationError::MemberDirectoryError)?
        .ok_or(ApiError::Unauthenticated)?;

    if !role.can_manage_circulation() {
        tracing::warn!(%actor_id, role = role.as_str(), "forbidden: circulation staff only");
        return Err(ApiError::Forbidden);
    }
    Ok(())
}

// ============================================================================
// Command handlers (POST)
// ============================================================================

/// POST /books/:id/register - 書籍を在庫台帳に登録
///
/// 司書または管理者のみ。所蔵冊数はカタログから取得する。
pub async fn register_book(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(book_id): Path<Uuid>,
) -> Result<(StatusCode, Json<BookRegisteredResponse>), ApiError> {
    require_circulation_staff(&state, &headers).await?;

    let cmd = RegisterBook {
        book_id: BookId::from_uuid(book_id),
    };
    let stock = execute_register_book(&state.service_deps, cmd).await?;

    Ok((StatusCode::CREATED, Json(stock.into())))
}

/// POST /loans - 書籍を貸し出す
///
/// 強制されるビジネスルール:
/// - 会員が存在すること
/// - 未払いの延滞料金がないこと
/// - 貸出可能な冊数があること
pub async fn issue_book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IssueBookRequest>,
) -> Result<(StatusCode, Json<LoanCreatedResponse>), ApiError> {
    let loan = execute_issue_book(&state.service_deps, req.to_command(today())).await?;

    Ok((StatusCode::CREATED, Json(loan.into())))
}

/// POST /loans/:id/return - 書籍を返却
///
/// 延滞していれば会員種別に応じた延滞料金を加算し、結果を返す。
pub async fn return_book(
    State(state): State<Arc<AppState>>,
    Path(transaction_id): Path<Uuid>,
) -> Result<Json<BookReturnedResponse>, ApiError> {
    let outcome =
        execute_return_book(&state.service_deps, return_command(transaction_id, today())).await?;

    Ok(Json(BookReturnedResponse::new(transaction_id, outcome)))
}

/// POST /members/:id/fine/payments - 延滞料金を支払う
///
/// 司書または管理者のみ（窓口での受領を想定）。
pub async fn pay_fine(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(member_id): Path<Uuid>,
    Json(req): Json<PayFineRequest>,
) -> Result<Json<FineBalanceResponse>, ApiError> {
    require_circulation_staff(&state, &headers).await?;

    let outstanding_fine =
        execute_pay_fine(&state.service_deps, req.to_command(member_id)).await?;

    Ok(Json(FineBalanceResponse {
        member_id,
        outstanding_fine,
    }))
}

// ============================================================================
// Query handlers (GET)
// ============================================================================

/// GET /books/:id/availability - 貸出可能冊数
pub async fn get_availability(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<Uuid>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    let stock = query_availability(&state.service_deps, BookId::from_uuid(book_id)).await?;

    Ok(Json(stock.into()))
}

/// GET /members/:id/loans - 会員の貸出中の記録（貸出順）
pub async fn list_open_loans(
    State(state): State<Arc<AppState>>,
    Path(member_id): Path<Uuid>,
) -> Result<Json<Vec<OpenLoanResponse>>, ApiError> {
    let deps = &state.service_deps;
    let loans = query_open_loans(deps, MemberId::from_uuid(member_id)).await?;

    let mut response = Vec::with_capacity(loans.len());
    for loan in &loans {
        let metadata = circulation::lookup_book(deps, loan.core().book_id).await?;
        response.push(OpenLoanResponse::new(loan, metadata));
    }

    Ok(Json(response))
}

/// GET /members/:id/fine - 延滞料金残高
pub async fn get_fine_balance(
    State(state): State<Arc<AppState>>,
    Path(member_id): Path<Uuid>,
) -> Result<Json<FineBalanceResponse>, ApiError> {
    let outstanding_fine =
        query_fine_balance(&state.service_deps, MemberId::from_uuid(member_id)).await?;

    Ok(Json(FineBalanceResponse {
        member_id,
        outstanding_fine,
    }))
}
