use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use rusty_library_circulation::api::handlers::{ACTOR_HEADER, AppState};
use rusty_library_circulation::api::router::create_router;
use rusty_library_circulation::api::types::*;
use rusty_library_circulation::application::circulation::return_book;
use rusty_library_circulation::domain::commands::ReturnBook;
use rusty_library_circulation::domain::*;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

mod common;

use common::TestEnv;

// ============================================================================
// APIテスト用のヘルパー関数
// ============================================================================

fn app(env: &TestEnv) -> axum::Router {
    let app_state = Arc::new(AppState {
        service_deps: env.deps.clone(),
    });
    create_router(app_state)
}

fn librarian(env: &TestEnv) -> MemberId {
    let member_id = MemberId::new();
    env.members
        .add_member_with_role(member_id, MembershipCategory::Staff, Role::Librarian);
    member_id
}

fn borrower(env: &TestEnv) -> MemberId {
    let member_id = MemberId::new();
    env.members.add_member(member_id, MembershipCategory::Public);
    member_id
}

fn post_json(uri: &str, actor: Option<MemberId>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(actor) = actor {
        builder = builder.header(ACTOR_HEADER, actor.to_string());
    }
    builder
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn read_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// カタログに書籍を追加し、司書としてAPI経由で登録する
async fn register_via_api(env: &TestEnv, total_copies: u32) -> BookId {
    let book_id = BookId::new();
    env.catalog.add_book(book_id, "The Left Hand of Darkness", total_copies);

    let response = app(env)
        .oneshot(post_json(
            &format!("/books/{}/register", book_id),
            Some(librarian(env)),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    book_id
}

// ============================================================================
// 正常系フロー
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let env = TestEnv::new();

    let response = app(&env).oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_full_circulation_flow() {
    let env = TestEnv::new();
    let member_id = borrower(&env);
    let book_id = register_via_api(&env, 2).await;

    // Step 1: 貸出（POST /loans）
    let response = app(&env)
        .oneshot(post_json(
            "/loans",
            None,
            json!({ "member_id": member_id.value(), "book_id": book_id.value() }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let loan: LoanCreatedResponse = read_json(response).await;
    assert_eq!(loan.member_id, member_id.value());
    assert_eq!(loan.book_id, book_id.value());
    assert_eq!(loan.due_date, loan.issue_date + Duration::days(14));

    // Step 2: 在庫（GET /books/:id/availability）
    let response = app(&env)
        .oneshot(get(&format!("/books/{}/availability", book_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let availability: AvailabilityResponse = read_json(response).await;
    assert_eq!(availability.available_copies, 1);

    // Step 3: 貸出中の一覧（GET /members/:id/loans）
    let response = app(&env)
        .oneshot(get(&format!("/members/{}/loans", member_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let loans: Vec<OpenLoanResponse> = read_json(response).await;
    assert_eq!(loans.len(), 1);
    assert_eq!(loans[0].transaction_id, loan.transaction_id);
    assert_eq!(loans[0].title.as_deref(), Some("The Left Hand of Darkness"));

    // Step 4: 返却（POST /loans/:id/return）
    let response = app(&env)
        .oneshot(post_json(
            &format!("/loans/{}/return", loan.transaction_id),
            None,
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let returned: BookReturnedResponse = read_json(response).await;
    assert_eq!(returned.transaction_id, loan.transaction_id);
    assert_eq!(returned.outcome, "on_time");
    assert_eq!(returned.fine, Money::ZERO);

    // Step 5: 二重返却
    let response = app(&env)
        .oneshot(post_json(
            &format!("/loans/{}/return", loan.transaction_id),
            None,
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error: ErrorResponse = read_json(response).await;
    assert_eq!(error.error, "NOT_FOUND_OR_ALREADY_RETURNED");
}

#[tokio::test]
async fn test_fine_payment_flow() {
    let env = TestEnv::new();
    let member_id = borrower(&env);
    let book_id = register_via_api(&env, 1).await;

    let response = app(&env)
        .oneshot(post_json(
            "/loans",
            None,
            json!({ "member_id": member_id.value(), "book_id": book_id.value() }),
        ))
        .await
        .unwrap();
    let loan: LoanCreatedResponse = read_json(response).await;

    // 20日後に返却（期限の6日後）
    return_book(
        &env.deps,
        ReturnBook {
            transaction_id: TransactionId::from_uuid(loan.transaction_id),
            return_date: Utc::now().date_naive() + Duration::days(20),
        },
    )
    .await
    .unwrap();

    let response = app(&env)
        .oneshot(get(&format!("/members/{}/fine", member_id)))
        .await
        .unwrap();
    let balance: FineBalanceResponse = read_json(response).await;
    assert_eq!(balance.outstanding_fine, Money::new(60));

    // 延滞料金があると借りられない
    let response = app(&env)
        .oneshot(post_json(
            "/loans",
            None,
            json!({ "member_id": member_id.value(), "book_id": book_id.value() }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let error: ErrorResponse = read_json(response).await;
    assert_eq!(error.error, "OUTSTANDING_FINE");

    let staff = librarian(&env);
    let payments = format!("/members/{}/fine/payments", member_id);

    // 残高超過
    let response = app(&env)
        .oneshot(post_json(&payments, Some(staff), json!({ "amount": 100 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let error: ErrorResponse = read_json(response).await;
    assert_eq!(error.error, "OVERPAYMENT_REJECTED");

    // 全額支払い
    let response = app(&env)
        .oneshot(post_json(&payments, Some(staff), json!({ "amount": 60 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let balance: FineBalanceResponse = read_json(response).await;
    assert_eq!(balance.outstanding_fine, Money::ZERO);

    // 残高0
    let response = app(&env)
        .oneshot(post_json(&payments, Some(staff), json!({ "amount": 1 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let error: ErrorResponse = read_json(response).await;
    assert_eq!(error.error, "NO_FINE_DUE");
}

// ============================================================================
// エラー系
// ============================================================================

#[tokio::test]
async fn test_issue_for_unknown_member_returns_404() {
    let env = TestEnv::new();
    let book_id = register_via_api(&env, 1).await;

    let response = app(&env)
        .oneshot(post_json(
            "/loans",
            None,
            json!({ "member_id": MemberId::new().value(), "book_id": book_id.value() }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error: ErrorResponse = read_json(response).await;
    assert_eq!(error.error, "MEMBER_NOT_FOUND");
}

#[tokio::test]
async fn test_issue_without_copies_returns_409() {
    let env = TestEnv::new();
    let book_id = register_via_api(&env, 0).await;

    let response = app(&env)
        .oneshot(post_json(
            "/loans",
            None,
            json!({ "member_id": borrower(&env).value(), "book_id": book_id.value() }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let error: ErrorResponse = read_json(response).await;
    assert_eq!(error.error, "BOOK_UNAVAILABLE");
}

#[tokio::test]
async fn test_register_twice_returns_409() {
    let env = TestEnv::new();
    let book_id = register_via_api(&env, 1).await;

    let response = app(&env)
        .oneshot(post_json(
            &format!("/books/{}/register", book_id),
            Some(librarian(&env)),
            json!({}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// ============================================================================
// アクセス制御
// ============================================================================

#[tokio::test]
async fn test_register_requires_actor_header() {
    let env = TestEnv::new();
    let book_id = BookId::new();
    env.catalog.add_book(book_id, "Solaris", 1);

    let response = app(&env)
        .oneshot(post_json(
            &format!("/books/{}/register", book_id),
            None,
            json!({}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_rejects_unknown_actor() {
    let env = TestEnv::new();
    let book_id = BookId::new();
    env.catalog.add_book(book_id, "Solaris", 1);

    let response = app(&env)
        .oneshot(post_json(
            &format!("/books/{}/register", book_id),
            Some(MemberId::new()),
            json!({}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_borrower_cannot_take_payments() {
    let env = TestEnv::new();
    let member_id = borrower(&env);

    let response = app(&env)
        .oneshot(post_json(
            &format!("/members/{}/fine/payments", member_id),
            Some(member_id),
            json!({ "amount": 10 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let error: ErrorResponse = read_json(response).await;
    assert_eq!(error.error, "FORBIDDEN");
}
