use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, get_availability, get_fine_balance, issue_book, list_open_loans, pay_fine,
    register_book, return_book,
};

/// Creates the API router with all circulation endpoints
///
/// Command endpoints (Write operations):
/// - POST /books/:id/register - Register a book in the inventory ledger (staff only)
/// - POST /loans - Issue a book
/// - POST /loans/:id/return - Return a book
/// - POST /members/:id/fine/payments - Pay an outstanding fine (staff only)
///
/// Query endpoints (Read operations):
/// - GET /books/:id/availability
/// - GET /members/:id/loans
/// - GET /members/:id/fine
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Command endpoints (Write operations)
        .route("/books/:id/register", post(register_book))
        .route("/loans", post(issue_book))
        .route("/loans/:id/return", post(return_book))
        .route("/members/:id/fine/payments", post(pay_fine))
        // Query endpoints (Read operations)
        .route("/books/:id/availability", get(get_availability))
        .route("/members/:id/loans", get(list_open_loans))
        .route("/members/:id/fine", get(get_fine_balance))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
