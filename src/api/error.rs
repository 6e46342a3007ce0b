use crate::application::circulation::CirculationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーに加えて、API層で行うアクセス制御の失敗を表す。
#[derive(Debug)]
pub enum ApiError {
    Circulation(CirculationError),
    /// `x-actor-id`ヘッダーがない、不正、または未知の会員
    Unauthenticated,
    /// 操作に必要なロールがない
    Forbidden,
}

impl From<CirculationError> for ApiError {
    fn from(err: CirculationError) -> Self {
        ApiError::Circulation(err)
    }
}

impl ApiError {
    /// HTTPステータスとエラーコードの対応
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        use CirculationError::*;

        match self {
            ApiError::Unauthenticated => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN"),

            // 404 Not Found - リクエストされたリソースが存在しない
            ApiError::Circulation(MemberNotFound(_)) => (StatusCode::NOT_FOUND, "MEMBER_NOT_FOUND"),
            ApiError::Circulation(BookNotFound(_)) => (StatusCode::NOT_FOUND, "BOOK_NOT_FOUND"),
            ApiError::Circulation(NotFoundOrAlreadyReturned) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND_OR_ALREADY_RETURNED")
            }

            // 409 Conflict - 現在の状態と衝突する
            ApiError::Circulation(AlreadyRegistered(_)) => {
                (StatusCode::CONFLICT, "ALREADY_REGISTERED")
            }
            ApiError::Circulation(Unavailable) => (StatusCode::CONFLICT, "BOOK_UNAVAILABLE"),
            ApiError::Circulation(OutstandingFine(_)) => (StatusCode::CONFLICT, "OUTSTANDING_FINE"),
            ApiError::Circulation(AlreadyClosed) => (StatusCode::CONFLICT, "ALREADY_CLOSED"),

            // 422 Unprocessable Entity - 支払いのビジネスルール違反
            ApiError::Circulation(NoFineDue) => (StatusCode::UNPROCESSABLE_ENTITY, "NO_FINE_DUE"),
            ApiError::Circulation(InvalidAmount) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_AMOUNT")
            }
            ApiError::Circulation(OverpaymentRejected) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "OVERPAYMENT_REJECTED")
            }

            // 500 Internal Server Error - システム障害
            ApiError::Circulation(InvariantViolation) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INVARIANT_VIOLATION")
            }
            ApiError::Circulation(StorageUnavailable(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_UNAVAILABLE")
            }
            ApiError::Circulation(MemberDirectoryError(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "MEMBER_DIRECTORY_ERROR")
            }
            ApiError::Circulation(CatalogError(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CATALOG_ERROR")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status_and_code();

        let message = match &self {
            ApiError::Unauthenticated => "A known actor is required (x-actor-id)".to_string(),
            ApiError::Forbidden => "Librarian or admin role required".to_string(),
            // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
            ApiError::Circulation(err) if status.is_server_error() => {
                tracing::error!(error = ?err, "{}", err);
                err.to_string()
            }
            ApiError::Circulation(err) => err.to_string(),
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}
