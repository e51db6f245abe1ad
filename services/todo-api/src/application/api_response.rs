// Todo APIのレスポンス生成
//
// 処理結果をHTTPステータス・ヘッダー・ボディに変換する。
// エラー時のボディはステータスの標準理由句のみで、内部の詳細は返さない。

use lambda_http::http::header::{CONTENT_TYPE, HeaderValue, LOCATION};
use lambda_http::http::StatusCode;
use lambda_http::{Body, Response};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::domain::PayloadError;
use crate::infrastructure::RepositoryError;

/// JSONボディのContent-Type
const JSON_CONTENT_TYPE: &str = "application/json";

/// エラーボディのContent-Type
const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Todo APIのエラー型
///
/// クライアントエラー（4xx）、未検出（404）、サーバーエラー（500）に分類される。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TodoApiError {
    /// ボディがJSONとして不正
    #[error("malformed request body: {0}")]
    MalformedBody(String),

    /// 必須フィールドの検証に失敗
    #[error("invalid request body: missing required field {0}")]
    InvalidPayload(&'static str),

    /// パスパラメータidが必要なメソッドでidがない
    #[error("missing path parameter: id")]
    MissingId,

    /// 未対応のHTTPメソッド
    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),

    /// 対象のTodoが存在しない
    #[error("todo not found: {0}")]
    NotFound(String),

    /// DynamoDB操作の失敗
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// レスポンスの構築に失敗
    #[error("response serialization error: {0}")]
    ResponseSerialization(String),
}

impl From<PayloadError> for TodoApiError {
    fn from(err: PayloadError) -> Self {
        match err {
            PayloadError::Malformed(msg) => TodoApiError::MalformedBody(msg),
            PayloadError::MissingField(field) => TodoApiError::InvalidPayload(field),
        }
    }
}

impl TodoApiError {
    /// 対応するHTTPステータス
    pub fn status_code(&self) -> StatusCode {
        match self {
            TodoApiError::MalformedBody(_) => StatusCode::UNPROCESSABLE_ENTITY,
            TodoApiError::InvalidPayload(_) | TodoApiError::MissingId => StatusCode::BAD_REQUEST,
            TodoApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            TodoApiError::NotFound(_) => StatusCode::NOT_FOUND,
            TodoApiError::Repository(_) | TodoApiError::ResponseSerialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// サーバー側の失敗かどうか
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// 分類に応じたレベルでログ出力
    ///
    /// 404は通常の結果としてinfo、その他の4xxはwarn、5xxのみerror。
    pub fn log(&self) {
        let status = self.status_code().as_u16();
        match self {
            TodoApiError::NotFound(id) => {
                info!(status = status, todo_id = %id, "Todoが見つからない");
            }
            err if err.is_server_error() => {
                error!(status = status, error = %err, "リクエスト処理中にサーバーエラー");
            }
            err => {
                warn!(status = status, reason = %err, "クライアントエラー");
            }
        }
    }
}

/// HTTPレスポンスの生成
pub struct ApiResponse;

impl ApiResponse {
    /// JSONボディのレスポンスを生成
    ///
    /// # Arguments
    /// * `status` - HTTPステータス
    /// * `value` - ボディとしてシリアライズする値
    /// * `location` - Locationヘッダー（作成・更新時のみ）
    pub fn json<T>(
        status: StatusCode,
        value: &T,
        location: Option<&str>,
    ) -> Result<Response<Body>, TodoApiError>
    where
        T: Serialize + ?Sized,
    {
        let json = serde_json::to_string(value)
            .map_err(|e| TodoApiError::ResponseSerialization(e.to_string()))?;

        let mut response = Response::new(Body::Text(json));
        *response.status_mut() = status;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));

        if let Some(location) = location {
            let value = HeaderValue::from_str(location)
                .map_err(|e| TodoApiError::ResponseSerialization(e.to_string()))?;
            response.headers_mut().insert(LOCATION, value);
        }

        Ok(response)
    }

    /// エラーレスポンスを生成（ボディは標準理由句）
    pub fn error(err: &TodoApiError) -> Response<Body> {
        Self::status_text(err.status_code())
    }

    /// ステータスの標準理由句をボディとするレスポンス
    pub fn status_text(status: StatusCode) -> Response<Body> {
        let reason = status.canonical_reason().unwrap_or_default();

        let mut response = Response::new(Body::Text(reason.to_string()));
        *response.status_mut() = status;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(TEXT_CONTENT_TYPE));

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Todo;

    fn body_text(response: &Response<Body>) -> String {
        match response.body() {
            Body::Text(text) => text.clone(),
            Body::Binary(bytes) => String::from_utf8(bytes.clone()).unwrap(),
            Body::Empty => String::new(),
            _ => panic!("予期しないBody型"),
        }
    }

    fn sample_todo() -> Todo {
        Todo {
            id: "todo-1".to_string(),
            name: "a".to_string(),
            description: "b".to_string(),
            status: false,
        }
    }

    // ==================== ステータス対応表 ====================

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(
            TodoApiError::MalformedBody("EOF".to_string()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            TodoApiError::InvalidPayload("name").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(TodoApiError::MissingId.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            TodoApiError::MethodNotAllowed("PATCH".to_string()).status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            TodoApiError::NotFound("x".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            TodoApiError::Repository(RepositoryError::ReadError("timeout".to_string()))
                .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            TodoApiError::ResponseSerialization("bad header".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_only_backend_failures_are_server_errors() {
        assert!(TodoApiError::Repository(RepositoryError::WriteError("x".to_string()))
            .is_server_error());
        assert!(!TodoApiError::NotFound("x".to_string()).is_server_error());
        assert!(!TodoApiError::MissingId.is_server_error());
    }

    #[test]
    fn test_from_payload_error() {
        assert_eq!(
            TodoApiError::from(PayloadError::Malformed("EOF".to_string())),
            TodoApiError::MalformedBody("EOF".to_string())
        );
        assert_eq!(
            TodoApiError::from(PayloadError::MissingField("status")),
            TodoApiError::InvalidPayload("status")
        );
    }

    #[test]
    fn test_log_each_category() {
        crate::infrastructure::logging::init_test_logging();

        TodoApiError::NotFound("x".to_string()).log();
        TodoApiError::MissingId.log();
        TodoApiError::Repository(RepositoryError::ReadError("timeout".to_string())).log();
    }

    // ==================== エラーレスポンス ====================

    /// エラーボディは標準理由句のみで内部情報を含まない
    #[test]
    fn test_error_response_hides_internal_detail() {
        let err = TodoApiError::Repository(RepositoryError::ReadError(
            "AccessDeniedException: arn:aws:dynamodb:...".to_string(),
        ));

        let response = ApiResponse::error(&err);

        assert_eq!(response.status(), 500);
        assert_eq!(body_text(&response), "Internal Server Error");
    }

    #[test]
    fn test_error_response_reason_phrases() {
        let cases = [
            (TodoApiError::NotFound("x".to_string()), 404, "Not Found"),
            (TodoApiError::MalformedBody("x".to_string()), 422, "Unprocessable Entity"),
            (TodoApiError::InvalidPayload("name"), 400, "Bad Request"),
            (TodoApiError::MissingId, 400, "Bad Request"),
            (TodoApiError::MethodNotAllowed("PATCH".to_string()), 405, "Method Not Allowed"),
        ];

        for (err, status, reason) in cases {
            let response = ApiResponse::error(&err);
            assert_eq!(response.status(), status);
            assert_eq!(body_text(&response), reason);
            assert_eq!(
                response.headers().get("content-type").unwrap(),
                "text/plain; charset=utf-8"
            );
        }
    }

    // ==================== JSONレスポンス ====================

    #[test]
    fn test_json_response_without_location() {
        let response = ApiResponse::json(StatusCode::OK, &sample_todo(), None).unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(response.headers().get("content-type").unwrap(), "application/json");
        assert!(response.headers().get("location").is_none());

        let parsed: Todo = serde_json::from_str(&body_text(&response)).unwrap();
        assert_eq!(parsed, sample_todo());
    }

    #[test]
    fn test_json_response_with_location() {
        let todo = sample_todo();
        let response =
            ApiResponse::json(StatusCode::CREATED, &todo, Some(todo.location().as_str())).unwrap();

        assert_eq!(response.status(), 201);
        assert_eq!(response.headers().get("location").unwrap(), "/todo/todo-1");
    }

    #[test]
    fn test_json_response_array_body() {
        let todos = vec![sample_todo(), sample_todo()];
        let response = ApiResponse::json(StatusCode::OK, &todos, None).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&body_text(&response)).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);
    }

    /// ヘッダーに使えない文字を含むLocationはサーバーエラー
    #[test]
    fn test_json_response_invalid_location() {
        let result = ApiResponse::json(StatusCode::OK, &sample_todo(), Some("/todo/a\nb"));

        assert!(matches!(result, Err(TodoApiError::ResponseSerialization(_))));
    }
}
