/// Todo CRUDハンドラー
///
/// API Gatewayから受け取ったHTTPメソッドとパスパラメータ`id`で処理を振り分け、
/// TodoRepositoryの操作を1回だけ実行してレスポンスを返す。
///
/// | メソッド | id | 処理 |
/// |---|---|---|
/// | GET | なし | 一覧 |
/// | GET | あり | 1件取得 |
/// | POST | - | 作成 |
/// | PUT | あり | 更新（idなしは400） |
/// | DELETE | あり | 削除（idなしは400） |
/// | その他 | - | 405 |
use lambda_http::http::{Method, StatusCode};
use lambda_http::{Body, Request, RequestExt, Response};
use tracing::info;

use super::api_response::{ApiResponse, TodoApiError};
use crate::domain::{CreateTodo, PayloadParser, UpdateTodo};
use crate::infrastructure::TodoRepository;

/// パスパラメータ名（API Gatewayリソース `/todo/{id}`）
pub const ID_PATH_PARAMETER: &str = "id";

/// Todo APIのリクエストハンドラー
pub struct TodoHandler<R>
where
    R: TodoRepository,
{
    /// Todoリポジトリ
    repository: R,
}

impl<R> TodoHandler<R>
where
    R: TodoRepository,
{
    /// 新しいTodoHandlerを作成
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// API Gatewayリクエストを処理
    ///
    /// エラーもすべてHTTPレスポンスに変換するため、常にレスポンスを返す。
    pub async fn handle(&self, request: Request) -> Response<Body> {
        let method = request.method().clone();
        let id = Self::path_id(&request);

        info!(method = %method, todo_id = id.unwrap_or(""), "Todoリクエスト受信");

        match self.route(&method, id, request.body().as_ref()).await {
            Ok(response) => {
                info!(
                    method = %method,
                    status = response.status().as_u16(),
                    "Todoリクエスト処理完了"
                );
                response
            }
            Err(err) => {
                err.log();
                ApiResponse::error(&err)
            }
        }
    }

    /// パスパラメータ`id`を取得（空文字は未指定扱い）
    fn path_id(request: &Request) -> Option<&str> {
        request
            .path_parameters_ref()
            .and_then(|params| params.first(ID_PATH_PARAMETER))
            .filter(|id| !id.is_empty())
    }

    /// メソッドとidで処理を振り分ける
    ///
    /// # Arguments
    /// * `method` - HTTPメソッド
    /// * `id` - パスパラメータ`id`
    /// * `body` - リクエストボディ
    pub async fn route(
        &self,
        method: &Method,
        id: Option<&str>,
        body: &[u8],
    ) -> Result<Response<Body>, TodoApiError> {
        match *method {
            Method::GET => match id {
                Some(id) => self.get_todo(id).await,
                None => self.list_todos().await,
            },
            Method::POST => self.create_todo(body).await,
            Method::PUT => {
                let id = id.ok_or(TodoApiError::MissingId)?;
                self.update_todo(id, body).await
            }
            Method::DELETE => {
                let id = id.ok_or(TodoApiError::MissingId)?;
                self.delete_todo(id).await
            }
            _ => Err(TodoApiError::MethodNotAllowed(method.to_string())),
        }
    }

    async fn list_todos(&self) -> Result<Response<Body>, TodoApiError> {
        let todos = self.repository.list().await?;

        info!(count = todos.len(), "Todo一覧を取得");
        ApiResponse::json(StatusCode::OK, &todos, None)
    }

    async fn get_todo(&self, id: &str) -> Result<Response<Body>, TodoApiError> {
        let todo = self
            .repository
            .get(id)
            .await?
            .ok_or_else(|| TodoApiError::NotFound(id.to_string()))?;

        info!(todo_id = %todo.id, "Todoを取得");
        ApiResponse::json(StatusCode::OK, &todo, None)
    }

    async fn create_todo(&self, body: &[u8]) -> Result<Response<Body>, TodoApiError> {
        let payload: CreateTodo = PayloadParser::parse(body)?;

        let todo = self.repository.insert(payload).await?;

        info!(todo_id = %todo.id, "Todoを作成");
        ApiResponse::json(StatusCode::CREATED, &todo, Some(todo.location().as_str()))
    }

    async fn update_todo(&self, id: &str, body: &[u8]) -> Result<Response<Body>, TodoApiError> {
        let payload: UpdateTodo = PayloadParser::parse(body)?;

        let todo = self
            .repository
            .update(id, payload)
            .await?
            .ok_or_else(|| TodoApiError::NotFound(id.to_string()))?;

        info!(todo_id = %todo.id, status = todo.status, "Todoを更新");
        ApiResponse::json(StatusCode::OK, &todo, Some(todo.location().as_str()))
    }

    async fn delete_todo(&self, id: &str) -> Result<Response<Body>, TodoApiError> {
        let todo = self
            .repository
            .delete(id)
            .await?
            .ok_or_else(|| TodoApiError::NotFound(id.to_string()))?;

        info!(todo_id = %todo.id, "Todoを削除");
        ApiResponse::json(StatusCode::OK, &todo, None)
    }
}
