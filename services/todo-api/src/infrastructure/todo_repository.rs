/// DynamoDBでTodoを管理するためのTodoリポジトリ
///
/// テーブルはパーティションキー`id`（S）のみを持つ。リクエスト1件につき
/// DynamoDB操作は1種類（GetItem / Scan / PutItem / UpdateItem / DeleteItem）。
use async_trait::async_trait;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_dynamodb::operation::delete_item::builders::DeleteItemFluentBuilder;
use aws_sdk_dynamodb::operation::get_item::builders::GetItemFluentBuilder;
use aws_sdk_dynamodb::operation::put_item::builders::PutItemFluentBuilder;
use aws_sdk_dynamodb::operation::update_item::builders::UpdateItemFluentBuilder;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};

use super::scan_pages::{ScanKey, ScanPage, ScanPageSource, ScanPages};
use crate::domain::{CreateTodo, Todo, UpdateTodo};

/// パーティションキー属性名
pub const ID_ATTRIBUTE: &str = "id";

/// UpdateItemの更新式（name/statusは予約語のため属性名プレースホルダーを使う）
const UPDATE_EXPRESSION: &str = "SET #name = :name, #description = :description, #status = :status";

/// UpdateItemの条件式（対象アイテムが存在する場合のみ更新）
const UPDATE_CONDITION: &str = "#id = :id";

/// PutItemの条件式（同一idを上書きしない）
const INSERT_CONDITION: &str = "attribute_not_exists(#id)";

/// リポジトリ操作のエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RepositoryError {
    /// DynamoDBからの読み取りに失敗
    #[error("Read error: {0}")]
    ReadError(String),

    /// DynamoDBへの書き込みに失敗
    #[error("Write error: {0}")]
    WriteError(String),

    /// アイテムとTodoの変換に失敗
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Todo永続化用トレイト
///
/// 「見つからない」はエラーではなく`Ok(None)`で表す。
/// `Err`はバックエンドや変換の失敗のみ。
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// idでTodoを取得
    ///
    /// # 戻り値
    /// * 見つかった場合は`Ok(Some(Todo))`
    /// * 見つからなかった場合は`Ok(None)`
    /// * 失敗時は`Err(RepositoryError)`
    async fn get(&self, id: &str) -> Result<Option<Todo>, RepositoryError>;

    /// 全Todoを取得
    ///
    /// 内部でScanの継続キーを最後まで辿り、全ページを連結して返す。
    /// 順序はストアが返した順（ソートされない）。
    async fn list(&self) -> Result<Vec<Todo>, RepositoryError>;

    /// 新しいidを採番してTodoを保存
    ///
    /// # 戻り値
    /// * 成功時は保存したTodo（status=false）
    async fn insert(&self, payload: CreateTodo) -> Result<Todo, RepositoryError>;

    /// 既存Todoのname/description/statusを上書き
    ///
    /// 存在チェックと更新はDynamoDBの条件付き書き込みで原子的に行う。
    ///
    /// # 戻り値
    /// * 更新後のTodoを`Ok(Some(Todo))`
    /// * 対象が存在しない（条件チェック失敗）場合は`Ok(None)`
    async fn update(&self, id: &str, payload: UpdateTodo)
        -> Result<Option<Todo>, RepositoryError>;

    /// Todoを削除し、削除前の値を返す
    ///
    /// # 戻り値
    /// * 削除前のTodoを`Ok(Some(Todo))`
    /// * 存在しなかった場合は`Ok(None)`
    async fn delete(&self, id: &str) -> Result<Option<Todo>, RepositoryError>;
}

/// TodoRepositoryのDynamoDB実装
#[derive(Debug, Clone)]
pub struct DynamoTodoRepository {
    /// DynamoDBクライアント
    client: DynamoDbClient,
    /// Todoテーブル名
    table_name: String,
}

impl DynamoTodoRepository {
    /// 新しいDynamoTodoRepositoryを作成
    ///
    /// # 引数
    /// * `client` - DynamoDBクライアント
    /// * `table_name` - Todoテーブルの名前
    pub fn new(client: DynamoDbClient, table_name: String) -> Self {
        Self { client, table_name }
    }

    fn id_key(id: &str) -> AttributeValue {
        AttributeValue::S(id.to_string())
    }

    /// TodoをDynamoDBアイテムに変換
    pub(crate) fn todo_to_item(
        todo: &Todo,
    ) -> Result<HashMap<String, AttributeValue>, RepositoryError> {
        serde_dynamo::to_item(todo).map_err(|e| RepositoryError::SerializationError(e.to_string()))
    }

    /// DynamoDBアイテムをTodoに変換
    pub(crate) fn item_to_todo(item: HashMap<String, AttributeValue>) -> Result<Todo, RepositoryError> {
        serde_dynamo::from_item(item).map_err(|e| RepositoryError::SerializationError(e.to_string()))
    }

    fn get_request(&self, id: &str) -> GetItemFluentBuilder {
        self.client
            .get_item()
            .table_name(&self.table_name)
            .key(ID_ATTRIBUTE, Self::id_key(id))
    }

    fn insert_request(&self, item: HashMap<String, AttributeValue>) -> PutItemFluentBuilder {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression(INSERT_CONDITION)
            .expression_attribute_names("#id", ID_ATTRIBUTE)
    }

    fn update_request(&self, id: &str, payload: &UpdateTodo) -> UpdateItemFluentBuilder {
        self.client
            .update_item()
            .table_name(&self.table_name)
            .key(ID_ATTRIBUTE, Self::id_key(id))
            .update_expression(UPDATE_EXPRESSION)
            .condition_expression(UPDATE_CONDITION)
            .expression_attribute_names("#id", ID_ATTRIBUTE)
            .expression_attribute_names("#name", "name")
            .expression_attribute_names("#description", "description")
            .expression_attribute_names("#status", "status")
            .expression_attribute_values(":id", Self::id_key(id))
            .expression_attribute_values(":name", AttributeValue::S(payload.name.clone()))
            .expression_attribute_values(
                ":description",
                AttributeValue::S(payload.description.clone()),
            )
            .expression_attribute_values(":status", AttributeValue::Bool(payload.status))
            .return_values(ReturnValue::AllNew)
    }

    fn delete_request(&self, id: &str) -> DeleteItemFluentBuilder {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key(ID_ATTRIBUTE, Self::id_key(id))
            .return_values(ReturnValue::AllOld)
    }
}

#[async_trait]
impl ScanPageSource for DynamoTodoRepository {
    async fn fetch_page(
        &self,
        exclusive_start_key: Option<ScanKey>,
    ) -> Result<ScanPage, RepositoryError> {
        let response = self
            .client
            .scan()
            .table_name(&self.table_name)
            .set_exclusive_start_key(exclusive_start_key)
            .send()
            .await
            .map_err(|e| RepositoryError::ReadError(e.into_service_error().to_string()))?;

        let items = response
            .items
            .unwrap_or_default()
            .into_iter()
            .map(Self::item_to_todo)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ScanPage {
            items,
            next_key: response.last_evaluated_key,
        })
    }
}

#[async_trait]
impl TodoRepository for DynamoTodoRepository {
    async fn get(&self, id: &str) -> Result<Option<Todo>, RepositoryError> {
        let result = self
            .get_request(id)
            .send()
            .await
            .map_err(|e| RepositoryError::ReadError(e.into_service_error().to_string()))?;

        result.item.map(Self::item_to_todo).transpose()
    }

    async fn list(&self) -> Result<Vec<Todo>, RepositoryError> {
        let todos = ScanPages::new(self).collect_all().await?;

        info!(
            table_name = %self.table_name,
            count = todos.len(),
            "Todoテーブルのスキャン完了"
        );

        Ok(todos)
    }

    async fn insert(&self, payload: CreateTodo) -> Result<Todo, RepositoryError> {
        let todo = Todo::new(payload);
        let item = Self::todo_to_item(&todo)?;

        self.insert_request(item)
            .send()
            .await
            .map_err(|e| RepositoryError::WriteError(e.into_service_error().to_string()))?;

        Ok(todo)
    }

    async fn update(
        &self,
        id: &str,
        payload: UpdateTodo,
    ) -> Result<Option<Todo>, RepositoryError> {
        let result = self.update_request(id, &payload).send().await;

        match result {
            Ok(output) => output.attributes.map(Self::item_to_todo).transpose(),
            Err(err) => {
                let service_error = err.into_service_error();
                if service_error.is_conditional_check_failed_exception() {
                    debug!(todo_id = id, "更新対象のTodoが存在しない");
                    return Ok(None);
                }
                Err(RepositoryError::WriteError(service_error.to_string()))
            }
        }
    }

    async fn delete(&self, id: &str) -> Result<Option<Todo>, RepositoryError> {
        let result = self
            .delete_request(id)
            .send()
            .await
            .map_err(|e| RepositoryError::WriteError(e.into_service_error().to_string()))?;

        result.attributes.map(Self::item_to_todo).transpose()
    }
}
