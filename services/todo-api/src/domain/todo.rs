/// Todoエンティティ
///
/// DynamoDBの1アイテム、かつAPIレスポンスの1 JSONオブジェクトに対応する。
/// 属性名とJSONフィールド名は同一（id, name, description, status）。
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::CreateTodo;

/// Todoリソースのパスプレフィックス（Locationヘッダー用）
pub const TODO_PATH_PREFIX: &str = "/todo";

/// Todoレコード
///
/// `id`は作成時にサーバー側で一度だけ採番され、以後変更されない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// パーティションキー（UUID v4文字列）
    pub id: String,
    /// 名前（空文字不可）
    pub name: String,
    /// 説明（空文字不可）
    pub description: String,
    /// 完了状態
    pub status: bool,
}

impl Todo {
    /// 作成ペイロードから新しいTodoを生成
    ///
    /// 新しいIDを採番し、statusはfalseで初期化する。
    pub fn new(payload: CreateTodo) -> Self {
        Self {
            id: generate_todo_id(),
            name: payload.name,
            description: payload.description,
            status: false,
        }
    }

    /// このTodoを指すリソースパス（例: `/todo/{id}`）
    pub fn location(&self) -> String {
        format!("{}/{}", TODO_PATH_PREFIX, self.id)
    }
}

/// 128ビットのランダムIDを生成（ハイフン区切り小文字のUUID v4）
pub fn generate_todo_id() -> String {
    Uuid::new_v4().to_string()
}
