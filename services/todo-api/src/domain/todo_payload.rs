/// Todoリクエストボディのデシリアライズと必須フィールド検証
///
/// 判定は2段階:
/// 1. JSONとして解釈できない → `PayloadError::Malformed`（422）
/// 2. 解釈できたが必須フィールドがゼロ値 → `PayloadError::MissingField`（400）
///
/// 欠落フィールドはゼロ値（空文字/false）として扱い、デシリアライズ段階では
/// 失敗させない。したがって欠落は422ではなく400になる。
/// フィールド値の`null`も欠落と同じ扱い。フィールド名は大文字小文字を区別しない。
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

/// ペイロード処理のエラー型
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PayloadError {
    /// JSONとして不正（構文エラー、空ボディ、型不一致など）
    #[error("malformed body: {0}")]
    Malformed(String),
    /// 必須フィールドがゼロ値
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

/// 必須フィールドを持つペイロード
pub trait RequiredFields {
    /// 最初に検証に失敗したフィールド名を返す（すべて満たしていればNone）
    fn missing_field(&self) -> Option<&'static str>;
}

/// POST /todo のボディ
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CreateTodo {
    pub name: String,
    pub description: String,
}

/// PUT /todo/{id} のボディ
///
/// `status`の必須チェックはゼロ値判定のため、`false`は「未指定」と同じ扱いになり
/// 検証に失敗する。更新で`false`を設定することはできない。
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UpdateTodo {
    pub name: String,
    pub description: String,
    pub status: bool,
}

impl RequiredFields for CreateTodo {
    fn missing_field(&self) -> Option<&'static str> {
        if self.name.is_empty() {
            return Some("name");
        }
        if self.description.is_empty() {
            return Some("description");
        }
        None
    }
}

impl RequiredFields for UpdateTodo {
    fn missing_field(&self) -> Option<&'static str> {
        if self.name.is_empty() {
            return Some("name");
        }
        if self.description.is_empty() {
            return Some("description");
        }
        if !self.status {
            return Some("status");
        }
        None
    }
}

/// リクエストボディのパーサー
pub struct PayloadParser;

impl PayloadParser {
    /// ボディをデシリアライズし、必須フィールドを検証する
    ///
    /// トップレベルの`null`は全フィールドがゼロ値のペイロードとして扱う。
    /// オブジェクトは`normalize_fields`を通してからデシリアライズする。
    pub fn parse<T>(body: &[u8]) -> Result<T, PayloadError>
    where
        T: DeserializeOwned + Default + RequiredFields,
    {
        let value: Value =
            serde_json::from_slice(body).map_err(|e| PayloadError::Malformed(e.to_string()))?;

        let payload = match value {
            Value::Null => T::default(),
            Value::Object(fields) => T::deserialize(Value::Object(normalize_fields(fields)))
                .map_err(|e| PayloadError::Malformed(e.to_string()))?,
            other => {
                return Err(PayloadError::Malformed(format!(
                    "expected JSON object, got {}",
                    json_type_name(&other)
                )));
            }
        };

        if let Some(field) = payload.missing_field() {
            return Err(PayloadError::MissingField(field));
        }

        Ok(payload)
    }
}

/// フィールド名を小文字に揃え、値が`null`のフィールドを取り除く
///
/// ペイロードのフィールド名はすべて小文字。
/// 同じフィールドを指すキーが複数ある場合は、小文字そのままのキーを優先する。
fn normalize_fields(fields: Map<String, Value>) -> Map<String, Value> {
    let mut normalized = Map::with_capacity(fields.len());

    for (key, value) in fields {
        if value.is_null() {
            continue;
        }

        let folded = key.to_lowercase();
        if folded == key {
            normalized.insert(folded, value);
        } else {
            normalized.entry(folded).or_insert(value);
        }
    }

    normalized
}

/// ログ用のJSON型名
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
