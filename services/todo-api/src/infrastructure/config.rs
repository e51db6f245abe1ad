/// DynamoDB接続設定
///
/// プロセス起動時に一度だけ読み込み、以後は不変のまま全リクエストで共有する。
use aws_sdk_dynamodb::Client as DynamoDbClient;
use thiserror::Error;

/// Todoテーブル名を指定する環境変数
pub const TODOS_TABLE_ENV: &str = "TODOS_TABLE";

/// TODOS_TABLE未設定時のテーブル名
pub const DEFAULT_TODOS_TABLE: &str = "Todos";

/// DynamoDB設定のエラー型
#[derive(Debug, Error)]
pub enum DynamoDbConfigError {
    #[error("Environment variable is blank: {0}")]
    BlankEnvVar(String),
}

/// テーブル名とクライアントを持つDynamoDB設定
///
/// テーブル名は環境変数`TODOS_TABLE`で設定（未設定なら`Todos`）。
#[derive(Debug, Clone)]
pub struct DynamoDbConfig {
    /// DynamoDBクライアントインスタンス
    client: DynamoDbClient,
    /// Todoテーブル名
    todos_table: String,
}

impl DynamoDbConfig {
    /// 環境からAWS設定を読み込み、環境変数からテーブル名を読み取って新しいDynamoDbConfigを作成
    ///
    /// 環境変数:
    /// - AWS認証情報/リージョン: aws-configにより自動読み込み
    /// - TODOS_TABLE: Todo用DynamoDBテーブル名
    pub async fn from_env() -> Result<Self, DynamoDbConfigError> {
        // テーブル名を先に検証（設定ミスはAWS設定の読み込み前に検出する）
        let todos_table = resolve_table_name(std::env::var(TODOS_TABLE_ENV).ok())?;

        // 環境からAWS設定を読み込み（認証情報、リージョンなど）
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

        // AWS設定からDynamoDBクライアントを作成
        let client = DynamoDbClient::new(&aws_config);

        Ok(Self {
            client,
            todos_table,
        })
    }

    /// 明示的な値で新しいDynamoDbConfigを作成（テスト用）
    pub fn new(client: DynamoDbClient, todos_table: String) -> Self {
        Self {
            client,
            todos_table,
        }
    }

    /// DynamoDBクライアントへの参照を取得
    pub fn client(&self) -> &DynamoDbClient {
        &self.client
    }

    /// Todoテーブル名を取得
    pub fn todos_table(&self) -> &str {
        &self.todos_table
    }
}

/// 環境変数の値からテーブル名を決定
///
/// 未設定ならデフォルト、設定されているが空白のみならエラー。
fn resolve_table_name(value: Option<String>) -> Result<String, DynamoDbConfigError> {
    match value {
        None => Ok(DEFAULT_TODOS_TABLE.to_string()),
        Some(name) if name.trim().is_empty() => {
            Err(DynamoDbConfigError::BlankEnvVar(TODOS_TABLE_ENV.to_string()))
        }
        Some(name) => Ok(name.trim().to_string()),
    }
}
