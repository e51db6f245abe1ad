/// Todo API Lambdaエントリポイント
///
/// API Gateway（RESTプロキシ統合）経由のHTTPリクエストを処理する。
/// リソースは `/todo` と `/todo/{id}` の2つ。
use lambda_http::{Body, Error, Request, Response, run, service_fn};
use todo_api::application::TodoHandler;
use todo_api::infrastructure::{DynamoDbConfig, DynamoTodoRepository, init_logging};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 構造化ログを初期化
    init_logging();

    // DynamoDBクライアントは起動時に一度だけ作成し、全リクエストで共有する
    // 設定の読み込みに失敗した場合は起動失敗とする
    let config = DynamoDbConfig::from_env().await.map_err(|err| {
        error!(error = %err, "DynamoDB設定の読み込みに失敗");
        err
    })?;

    info!(table_name = config.todos_table(), "Todo API Lambda関数を初期化");

    let repository =
        DynamoTodoRepository::new(config.client().clone(), config.todos_table().to_string());
    let handler = TodoHandler::new(repository);
    let handler = &handler;

    // Lambda関数を実行
    run(service_fn(move |request: Request| async move {
        Ok::<Response<Body>, Error>(handler.handle(request).await)
    }))
    .await
}
