// インフラ層モジュール
pub mod config;
pub mod logging;
pub mod scan_pages;
pub mod todo_repository;

// 再エクスポート
pub use config::{DynamoDbConfig, DynamoDbConfigError};
pub use logging::init_logging;
pub use scan_pages::{ScanKey, ScanPage, ScanPageSource, ScanPages};
pub use todo_repository::{DynamoTodoRepository, RepositoryError, TodoRepository};
