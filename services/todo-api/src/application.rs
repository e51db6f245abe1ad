// アプリケーション層モジュール
pub mod api_response;
pub mod todo_handler;

// 再エクスポート
pub use api_response::{ApiResponse, TodoApiError};
pub use todo_handler::TodoHandler;
