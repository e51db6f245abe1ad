// ドメイン層モジュール
pub mod todo;
pub mod todo_payload;

// 再エクスポート
pub use todo::{Todo, generate_todo_id};
pub use todo_payload::{CreateTodo, PayloadError, PayloadParser, RequiredFields, UpdateTodo};
