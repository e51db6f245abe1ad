/// DynamoDB Scanのページ列
///
/// Scanは1回の呼び出しで最大1MBまでしか返さないため、LastEvaluatedKeyを
/// 次のExclusiveStartKeyに渡して繰り返す必要がある。`ScanPages`はページを
/// 1つずつ遅延取得し、`collect_all`で全ページを1つのVecにまとめる。
use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use std::collections::HashMap;
use tracing::debug;

use super::RepositoryError;
use crate::domain::Todo;

/// Scanの継続キー（LastEvaluatedKey / ExclusiveStartKey）
pub type ScanKey = HashMap<String, AttributeValue>;

/// Scan 1回分の結果
#[derive(Debug, Clone, PartialEq)]
pub struct ScanPage {
    /// このページのTodo（ストアが返した順）
    pub items: Vec<Todo>,
    /// 次ページの開始キー（最終ページならNone）
    pub next_key: Option<ScanKey>,
}

/// ページ単位でScanを実行するデータソース
#[async_trait]
pub trait ScanPageSource: Send + Sync {
    /// `exclusive_start_key`の直後から1ページ分を取得
    async fn fetch_page(
        &self,
        exclusive_start_key: Option<ScanKey>,
    ) -> Result<ScanPage, RepositoryError>;
}

/// 遅延ページ列
///
/// `next_page`を呼ぶたびに1回だけScanを実行する。
/// エラーを返した後は終端として扱う。
pub struct ScanPages<'a, S>
where
    S: ScanPageSource + ?Sized,
{
    source: &'a S,
    next_key: Option<ScanKey>,
    exhausted: bool,
    fetched_pages: u32,
}

impl<'a, S> ScanPages<'a, S>
where
    S: ScanPageSource + ?Sized,
{
    /// テーブル先頭から始まるページ列を作成
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            next_key: None,
            exhausted: false,
            fetched_pages: 0,
        }
    }

    /// 次のページを取得（終端ならNone）
    pub async fn next_page(&mut self) -> Option<Result<Vec<Todo>, RepositoryError>> {
        if self.exhausted {
            return None;
        }

        match self.source.fetch_page(self.next_key.take()).await {
            Ok(page) => {
                self.fetched_pages += 1;
                // 空の継続キーも終端扱い（無限ループ防止）
                match page.next_key {
                    Some(key) if !key.is_empty() => self.next_key = Some(key),
                    _ => self.exhausted = true,
                }
                Some(Ok(page.items))
            }
            Err(err) => {
                self.exhausted = true;
                Some(Err(err))
            }
        }
    }

    /// 全ページを取得して1つのVecに連結する
    ///
    /// 途中のページでエラーになった場合、それまでの結果は破棄してエラーを返す。
    pub async fn collect_all(mut self) -> Result<Vec<Todo>, RepositoryError> {
        let mut todos = Vec::new();

        while let Some(page) = self.next_page().await {
            let items = page?;
            debug!(
                page = self.fetched_pages,
                page_item_count = items.len(),
                "Scanページ取得"
            );
            todos.extend(items);
        }

        Ok(todos)
    }
}
