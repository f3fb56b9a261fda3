// ==========================================
// 销售协同系统 - 产品目录仓储
// ==========================================
// 说明: 目录维护界面不在本系统范围,这里只提供读取与种子写入
// ==========================================

use crate::domain::catalog::CatalogItem;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct CatalogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CatalogRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 写入产品(存在则覆盖,种子数据用)
    pub fn upsert(&self, item: &CatalogItem) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let doc = serde_json::to_string(item)?;
        conn.execute(
            r#"
            INSERT INTO catalog_item (item_id, doc) VALUES (?1, ?2)
            ON CONFLICT(item_id) DO UPDATE SET doc = excluded.doc
            "#,
            params![item.item_id, doc],
        )?;
        Ok(())
    }

    /// 按ID查询
    pub fn find_by_id(&self, item_id: &str) -> RepositoryResult<Option<CatalogItem>> {
        let conn = self.get_conn()?;
        let doc: Option<String> = conn
            .query_row(
                "SELECT doc FROM catalog_item WHERE item_id = ?1",
                params![item_id],
                |row| row.get(0),
            )
            .optional()?;
        doc.map(|d| serde_json::from_str(&d).map_err(Into::into))
            .transpose()
    }
}
