// ==========================================
// 销售协同系统 - 生产单仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
// ==========================================

use crate::domain::production::ProductionOrder;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct ProductionRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProductionRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入生产单
    pub fn insert(&self, production: &ProductionOrder) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let doc = serde_json::to_string(production)?;
        conn.execute(
            r#"
            INSERT INTO production_order (production_id, production_no, order_id, status, doc, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                production.production_id,
                production.production_no,
                production.order_id,
                production.status.to_db_str(),
                doc,
                production.created_at.to_rfc3339(),
                production.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// 按ID查询
    pub fn find_by_id(&self, production_id: &str) -> RepositoryResult<Option<ProductionOrder>> {
        let conn = self.get_conn()?;
        let doc: Option<String> = conn
            .query_row(
                "SELECT doc FROM production_order WHERE production_id = ?1",
                params![production_id],
                |row| row.get(0),
            )
            .optional()?;
        doc.map(|d| serde_json::from_str(&d).map_err(Into::into))
            .transpose()
    }

    /// 按来源订单查询(1:1)
    pub fn find_by_order(&self, order_id: &str) -> RepositoryResult<Option<ProductionOrder>> {
        let conn = self.get_conn()?;
        let doc: Option<String> = conn
            .query_row(
                "SELECT doc FROM production_order WHERE order_id = ?1",
                params![order_id],
                |row| row.get(0),
            )
            .optional()?;
        doc.map(|d| serde_json::from_str(&d).map_err(Into::into))
            .transpose()
    }

    /// 整体更新(索引列随文档同步)
    pub fn update(&self, production: &ProductionOrder) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let doc = serde_json::to_string(production)?;
        let rows = conn.execute(
            "UPDATE production_order SET status = ?2, doc = ?3, updated_at = ?4 WHERE production_id = ?1",
            params![
                production.production_id,
                production.status.to_db_str(),
                doc,
                production.updated_at.to_rfc3339(),
            ],
        )?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "ProductionOrder".to_string(),
                id: production.production_id.clone(),
            });
        }
        Ok(())
    }

    /// 按状态过滤的分页列表(按创建时间倒序)
    pub fn list(
        &self,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> RepositoryResult<Vec<ProductionOrder>> {
        let conn = self.get_conn()?;
        let mut result = Vec::new();

        match status {
            Some(s) => {
                let mut stmt = conn.prepare(
                    "SELECT doc FROM production_order WHERE status = ?1 ORDER BY created_at DESC LIMIT ?2 OFFSET ?3",
                )?;
                let rows =
                    stmt.query_map(params![s, limit, offset], |row| row.get::<_, String>(0))?;
                for doc in rows {
                    result.push(serde_json::from_str(&doc?)?);
                }
            }
            None => {
                let mut stmt = conn.prepare(
                    "SELECT doc FROM production_order ORDER BY created_at DESC LIMIT ?1 OFFSET ?2",
                )?;
                let rows = stmt.query_map(params![limit, offset], |row| row.get::<_, String>(0))?;
                for doc in rows {
                    result.push(serde_json::from_str(&doc?)?);
                }
            }
        }
        Ok(result)
    }

    /// 按状态分组计数(统计用)
    pub fn count_by_status(&self) -> RepositoryResult<Vec<(String, i64)>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT status, COUNT(*) FROM production_order GROUP BY status ORDER BY status",
        )?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }
}
