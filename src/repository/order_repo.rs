// ==========================================
// 销售协同系统 - 销售订单仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
// 说明: project_id 列带唯一约束,数据库侧兜底一项目一订单
// ==========================================

use crate::domain::order::SalesOrder;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct OrderRepository {
    conn: Arc<Mutex<Connection>>,
}

impl OrderRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入订单
    pub fn insert(&self, order: &SalesOrder) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let doc = serde_json::to_string(order)?;
        conn.execute(
            r#"
            INSERT INTO sales_order (order_id, order_no, project_id, status, doc, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                order.order_id,
                order.order_no,
                order.project_id,
                order.status.to_db_str(),
                doc,
                order.created_at.to_rfc3339(),
                order.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// 按ID查询
    pub fn find_by_id(&self, order_id: &str) -> RepositoryResult<Option<SalesOrder>> {
        let conn = self.get_conn()?;
        let doc: Option<String> = conn
            .query_row(
                "SELECT doc FROM sales_order WHERE order_id = ?1",
                params![order_id],
                |row| row.get(0),
            )
            .optional()?;
        doc.map(|d| serde_json::from_str(&d).map_err(Into::into))
            .transpose()
    }

    /// 按来源项目查询(1:1)
    pub fn find_by_project(&self, project_id: &str) -> RepositoryResult<Option<SalesOrder>> {
        let conn = self.get_conn()?;
        let doc: Option<String> = conn
            .query_row(
                "SELECT doc FROM sales_order WHERE project_id = ?1",
                params![project_id],
                |row| row.get(0),
            )
            .optional()?;
        doc.map(|d| serde_json::from_str(&d).map_err(Into::into))
            .transpose()
    }

    /// 整体更新(索引列随文档同步)
    pub fn update(&self, order: &SalesOrder) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let doc = serde_json::to_string(order)?;
        let rows = conn.execute(
            "UPDATE sales_order SET status = ?2, doc = ?3, updated_at = ?4 WHERE order_id = ?1",
            params![
                order.order_id,
                order.status.to_db_str(),
                doc,
                order.updated_at.to_rfc3339(),
            ],
        )?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "SalesOrder".to_string(),
                id: order.order_id.clone(),
            });
        }
        Ok(())
    }

    /// 删除订单(业务侧已校验仅限初始/取消态)
    pub fn delete(&self, order_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "DELETE FROM sales_order WHERE order_id = ?1",
            params![order_id],
        )?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "SalesOrder".to_string(),
                id: order_id.to_string(),
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
    ) -> RepositoryResult<Vec<SalesOrder>> {
        let conn = self.get_conn()?;
        let mut result = Vec::new();

        match status {
            Some(s) => {
                let mut stmt = conn.prepare(
                    "SELECT doc FROM sales_order WHERE status = ?1 ORDER BY created_at DESC LIMIT ?2 OFFSET ?3",
                )?;
                let rows =
                    stmt.query_map(params![s, limit, offset], |row| row.get::<_, String>(0))?;
                for doc in rows {
                    result.push(serde_json::from_str(&doc?)?);
                }
            }
            None => {
                let mut stmt = conn.prepare(
                    "SELECT doc FROM sales_order ORDER BY created_at DESC LIMIT ?1 OFFSET ?2",
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
        let mut stmt = conn
            .prepare("SELECT status, COUNT(*) FROM sales_order GROUP BY status ORDER BY status")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }
}
