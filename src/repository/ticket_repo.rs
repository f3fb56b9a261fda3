// ==========================================
// 销售协同系统 - 服务工单仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
// ==========================================

use crate::domain::ticket::ServiceTicket;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct TicketRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TicketRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入工单
    pub fn insert(&self, ticket: &ServiceTicket) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let doc = serde_json::to_string(ticket)?;
        conn.execute(
            r#"
            INSERT INTO service_ticket (ticket_id, ticket_no, order_id, status, doc, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                ticket.ticket_id,
                ticket.ticket_no,
                ticket.order_id,
                ticket.status.to_db_str(),
                doc,
                ticket.created_at.to_rfc3339(),
                ticket.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// 按ID查询
    pub fn find_by_id(&self, ticket_id: &str) -> RepositoryResult<Option<ServiceTicket>> {
        let conn = self.get_conn()?;
        let doc: Option<String> = conn
            .query_row(
                "SELECT doc FROM service_ticket WHERE ticket_id = ?1",
                params![ticket_id],
                |row| row.get(0),
            )
            .optional()?;
        doc.map(|d| serde_json::from_str(&d).map_err(Into::into))
            .transpose()
    }

    /// 按关联订单查询
    pub fn find_by_order(&self, order_id: &str) -> RepositoryResult<Vec<ServiceTicket>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT doc FROM service_ticket WHERE order_id = ?1 ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map(params![order_id], |row| row.get::<_, String>(0))?;
        let mut result = Vec::new();
        for doc in rows {
            result.push(serde_json::from_str(&doc?)?);
        }
        Ok(result)
    }

    /// 整体更新(索引列随文档同步)
    pub fn update(&self, ticket: &ServiceTicket) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let doc = serde_json::to_string(ticket)?;
        let rows = conn.execute(
            "UPDATE service_ticket SET status = ?2, doc = ?3, updated_at = ?4 WHERE ticket_id = ?1",
            params![
                ticket.ticket_id,
                ticket.status.to_db_str(),
                doc,
                ticket.updated_at.to_rfc3339(),
            ],
        )?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "ServiceTicket".to_string(),
                id: ticket.ticket_id.clone(),
            });
        }
        Ok(())
    }

    /// 删除工单(业务侧已校验仅限初始/取消态)
    pub fn delete(&self, ticket_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "DELETE FROM service_ticket WHERE ticket_id = ?1",
            params![ticket_id],
        )?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "ServiceTicket".to_string(),
                id: ticket_id.to_string(),
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
    ) -> RepositoryResult<Vec<ServiceTicket>> {
        let conn = self.get_conn()?;
        let mut result = Vec::new();

        match status {
            Some(s) => {
                let mut stmt = conn.prepare(
                    "SELECT doc FROM service_ticket WHERE status = ?1 ORDER BY created_at DESC LIMIT ?2 OFFSET ?3",
                )?;
                let rows =
                    stmt.query_map(params![s, limit, offset], |row| row.get::<_, String>(0))?;
                for doc in rows {
                    result.push(serde_json::from_str(&doc?)?);
                }
            }
            None => {
                let mut stmt = conn.prepare(
                    "SELECT doc FROM service_ticket ORDER BY created_at DESC LIMIT ?1 OFFSET ?2",
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
            "SELECT status, COUNT(*) FROM service_ticket GROUP BY status ORDER BY status",
        )?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }
}
