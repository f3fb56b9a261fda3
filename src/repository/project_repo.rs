// ==========================================
// 销售协同系统 - 商机项目仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
// ==========================================

use crate::domain::project::CommercialProject;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct ProjectRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProjectRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入项目
    pub fn insert(&self, project: &CommercialProject) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let doc = serde_json::to_string(project)?;
        conn.execute(
            r#"
            INSERT INTO project (project_id, project_no, status, linked_order_id, doc, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                project.project_id,
                project.project_no,
                project.status.to_db_str(),
                project.linked_order_id,
                doc,
                project.created_at.to_rfc3339(),
                project.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// 按ID查询
    pub fn find_by_id(&self, project_id: &str) -> RepositoryResult<Option<CommercialProject>> {
        let conn = self.get_conn()?;
        let doc: Option<String> = conn
            .query_row(
                "SELECT doc FROM project WHERE project_id = ?1",
                params![project_id],
                |row| row.get(0),
            )
            .optional()?;
        doc.map(|d| serde_json::from_str(&d).map_err(Into::into))
            .transpose()
    }

    /// 整体更新(索引列随文档同步)
    pub fn update(&self, project: &CommercialProject) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let doc = serde_json::to_string(project)?;
        let rows = conn.execute(
            r#"
            UPDATE project
            SET status = ?2, linked_order_id = ?3, doc = ?4, updated_at = ?5
            WHERE project_id = ?1
            "#,
            params![
                project.project_id,
                project.status.to_db_str(),
                project.linked_order_id,
                doc,
                project.updated_at.to_rfc3339(),
            ],
        )?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "CommercialProject".to_string(),
                id: project.project_id.clone(),
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
    ) -> RepositoryResult<Vec<CommercialProject>> {
        let conn = self.get_conn()?;
        let mut result = Vec::new();

        match status {
            Some(s) => {
                let mut stmt = conn.prepare(
                    "SELECT doc FROM project WHERE status = ?1 ORDER BY created_at DESC LIMIT ?2 OFFSET ?3",
                )?;
                let rows = stmt.query_map(params![s, limit, offset], |row| {
                    row.get::<_, String>(0)
                })?;
                for doc in rows {
                    result.push(serde_json::from_str(&doc?)?);
                }
            }
            None => {
                let mut stmt = conn.prepare(
                    "SELECT doc FROM project ORDER BY created_at DESC LIMIT ?1 OFFSET ?2",
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
        let mut stmt =
            conn.prepare("SELECT status, COUNT(*) FROM project GROUP BY status ORDER BY status")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }
}
