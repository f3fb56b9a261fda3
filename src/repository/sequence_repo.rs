// ==========================================
// 销售协同系统 - 展示编号序列仓储
// ==========================================
// 职责: 生成类别+周期内单调递增的展示编号 (如 XM20260805-003)
// 说明: 只要求同类别同周期内唯一且可区分先后,不要求绝对无缝
// ==========================================

use crate::domain::types::SequenceKind;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct SequenceRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SequenceRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 取下一个展示编号
    ///
    /// 读取与递增在同一事务内完成,避免并发重号
    pub fn next_number(&self, kind: SequenceKind, on: NaiveDate) -> RepositoryResult<String> {
        let mut conn = self.get_conn()?;
        let period = on.format("%Y%m%d").to_string();

        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let current: Option<i64> = tx
            .query_row(
                "SELECT next_value FROM seq_counter WHERE seq_key = ?1 AND period = ?2",
                params![kind.key(), period],
                |row| row.get(0),
            )
            .optional()?;

        let value = current.unwrap_or(1);
        tx.execute(
            r#"
            INSERT INTO seq_counter (seq_key, period, next_value) VALUES (?1, ?2, ?3)
            ON CONFLICT(seq_key, period) DO UPDATE SET next_value = ?3
            "#,
            params![kind.key(), period, value + 1],
        )?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Ok(format!("{}{}-{:03}", kind.prefix(), period, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::db::open_in_memory_connection;
    use crate::repository::schema::init_schema;

    fn setup() -> SequenceRepository {
        let conn = open_in_memory_connection().unwrap();
        init_schema(&conn).unwrap();
        SequenceRepository::new(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_numbers_increment_within_period() {
        let repo = setup();
        let day = NaiveDate::from_ymd_opt(2026, 8, 5).unwrap();
        assert_eq!(
            repo.next_number(SequenceKind::Project, day).unwrap(),
            "XM20260805-001"
        );
        assert_eq!(
            repo.next_number(SequenceKind::Project, day).unwrap(),
            "XM20260805-002"
        );
        // 不同类别各自独立计数
        assert_eq!(
            repo.next_number(SequenceKind::SalesOrder, day).unwrap(),
            "SO20260805-001"
        );
    }

    #[test]
    fn test_period_rollover_restarts() {
        let repo = setup();
        let d1 = NaiveDate::from_ymd_opt(2026, 8, 5).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        repo.next_number(SequenceKind::ServiceTicket, d1).unwrap();
        assert_eq!(
            repo.next_number(SequenceKind::ServiceTicket, d2).unwrap(),
            "FW20260806-001"
        );
    }
}
