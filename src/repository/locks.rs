// ==========================================
// 销售协同系统 - 单记录写锁
// ==========================================
// 职责: 同一实体实例的变更操作串行化(single-writer-per-record)
// 说明: 不同实体之间互不阻塞; 只读查询不经过写锁
// ==========================================

use crate::domain::types::EntityKind;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

// ==========================================
// RecordLocks - 按 (实体类别, ID) 键控的锁注册表
// ==========================================
#[derive(Default)]
pub struct RecordLocks {
    locks: Mutex<HashMap<(EntityKind, String), Arc<AsyncMutex<()>>>>,
}

impl RecordLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取某条记录的写锁,持有期间该记录的读-校验-写整体原子
    ///
    /// 锁注册表本身只在取句柄的瞬间短暂持有,不跨 await
    pub async fn acquire(&self, kind: EntityKind, id: &str) -> OwnedMutexGuard<()> {
        let handle = {
            let mut map = self
                .locks
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            map.entry((kind, id.to_string()))
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        handle.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[tokio::test]
    async fn test_same_record_serializes() {
        let locks = Arc::new(RecordLocks::new());
        let counter = Arc::new(AtomicU64::new(0));

        let mut handles = vec![];
        for _ in 0..16 {
            let locks = locks.clone();
            let counter = counter.clone();
            handles.push(tokio::spawn(async move {
                let _guard = locks.acquire(EntityKind::SalesOrder, "SO-1").await;
                // 读-改-写竞态窗口: 串行化后不会丢失更新
                let before = counter.load(Ordering::SeqCst);
                tokio::task::yield_now().await;
                counter.store(before + 1, Ordering::SeqCst);
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(counter.load(Ordering::SeqCst), 16);
    }

    #[tokio::test]
    async fn test_different_records_do_not_block() {
        let locks = RecordLocks::new();
        let _a = locks.acquire(EntityKind::SalesOrder, "SO-1").await;
        // 另一条记录的锁立刻可得
        let _b = locks.acquire(EntityKind::SalesOrder, "SO-2").await;
        let _c = locks.acquire(EntityKind::Project, "SO-1").await;
    }
}
