// ==========================================
// 销售协同系统 - API层仓储聚合
// ==========================================
// 职责: 聚合各控制器所需的全部 Repository 与单记录写锁
// 目标: 减少控制器构造函数参数数量
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::repository::{
    CatalogRepository, OrderRepository, ProductionRepository, ProjectRepository, RecordLocks,
    SequenceRepository, TicketRepository,
};

/// 流程控制器仓储集合
///
/// 各仓储共享同一个数据库连接,写锁注册表全局唯一
#[derive(Clone)]
pub struct FlowRepositories {
    pub project_repo: Arc<ProjectRepository>,
    pub order_repo: Arc<OrderRepository>,
    pub production_repo: Arc<ProductionRepository>,
    pub ticket_repo: Arc<TicketRepository>,
    pub catalog_repo: Arc<CatalogRepository>,
    pub sequence_repo: Arc<SequenceRepository>,
    pub locks: Arc<RecordLocks>,
}

impl FlowRepositories {
    /// 基于共享连接构建全部仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            project_repo: Arc::new(ProjectRepository::new(conn.clone())),
            order_repo: Arc::new(OrderRepository::new(conn.clone())),
            production_repo: Arc::new(ProductionRepository::new(conn.clone())),
            ticket_repo: Arc::new(TicketRepository::new(conn.clone())),
            catalog_repo: Arc::new(CatalogRepository::new(conn.clone())),
            sequence_repo: Arc::new(SequenceRepository::new(conn)),
            locks: Arc::new(RecordLocks::new()),
        }
    }
}
