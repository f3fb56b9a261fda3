// ==========================================
// 销售协同系统 - 生产单领域模型
// ==========================================
// 职责: 跟踪订单的制造侧进度
// 说明: 状态一部分由订单侧事件联动(待发货/已发货),一部分由生产侧事件驱动
// ==========================================

use crate::domain::actor::ActorSnapshot;
use crate::domain::audit::AuditEntry;
use crate::domain::types::{MaterialReadiness, ProductionStatus};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// ProductionSchedule - 排期块
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionSchedule {
    pub planned_start: Option<NaiveDate>, // 计划开工
    pub planned_end: Option<NaiveDate>,   // 计划完工
    pub actual_start: Option<NaiveDate>,  // 实际开工
    pub actual_end: Option<NaiveDate>,    // 实际完工
}

impl ProductionSchedule {
    pub fn empty() -> Self {
        Self {
            planned_start: None,
            planned_end: None,
            actual_start: None,
            actual_end: None,
        }
    }
}

// ==========================================
// ProductionOrder - 生产单
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionOrder {
    pub production_id: String,                 // 内部ID
    pub production_no: String,                 // 展示编号 (PR 前缀)
    pub order_id: String,                      // 来源订单(1:1)
    pub status: ProductionStatus,              // 生产状态
    pub schedule: ProductionSchedule,          // 排期块
    pub progress: u8,                          // 进度百分比 0-100
    pub material_readiness: MaterialReadiness, // 齐料状态
    pub logs: Vec<AuditEntry>,                 // 生产日志(只追加)
    pub created_by: ActorSnapshot,             // 创建人快照
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
