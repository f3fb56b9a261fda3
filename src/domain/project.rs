// ==========================================
// 销售协同系统 - 商机项目领域模型
// ==========================================
// 职责: 销售阶段记录,从初步接触到签约
// 红线: locked=true 后物料清单与定价相关字段不可再修改
// ==========================================

use crate::domain::actor::ActorSnapshot;
use crate::domain::audit::AuditEntry;
use crate::domain::types::ProjectStatus;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==========================================
// TechnicalItem - 技术方案条目
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicalItem {
    pub item_id: String,          // 目录产品ID
    pub name: String,             // 产品名称(写入时点快照)
    pub quantity: i64,            // 数量
    pub remark: Option<String>,   // 技术备注
}

// ==========================================
// BomEntry - 物料清单条目
// ==========================================
// 项目锁定后整体冻结
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BomEntry {
    pub material_code: String,       // 物料编码
    pub description: String,         // 物料描述
    pub quantity: i64,               // 用量
    pub unit_cost: Option<Decimal>,  // 单位成本(定价相关)
}

// ==========================================
// CommercialProject - 商机项目
// ==========================================
// 项目不做物理删除,只能以失单终止
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommercialProject {
    pub project_id: String,                  // 内部ID
    pub project_no: String,                  // 展示编号 (XM 前缀)
    pub client_name: String,                 // 客户名称
    pub project_name: String,                // 项目名称
    pub status: ProjectStatus,               // 销售阶段
    pub owner: ActorSnapshot,                // 归属销售
    pub technical_assignee: Option<ActorSnapshot>, // 技术支持
    pub technical_items: Vec<TechnicalItem>, // 技术方案条目
    pub technical_version: i32,              // 技术方案版本号(每次更新递增)
    pub bom_snapshot: Vec<BomEntry>,         // 物料清单快照
    pub lost_reason: Option<String>,         // 失单原因
    pub locked: bool,                        // 锁定标志
    pub locked_reason: Option<String>,       // 锁定原因
    pub locked_at: Option<DateTime<Utc>>,    // 锁定时间
    pub linked_order_id: Option<String>,     // 已转订单ID(1:1)
    pub operation_history: Vec<AuditEntry>,  // 操作历史(只追加)
    pub created_by: ActorSnapshot,           // 创建人快照
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CommercialProject {
    /// 是否允许修改物料清单与定价相关字段
    pub fn commercial_terms_mutable(&self) -> bool {
        !self.locked && !self.status.is_terminal()
    }
}
