// ==========================================
// 销售协同系统 - 操作历史领域模型
// ==========================================
// 红线: 历史条目只追加不修改,插入顺序即审计事实
// 用途: 审计追踪,状态流转留痕
// ==========================================

use crate::domain::actor::ActorSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

// ==========================================
// AuditVisibility - 条目可见范围
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditVisibility {
    Internal,        // 仅内部可见
    CustomerVisible, // 客户可见
}

impl fmt::Display for AuditVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditVisibility::Internal => write!(f, "INTERNAL"),
            AuditVisibility::CustomerVisible => write!(f, "CUSTOMER_VISIBLE"),
        }
    }
}

// ==========================================
// AuditEntry - 操作历史条目
// ==========================================
// 内嵌于各实体的 history 列表,随实体文档一起持久化
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub entry_id: String,            // 条目ID
    pub operation: String,           // 操作标签 (如 "CONFIRM_ORDER")
    pub actor: ActorSnapshot,        // 操作人快照
    pub occurred_at: DateTime<Utc>,  // 操作时间
    pub from_status: Option<String>, // 流转前状态
    pub to_status: Option<String>,   // 流转后状态
    pub description: String,         // 自由文本描述
    pub metadata: Option<JsonValue>, // 结构化附加信息
    pub visibility: AuditVisibility, // 可见范围
}

impl AuditEntry {
    /// 是否为状态流转条目
    pub fn is_transition(&self) -> bool {
        self.from_status.is_some() && self.to_status.is_some()
    }
}
