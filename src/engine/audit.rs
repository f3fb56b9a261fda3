// ==========================================
// 销售协同系统 - 操作历史记录器
// ==========================================
// 职责: 构建不可变的历史条目,交由控制器在写锁内追加
// 红线: 记录器只记录不判定,不产生业务错误
// ==========================================

use crate::domain::actor::Actor;
use crate::domain::audit::{AuditEntry, AuditVisibility};
use chrono::Utc;
use serde_json::Value as JsonValue;
use uuid::Uuid;

// ==========================================
// AuditRecorder - 历史条目构建器
// ==========================================
pub struct AuditRecorder;

impl AuditRecorder {
    /// 开始构建一条历史条目
    pub fn entry(
        operation: impl Into<String>,
        actor: &Actor,
        description: impl Into<String>,
    ) -> AuditEntryBuilder {
        AuditEntryBuilder {
            operation: operation.into(),
            actor: actor.clone(),
            description: description.into(),
            from_status: None,
            to_status: None,
            metadata: None,
            visibility: AuditVisibility::Internal,
        }
    }
}

// ==========================================
// AuditEntryBuilder
// ==========================================
pub struct AuditEntryBuilder {
    operation: String,
    actor: Actor,
    description: String,
    from_status: Option<String>,
    to_status: Option<String>,
    metadata: Option<JsonValue>,
    visibility: AuditVisibility,
}

impl AuditEntryBuilder {
    /// 设置流转前后状态
    pub fn with_transition(
        mut self,
        from: impl ToString,
        to: impl ToString,
    ) -> Self {
        self.from_status = Some(from.to_string());
        self.to_status = Some(to.to_string());
        self
    }

    /// 设置结构化附加信息
    pub fn with_metadata(mut self, metadata: JsonValue) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// 设置可见范围
    pub fn with_visibility(mut self, visibility: AuditVisibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// 生成条目(时间与操作人快照在此时点固化)
    pub fn build(self) -> AuditEntry {
        AuditEntry {
            entry_id: Uuid::new_v4().to_string(),
            operation: self.operation,
            actor: self.actor.snapshot(),
            occurred_at: Utc::now(),
            from_status: self.from_status,
            to_status: self.to_status,
            description: self.description,
            metadata: self.metadata,
            visibility: self.visibility,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Role;
    use serde_json::json;

    #[test]
    fn test_entry_captures_snapshot_and_transition() {
        let actor = Actor::new("u01", "李销售", Role::Sales);
        let entry = AuditRecorder::entry("CONFIRM_ORDER", &actor, "确认订单")
            .with_transition("PENDING", "CONFIRMED")
            .with_metadata(json!({"order_no": "SO20260310-001"}))
            .build();

        assert_eq!(entry.operation, "CONFIRM_ORDER");
        assert_eq!(entry.actor.name, "李销售");
        assert_eq!(entry.actor.role_label, "销售");
        assert!(entry.is_transition());
        assert_eq!(entry.from_status.as_deref(), Some("PENDING"));
        assert_eq!(entry.to_status.as_deref(), Some("CONFIRMED"));
        assert_eq!(entry.visibility, AuditVisibility::Internal);
    }

    #[test]
    fn test_plain_entry_is_not_transition() {
        let actor = Actor::new("u02", "赵售后", Role::AfterSales);
        let entry = AuditRecorder::entry("SAVE_REPORT", &actor, "保存处理报告").build();
        assert!(!entry.is_transition());
        assert!(entry.metadata.is_none());
    }
}
