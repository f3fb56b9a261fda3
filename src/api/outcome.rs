// ==========================================
// 销售协同系统 - 跨实体联动结果
// ==========================================
// 职责: 主流转成功后,联动写入的结果单独上报
// 红线: 联动失败不回滚主流转,但必须显式暴露给调用方
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// PropagationOutcome - 联动写入结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropagationOutcome {
    /// 本次操作无联动
    NotRequired,
    /// 联动写入成功
    Applied { target: String },
    /// 主流转已生效,联动写入失败,需要调用方对账
    Failed { target: String, reason: String },
}

impl PropagationOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, PropagationOutcome::Failed { .. })
    }
}

// ==========================================
// TransitionOutcome - 主流转 + 联动 的组合结果
// ==========================================
#[derive(Debug, Clone)]
pub struct TransitionOutcome<T> {
    pub entity: T,                      // 主流转后的实体
    pub propagation: PropagationOutcome, // 联动结果
}

impl<T> TransitionOutcome<T> {
    /// 无联动的主流转结果
    pub fn standalone(entity: T) -> Self {
        Self {
            entity,
            propagation: PropagationOutcome::NotRequired,
        }
    }
}
