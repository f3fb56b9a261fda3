// ==========================================
// 销售协同系统 - 操作人模型
// ==========================================
// 职责: 区分"在线身份"与"写入时点快照"
// 红线: 权限判定只依据在线身份,历史快照仅用于展示
// ==========================================

use crate::domain::types::Role;
use serde::{Deserialize, Serialize};

// ==========================================
// Actor - 在线身份
// ==========================================
// 由身份协作方在每次操作时提供
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,   // 账号ID
    pub name: String, // 显示名
    pub role: Role,   // 当前角色
}

impl Actor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
        }
    }

    /// 生成写入时点快照
    pub fn snapshot(&self) -> ActorSnapshot {
        ActorSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            role_label: self.role.label().to_string(),
        }
    }
}

// ==========================================
// ActorSnapshot - 写入时点快照
// ==========================================
// 冗余保存姓名与角色文案,账号后续变更或删除不影响历史可读性
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorSnapshot {
    pub id: String,         // 账号ID(弱引用,可用于回查)
    pub name: String,       // 写入时点显示名
    pub role_label: String, // 写入时点角色文案
}
