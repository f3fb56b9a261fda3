// ==========================================
// 销售协同系统 - 服务工单领域模型
// ==========================================
// 职责: 售后支持案例,独立于项目/订单链路的生命周期
// 红线: markAsResolved 前必须已有非空处理报告
// ==========================================

use crate::domain::actor::ActorSnapshot;
use crate::domain::audit::AuditEntry;
use crate::domain::types::TicketStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// FinalReport - 处理报告
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalReport {
    pub content: String,                // 报告正文
    pub root_cause: Option<String>,     // 根因
    pub actions_taken: Option<String>,  // 处理措施
    pub generated_by: ActorSnapshot,    // 出具人快照
    pub generated_at: DateTime<Utc>,    // 出具时间
}

impl FinalReport {
    /// 报告是否具备结案条件(正文非空)
    pub fn is_substantive(&self) -> bool {
        !self.content.trim().is_empty()
    }
}

// ==========================================
// CustomerFeedback - 客户反馈
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerFeedback {
    pub rating: u8,                 // 评分 1-5
    pub comment: Option<String>,    // 反馈意见
    pub submitted_at: DateTime<Utc>,
}

// ==========================================
// ServiceTicket - 服务工单
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceTicket {
    pub ticket_id: String,                    // 内部ID
    pub ticket_no: String,                    // 展示编号 (FW 前缀)
    pub order_id: Option<String>,             // 关联订单(可选)
    pub title: String,                        // 问题标题
    pub description: String,                  // 问题描述
    pub status: TicketStatus,                 // 工单状态
    pub created_by: ActorSnapshot,            // 创建人快照
    pub assigned_to: Option<ActorSnapshot>,   // 受理工程师快照
    pub closed_by: Option<ActorSnapshot>,     // 关闭人快照
    pub final_report: Option<FinalReport>,    // 处理报告
    pub customer_feedback: Option<CustomerFeedback>, // 客户反馈
    pub history: Vec<AuditEntry>,             // 操作历史(只追加)
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ServiceTicket {
    /// 是否已有可结案的处理报告
    pub fn has_substantive_report(&self) -> bool {
        self.final_report
            .as_ref()
            .map(|r| r.is_substantive())
            .unwrap_or(false)
    }
}
