// ==========================================
// 销售协同系统 - 服务工单 API
// ==========================================
// 职责: 售后工单创建、受理、处理报告、结案与重开
// 红线: 无处理报告不得标记已解决; 重开必须同时给出原因与说明
// ==========================================

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::api::repositories::FlowRepositories;
use crate::domain::ticket::{CustomerFeedback, FinalReport, ServiceTicket};
use crate::domain::types::{EntityKind, Role, SequenceKind, TicketStatus};
use crate::domain::Actor;
use crate::engine::audit::AuditRecorder;
use crate::engine::authorization::OwnershipPolicy;
use crate::engine::error::EngineError;
use crate::engine::workflow::{ticket_transition, TicketAction};

// ==========================================
// CreateTicketInput
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTicketInput {
    pub order_id: Option<String>, // 关联订单(可选)
    pub title: String,
    pub description: String,
}

/// 可受理工单的角色(无受理人时)
fn eligible_acceptor(role: Role) -> bool {
    matches!(
        role,
        Role::AfterSales | Role::TechnicalSupport | Role::AfterSalesManager
    )
}

// ==========================================
// TicketApi - 服务工单 API
// ==========================================
pub struct TicketApi {
    repos: FlowRepositories,
}

impl TicketApi {
    pub fn new(repos: FlowRepositories) -> Self {
        Self { repos }
    }

    // ==========================================
    // 查询接口
    // ==========================================

    /// 按ID查询工单
    pub async fn get_ticket(&self, ticket_id: &str) -> ApiResult<ServiceTicket> {
        self.fetch(ticket_id)
    }

    /// 分页列表(可按状态过滤)
    pub async fn list_tickets(
        &self,
        status: Option<TicketStatus>,
        limit: i64,
        offset: i64,
    ) -> ApiResult<Vec<ServiceTicket>> {
        Ok(self
            .repos
            .ticket_repo
            .list(status.map(|s| s.to_db_str()), limit, offset)?)
    }

    /// 查询某订单下全部工单
    pub async fn list_tickets_by_order(&self, order_id: &str) -> ApiResult<Vec<ServiceTicket>> {
        Ok(self.repos.ticket_repo.find_by_order(order_id)?)
    }

    /// 按状态分组统计
    pub async fn ticket_statistics(&self) -> ApiResult<Vec<(String, i64)>> {
        Ok(self.repos.ticket_repo.count_by_status()?)
    }

    // ==========================================
    // 写入接口
    // ==========================================

    /// 创建工单(售后发起,可独立或挂靠订单)
    pub async fn create_ticket(
        &self,
        actor: &Actor,
        input: CreateTicketInput,
    ) -> ApiResult<ServiceTicket> {
        if !matches!(
            actor.role,
            Role::AfterSales | Role::AfterSalesManager | Role::TechnicalSupport | Role::Admin
        ) {
            return Err(EngineError::Forbidden {
                reason: "仅售后相关角色可创建工单".to_string(),
            }
            .into());
        }
        if input.title.trim().is_empty() {
            return Err(ApiError::InvalidInput("工单标题不能为空".to_string()));
        }
        // 挂靠订单时校验订单存在
        if let Some(order_id) = &input.order_id {
            self.repos
                .order_repo
                .find_by_id(order_id)?
                .ok_or_else(|| ApiError::not_found("SalesOrder", order_id))?;
        }

        let now = Utc::now();
        let ticket_no = self
            .repos
            .sequence_repo
            .next_number(SequenceKind::ServiceTicket, now.date_naive())?;

        let mut ticket = ServiceTicket {
            ticket_id: Uuid::new_v4().to_string(),
            ticket_no: ticket_no.clone(),
            order_id: input.order_id,
            title: input.title,
            description: input.description,
            status: TicketStatus::PendingAcceptance,
            created_by: actor.snapshot(),
            assigned_to: None,
            closed_by: None,
            final_report: None,
            customer_feedback: None,
            history: vec![],
            created_at: now,
            updated_at: now,
        };
        ticket.history.push(
            AuditRecorder::entry("CREATE_TICKET", actor, "创建服务工单")
                .with_metadata(json!({ "ticket_no": ticket_no }))
                .build(),
        );
        self.repos.ticket_repo.insert(&ticket)?;
        info!(ticket_no = %ticket.ticket_no, actor = %actor.id, "服务工单已创建");
        Ok(ticket)
    }

    /// 指派受理工程师(售后经理调度)
    pub async fn assign_engineer(
        &self,
        actor: &Actor,
        ticket_id: &str,
        engineer: &Actor,
    ) -> ApiResult<ServiceTicket> {
        if !matches!(actor.role, Role::AfterSalesManager | Role::Admin) {
            return Err(EngineError::Forbidden {
                reason: "仅售后经理可指派工程师".to_string(),
            }
            .into());
        }
        if !eligible_acceptor(engineer.role) {
            return Err(ApiError::InvalidInput(
                "被指派人必须是售后或技术支持角色".to_string(),
            ));
        }

        let _guard = self
            .repos
            .locks
            .acquire(EntityKind::ServiceTicket, ticket_id)
            .await;

        let mut ticket = self.fetch(ticket_id)?;
        if ticket.status.is_terminal() {
            return Err(EngineError::precondition("终态工单不可再指派").into());
        }

        ticket.assigned_to = Some(engineer.snapshot());
        ticket.updated_at = Utc::now();
        ticket.history.push(
            AuditRecorder::entry("ASSIGN_ENGINEER", actor, "指派受理工程师")
                .with_metadata(json!({ "engineer_id": engineer.id, "engineer_name": engineer.name }))
                .build(),
        );
        self.repos.ticket_repo.update(&ticket)?;
        Ok(ticket)
    }

    /// 受理工单
    ///
    /// 前置条件: 操作人是已指派的工程师; 或工单尚无受理人且操作人持有
    /// 可受理角色(此时自动指派给操作人)。
    pub async fn accept_ticket(&self, actor: &Actor, ticket_id: &str) -> ApiResult<ServiceTicket> {
        let _guard = self
            .repos
            .locks
            .acquire(EntityKind::ServiceTicket, ticket_id)
            .await;

        let mut ticket = self.fetch(ticket_id)?;

        let to = self.require_edge(&ticket, TicketAction::Accept)?;
        match &ticket.assigned_to {
            Some(assignee) => {
                if assignee.id != actor.id && actor.role != Role::Admin {
                    return Err(EngineError::precondition("工单已指派给其他工程师").into());
                }
            }
            None => {
                if !eligible_acceptor(actor.role) && actor.role != Role::Admin {
                    return Err(EngineError::Forbidden {
                        reason: "当前角色不可受理工单".to_string(),
                    }
                    .into());
                }
                // 无受理人时受理即自动指派
                ticket.assigned_to = Some(actor.snapshot());
            }
        }

        let from = ticket.status;
        ticket.status = to;
        ticket.updated_at = Utc::now();
        ticket.history.push(
            AuditRecorder::entry(TicketAction::Accept.as_str(), actor, "受理工单")
                .with_transition(from, to)
                .build(),
        );
        self.repos.ticket_repo.update(&ticket)?;
        info!(ticket_no = %ticket.ticket_no, engineer = %actor.id, "工单已受理");
        Ok(ticket)
    }

    /// 保存处理报告(处理中可反复修订)
    pub async fn save_final_report(
        &self,
        actor: &Actor,
        ticket_id: &str,
        content: &str,
        root_cause: Option<String>,
        actions_taken: Option<String>,
    ) -> ApiResult<ServiceTicket> {
        let _guard = self
            .repos
            .locks
            .acquire(EntityKind::ServiceTicket, ticket_id)
            .await;

        let mut ticket = self.fetch(ticket_id)?;
        OwnershipPolicy::authorize(actor, &ticket).map_err(ApiError::from)?;

        if ticket.status != TicketStatus::InProgress {
            return Err(EngineError::precondition("仅处理中的工单可保存报告").into());
        }
        if content.trim().is_empty() {
            return Err(ApiError::InvalidInput("报告正文不能为空".to_string()));
        }

        ticket.final_report = Some(FinalReport {
            content: content.to_string(),
            root_cause,
            actions_taken,
            generated_by: actor.snapshot(),
            generated_at: Utc::now(),
        });
        ticket.updated_at = Utc::now();
        ticket.history.push(
            AuditRecorder::entry("SAVE_REPORT", actor, "保存处理报告").build(),
        );
        self.repos.ticket_repo.update(&ticket)?;
        Ok(ticket)
    }

    /// 标记已解决(硬前置条件: 已有非空处理报告)
    pub async fn mark_resolved(&self, actor: &Actor, ticket_id: &str) -> ApiResult<ServiceTicket> {
        let _guard = self
            .repos
            .locks
            .acquire(EntityKind::ServiceTicket, ticket_id)
            .await;

        let mut ticket = self.fetch(ticket_id)?;
        OwnershipPolicy::authorize(actor, &ticket).map_err(ApiError::from)?;

        let to = self.require_edge(&ticket, TicketAction::MarkResolved)?;
        if !ticket.has_substantive_report() {
            return Err(EngineError::precondition("处理报告缺失,不可标记已解决").into());
        }

        let from = ticket.status;
        ticket.status = to;
        ticket.updated_at = Utc::now();
        ticket.history.push(
            AuditRecorder::entry(TicketAction::MarkResolved.as_str(), actor, "标记问题已解决")
                .with_transition(from, to)
                .build(),
        );
        self.repos.ticket_repo.update(&ticket)?;
        info!(ticket_no = %ticket.ticket_no, "工单已标记解决,待确认");
        Ok(ticket)
    }

    /// 关闭工单(仅售后经理确认,终态)
    pub async fn close_ticket(&self, actor: &Actor, ticket_id: &str) -> ApiResult<ServiceTicket> {
        if !matches!(actor.role, Role::AfterSalesManager | Role::Admin) {
            return Err(EngineError::Forbidden {
                reason: "仅售后经理可确认关闭工单".to_string(),
            }
            .into());
        }

        let _guard = self
            .repos
            .locks
            .acquire(EntityKind::ServiceTicket, ticket_id)
            .await;

        let mut ticket = self.fetch(ticket_id)?;
        let to = self.require_edge(&ticket, TicketAction::Close)?;

        let from = ticket.status;
        ticket.status = to;
        ticket.closed_by = Some(actor.snapshot());
        ticket.updated_at = Utc::now();
        ticket.history.push(
            AuditRecorder::entry(TicketAction::Close.as_str(), actor, "确认关闭工单")
                .with_transition(from, to)
                .build(),
        );
        self.repos.ticket_repo.update(&ticket)?;
        info!(ticket_no = %ticket.ticket_no, "工单已关闭");
        Ok(ticket)
    }

    /// 重新打开(必须同时给出原因与说明,一并写入历史元数据)
    pub async fn reopen_ticket(
        &self,
        actor: &Actor,
        ticket_id: &str,
        reason: &str,
        comments: &str,
    ) -> ApiResult<ServiceTicket> {
        let _guard = self
            .repos
            .locks
            .acquire(EntityKind::ServiceTicket, ticket_id)
            .await;

        let mut ticket = self.fetch(ticket_id)?;
        OwnershipPolicy::authorize(actor, &ticket).map_err(ApiError::from)?;

        let to = self.require_edge(&ticket, TicketAction::Reopen)?;
        if reason.trim().is_empty() || comments.trim().is_empty() {
            return Err(EngineError::precondition("重开工单必须同时填写原因与说明").into());
        }

        let from = ticket.status;
        ticket.status = to;
        ticket.updated_at = Utc::now();
        ticket.history.push(
            AuditRecorder::entry(TicketAction::Reopen.as_str(), actor, "重新打开工单")
                .with_transition(from, to)
                .with_metadata(json!({ "reason": reason, "comments": comments }))
                .build(),
        );
        self.repos.ticket_repo.update(&ticket)?;
        warn!(ticket_no = %ticket.ticket_no, reason = %reason, "工单已重开");
        Ok(ticket)
    }

    /// 登记客户反馈(解决待确认或已关闭后)
    pub async fn record_customer_feedback(
        &self,
        actor: &Actor,
        ticket_id: &str,
        rating: u8,
        comment: Option<String>,
    ) -> ApiResult<ServiceTicket> {
        if !(1..=5).contains(&rating) {
            return Err(ApiError::InvalidInput("评分必须在 1-5 之间".to_string()));
        }

        let _guard = self
            .repos
            .locks
            .acquire(EntityKind::ServiceTicket, ticket_id)
            .await;

        let mut ticket = self.fetch(ticket_id)?;
        OwnershipPolicy::authorize(actor, &ticket).map_err(ApiError::from)?;

        if !matches!(
            ticket.status,
            TicketStatus::ResolvedPendingConfirm | TicketStatus::Closed
        ) {
            return Err(EngineError::precondition("问题解决前不可登记客户反馈").into());
        }

        ticket.customer_feedback = Some(CustomerFeedback {
            rating,
            comment: comment.clone(),
            submitted_at: Utc::now(),
        });
        ticket.updated_at = Utc::now();
        ticket.history.push(
            AuditRecorder::entry("CUSTOMER_FEEDBACK", actor, "登记客户反馈")
                .with_metadata(json!({ "rating": rating, "comment": comment }))
                .build(),
        );
        self.repos.ticket_repo.update(&ticket)?;
        Ok(ticket)
    }

    /// 取消工单
    pub async fn cancel_ticket(
        &self,
        actor: &Actor,
        ticket_id: &str,
        reason: &str,
    ) -> ApiResult<ServiceTicket> {
        let _guard = self
            .repos
            .locks
            .acquire(EntityKind::ServiceTicket, ticket_id)
            .await;

        let mut ticket = self.fetch(ticket_id)?;
        OwnershipPolicy::authorize(actor, &ticket).map_err(ApiError::from)?;

        let to = self.require_edge(&ticket, TicketAction::Cancel)?;
        if reason.trim().is_empty() {
            return Err(EngineError::precondition("取消工单必须填写原因").into());
        }

        let from = ticket.status;
        ticket.status = to;
        ticket.updated_at = Utc::now();
        ticket.history.push(
            AuditRecorder::entry(TicketAction::Cancel.as_str(), actor, "取消工单")
                .with_transition(from, to)
                .with_metadata(json!({ "reason": reason }))
                .build(),
        );
        self.repos.ticket_repo.update(&ticket)?;
        Ok(ticket)
    }

    /// 删除工单(仅限待受理或已取消状态)
    pub async fn delete_ticket(&self, actor: &Actor, ticket_id: &str) -> ApiResult<()> {
        let _guard = self
            .repos
            .locks
            .acquire(EntityKind::ServiceTicket, ticket_id)
            .await;

        let ticket = self.fetch(ticket_id)?;
        OwnershipPolicy::authorize(actor, &ticket).map_err(ApiError::from)?;

        if !ticket.status.deletable() {
            return Err(EngineError::precondition(format!(
                "当前状态不允许删除工单: {}",
                ticket.status.label()
            ))
            .into());
        }

        self.repos.ticket_repo.delete(ticket_id)?;
        warn!(ticket_no = %ticket.ticket_no, actor = %actor.id, "工单已删除");
        Ok(())
    }

    // ==========================================
    // 内部工具
    // ==========================================

    /// 查流转表,无边即非法流转
    fn require_edge(&self, ticket: &ServiceTicket, action: TicketAction) -> ApiResult<TicketStatus> {
        ticket_transition(ticket.status, action).ok_or_else(|| {
            EngineError::IllegalTransition {
                entity: EntityKind::ServiceTicket.to_string(),
                from: ticket.status.to_string(),
                action: action.as_str().to_string(),
            }
            .into()
        })
    }

    fn fetch(&self, ticket_id: &str) -> ApiResult<ServiceTicket> {
        self.repos
            .ticket_repo
            .find_by_id(ticket_id)?
            .ok_or_else(|| ApiError::not_found("ServiceTicket", ticket_id))
    }
}
