// ==========================================
// 销售协同系统 - 状态流转表
// ==========================================
// 职责: 每类实体一张封闭的 (当前状态, 动作) → 下一状态 流转表
// 红线: 表中无边即非法流转; 前置条件由控制器在落锁后校验
// ==========================================

use crate::domain::types::{OrderStatus, ProductionStatus, ProjectStatus, TicketStatus};

// ==========================================
// 项目动作 (Project Action)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectAction {
    AdvanceStage, // 推进销售阶段
    MarkLost,     // 失单
}

impl ProjectAction {
    /// 历史条目操作标签
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectAction::AdvanceStage => "ADVANCE_STAGE",
            ProjectAction::MarkLost => "MARK_LOST",
        }
    }
}

/// 项目状态流转表
///
/// 销售漏斗逐级推进; 失单可从任意非终态进入,且不可逆
pub fn project_transition(from: ProjectStatus, action: ProjectAction) -> Option<ProjectStatus> {
    match (from, action) {
        (ProjectStatus::InitialContact, ProjectAction::AdvanceStage) => {
            Some(ProjectStatus::RequirementConfirmed)
        }
        (ProjectStatus::RequirementConfirmed, ProjectAction::AdvanceStage) => {
            Some(ProjectStatus::Quoted)
        }
        (ProjectStatus::Quoted, ProjectAction::AdvanceStage) => Some(ProjectStatus::Negotiation),
        (ProjectStatus::Negotiation, ProjectAction::AdvanceStage) => Some(ProjectStatus::Won),
        (ProjectStatus::Won, ProjectAction::AdvanceStage) => None,
        (ProjectStatus::Lost, ProjectAction::AdvanceStage) => None,

        (ProjectStatus::Won, ProjectAction::MarkLost) => None, // 赢单后不再失单
        (ProjectStatus::Lost, ProjectAction::MarkLost) => None,
        (_, ProjectAction::MarkLost) => Some(ProjectStatus::Lost),
    }
}

// ==========================================
// 订单动作 (Order Action)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderAction {
    Confirm,         // 确认订单(需审批通过)
    StartProduction, // 进入生产(由生产单创建联动)
    PassQc,          // 质检通过(由生产侧联动)
    MarkReadyToShip, // 转待发货(需尾款确认)
    Ship,            // 发货(需运单号)
    Complete,        // 完成
    Cancel,          // 取消
}

impl OrderAction {
    /// 历史条目操作标签
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderAction::Confirm => "CONFIRM_ORDER",
            OrderAction::StartProduction => "START_PRODUCTION",
            OrderAction::PassQc => "QC_PASS",
            OrderAction::MarkReadyToShip => "MARK_READY_TO_SHIP",
            OrderAction::Ship => "SHIP_ORDER",
            OrderAction::Complete => "COMPLETE_ORDER",
            OrderAction::Cancel => "CANCEL_ORDER",
        }
    }
}

/// 订单状态流转表
pub fn order_transition(from: OrderStatus, action: OrderAction) -> Option<OrderStatus> {
    match (from, action) {
        (OrderStatus::Pending, OrderAction::Confirm) => Some(OrderStatus::Confirmed),
        (OrderStatus::Confirmed, OrderAction::StartProduction) => Some(OrderStatus::InProduction),
        (OrderStatus::InProduction, OrderAction::PassQc) => Some(OrderStatus::QcPassed),
        (OrderStatus::QcPassed, OrderAction::MarkReadyToShip) => Some(OrderStatus::ReadyToShip),
        (OrderStatus::ReadyToShip, OrderAction::Ship) => Some(OrderStatus::Shipped),
        (OrderStatus::Shipped, OrderAction::Complete) => Some(OrderStatus::Completed),
        (OrderStatus::Pending, OrderAction::Cancel) => Some(OrderStatus::Cancelled),
        (OrderStatus::Confirmed, OrderAction::Cancel) => Some(OrderStatus::Cancelled),
        _ => None,
    }
}

// ==========================================
// 生产单动作 (Production Action)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductionAction {
    Schedule,        // 排产
    Start,           // 开工
    SubmitQc,        // 报检
    PassQc,          // 质检通过
    MarkReadyToShip, // 转待发货(订单侧联动)
    MarkShipped,     // 发货(订单侧联动)
    Complete,        // 完成
    MarkDelayed,     // 标记延期
    Pause,           // 暂停
    Resume,          // 恢复生产
    Cancel,          // 取消
}

impl ProductionAction {
    /// 历史条目操作标签
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductionAction::Schedule => "SCHEDULE_PRODUCTION",
            ProductionAction::Start => "START_PRODUCTION",
            ProductionAction::SubmitQc => "SUBMIT_QC",
            ProductionAction::PassQc => "QC_PASS",
            ProductionAction::MarkReadyToShip => "MARK_READY_TO_SHIP",
            ProductionAction::MarkShipped => "MARK_SHIPPED",
            ProductionAction::Complete => "COMPLETE_PRODUCTION",
            ProductionAction::MarkDelayed => "MARK_DELAYED",
            ProductionAction::Pause => "PAUSE_PRODUCTION",
            ProductionAction::Resume => "RESUME_PRODUCTION",
            ProductionAction::Cancel => "CANCEL_PRODUCTION",
        }
    }
}

/// 生产单状态流转表
///
/// 主链: Pending → Scheduled → InProduction → AwaitingQc → QcPassed
///       → ReadyToShip → Shipped → Completed
/// 分支: Delayed / Paused 可恢复, Cancelled 为终态
pub fn production_transition(
    from: ProductionStatus,
    action: ProductionAction,
) -> Option<ProductionStatus> {
    match (from, action) {
        (ProductionStatus::Pending, ProductionAction::Schedule) => {
            Some(ProductionStatus::Scheduled)
        }
        (ProductionStatus::Scheduled, ProductionAction::Start) => {
            Some(ProductionStatus::InProduction)
        }
        (ProductionStatus::InProduction, ProductionAction::SubmitQc) => {
            Some(ProductionStatus::AwaitingQc)
        }
        (ProductionStatus::AwaitingQc, ProductionAction::PassQc) => {
            Some(ProductionStatus::QcPassed)
        }
        (ProductionStatus::QcPassed, ProductionAction::MarkReadyToShip) => {
            Some(ProductionStatus::ReadyToShip)
        }
        (ProductionStatus::ReadyToShip, ProductionAction::MarkShipped) => {
            Some(ProductionStatus::Shipped)
        }
        (ProductionStatus::Shipped, ProductionAction::Complete) => {
            Some(ProductionStatus::Completed)
        }

        // 延期: 排产后、生产中可标记
        (ProductionStatus::Scheduled, ProductionAction::MarkDelayed)
        | (ProductionStatus::InProduction, ProductionAction::MarkDelayed) => {
            Some(ProductionStatus::Delayed)
        }

        // 暂停与恢复
        (ProductionStatus::Scheduled, ProductionAction::Pause)
        | (ProductionStatus::InProduction, ProductionAction::Pause) => {
            Some(ProductionStatus::Paused)
        }
        (ProductionStatus::Paused, ProductionAction::Resume)
        | (ProductionStatus::Delayed, ProductionAction::Resume) => {
            Some(ProductionStatus::InProduction)
        }

        // 取消: 发货前的非终态均可
        (ProductionStatus::Pending, ProductionAction::Cancel)
        | (ProductionStatus::Scheduled, ProductionAction::Cancel)
        | (ProductionStatus::Delayed, ProductionAction::Cancel)
        | (ProductionStatus::Paused, ProductionAction::Cancel) => {
            Some(ProductionStatus::Cancelled)
        }

        _ => None,
    }
}

// ==========================================
// 工单动作 (Ticket Action)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketAction {
    Accept,       // 受理
    MarkResolved, // 标记已解决(需已有处理报告)
    Close,        // 关闭(售后经理确认)
    Reopen,       // 重新打开(需原因与说明)
    Cancel,       // 取消
}

impl TicketAction {
    /// 历史条目操作标签
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketAction::Accept => "ACCEPT_TICKET",
            TicketAction::MarkResolved => "MARK_RESOLVED",
            TicketAction::Close => "CLOSE_TICKET",
            TicketAction::Reopen => "REOPEN_TICKET",
            TicketAction::Cancel => "CANCEL_TICKET",
        }
    }
}

/// 工单状态流转表
pub fn ticket_transition(from: TicketStatus, action: TicketAction) -> Option<TicketStatus> {
    match (from, action) {
        (TicketStatus::PendingAcceptance, TicketAction::Accept) => Some(TicketStatus::InProgress),
        (TicketStatus::InProgress, TicketAction::MarkResolved) => {
            Some(TicketStatus::ResolvedPendingConfirm)
        }
        (TicketStatus::ResolvedPendingConfirm, TicketAction::Close) => Some(TicketStatus::Closed),
        (TicketStatus::ResolvedPendingConfirm, TicketAction::Reopen) => {
            Some(TicketStatus::InProgress)
        }
        (TicketStatus::PendingAcceptance, TicketAction::Cancel)
        | (TicketStatus::InProgress, TicketAction::Cancel) => Some(TicketStatus::Cancelled),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_funnel_advances_in_order() {
        let mut status = ProjectStatus::InitialContact;
        let expected = [
            ProjectStatus::RequirementConfirmed,
            ProjectStatus::Quoted,
            ProjectStatus::Negotiation,
            ProjectStatus::Won,
        ];
        for next in expected {
            status = project_transition(status, ProjectAction::AdvanceStage).unwrap();
            assert_eq!(status, next);
        }
        // 赢单后不可再推进
        assert!(project_transition(ProjectStatus::Won, ProjectAction::AdvanceStage).is_none());
    }

    #[test]
    fn test_project_lost_rules() {
        assert_eq!(
            project_transition(ProjectStatus::Negotiation, ProjectAction::MarkLost),
            Some(ProjectStatus::Lost)
        );
        // 赢单与失单均不可再失单
        assert!(project_transition(ProjectStatus::Won, ProjectAction::MarkLost).is_none());
        assert!(project_transition(ProjectStatus::Lost, ProjectAction::MarkLost).is_none());
    }

    #[test]
    fn test_order_main_chain() {
        assert_eq!(
            order_transition(OrderStatus::Pending, OrderAction::Confirm),
            Some(OrderStatus::Confirmed)
        );
        assert_eq!(
            order_transition(OrderStatus::Confirmed, OrderAction::StartProduction),
            Some(OrderStatus::InProduction)
        );
        assert_eq!(
            order_transition(OrderStatus::QcPassed, OrderAction::MarkReadyToShip),
            Some(OrderStatus::ReadyToShip)
        );
        assert_eq!(
            order_transition(OrderStatus::ReadyToShip, OrderAction::Ship),
            Some(OrderStatus::Shipped)
        );
    }

    #[test]
    fn test_order_illegal_edges() {
        // 未确认直接发货、已发货再取消等均无边
        assert!(order_transition(OrderStatus::Pending, OrderAction::Ship).is_none());
        assert!(order_transition(OrderStatus::Shipped, OrderAction::Cancel).is_none());
        assert!(order_transition(OrderStatus::Cancelled, OrderAction::Confirm).is_none());
        // 质检未通过不能转待发货
        assert!(order_transition(OrderStatus::InProduction, OrderAction::MarkReadyToShip).is_none());
    }

    #[test]
    fn test_production_branches() {
        assert_eq!(
            production_transition(ProductionStatus::InProduction, ProductionAction::Pause),
            Some(ProductionStatus::Paused)
        );
        assert_eq!(
            production_transition(ProductionStatus::Paused, ProductionAction::Resume),
            Some(ProductionStatus::InProduction)
        );
        assert_eq!(
            production_transition(ProductionStatus::Delayed, ProductionAction::Resume),
            Some(ProductionStatus::InProduction)
        );
        // 已发货不可取消
        assert!(
            production_transition(ProductionStatus::Shipped, ProductionAction::Cancel).is_none()
        );
        // 未报检不可质检通过
        assert!(
            production_transition(ProductionStatus::InProduction, ProductionAction::PassQc)
                .is_none()
        );
    }

    #[test]
    fn test_ticket_lifecycle_edges() {
        assert_eq!(
            ticket_transition(TicketStatus::PendingAcceptance, TicketAction::Accept),
            Some(TicketStatus::InProgress)
        );
        assert_eq!(
            ticket_transition(TicketStatus::InProgress, TicketAction::MarkResolved),
            Some(TicketStatus::ResolvedPendingConfirm)
        );
        assert_eq!(
            ticket_transition(TicketStatus::ResolvedPendingConfirm, TicketAction::Close),
            Some(TicketStatus::Closed)
        );
        assert_eq!(
            ticket_transition(TicketStatus::ResolvedPendingConfirm, TicketAction::Reopen),
            Some(TicketStatus::InProgress)
        );
        // 终态无出边
        for action in [
            TicketAction::Accept,
            TicketAction::MarkResolved,
            TicketAction::Close,
            TicketAction::Reopen,
            TicketAction::Cancel,
        ] {
            assert!(ticket_transition(TicketStatus::Closed, action).is_none());
            assert!(ticket_transition(TicketStatus::Cancelled, action).is_none());
        }
    }
}
