// ==========================================
// 销售协同系统 - 领域类型定义
// ==========================================
// 职责: 定义封闭的状态/角色枚举,所有流转判定基于这些类型
// 红线: 状态只能通过流转表变更,不允许字符串散写
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 角色 (Role)
// ==========================================
// 权限判定的唯一角色依据,历史快照中的角色仅用于展示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Sales,             // 销售
    SalesManager,      // 销售经理
    TechnicalSupport,  // 技术支持
    Commercial,        // 商务
    Production,        // 生产
    ProductionManager, // 生产经理
    Procurement,       // 采购
    Logistics,         // 物流
    AfterSales,        // 售后
    AfterSalesManager, // 售后经理
    Admin,             // 管理员
}

impl Role {
    /// 中文显示名
    pub fn label(&self) -> &'static str {
        match self {
            Role::Sales => "销售",
            Role::SalesManager => "销售经理",
            Role::TechnicalSupport => "技术支持",
            Role::Commercial => "商务",
            Role::Production => "生产",
            Role::ProductionManager => "生产经理",
            Role::Procurement => "采购",
            Role::Logistics => "物流",
            Role::AfterSales => "售后",
            Role::AfterSalesManager => "售后经理",
            Role::Admin => "管理员",
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Role::Sales => "SALES",
            Role::SalesManager => "SALES_MANAGER",
            Role::TechnicalSupport => "TECHNICAL_SUPPORT",
            Role::Commercial => "COMMERCIAL",
            Role::Production => "PRODUCTION",
            Role::ProductionManager => "PRODUCTION_MANAGER",
            Role::Procurement => "PROCUREMENT",
            Role::Logistics => "LOGISTICS",
            Role::AfterSales => "AFTER_SALES",
            Role::AfterSalesManager => "AFTER_SALES_MANAGER",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 项目状态 (Project Status)
// ==========================================
// 销售漏斗阶段,有序推进; 失单为终态
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    InitialContact,       // 初步接触
    RequirementConfirmed, // 需求确认
    Quoted,               // 方案报价
    Negotiation,          // 商务谈判
    Won,                  // 赢单
    Lost,                 // 失单(终态)
}

impl ProjectStatus {
    /// 中文显示名
    pub fn label(&self) -> &'static str {
        match self {
            ProjectStatus::InitialContact => "初步接触",
            ProjectStatus::RequirementConfirmed => "需求确认",
            ProjectStatus::Quoted => "方案报价",
            ProjectStatus::Negotiation => "商务谈判",
            ProjectStatus::Won => "赢单",
            ProjectStatus::Lost => "失单",
        }
    }

    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProjectStatus::Lost)
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ProjectStatus::InitialContact => "INITIAL_CONTACT",
            ProjectStatus::RequirementConfirmed => "REQUIREMENT_CONFIRMED",
            ProjectStatus::Quoted => "QUOTED",
            ProjectStatus::Negotiation => "NEGOTIATION",
            ProjectStatus::Won => "WON",
            ProjectStatus::Lost => "LOST",
        }
    }

    /// 从字符串解析
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "INITIAL_CONTACT" => Some(ProjectStatus::InitialContact),
            "REQUIREMENT_CONFIRMED" => Some(ProjectStatus::RequirementConfirmed),
            "QUOTED" => Some(ProjectStatus::Quoted),
            "NEGOTIATION" => Some(ProjectStatus::Negotiation),
            "WON" => Some(ProjectStatus::Won),
            "LOST" => Some(ProjectStatus::Lost),
            _ => None,
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 订单状态 (Order Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,      // 待确认
    Confirmed,    // 已确认
    InProduction, // 生产中
    QcPassed,     // 质检通过
    ReadyToShip,  // 待发货
    Shipped,      // 已发货
    Completed,    // 已完成
    Cancelled,    // 已取消
}

impl OrderStatus {
    /// 中文显示名
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "待确认",
            OrderStatus::Confirmed => "已确认",
            OrderStatus::InProduction => "生产中",
            OrderStatus::QcPassed => "质检通过",
            OrderStatus::ReadyToShip => "待发货",
            OrderStatus::Shipped => "已发货",
            OrderStatus::Completed => "已完成",
            OrderStatus::Cancelled => "已取消",
        }
    }

    /// 是否允许删除订单
    pub fn deletable(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Cancelled)
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::InProduction => "IN_PRODUCTION",
            OrderStatus::QcPassed => "QC_PASSED",
            OrderStatus::ReadyToShip => "READY_TO_SHIP",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    /// 从字符串解析
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PENDING" => Some(OrderStatus::Pending),
            "CONFIRMED" => Some(OrderStatus::Confirmed),
            "IN_PRODUCTION" => Some(OrderStatus::InProduction),
            "QC_PASSED" => Some(OrderStatus::QcPassed),
            "READY_TO_SHIP" => Some(OrderStatus::ReadyToShip),
            "SHIPPED" => Some(OrderStatus::Shipped),
            "COMPLETED" => Some(OrderStatus::Completed),
            "CANCELLED" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 生产单状态 (Production Status)
// ==========================================
// 主链部分随订单事件推进,Delayed/Paused/Cancelled 为分支状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductionStatus {
    Pending,      // 待排产
    Scheduled,    // 已排产
    InProduction, // 生产中
    AwaitingQc,   // 待质检
    QcPassed,     // 质检通过
    ReadyToShip,  // 待发货
    Shipped,      // 已发货
    Completed,    // 已完成
    Delayed,      // 延期
    Paused,       // 暂停
    Cancelled,    // 已取消
}

impl ProductionStatus {
    /// 中文显示名
    pub fn label(&self) -> &'static str {
        match self {
            ProductionStatus::Pending => "待排产",
            ProductionStatus::Scheduled => "已排产",
            ProductionStatus::InProduction => "生产中",
            ProductionStatus::AwaitingQc => "待质检",
            ProductionStatus::QcPassed => "质检通过",
            ProductionStatus::ReadyToShip => "待发货",
            ProductionStatus::Shipped => "已发货",
            ProductionStatus::Completed => "已完成",
            ProductionStatus::Delayed => "延期",
            ProductionStatus::Paused => "暂停",
            ProductionStatus::Cancelled => "已取消",
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ProductionStatus::Pending => "PENDING",
            ProductionStatus::Scheduled => "SCHEDULED",
            ProductionStatus::InProduction => "IN_PRODUCTION",
            ProductionStatus::AwaitingQc => "AWAITING_QC",
            ProductionStatus::QcPassed => "QC_PASSED",
            ProductionStatus::ReadyToShip => "READY_TO_SHIP",
            ProductionStatus::Shipped => "SHIPPED",
            ProductionStatus::Completed => "COMPLETED",
            ProductionStatus::Delayed => "DELAYED",
            ProductionStatus::Paused => "PAUSED",
            ProductionStatus::Cancelled => "CANCELLED",
        }
    }

    /// 从字符串解析
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PENDING" => Some(ProductionStatus::Pending),
            "SCHEDULED" => Some(ProductionStatus::Scheduled),
            "IN_PRODUCTION" => Some(ProductionStatus::InProduction),
            "AWAITING_QC" => Some(ProductionStatus::AwaitingQc),
            "QC_PASSED" => Some(ProductionStatus::QcPassed),
            "READY_TO_SHIP" => Some(ProductionStatus::ReadyToShip),
            "SHIPPED" => Some(ProductionStatus::Shipped),
            "COMPLETED" => Some(ProductionStatus::Completed),
            "DELAYED" => Some(ProductionStatus::Delayed),
            "PAUSED" => Some(ProductionStatus::Paused),
            "CANCELLED" => Some(ProductionStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for ProductionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 服务工单状态 (Ticket Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    PendingAcceptance,      // 待技术受理
    InProgress,             // 技术处理中
    ResolvedPendingConfirm, // 问题已解决-待确认
    Closed,                 // 已关闭(终态)
    Cancelled,              // 已取消(终态)
}

impl TicketStatus {
    /// 中文显示名
    pub fn label(&self) -> &'static str {
        match self {
            TicketStatus::PendingAcceptance => "待技术受理",
            TicketStatus::InProgress => "技术处理中",
            TicketStatus::ResolvedPendingConfirm => "问题已解决-待确认",
            TicketStatus::Closed => "已关闭",
            TicketStatus::Cancelled => "已取消",
        }
    }

    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, TicketStatus::Closed | TicketStatus::Cancelled)
    }

    /// 是否允许删除工单
    pub fn deletable(&self) -> bool {
        matches!(
            self,
            TicketStatus::PendingAcceptance | TicketStatus::Cancelled
        )
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            TicketStatus::PendingAcceptance => "PENDING_ACCEPTANCE",
            TicketStatus::InProgress => "IN_PROGRESS",
            TicketStatus::ResolvedPendingConfirm => "RESOLVED_PENDING_CONFIRM",
            TicketStatus::Closed => "CLOSED",
            TicketStatus::Cancelled => "CANCELLED",
        }
    }

    /// 从字符串解析
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PENDING_ACCEPTANCE" => Some(TicketStatus::PendingAcceptance),
            "IN_PROGRESS" => Some(TicketStatus::InProgress),
            "RESOLVED_PENDING_CONFIRM" => Some(TicketStatus::ResolvedPendingConfirm),
            "CLOSED" => Some(TicketStatus::Closed),
            "CANCELLED" => Some(TicketStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 收款状态 (Payment Status)
// ==========================================
// 派生状态: 唯一事实来源是 payment_records 累计金额,不允许独立设置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending, // 未收款
    Partial, // 部分收款
    Paid,    // 已收款
}

impl PaymentStatus {
    /// 中文显示名
    pub fn label(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "未收款",
            PaymentStatus::Partial => "部分收款",
            PaymentStatus::Paid => "已收款",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "PENDING"),
            PaymentStatus::Partial => write!(f, "PARTIAL"),
            PaymentStatus::Paid => write!(f, "PAID"),
        }
    }
}

// ==========================================
// 审批状态 (Approval Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    Pending,  // 待审批
    Approved, // 已批准
    Rejected, // 已驳回
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApprovalStatus::Pending => write!(f, "PENDING"),
            ApprovalStatus::Approved => write!(f, "APPROVED"),
            ApprovalStatus::Rejected => write!(f, "REJECTED"),
        }
    }
}

// ==========================================
// 行项目履约状态 (Line Fulfillment Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FulfillmentStatus {
    Pending,      // 待生产
    InProduction, // 生产中
    Shipped,      // 已发货
}

impl fmt::Display for FulfillmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FulfillmentStatus::Pending => write!(f, "PENDING"),
            FulfillmentStatus::InProduction => write!(f, "IN_PRODUCTION"),
            FulfillmentStatus::Shipped => write!(f, "SHIPPED"),
        }
    }
}

// ==========================================
// 齐料状态 (Material Readiness)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaterialReadiness {
    NotReady, // 未齐料
    Partial,  // 部分齐料
    Ready,    // 已齐料
}

impl MaterialReadiness {
    /// 中文显示名
    pub fn label(&self) -> &'static str {
        match self {
            MaterialReadiness::NotReady => "未齐料",
            MaterialReadiness::Partial => "部分齐料",
            MaterialReadiness::Ready => "已齐料",
        }
    }
}

impl fmt::Display for MaterialReadiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaterialReadiness::NotReady => write!(f, "NOT_READY"),
            MaterialReadiness::Partial => write!(f, "PARTIAL"),
            MaterialReadiness::Ready => write!(f, "READY"),
        }
    }
}

// ==========================================
// 实体类别 (Entity Kind)
// ==========================================
// 用于权限域判定与单记录写锁的键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    Project,         // 商机项目
    SalesOrder,      // 销售订单
    ProductionOrder, // 生产单
    ServiceTicket,   // 服务工单
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Project => write!(f, "PROJECT"),
            EntityKind::SalesOrder => write!(f, "SALES_ORDER"),
            EntityKind::ProductionOrder => write!(f, "PRODUCTION_ORDER"),
            EntityKind::ServiceTicket => write!(f, "SERVICE_TICKET"),
        }
    }
}

// ==========================================
// 编号序列类别 (Sequence Kind)
// ==========================================
// 展示编号前缀: 项目 XM / 订单 SO / 生产单 PR / 工单 FW / 发运批次 SH
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequenceKind {
    Project,
    SalesOrder,
    ProductionOrder,
    ServiceTicket,
    Shipment,
}

impl SequenceKind {
    /// 展示编号前缀
    pub fn prefix(&self) -> &'static str {
        match self {
            SequenceKind::Project => "XM",
            SequenceKind::SalesOrder => "SO",
            SequenceKind::ProductionOrder => "PR",
            SequenceKind::ServiceTicket => "FW",
            SequenceKind::Shipment => "SH",
        }
    }

    /// 序列键(sequence 表主键的一部分)
    pub fn key(&self) -> &'static str {
        match self {
            SequenceKind::Project => "PROJECT",
            SequenceKind::SalesOrder => "SALES_ORDER",
            SequenceKind::ProductionOrder => "PRODUCTION_ORDER",
            SequenceKind::ServiceTicket => "SERVICE_TICKET",
            SequenceKind::Shipment => "SHIPMENT",
        }
    }
}
