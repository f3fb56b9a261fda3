// ==========================================
// 销售协同系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体与封闭类型
// 红线: 不含数据访问逻辑,不含流转规则
// ==========================================

pub mod actor;
pub mod audit;
pub mod catalog;
pub mod order;
pub mod production;
pub mod project;
pub mod ticket;
pub mod types;

// 重导出核心类型
pub use actor::{Actor, ActorSnapshot};
pub use audit::{AuditEntry, AuditVisibility};
pub use catalog::{CatalogItem, PriceTier, PricingModel};
pub use order::{
    ApprovalInfo, FinancialInfo, OrderLineItem, PaymentInfo, PaymentRecord, ProjectSnapshot,
    SalesOrder, ShipmentRecord,
};
pub use production::{ProductionOrder, ProductionSchedule};
pub use project::{BomEntry, CommercialProject, TechnicalItem};
pub use ticket::{CustomerFeedback, FinalReport, ServiceTicket};
pub use types::{
    ApprovalStatus, EntityKind, FulfillmentStatus, MaterialReadiness, OrderStatus, PaymentStatus,
    ProductionStatus, ProjectStatus, Role, SequenceKind, TicketStatus,
};
