// ==========================================
// 工业装备销售协同系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 销售到交付流程引擎 (项目 → 订单 → 生产 → 售后)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 业务规则
pub mod engine;

// 数据仓储层 - 数据访问
pub mod repository;

// API 层 - 业务接口
pub mod api;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    ApprovalStatus, EntityKind, FulfillmentStatus, MaterialReadiness, OrderStatus, PaymentStatus,
    ProductionStatus, ProjectStatus, Role, SequenceKind, TicketStatus,
};

// 领域实体
pub use domain::{
    Actor, ActorSnapshot, AuditEntry, AuditVisibility, CatalogItem, CommercialProject,
    CustomerFeedback, FinalReport, PaymentRecord, PriceTier, PricingModel, ProductionOrder,
    SalesOrder, ServiceTicket, ShipmentRecord,
};

// 引擎
pub use engine::{
    AuditRecorder, EngineError, FinancialLedger, OwnedEntity, OwnershipPolicy, PricingResolver,
    Totals,
};

// API
pub use api::{
    ApiError, ApiResult, FlowRepositories, OrderApi, ProductionApi, ProjectApi, PropagationOutcome,
    TicketApi, TransitionOutcome,
};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "工业装备销售协同系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
