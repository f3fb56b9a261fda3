// ==========================================
// 销售协同系统 - 引擎层
// ==========================================
// 职责: 业务规则引擎,纯判定与派生
// 红线: Engine 不拼 SQL, 所有拒绝必须输出具体原因
// ==========================================

pub mod audit;
pub mod authorization;
pub mod error;
pub mod ledger;
pub mod pricing;
pub mod workflow;

// 重导出核心引擎
pub use audit::{AuditEntryBuilder, AuditRecorder};
pub use authorization::{OwnedEntity, OwnershipPolicy};
pub use error::{EngineError, EngineResult};
pub use ledger::{FinancialLedger, Totals};
pub use pricing::PricingResolver;
pub use workflow::{
    order_transition, production_transition, project_transition, ticket_transition, OrderAction,
    ProductionAction, ProjectAction, TicketAction,
};
