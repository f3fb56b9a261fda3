// ==========================================
// 销售协同系统 - API 层
// ==========================================
// 职责: 实体生命周期控制器,聚合权限/流转/财务引擎与仓储
// 说明: 本层即对外稳定操作面,HTTP/CLI 等外层只做包装
// ==========================================

pub mod error;
pub mod order_api;
pub mod outcome;
pub mod production_api;
pub mod project_api;
pub mod repositories;
pub mod ticket_api;

// 重导出
pub use error::{ApiError, ApiResult};
pub use order_api::{CreateOrderInput, OrderApi, OrderLineInput, ShipOrderInput};
pub use outcome::{PropagationOutcome, TransitionOutcome};
pub use production_api::ProductionApi;
pub use project_api::{CreateProjectInput, ProjectApi};
pub use repositories::FlowRepositories;
pub use ticket_api::{CreateTicketInput, TicketApi};
