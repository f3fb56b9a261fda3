// ==========================================
// 销售协同系统 - 引擎层错误类型
// ==========================================
// 职责: 业务规则判定失败的结构化错误
// 红线: 所有错误必须携带可解释的具体原因
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    // ===== 价格解析错误 =====
    #[error("数量非法: quantity={quantity}, 必须大于 0")]
    InvalidQuantity { quantity: i64 },

    #[error("目录产品定价配置非法: item_id={item_id}, {message}")]
    InvalidCatalogItem { item_id: String, message: String },

    #[error("无适用价格档位: item_id={item_id}, quantity={quantity}")]
    NoApplicableTier { item_id: String, quantity: i64 },

    // ===== 财务规则错误 =====
    #[error("收款金额非法: {amount}, 必须大于 0")]
    InvalidPaymentAmount { amount: String },

    #[error("订单总额为负: {total}, 请调整折扣或运费")]
    NegativeTotal { total: String },

    // ===== 流转规则错误 =====
    #[error("非法状态流转: entity={entity}, from={from}, action={action}")]
    IllegalTransition {
        entity: String,
        from: String,
        action: String,
    },

    #[error("前置条件不满足: {condition}")]
    PreconditionFailed { condition: String },

    // ===== 权限错误 =====
    #[error("无权操作: {reason}")]
    Forbidden { reason: String },
}

impl EngineError {
    /// 前置条件错误的便捷构造
    pub fn precondition(condition: impl Into<String>) -> Self {
        EngineError::PreconditionFailed {
            condition: condition.into(),
        }
    }
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
