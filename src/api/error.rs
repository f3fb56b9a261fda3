// ==========================================
// 销售协同系统 - API层错误类型
// ==========================================
// 职责: 操作边界的结构化错误,聚合引擎/仓储错误
// 红线: 所有错误必须携带可解释原因; 错误返回前不得有部分变更落库
// ==========================================

use crate::engine::error::EngineError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ===== 资源错误 =====
    #[error("资源未找到: {entity}(id={id})")]
    NotFound { entity: String, id: String },

    #[error("来源记录已存在关联实体,不允许重复创建: source_id={source_id}")]
    DuplicateLink { source_id: String },

    #[error("无效输入: {0}")]
    InvalidInput(String),

    // ===== 业务规则错误(引擎判定) =====
    #[error(transparent)]
    Rule(#[from] EngineError),

    // ===== 存储错误 =====
    // 存储层意外失败一律不假定已提交
    #[error("存储层错误: {0}")]
    StorageError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// NotFound 便捷构造
    pub fn not_found(entity: &str, id: &str) -> Self {
        ApiError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    /// 是否为权限拒绝
    pub fn is_forbidden(&self) -> bool {
        matches!(self, ApiError::Rule(EngineError::Forbidden { .. }))
    }

    /// 是否为前置条件不满足
    pub fn is_precondition_failed(&self) -> bool {
        matches!(self, ApiError::Rule(EngineError::PreconditionFailed { .. }))
    }

    /// 是否为非法流转
    pub fn is_illegal_transition(&self) -> bool {
        matches!(self, ApiError::Rule(EngineError::IllegalTransition { .. }))
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => ApiError::NotFound { entity, id },
            other => ApiError::StorageError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
