// ==========================================
// 月度拜访计划分配系统 - 引擎层错误类型
// ==========================================
// 分类:
// - 致命: 仓储读写失败 → 中止整个批处理, 不重试
// - 可恢复: 缺少映射/配额、目标月无工作日 → 跳过该代表, 继续下一个
// ==========================================

use crate::repository::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AllocationError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("代表缺少映射 (user_id={user_id}): {reason}")]
    MissingMapping { user_id: String, reason: String },

    #[error("目标月份无工作日: {month}")]
    NoWorkingDays { month: String },

    #[error("日期计算失败: {0}")]
    DateError(String),
}

impl AllocationError {
    pub fn missing_mapping(user_id: &str, reason: impl Into<String>) -> Self {
        AllocationError::MissingMapping {
            user_id: user_id.to_string(),
            reason: reason.into(),
        }
    }

    /// 是否仅需跳过当前代表
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AllocationError::MissingMapping { .. } | AllocationError::NoWorkingDays { .. }
        )
    }
}

pub type AllocationResult<T> = Result<T, AllocationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        assert!(AllocationError::missing_mapping("U1", "无地理映射").is_recoverable());
        assert!(AllocationError::NoWorkingDays { month: "2026-11".to_string() }.is_recoverable());
        assert!(!AllocationError::Repository(RepositoryError::LockError("poisoned".to_string()))
            .is_recoverable());
        assert!(!AllocationError::DateError("overflow".to_string()).is_recoverable());
    }
}
