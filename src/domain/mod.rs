// ==========================================
// 月度拜访计划分配系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod account;
pub mod calendar;
pub mod representative;
pub mod types;
pub mod visit;

// 重导出核心类型
pub use account::Account;
pub use calendar::TargetMonth;
pub use representative::{ComplianceQuota, Representative};
pub use types::{ApprovalStatus, CustomerType, PlanStatus, TaskType, UserRole};
pub use visit::{
    AccountSlot, RouteSlot, RouteVisit, VisitHeader, VisitTask, PLACEHOLDER_NAME,
    PLACEHOLDER_SUBJECT,
};
