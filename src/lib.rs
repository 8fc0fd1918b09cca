// ==========================================
// 月度拜访计划分配系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 月度批处理 (客户权重评分 + 拜访排程)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 评分与分配规则
pub mod engine;

// 配置层 - 运行参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/建表）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{ApprovalStatus, CustomerType, PlanStatus, TaskType, UserRole};

// 领域实体
pub use domain::{
    Account, AccountSlot, ComplianceQuota, Representative, RouteSlot, RouteVisit, TargetMonth,
    VisitHeader, VisitTask,
};

// 引擎
pub use engine::{
    AllocationError, AllocationRepositories, AllocationResult, RunSummary,
    VisitAllocationOrchestrator,
};

// 配置
pub use config::{AllocatorConfig, ConfigManager};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "月度拜访计划分配系统";
