// ==========================================
// 月度拜访计划分配系统 - 配置层
// ==========================================
// 职责: 读取运行参数, 支持覆写
// 存储: config_kv 表
// ==========================================

pub mod allocator_config;
pub mod config_manager;

// 重导出核心配置
pub use allocator_config::AllocatorConfig;
pub use config_manager::{config_keys, ConfigManager};
