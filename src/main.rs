// ==========================================
// 月度拜访计划分配系统 - 批处理入口
// ==========================================
// 用法: visit-allocator (无参数)
// 数据库: VISIT_ALLOCATOR_DB_PATH 或用户数据目录
// 退出码: 任一未处理错误 → 非 0
// ==========================================

use anyhow::Context;
use std::sync::{Arc, Mutex};
use visit_allocator::config::ConfigManager;
use visit_allocator::db::{default_db_path, init_schema, open_sqlite_connection};
use visit_allocator::engine::{AllocationRepositories, VisitAllocationOrchestrator};
use visit_allocator::logging;

fn main() -> anyhow::Result<()> {
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} v{}", visit_allocator::APP_NAME, visit_allocator::VERSION);
    tracing::info!("==================================================");

    let db_path = default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    let conn = open_sqlite_connection(&db_path)
        .with_context(|| format!("无法打开数据库: {}", db_path))?;
    init_schema(&conn).context("数据库初始化失败")?;
    let conn = Arc::new(Mutex::new(conn));

    let config = ConfigManager::from_connection(conn.clone())
        .load_allocator_config()
        .context("运行参数加载失败")?;
    let run_date = config
        .run_date
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let orchestrator =
        VisitAllocationOrchestrator::new(AllocationRepositories::from_connection(conn), config);
    let summary = orchestrator.run(run_date).context("月度拜访分配失败")?;

    tracing::info!(summary = %serde_json::to_string(&summary)?, "运行汇总");
    Ok(())
}
