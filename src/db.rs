// ==========================================
// 月度拜访计划分配系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 提供幂等建表 (init_schema)，供批处理与测试共用
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::path::PathBuf;
use std::time::Duration;

/// 显式指定数据库路径的环境变量
pub const DB_PATH_ENV: &str = "VISIT_ALLOCATOR_DB_PATH";

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 默认数据库路径
///
/// 优先级: 环境变量 VISIT_ALLOCATOR_DB_PATH → 用户数据目录 → 当前目录
pub fn default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./visit_allocator.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("visit-allocator");
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("visit_allocator.db");
        }
    }
    path.to_string_lossy().to_string()
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 初始化数据库 schema（幂等）
///
/// 表:
/// - account / system_user / user_geography_mapping: 主数据 (运行前已存在)
/// - compliance_matrix / holiday_calendar / user_route_mapping: 配额、节假日、线路映射
/// - visit_header / route_visit / visit_task: 每次运行新建的拜访计划
/// - config_kv / schema_version: 配置与版本
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS system_user (
            user_id TEXT PRIMARY KEY,
            full_name TEXT NOT NULL,
            role INTEGER NOT NULL,
            region_id TEXT,
            lob_code INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS user_geography_mapping (
            mapping_id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            region_id TEXT,
            depot TEXT,
            district TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS account (
            account_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            owner_id TEXT NOT NULL,
            region_id TEXT NOT NULL,
            route_id TEXT,
            customer_type INTEGER NOT NULL,
            actual_sale REAL NOT NULL DEFAULT 0,
            sale_till_last_month REAL NOT NULL DEFAULT 0,
            ytd_sale REAL,
            growth_pct REAL,
            weightage INTEGER NOT NULL DEFAULT 0,
            visit_count INTEGER NOT NULL DEFAULT 0
        );
        CREATE INDEX IF NOT EXISTS idx_account_owner ON account(owner_id);
        CREATE INDEX IF NOT EXISTS idx_account_route ON account(route_id);

        CREATE TABLE IF NOT EXISTS compliance_matrix (
            compliance_id TEXT PRIMARY KEY,
            name TEXT,
            region_id TEXT NOT NULL,
            role INTEGER NOT NULL,
            lob_code INTEGER NOT NULL,
            visit_count INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS holiday_calendar (
            holiday_id TEXT PRIMARY KEY,
            name TEXT,
            holiday_date TEXT NOT NULL,
            end_date TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_holiday_date ON holiday_calendar(holiday_date);

        CREATE TABLE IF NOT EXISTS user_route_mapping (
            mapping_id TEXT PRIMARY KEY,
            route_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            weightage_point INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS visit_header (
            visit_header_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            month TEXT NOT NULL,
            header_date TEXT NOT NULL,
            salesperson_id TEXT NOT NULL,
            approver_id TEXT NOT NULL,
            approval_status INTEGER NOT NULL,
            visit_count INTEGER NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS route_visit (
            route_visit_id TEXT PRIMARY KEY,
            visit_header_id TEXT NOT NULL REFERENCES visit_header(visit_header_id),
            route_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            visit_date TEXT NOT NULL,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_route_visit_header_date ON route_visit(visit_header_id, visit_date);

        CREATE TABLE IF NOT EXISTS visit_task (
            task_id TEXT PRIMARY KEY,
            visit_header_id TEXT NOT NULL REFERENCES visit_header(visit_header_id),
            route_id TEXT NOT NULL,
            account_id TEXT,
            regarding_account_id TEXT,
            subject TEXT NOT NULL,
            visit_date TEXT NOT NULL,
            owner_id TEXT NOT NULL,
            plan_status INTEGER,
            task_type TEXT NOT NULL,
            task_type_code INTEGER,
            other_task_type_code INTEGER,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_visit_task_header ON visit_task(visit_header_id);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    Ok(())
}
