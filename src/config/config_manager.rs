// ==========================================
// 月度拜访计划分配系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::allocator_config::{
    default_roles, AllocatorConfig, DEFAULT_DEGROWTH_CUTOFF_PCT, DEFAULT_LOB_CODE,
};
use crate::db::open_sqlite_connection;
use crate::domain::types::UserRole;
use crate::engine::party_route::DEFAULT_SHORTFALL_LIMIT;
use crate::repository::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::debug;

const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
                params![GLOBAL_SCOPE, key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global scope 的配置值（已存在则覆写）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES (?1, ?2, ?3, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![GLOBAL_SCOPE, key, value],
        )?;
        Ok(())
    }

    /// 全部 global 配置
    pub fn get_config_snapshot(&self) -> RepositoryResult<HashMap<String, String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key",
        )?;
        let rows = stmt.query_map(params![GLOBAL_SCOPE], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut snapshot = HashMap::new();
        for row in rows {
            let (key, value) = row?;
            snapshot.insert(key, value);
        }
        Ok(snapshot)
    }

    fn get_parsed<T: FromStr>(&self, key: &str, default: T) -> RepositoryResult<T>
    where
        T::Err: std::fmt::Display,
    {
        match self.get_global_config_value(key)? {
            None => Ok(default),
            Some(raw) => raw.trim().parse::<T>().map_err(|e| RepositoryError::FieldValueError {
                field: key.to_string(),
                message: format!("无法解析配置值 '{}': {}", raw, e),
            }),
        }
    }

    /// 加载批处理运行参数
    ///
    /// # 返回
    /// - Err(ValidationError): 未配置 region_id
    /// - Err(FieldValueError): 配置值无法解析
    pub fn load_allocator_config(&self) -> RepositoryResult<AllocatorConfig> {
        let region_id = self
            .get_global_config_value(config_keys::REGION_ID)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                RepositoryError::ValidationError(format!(
                    "缺少必填配置: {}",
                    config_keys::REGION_ID
                ))
            })?;

        let roles = match self.get_global_config_value(config_keys::ROLES)? {
            None => default_roles(),
            Some(raw) => serde_json::from_str::<Vec<i64>>(&raw)
                .map_err(|e| RepositoryError::FieldValueError {
                    field: config_keys::ROLES.to_string(),
                    message: e.to_string(),
                })?
                .into_iter()
                .map(UserRole::from_code)
                .collect(),
        };

        let run_date = match self.get_global_config_value(config_keys::RUN_DATE)? {
            None => None,
            Some(raw) => Some(NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| {
                RepositoryError::FieldValueError {
                    field: config_keys::RUN_DATE.to_string(),
                    message: e.to_string(),
                }
            })?),
        };

        let config = AllocatorConfig {
            region_id,
            lob_code: self.get_parsed(config_keys::LOB_CODE, DEFAULT_LOB_CODE)?,
            roles,
            degrowth_cutoff_pct: self
                .get_parsed(config_keys::DEGROWTH_CUTOFF_PCT, DEFAULT_DEGROWTH_CUTOFF_PCT)?,
            placeholder_shortfall_limit: self.get_parsed(
                config_keys::PLACEHOLDER_SHORTFALL_LIMIT,
                DEFAULT_SHORTFALL_LIMIT,
            )?,
            run_date,
        };
        debug!(?config, "分配参数加载完成");
        Ok(config)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 运行范围
    pub const REGION_ID: &str = "region_id";
    pub const LOB_CODE: &str = "lob_code";
    pub const ROLES: &str = "roles"; // JSON 整数数组

    // 评分与分配
    pub const DEGROWTH_CUTOFF_PCT: &str = "degrowth_cutoff_pct";
    pub const PLACEHOLDER_SHORTFALL_LIMIT: &str = "placeholder_shortfall_limit";

    // 运行日期覆写 (YYYY-MM-DD)
    pub const RUN_DATE: &str = "run_date";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    fn manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_missing_region_is_validation_error() {
        let mgr = manager();
        let err = mgr.load_allocator_config().unwrap_err();
        assert!(matches!(err, RepositoryError::ValidationError(_)));
    }

    #[test]
    fn test_defaults_apply() {
        let mgr = manager();
        mgr.set_global_config_value(config_keys::REGION_ID, "R1").unwrap();

        let config = mgr.load_allocator_config().unwrap();
        assert_eq!(config, AllocatorConfig::for_region("R1"));
    }

    #[test]
    fn test_overrides_are_parsed() {
        let mgr = manager();
        mgr.set_global_config_value(config_keys::REGION_ID, "R9").unwrap();
        mgr.set_global_config_value(config_keys::ROLES, "[100000004]").unwrap();
        mgr.set_global_config_value(config_keys::DEGROWTH_CUTOFF_PCT, "-15.5").unwrap();
        mgr.set_global_config_value(config_keys::PLACEHOLDER_SHORTFALL_LIMIT, "2").unwrap();
        mgr.set_global_config_value(config_keys::RUN_DATE, "2026-10-16").unwrap();
        // 覆写
        mgr.set_global_config_value(config_keys::LOB_CODE, "1").unwrap();
        mgr.set_global_config_value(config_keys::LOB_CODE, "100000007").unwrap();

        let config = mgr.load_allocator_config().unwrap();
        assert_eq!(config.region_id, "R9");
        assert_eq!(config.roles, vec![UserRole::AreaManager]);
        assert_eq!(config.degrowth_cutoff_pct, -15.5);
        assert_eq!(config.placeholder_shortfall_limit, 2);
        assert_eq!(config.lob_code, 100_000_007);
        assert_eq!(config.run_date, NaiveDate::from_ymd_opt(2026, 10, 16));
        assert_eq!(mgr.get_config_snapshot().unwrap().len(), 6);
    }

    #[test]
    fn test_bad_value_is_field_error() {
        let mgr = manager();
        mgr.set_global_config_value(config_keys::REGION_ID, "R1").unwrap();
        mgr.set_global_config_value(config_keys::PLACEHOLDER_SHORTFALL_LIMIT, "many").unwrap();

        let err = mgr.load_allocator_config().unwrap_err();
        assert!(matches!(err, RepositoryError::FieldValueError { .. }));
    }
}
