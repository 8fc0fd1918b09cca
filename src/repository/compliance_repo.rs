// ==========================================
// 月度拜访计划分配系统 - 合规配额数据仓储
// ==========================================
// 表: compliance_matrix
// 映射: (区域, 角色, 业务线) → 月度拜访次数
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::representative::ComplianceQuota;
use crate::domain::types::UserRole;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub struct ComplianceRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ComplianceRepository {
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

    /// 写入配额（用于数据准备与测试）
    pub fn insert(&self, compliance_id: &str, quota: &ComplianceQuota) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO compliance_matrix (compliance_id, name, region_id, role, lob_code, visit_count)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                compliance_id,
                format!("{}-{}", quota.region_id, quota.role),
                quota.region_id,
                quota.role.code(),
                quota.lob_code,
                quota.visit_count
            ],
        )?;
        Ok(())
    }

    /// 查询合规拜访配额
    ///
    /// # 返回
    /// - region_id → visit_count 映射（无配置时为空）
    /// - Err(UniqueConstraintViolation): 同一区域存在多条配额
    pub fn find_visit_quota(
        &self,
        region_id: &str,
        role: UserRole,
        lob_code: i64,
    ) -> RepositoryResult<HashMap<String, i32>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT region_id, visit_count
            FROM compliance_matrix
            WHERE region_id = ?1
              AND role = ?2
              AND lob_code = ?3
            "#,
        )?;

        let rows = stmt
            .query_map(params![region_id, role.code(), lob_code], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i32>(1)?))
            })?
            .collect::<SqliteResult<Vec<(String, i32)>>>()?;

        let mut quota = HashMap::new();
        for (region, count) in rows {
            if quota.insert(region.clone(), count).is_some() {
                return Err(RepositoryError::UniqueConstraintViolation(format!(
                    "compliance_matrix 存在重复配额: region_id={}, role={}",
                    region, role
                )));
            }
        }

        Ok(quota)
    }
}
