// ==========================================
// 月度拜访计划分配系统 - 销售代表数据仓储
// ==========================================
// 表: system_user / user_geography_mapping
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::representative::Representative;
use crate::domain::types::UserRole;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex};

// ==========================================
// RepresentativeRepository - 销售代表仓储
// ==========================================
pub struct RepresentativeRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RepresentativeRepository {
    /// 创建新的销售代表仓储实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 写入销售代表（用于数据准备与测试）
    pub fn insert(&self, rep: &Representative) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO system_user (user_id, full_name, role, region_id, lob_code)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                rep.user_id,
                rep.full_name,
                rep.role.code(),
                rep.region_id,
                rep.lob_code
            ],
        )?;
        Ok(())
    }

    /// 写入用户地理映射（用于数据准备与测试）
    pub fn insert_geography_mapping(
        &self,
        mapping_id: &str,
        user_id: &str,
        region_id: Option<&str>,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO user_geography_mapping (mapping_id, user_id, region_id)
            VALUES (?1, ?2, ?3)
            "#,
            params![mapping_id, user_id, region_id],
        )?;
        Ok(())
    }

    /// 按区域、业务线与角色查询销售代表
    ///
    /// # 返回
    /// 按姓名升序排列的销售代表列表
    pub fn find_by_region_and_roles(
        &self,
        region_id: &str,
        lob_code: i64,
        roles: &[UserRole],
    ) -> RepositoryResult<Vec<Representative>> {
        if roles.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.get_conn()?;
        let placeholders = (0..roles.len())
            .map(|i| format!("?{}", i + 3))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            r#"
            SELECT DISTINCT user_id, full_name, role, region_id, lob_code
            FROM system_user
            WHERE region_id = ?1
              AND lob_code = ?2
              AND role IN ({})
            ORDER BY full_name ASC
            "#,
            placeholders
        );

        let mut values: Vec<rusqlite::types::Value> = vec![
            rusqlite::types::Value::Text(region_id.to_string()),
            rusqlite::types::Value::Integer(lob_code),
        ];
        values.extend(roles.iter().map(|r| rusqlite::types::Value::Integer(r.code())));

        let mut stmt = conn.prepare(&sql)?;
        let reps = stmt
            .query_map(params_from_iter(values), |row| {
                Ok(Representative {
                    user_id: row.get(0)?,
                    full_name: row.get(1)?,
                    role: UserRole::from_code(row.get(2)?),
                    region_id: row.get(3)?,
                    lob_code: row.get(4)?,
                })
            })?
            .collect::<SqliteResult<Vec<Representative>>>()?;

        Ok(reps)
    }

    /// 查询销售代表的地理映射区域
    ///
    /// # 返回
    /// - Ok(Some(region_id)): 首条映射上的区域
    /// - Ok(None): 无映射或映射未填区域
    pub fn find_geography_region(&self, user_id: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let region: Option<Option<String>> = conn
            .query_row(
                r#"
                SELECT region_id
                FROM user_geography_mapping
                WHERE user_id = ?1
                ORDER BY created_at ASC, rowid ASC
                LIMIT 1
                "#,
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(region.flatten())
    }
}
