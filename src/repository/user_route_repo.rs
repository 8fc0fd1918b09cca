// ==========================================
// 月度拜访计划分配系统 - 用户线路映射仓储
// ==========================================
// 表: user_route_mapping
// 用途: 保存线路聚合权重 (weightage_point), 并按权重读回可排程线路
// ==========================================

use crate::db::open_sqlite_connection;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, params_from_iter, Connection, Result as SqliteResult};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// 用户线路映射实体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRouteMappingEntity {
    pub mapping_id: String,
    pub route_id: String,
    pub user_id: String,
    pub weightage_point: i32,
}

pub struct UserRouteRepository {
    conn: Arc<Mutex<Connection>>,
}

impl UserRouteRepository {
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

    /// 写入映射（用于数据准备与测试）
    pub fn insert(&self, entity: &UserRouteMappingEntity) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO user_route_mapping (mapping_id, route_id, user_id, weightage_point)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                entity.mapping_id,
                entity.route_id,
                entity.user_id,
                entity.weightage_point
            ],
        )?;
        Ok(())
    }

    /// 回写线路权重
    ///
    /// 仅更新该代表已存在的映射行，未映射的线路忽略。
    ///
    /// # 返回
    /// - Ok(usize): 更新的映射行数
    pub fn update_weightage_points(
        &self,
        user_id: &str,
        route_weights: &[(String, i32)],
    ) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let mut updated = 0;
        for (route_id, weight) in route_weights {
            updated += conn.execute(
                r#"
                UPDATE user_route_mapping
                SET weightage_point = ?3
                WHERE user_id = ?1 AND route_id = ?2
                "#,
                params![user_id, route_id, weight],
            )?;
        }
        Ok(updated)
    }

    /// 查询代表名下权重 > 0 的线路
    ///
    /// # 参数
    /// - route_ids: 候选线路（本次评分涉及的线路）
    ///
    /// # 返回
    /// 按权重降序、线路ID升序排列的映射
    pub fn find_weighted_routes(
        &self,
        user_id: &str,
        route_ids: &[String],
    ) -> RepositoryResult<Vec<UserRouteMappingEntity>> {
        if route_ids.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.get_conn()?;
        let placeholders = (0..route_ids.len())
            .map(|i| format!("?{}", i + 2))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            r#"
            SELECT mapping_id, route_id, user_id, weightage_point
            FROM user_route_mapping
            WHERE user_id = ?1
              AND route_id IN ({})
              AND weightage_point > 0
            ORDER BY weightage_point DESC, route_id ASC
            "#,
            placeholders
        );

        let values = std::iter::once(user_id.to_string()).chain(route_ids.iter().cloned());
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(values), |row| {
                Ok(UserRouteMappingEntity {
                    mapping_id: row.get(0)?,
                    route_id: row.get(1)?,
                    user_id: row.get(2)?,
                    weightage_point: row.get(3)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(rows)
    }
}
