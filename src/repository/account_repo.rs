// ==========================================
// 月度拜访计划分配系统 - 客户数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 排序键之外统一追加 rowid 作为次级排序，保证同分客户的名次稳定
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::account::Account;
use crate::domain::types::CustomerType;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const ACCOUNT_COLUMNS: &str = r#"
    account_id, name, owner_id, region_id, route_id, customer_type,
    actual_sale, sale_till_last_month, ytd_sale, growth_pct,
    weightage, visit_count
"#;

fn map_account_row(row: &Row<'_>) -> SqliteResult<Account> {
    Ok(Account {
        account_id: row.get(0)?,
        name: row.get(1)?,
        owner_id: row.get(2)?,
        region_id: row.get(3)?,
        route_id: row.get(4)?,
        customer_type: CustomerType::from_code(row.get(5)?),
        actual_sale: row.get(6)?,
        sale_till_last_month: row.get(7)?,
        ytd_sale: row.get(8)?,
        growth_pct: row.get(9)?,
        weightage: row.get(10)?,
        visit_count: row.get(11)?,
    })
}

// ==========================================
// AccountRepository - 客户仓储
// ==========================================

/// 客户仓储
/// 职责: 管理 account 表的查询与评分字段回写
pub struct AccountRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AccountRepository {
    /// 创建新的客户仓储实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
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

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 写入客户主数据（用于数据准备与测试）
    pub fn insert(&self, account: &Account) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO account (
                account_id, name, owner_id, region_id, route_id, customer_type,
                actual_sale, sale_till_last_month, ytd_sale, growth_pct,
                weightage, visit_count
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                account.account_id,
                account.name,
                account.owner_id,
                account.region_id,
                account.route_id,
                account.customer_type.code(),
                account.actual_sale,
                account.sale_till_last_month,
                account.ytd_sale,
                account.growth_pct,
                account.weightage,
                account.visit_count,
            ],
        )?;
        Ok(())
    }

    /// 按ID查询客户
    pub fn find_by_id(&self, account_id: &str) -> RepositoryResult<Option<Account>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM account WHERE account_id = ?1", ACCOUNT_COLUMNS);
        let account = conn
            .query_row(&sql, params![account_id], map_account_row)
            .optional()?;
        Ok(account)
    }

    /// 区域客户重置
    ///
    /// 对区域内已映射线路的经销商/零售商客户:
    /// - weightage = 0, visit_count = 0
    /// - ytd_sale = actual_sale + sale_till_last_month
    ///
    /// # 返回
    /// - Ok(usize): 受影响的客户数
    pub fn reset_region_accounts(&self, region_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE account
            SET weightage = 0,
                visit_count = 0,
                ytd_sale = actual_sale + sale_till_last_month
            WHERE region_id = ?1
              AND route_id IS NOT NULL
              AND customer_type IN (?2, ?3)
            "#,
            params![region_id, CustomerType::DEALER_CODE, CustomerType::RETAILER_CODE],
        )?;
        Ok(affected)
    }

    /// 查询下滑客户队列
    ///
    /// 条件: 归属该代表、已映射线路、增长率严格低于 cutoff_pct
    /// 排序: 增长率升序（下滑最严重者在前）
    pub fn find_degrowing(&self, owner_id: &str, cutoff_pct: f64) -> RepositoryResult<Vec<Account>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT {}
            FROM account
            WHERE owner_id = ?1
              AND growth_pct < ?2
              AND route_id IS NOT NULL
            ORDER BY growth_pct ASC, rowid ASC
            "#,
            ACCOUNT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let accounts = stmt
            .query_map(params![owner_id, cutoff_pct], map_account_row)?
            .collect::<SqliteResult<Vec<Account>>>()?;
        Ok(accounts)
    }

    /// 查询按客户类型评分的候选队列
    ///
    /// 条件: 归属该代表、区域匹配、有年累计销量、已映射线路、尚未评分 (weightage = 0)
    /// 排序: 年累计销量降序
    pub fn find_cohort_candidates(
        &self,
        owner_id: &str,
        region_id: &str,
        customer_type: CustomerType,
    ) -> RepositoryResult<Vec<Account>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT {}
            FROM account
            WHERE owner_id = ?1
              AND region_id = ?2
              AND customer_type = ?3
              AND ytd_sale IS NOT NULL
              AND route_id IS NOT NULL
              AND weightage = 0
            ORDER BY ytd_sale DESC, rowid ASC
            "#,
            ACCOUNT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let accounts = stmt
            .query_map(params![owner_id, region_id, customer_type.code()], map_account_row)?
            .collect::<SqliteResult<Vec<Account>>>()?;
        Ok(accounts)
    }

    /// 查询线路上可拜访的客户
    ///
    /// 条件: 线路匹配、归属该代表、有年累计销量、权重 > 0、经销商/零售商
    /// 排序: 权重降序
    pub fn find_route_parties(&self, route_id: &str, owner_id: &str) -> RepositoryResult<Vec<Account>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT {}
            FROM account
            WHERE route_id = ?1
              AND owner_id = ?2
              AND ytd_sale IS NOT NULL
              AND weightage > 0
              AND customer_type IN (?3, ?4)
            ORDER BY weightage DESC, rowid ASC
            "#,
            ACCOUNT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let accounts = stmt
            .query_map(
                params![
                    route_id,
                    owner_id,
                    CustomerType::DEALER_CODE,
                    CustomerType::RETAILER_CODE
                ],
                map_account_row,
            )?
            .collect::<SqliteResult<Vec<Account>>>()?;
        Ok(accounts)
    }

    /// 回写客户权重
    pub fn update_weightage(&self, account_id: &str, weightage: i32) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE account SET weightage = ?2 WHERE account_id = ?1",
            params![account_id, weightage],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "account".to_string(),
                id: account_id.to_string(),
            });
        }
        Ok(())
    }

    /// 回写客户本月计划拜访次数
    pub fn update_visit_count(&self, account_id: &str, visit_count: i32) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE account SET visit_count = ?2 WHERE account_id = ?1",
            params![account_id, visit_count],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "account".to_string(),
                id: account_id.to_string(),
            });
        }
        Ok(())
    }
}
