// ==========================================
// 月度拜访计划分配系统 - 节假日数据仓储
// ==========================================
// 表: holiday_calendar
// 说明: 区间查询用于统计工作日; 单日查询在分配循环中逐日调用 (不缓存)
// ==========================================

use crate::db::open_sqlite_connection;
use crate::repository::error::{parse_date_column, RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Result as SqliteResult};
use std::sync::{Arc, Mutex};

pub struct HolidayRepository {
    conn: Arc<Mutex<Connection>>,
}

impl HolidayRepository {
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

    /// 写入节假日（用于数据准备与测试）
    pub fn insert(&self, holiday_id: &str, name: &str, date: NaiveDate) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO holiday_calendar (holiday_id, name, holiday_date)
            VALUES (?1, ?2, ?3)
            "#,
            params![holiday_id, name, date.format("%Y-%m-%d").to_string()],
        )?;
        Ok(())
    }

    /// 查询闭区间内的节假日日期（去重、升序）
    pub fn find_in_range(&self, first: NaiveDate, last: NaiveDate) -> RepositoryResult<Vec<NaiveDate>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT DISTINCT holiday_date
            FROM holiday_calendar
            WHERE holiday_date >= ?1
              AND holiday_date <= ?2
            ORDER BY holiday_date
            "#,
        )?;

        let raw = stmt
            .query_map(
                params![
                    first.format("%Y-%m-%d").to_string(),
                    last.format("%Y-%m-%d").to_string()
                ],
                |row| row.get::<_, String>(0),
            )?
            .collect::<SqliteResult<Vec<String>>>()?;

        raw.iter()
            .map(|s| parse_date_column("holiday_date", s))
            .collect()
    }

    /// 单日是否为节假日
    pub fn is_holiday(&self, date: NaiveDate) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM holiday_calendar WHERE holiday_date = ?1",
            params![date.format("%Y-%m-%d").to_string()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}
