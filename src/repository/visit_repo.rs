// ==========================================
// 月度拜访计划分配系统 - 拜访计划数据仓储
// ==========================================
// 表: visit_header / route_visit / visit_task
// 约定: 每次写入独立提交, 不跨调用开启事务; 不做去重
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::types::{ApprovalStatus, PlanStatus, TaskType};
use crate::domain::visit::{RouteVisit, VisitHeader, VisitTask};
use crate::repository::error::{parse_date_column, RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex};

fn fmt_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

// ==========================================
// VisitRepository - 拜访计划仓储
// ==========================================
pub struct VisitRepository {
    conn: Arc<Mutex<Connection>>,
}

impl VisitRepository {
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

    // ==========================================
    // 写入
    // ==========================================

    /// 创建月度拜访计划头
    ///
    /// # 返回
    /// - Ok(String): visit_header_id
    pub fn create_visit_header(&self, header: &VisitHeader) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO visit_header (
                visit_header_id, name, month, header_date,
                salesperson_id, approver_id, approval_status, visit_count
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                header.visit_header_id,
                header.name,
                header.month,
                fmt_date(header.header_date),
                header.salesperson_id,
                header.approver_id,
                header.approval_status.code(),
                header.visit_count,
            ],
        )?;
        Ok(header.visit_header_id.clone())
    }

    /// 创建日线路拜访记录
    pub fn create_route_visit(&self, route_visit: &RouteVisit) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO route_visit (
                route_visit_id, visit_header_id, route_id, user_id, visit_date, name
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                route_visit.route_visit_id,
                route_visit.visit_header_id,
                route_visit.route_id,
                route_visit.user_id,
                fmt_date(route_visit.visit_date),
                route_visit.name,
            ],
        )?;
        Ok(route_visit.route_visit_id.clone())
    }

    /// 创建拜访任务
    pub fn create_task(&self, task: &VisitTask) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO visit_task (
                task_id, visit_header_id, route_id, account_id, regarding_account_id,
                subject, visit_date, owner_id, plan_status,
                task_type, task_type_code, other_task_type_code
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                task.task_id,
                task.visit_header_id,
                task.route_id,
                task.account_id,
                task.regarding_account_id,
                task.subject,
                fmt_date(task.visit_date),
                task.owner_id,
                task.plan_status.map(|s| s.code()),
                task.task_type.to_string(),
                task.task_type.task_code(),
                task.task_type.other_task_code(),
            ],
        )?;
        Ok(task.task_id.clone())
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 查询某计划头在指定日期的线路拜访记录（取首条）
    pub fn find_route_visit(
        &self,
        visit_date: NaiveDate,
        visit_header_id: &str,
    ) -> RepositoryResult<Option<RouteVisit>> {
        let conn = self.get_conn()?;
        let raw = conn
            .query_row(
                r#"
                SELECT route_visit_id, visit_header_id, route_id, user_id, visit_date, name
                FROM route_visit
                WHERE visit_date = ?1 AND visit_header_id = ?2
                ORDER BY rowid ASC
                LIMIT 1
                "#,
                params![fmt_date(visit_date), visit_header_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, String>(5)?,
                    ))
                },
            )
            .optional()?;

        raw.map(|(route_visit_id, visit_header_id, route_id, user_id, date, name)| {
            Ok(RouteVisit {
                route_visit_id,
                visit_header_id,
                route_id,
                user_id,
                visit_date: parse_date_column("visit_date", &date)?,
                name,
            })
        })
        .transpose()
    }

    /// 查询计划头下全部线路拜访记录（按日期、写入顺序）
    pub fn list_route_visits(&self, visit_header_id: &str) -> RepositoryResult<Vec<RouteVisit>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT route_visit_id, visit_header_id, route_id, user_id, visit_date, name
            FROM route_visit
            WHERE visit_header_id = ?1
            ORDER BY visit_date ASC, rowid ASC
            "#,
        )?;
        let raw = stmt
            .query_map(params![visit_header_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        raw.into_iter()
            .map(|(route_visit_id, visit_header_id, route_id, user_id, date, name)| {
                Ok(RouteVisit {
                    route_visit_id,
                    visit_header_id,
                    route_id,
                    user_id,
                    visit_date: parse_date_column("visit_date", &date)?,
                    name,
                })
            })
            .collect()
    }

    /// 查询计划头下全部拜访任务（按日期、写入顺序）
    pub fn list_tasks(&self, visit_header_id: &str) -> RepositoryResult<Vec<VisitTask>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT task_id, visit_header_id, route_id, account_id, regarding_account_id,
                   subject, visit_date, owner_id, plan_status, task_type
            FROM visit_task
            WHERE visit_header_id = ?1
            ORDER BY visit_date ASC, rowid ASC
            "#,
        )?;
        let raw = stmt
            .query_map(params![visit_header_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                    row.get::<_, String>(7)?,
                    row.get::<_, Option<i64>>(8)?,
                    row.get::<_, String>(9)?,
                ))
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        raw.into_iter()
            .map(
                |(
                    task_id,
                    visit_header_id,
                    route_id,
                    account_id,
                    regarding_account_id,
                    subject,
                    date,
                    owner_id,
                    plan_status,
                    task_type,
                )| {
                    let task_type = task_type.parse::<TaskType>().map_err(|message| {
                        RepositoryError::FieldValueError {
                            field: "task_type".to_string(),
                            message,
                        }
                    })?;
                    Ok(VisitTask {
                        task_id,
                        visit_header_id,
                        route_id,
                        account_id,
                        regarding_account_id,
                        subject,
                        visit_date: parse_date_column("visit_date", &date)?,
                        owner_id,
                        plan_status: plan_status.map(|_| PlanStatus::Planned),
                        task_type,
                    })
                },
            )
            .collect()
    }

    /// 查询销售代表在某月的计划头
    pub fn find_headers_for(
        &self,
        salesperson_id: &str,
        header_date: NaiveDate,
    ) -> RepositoryResult<Vec<VisitHeader>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT visit_header_id, name, month, header_date,
                   salesperson_id, approver_id, visit_count
            FROM visit_header
            WHERE salesperson_id = ?1 AND header_date = ?2
            ORDER BY rowid ASC
            "#,
        )?;
        let raw = stmt
            .query_map(params![salesperson_id, fmt_date(header_date)], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, i32>(6)?,
                ))
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        raw.into_iter()
            .map(
                |(visit_header_id, name, month, date, salesperson_id, approver_id, visit_count)| {
                    Ok(VisitHeader {
                        visit_header_id,
                        name,
                        month,
                        header_date: parse_date_column("header_date", &date)?,
                        salesperson_id,
                        approver_id,
                        approval_status: ApprovalStatus::Pending,
                        visit_count,
                    })
                },
            )
            .collect()
    }

    /// 统计计划头下的拜访任务数
    pub fn count_tasks(&self, visit_header_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM visit_task WHERE visit_header_id = ?1",
            params![visit_header_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
