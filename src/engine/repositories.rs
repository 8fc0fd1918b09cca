// ==========================================
// 月度拜访计划分配系统 - 引擎层仓储聚合
// ==========================================
// 职责: 聚合分配引擎所需的所有 Repository
// 约定: 所有仓储共享同一个连接
// ==========================================

use crate::db::open_sqlite_connection;
use crate::repository::{
    AccountRepository, ComplianceRepository, HolidayRepository, RepositoryResult,
    RepresentativeRepository, UserRouteRepository, VisitRepository,
};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// 分配引擎仓储集合
///
/// # 包含的仓储
/// - `account_repo`: 客户 (评分队列、权重与拜访次数回写)
/// - `representative_repo`: 销售代表与地理映射
/// - `compliance_repo`: 合规拜访配额
/// - `holiday_repo`: 节假日
/// - `user_route_repo`: 代表线路映射 (线路权重)
/// - `visit_repo`: 拜访计划头/线路拜访/拜访任务
#[derive(Clone)]
pub struct AllocationRepositories {
    pub account_repo: Arc<AccountRepository>,
    pub representative_repo: Arc<RepresentativeRepository>,
    pub compliance_repo: Arc<ComplianceRepository>,
    pub holiday_repo: Arc<HolidayRepository>,
    pub user_route_repo: Arc<UserRouteRepository>,
    pub visit_repo: Arc<VisitRepository>,
}

impl AllocationRepositories {
    /// 以共享连接构造全部仓储
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            account_repo: Arc::new(AccountRepository::from_connection(conn.clone())),
            representative_repo: Arc::new(RepresentativeRepository::from_connection(conn.clone())),
            compliance_repo: Arc::new(ComplianceRepository::from_connection(conn.clone())),
            holiday_repo: Arc::new(HolidayRepository::from_connection(conn.clone())),
            user_route_repo: Arc::new(UserRouteRepository::from_connection(conn.clone())),
            visit_repo: Arc::new(VisitRepository::from_connection(conn)),
        }
    }

    /// 打开数据库并构造全部仓储
    pub fn open(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self::from_connection(Arc::new(Mutex::new(conn))))
    }
}
