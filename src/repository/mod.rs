// ==========================================
// 月度拜访计划分配系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod account_repo;
pub mod compliance_repo;
pub mod error;
pub mod holiday_repo;
pub mod representative_repo;
pub mod user_route_repo;
pub mod visit_repo;

// 重导出核心仓储
pub use account_repo::AccountRepository;
pub use compliance_repo::ComplianceRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use holiday_repo::HolidayRepository;
pub use representative_repo::RepresentativeRepository;
pub use user_route_repo::{UserRouteMappingEntity, UserRouteRepository};
pub use visit_repo::VisitRepository;
