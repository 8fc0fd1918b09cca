// ==========================================
// 月度拜访计划分配系统 - 引擎层
// ==========================================
// 红线: 引擎不拼 SQL, 数据访问一律经由 Repository
// 流向: 工作日历 → 配额规划 → 评分/线路权重 → 线路客户分配 → 逐日分配 → 余量分配
// ==========================================

pub mod calendar;
pub mod day_assignment;
pub mod error;
pub mod orchestrator;
pub mod party_route;
pub mod quota;
pub mod remainder;
pub mod repositories;
pub mod route_weight;
pub mod scoring;
pub mod weightage;

// 重导出核心引擎
pub use calendar::{count_working_days, is_weekend, WorkingCalendar};
pub use day_assignment::{
    assign_day, AssignmentCursors, DayAssignment, DayAssignmentLoop, DayLoopOutcome,
    PartyCursors, SlotCursor,
};
pub use error::{AllocationError, AllocationResult};
pub use orchestrator::{RepresentativeOutcome, RunSummary, VisitAllocationOrchestrator};
pub use party_route::{build_route_plan, compute_slots, RouteAllocation, RoutePartyPlan, SlotPlan};
pub use quota::VisitQuotaPlan;
pub use remainder::RemainderDistributor;
pub use repositories::AllocationRepositories;
pub use route_weight::{aggregate, RouteWeights};
pub use scoring::ScoringPipeline;
pub use weightage::{score_cohort, ScoredAccount, ScoringPass, ThresholdBand, ThresholdTable};
