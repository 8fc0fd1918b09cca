// ==========================================
// 月度拜访计划分配系统 - 引擎编排器
// ==========================================
// 主流程 (单线程, 逐代表顺序执行):
//   1) 区域客户重置
//   2) 查询区域内待处理的销售代表
//   3) 每个代表: 三轮评分 → 线路权重回写 → 地理映射 → 合规配额 → 工作日
//      → 线路客户分配 → 计划头 → 逐日分配 → 余量分配 → 客户拜访次数回写
// 错误: 仓储错误中止整个批处理; 缺映射/无工作日仅跳过该代表
// 已写入的记录不回滚
// ==========================================

use crate::config::AllocatorConfig;
use crate::domain::calendar::TargetMonth;
use crate::domain::representative::Representative;
use crate::domain::types::ApprovalStatus;
use crate::domain::visit::VisitHeader;
use crate::engine::calendar::WorkingCalendar;
use crate::engine::day_assignment::DayAssignmentLoop;
use crate::engine::error::{AllocationError, AllocationResult};
use crate::engine::party_route::{build_route_plan, RouteAllocation, RoutePartyPlan};
use crate::engine::quota::VisitQuotaPlan;
use crate::engine::remainder::RemainderDistributor;
use crate::engine::repositories::AllocationRepositories;
use crate::engine::scoring::ScoringPipeline;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

// ==========================================
// 运行结果
// ==========================================

/// 单个代表的处理结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RepresentativeOutcome {
    Allocated {
        user_id: String,
        full_name: String,
        visit_header_id: String,
        quota: u32,
        working_days: u32,
        per_day: u32,
        remainder: u32,
        routes: usize,
        route_visits: u32,
        tasks: u32,
        placeholder_tasks: u32,
        remainder_tasks: u32,
    },
    Skipped {
        user_id: String,
        full_name: String,
        reason: String,
    },
}

impl RepresentativeOutcome {
    pub fn user_id(&self) -> &str {
        match self {
            RepresentativeOutcome::Allocated { user_id, .. } => user_id,
            RepresentativeOutcome::Skipped { user_id, .. } => user_id,
        }
    }

    pub fn is_allocated(&self) -> bool {
        matches!(self, RepresentativeOutcome::Allocated { .. })
    }
}

/// 批处理运行汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub region_id: String,
    pub run_date: NaiveDate,
    pub target_month: String,
    pub accounts_reset: usize,
    pub outcomes: Vec<RepresentativeOutcome>,
}

impl RunSummary {
    pub fn allocated_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_allocated()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes.len() - self.allocated_count()
    }

    pub fn outcome_for(&self, user_id: &str) -> Option<&RepresentativeOutcome> {
        self.outcomes.iter().find(|o| o.user_id() == user_id)
    }
}

// ==========================================
// VisitAllocationOrchestrator - 引擎编排器
// ==========================================
pub struct VisitAllocationOrchestrator {
    repos: AllocationRepositories,
    config: AllocatorConfig,
    scoring: ScoringPipeline,
    calendar: WorkingCalendar,
    day_loop: DayAssignmentLoop,
    remainder: RemainderDistributor,
}

impl VisitAllocationOrchestrator {
    pub fn new(repos: AllocationRepositories, config: AllocatorConfig) -> Self {
        Self {
            scoring: ScoringPipeline::new(repos.account_repo.clone(), config.degrowth_cutoff_pct),
            calendar: WorkingCalendar::new(repos.holiday_repo.clone()),
            day_loop: DayAssignmentLoop::new(
                WorkingCalendar::new(repos.holiday_repo.clone()),
                repos.visit_repo.clone(),
            ),
            remainder: RemainderDistributor::new(
                WorkingCalendar::new(repos.holiday_repo.clone()),
                repos.visit_repo.clone(),
            ),
            repos,
            config,
        }
    }

    /// 执行一次批处理
    ///
    /// # 参数
    /// - run_date: 运行日期, 目标月为其下一个自然月
    ///
    /// # 返回
    /// - Ok(RunSummary): 各代表处理结果
    /// - Err: 仓储错误 (已写入的记录保留)
    #[instrument(skip(self), fields(region_id = %self.config.region_id))]
    pub fn run(&self, run_date: NaiveDate) -> AllocationResult<RunSummary> {
        let month = TargetMonth::next_after(run_date)
            .ok_or_else(|| AllocationError::DateError(format!("无法推导目标月份: {}", run_date)))?;

        let accounts_reset = self
            .repos
            .account_repo
            .reset_region_accounts(&self.config.region_id)?;

        let reps = self.repos.representative_repo.find_by_region_and_roles(
            &self.config.region_id,
            self.config.lob_code,
            &self.config.roles,
        )?;

        info!(
            target_month = %month,
            accounts_reset,
            representatives = reps.len(),
            "开始月度拜访分配"
        );

        let mut outcomes = Vec::with_capacity(reps.len());
        for rep in &reps {
            match self.allocate_for_representative(rep, &month) {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) if e.is_recoverable() => {
                    warn!(user_id = %rep.user_id, error = %e, "跳过销售代表");
                    outcomes.push(RepresentativeOutcome::Skipped {
                        user_id: rep.user_id.clone(),
                        full_name: rep.full_name.clone(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        let summary = RunSummary {
            region_id: self.config.region_id.clone(),
            run_date,
            target_month: month.to_string(),
            accounts_reset,
            outcomes,
        };
        info!(
            allocated = summary.allocated_count(),
            skipped = summary.skipped_count(),
            "月度拜访分配完成"
        );
        Ok(summary)
    }

    /// 为单个代表完成评分与分配
    #[instrument(skip(self, rep, month), fields(user_id = %rep.user_id, role = %rep.role))]
    pub fn allocate_for_representative(
        &self,
        rep: &Representative,
        month: &TargetMonth,
    ) -> AllocationResult<RepresentativeOutcome> {
        // 1. 三轮评分与线路权重 (先于映射检查, 被跳过的代表同样回写权重)
        let weights = self
            .scoring
            .score_representative(rep, &self.config.region_id)?;
        self.repos
            .user_route_repo
            .update_weightage_points(&rep.user_id, &weights.as_pairs())?;

        // 2. 地理映射与配额
        let geo_region = self
            .repos
            .representative_repo
            .find_geography_region(&rep.user_id)?
            .ok_or_else(|| AllocationError::missing_mapping(&rep.user_id, "无地理区域映射"))?;

        let quota = self
            .repos
            .compliance_repo
            .find_visit_quota(&geo_region, rep.role, self.config.lob_code)?
            .get(&geo_region)
            .copied()
            .filter(|q| *q > 0)
            .ok_or_else(|| {
                AllocationError::missing_mapping(
                    &rep.user_id,
                    format!("区域 {} 无合规拜访配额", geo_region),
                )
            })? as u32;

        // 3. 工作日与每日拜访数
        let working_days = self.calendar.working_day_count(month)?;
        let plan = VisitQuotaPlan::compute(quota, working_days).ok_or_else(|| {
            AllocationError::NoWorkingDays {
                month: month.to_string(),
            }
        })?;

        // 4. 线路客户分配
        let allocation = self.build_allocation(rep, &weights.route_ids(), plan.per_day)?;
        if allocation.is_empty() {
            return Err(AllocationError::missing_mapping(
                &rep.user_id,
                "无正权重线路或线路无可拜访客户",
            ));
        }

        // 5. 计划头
        let header = VisitHeader {
            visit_header_id: Uuid::new_v4().to_string(),
            name: format!("{}-{}", rep.full_name, month.month_name()),
            month: month.month_name(),
            header_date: month.first_day,
            salesperson_id: rep.user_id.clone(),
            approver_id: rep.user_id.clone(),
            approval_status: ApprovalStatus::Pending,
            visit_count: quota as i32,
        };
        let visit_header_id = self.repos.visit_repo.create_visit_header(&header)?;

        // 6. 逐日分配与余量
        let day_outcome = self.day_loop.run(
            month,
            &allocation,
            plan.per_day,
            &visit_header_id,
            &rep.full_name,
        )?;
        let remainder_tasks = if plan.remainder > 0 {
            self.remainder
                .distribute(month, &visit_header_id, plan.remainder)?
        } else {
            0
        };

        // 7. 客户拜访次数
        for (account_id, count) in &day_outcome.account_visits {
            self.repos
                .account_repo
                .update_visit_count(account_id, *count)?;
        }

        info!(
            visit_header_id = %visit_header_id,
            quota,
            working_days,
            per_day = plan.per_day,
            remainder = plan.remainder,
            route_visits = day_outcome.route_visits,
            tasks = day_outcome.tasks + remainder_tasks,
            "销售代表分配完成"
        );

        Ok(RepresentativeOutcome::Allocated {
            user_id: rep.user_id.clone(),
            full_name: rep.full_name.clone(),
            visit_header_id,
            quota,
            working_days,
            per_day: plan.per_day,
            remainder: plan.remainder,
            routes: allocation.plans.len(),
            route_visits: day_outcome.route_visits,
            tasks: day_outcome.tasks + remainder_tasks,
            placeholder_tasks: day_outcome.placeholder_tasks + remainder_tasks,
            remainder_tasks,
        })
    }

    fn build_allocation(
        &self,
        rep: &Representative,
        route_ids: &[String],
        per_day: u32,
    ) -> AllocationResult<RouteAllocation> {
        let weighted = self
            .repos
            .user_route_repo
            .find_weighted_routes(&rep.user_id, route_ids)?;

        let mut plans: Vec<RoutePartyPlan> = Vec::with_capacity(weighted.len());
        for mapping in weighted {
            let parties = self
                .repos
                .account_repo
                .find_route_parties(&mapping.route_id, &rep.user_id)?;
            match build_route_plan(
                &mapping.route_id,
                mapping.weightage_point,
                parties,
                per_day,
                self.config.placeholder_shortfall_limit,
            ) {
                Some(plan) => plans.push(plan),
                None => warn!(route_id = %mapping.route_id, "线路无可拜访客户, 跳过"),
            }
        }

        Ok(RouteAllocation::from_plans(plans, &rep.user_id))
    }
}
