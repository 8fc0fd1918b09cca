// ==========================================
// 月度拜访计划分配系统 - 余量分配
// ==========================================
// remainder > 0 时, 从目标月第一个工作日起逐日追加 1 条占位拜访,
// 线路与负责人取当日已写入的线路拜访记录
// 当日无线路拜访记录 → 跳过该日, 不消耗余量
// ==========================================

use crate::domain::calendar::TargetMonth;
use crate::domain::visit::{AccountSlot, RouteSlot, RouteVisit, VisitTask};
use crate::engine::calendar::WorkingCalendar;
use crate::engine::day_assignment::build_task;
use crate::engine::error::AllocationResult;
use crate::repository::VisitRepository;
use std::sync::Arc;
use tracing::{instrument, warn};

/// 以当日线路拜访记录构造余量占位任务
pub fn remainder_task(route_visit: &RouteVisit) -> VisitTask {
    let slot = RouteSlot {
        route_id: route_visit.route_id.clone(),
        user_id: route_visit.user_id.clone(),
    };
    build_task(
        &route_visit.visit_header_id,
        &slot,
        &AccountSlot::Placeholder,
        route_visit.visit_date,
    )
}

// ==========================================
// RemainderDistributor - 余量分配器
// ==========================================
pub struct RemainderDistributor {
    calendar: WorkingCalendar,
    visit_repo: Arc<VisitRepository>,
}

impl RemainderDistributor {
    pub fn new(calendar: WorkingCalendar, visit_repo: Arc<VisitRepository>) -> Self {
        Self {
            calendar,
            visit_repo,
        }
    }

    /// 分配余量
    ///
    /// # 返回
    /// 实际追加的占位任务数 (工作日不足时小于 remainder)
    #[instrument(skip(self), fields(month = %month))]
    pub fn distribute(
        &self,
        month: &TargetMonth,
        visit_header_id: &str,
        remainder: u32,
    ) -> AllocationResult<u32> {
        let mut left = remainder;
        let mut created = 0;

        for date in month.days() {
            if left == 0 {
                break;
            }
            if !self.calendar.is_working_day(date)? {
                continue;
            }

            let Some(route_visit) = self.visit_repo.find_route_visit(date, visit_header_id)? else {
                warn!(date = %date, visit_header_id, "当日无线路拜访记录, 跳过余量分配");
                continue;
            };

            self.visit_repo.create_task(&remainder_task(&route_visit))?;
            left -= 1;
            created += 1;
        }

        if left > 0 {
            warn!(left, "工作日不足, 余量未分配完");
        }
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::TaskType;
    use chrono::NaiveDate;

    #[test]
    fn test_remainder_task_reuses_route_and_owner() {
        let route_visit = RouteVisit {
            route_visit_id: "RV1".to_string(),
            visit_header_id: "H1".to_string(),
            route_id: "RT7".to_string(),
            user_id: "U3".to_string(),
            visit_date: NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
            name: "Asha Verma".to_string(),
        };

        let task = remainder_task(&route_visit);
        assert_eq!(task.visit_header_id, "H1");
        assert_eq!(task.route_id, "RT7");
        assert_eq!(task.owner_id, "U3");
        assert_eq!(task.visit_date, route_visit.visit_date);
        assert_eq!(task.task_type, TaskType::NonCustomerVisit);
        assert!(task.account_id.is_none());
        assert!(task.is_placeholder());
    }
}
