// ==========================================
// 月度拜访计划分配系统 - 逐日分配
// ==========================================
// 状态:
//   SlotCursor   - 全局线路序列游标, 每个工作日前进 1, 越界回到 0
//   PartyCursors - 每条线路的客户清单游标, 每消费一个槽位前进 1, 到尾回到 0
// 单日: 取当前线路 → 1 条线路拜访记录 + per_day 条拜访任务
// 游标以值传入/返回, 单日分配本身不做 IO
// ==========================================

use crate::domain::calendar::TargetMonth;
use crate::domain::types::PlanStatus;
use crate::domain::visit::{AccountSlot, RouteSlot, RouteVisit, VisitTask};
use crate::engine::calendar::WorkingCalendar;
use crate::engine::error::AllocationResult;
use crate::engine::party_route::RouteAllocation;
use crate::repository::VisitRepository;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

// ==========================================
// 游标
// ==========================================

/// 全局线路序列游标
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotCursor {
    pos: usize,
}

impl SlotCursor {
    /// 取当前位置并前进
    ///
    /// # 返回
    /// (本次位置, 前进后的游标); 序列为空时 None
    pub fn advance(self, len: usize) -> Option<(usize, SlotCursor)> {
        if len == 0 {
            return None;
        }
        let idx = if self.pos < len { self.pos } else { 0 };
        Some((idx, SlotCursor { pos: idx + 1 }))
    }

    pub fn position(&self) -> usize {
        self.pos
    }
}

/// 各线路客户清单游标
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartyCursors {
    positions: HashMap<String, usize>,
}

impl PartyCursors {
    /// 取线路当前位置并前进 (到尾回到 0)
    pub fn advance(&mut self, route_id: &str, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let pos = self.positions.entry(route_id.to_string()).or_insert(0);
        let idx = *pos % len;
        *pos = (idx + 1) % len;
        Some(idx)
    }

    pub fn position(&self, route_id: &str) -> usize {
        self.positions.get(route_id).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentCursors {
    pub slot: SlotCursor,
    pub parties: PartyCursors,
}

// ==========================================
// DayAssignment - 单日分配结果
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct DayAssignment {
    pub date: NaiveDate,
    pub slot: RouteSlot,
    pub parties: Vec<AccountSlot>,
}

impl DayAssignment {
    /// 转换为待写入的线路拜访记录与拜访任务
    pub fn to_records(&self, visit_header_id: &str, rep_name: &str) -> (RouteVisit, Vec<VisitTask>) {
        let route_visit = RouteVisit {
            route_visit_id: Uuid::new_v4().to_string(),
            visit_header_id: visit_header_id.to_string(),
            route_id: self.slot.route_id.clone(),
            user_id: self.slot.user_id.clone(),
            visit_date: self.date,
            name: rep_name.to_string(),
        };
        let tasks = self
            .parties
            .iter()
            .map(|party| build_task(visit_header_id, &self.slot, party, self.date))
            .collect();
        (route_visit, tasks)
    }
}

/// 由槽位构造拜访任务
pub fn build_task(
    visit_header_id: &str,
    slot: &RouteSlot,
    party: &AccountSlot,
    visit_date: NaiveDate,
) -> VisitTask {
    let account_id = party.account().map(|a| a.account_id.clone());
    VisitTask {
        task_id: Uuid::new_v4().to_string(),
        visit_header_id: visit_header_id.to_string(),
        route_id: slot.route_id.clone(),
        regarding_account_id: account_id.clone(),
        account_id,
        subject: party.subject(),
        visit_date,
        owner_id: slot.user_id.clone(),
        plan_status: party.account().map(|_| PlanStatus::Planned),
        task_type: party.task_type(),
    }
}

/// 为一个工作日分配线路与客户
///
/// # 参数
/// - cursors: 上一个工作日结束时的游标
///
/// # 返回
/// (当日分配, 前进后的游标); 线路序列为空或线路无客户清单时 None
pub fn assign_day(
    date: NaiveDate,
    allocation: &RouteAllocation,
    per_day: u32,
    cursors: AssignmentCursors,
) -> Option<(DayAssignment, AssignmentCursors)> {
    let AssignmentCursors { slot, mut parties } = cursors;

    let (idx, slot) = slot.advance(allocation.slot_sequence.len())?;
    let route_slot = allocation.slot_sequence.get(idx)?.clone();
    let plan = allocation.plan_for(&route_slot.route_id)?;

    let mut day_parties = Vec::with_capacity(per_day as usize);
    for _ in 0..per_day {
        let party_idx = parties.advance(&plan.route_id, plan.parties.len())?;
        day_parties.push(plan.parties.get(party_idx)?.clone());
    }

    Some((
        DayAssignment {
            date,
            slot: route_slot,
            parties: day_parties,
        },
        AssignmentCursors { slot, parties },
    ))
}

// ==========================================
// DayLoopOutcome - 主循环统计
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayLoopOutcome {
    pub working_days: u32,
    pub route_visits: u32,
    pub tasks: u32,
    pub placeholder_tasks: u32,
    pub account_visits: BTreeMap<String, i32>, // account_id → 真实拜访次数
}

// ==========================================
// DayAssignmentLoop - 逐日分配主循环
// ==========================================
pub struct DayAssignmentLoop {
    calendar: WorkingCalendar,
    visit_repo: Arc<VisitRepository>,
}

impl DayAssignmentLoop {
    pub fn new(calendar: WorkingCalendar, visit_repo: Arc<VisitRepository>) -> Self {
        Self {
            calendar,
            visit_repo,
        }
    }

    /// 按日期升序遍历目标月, 对每个工作日写入线路拜访与拜访任务
    #[instrument(skip(self, allocation), fields(month = %month, slots = allocation.slot_sequence.len()))]
    pub fn run(
        &self,
        month: &TargetMonth,
        allocation: &RouteAllocation,
        per_day: u32,
        visit_header_id: &str,
        rep_name: &str,
    ) -> AllocationResult<DayLoopOutcome> {
        let mut outcome = DayLoopOutcome::default();
        let mut cursors = AssignmentCursors::default();

        for date in month.days() {
            if !self.calendar.is_working_day(date)? {
                continue;
            }
            outcome.working_days += 1;

            let Some((day, next)) = assign_day(date, allocation, per_day, cursors.clone()) else {
                continue;
            };
            cursors = next;

            let (route_visit, tasks) = day.to_records(visit_header_id, rep_name);
            self.visit_repo.create_route_visit(&route_visit)?;
            outcome.route_visits += 1;

            for task in &tasks {
                self.visit_repo.create_task(task)?;
                outcome.tasks += 1;
                match &task.account_id {
                    Some(account_id) => {
                        *outcome.account_visits.entry(account_id.clone()).or_insert(0) += 1
                    }
                    None => outcome.placeholder_tasks += 1,
                }
            }

            debug!(
                date = %date,
                route_id = %day.slot.route_id,
                tasks = tasks.len(),
                "工作日分配完成"
            );
        }

        Ok(outcome)
    }
}
