// ==========================================
// 月度拜访计划分配系统 - 工作日历引擎
// ==========================================
// 工作日 = 非周六/周日 且 不在节假日表中
// 月度工作日数: 一次区间查询节假日后本地计算
// 逐日判定: 每个日期单独查询一次节假日表 (不缓存)
// ==========================================

use crate::domain::calendar::TargetMonth;
use crate::engine::error::AllocationResult;
use crate::repository::HolidayRepository;
use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument};

/// 是否周末
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// 在给定节假日集合下统计月内工作日数
///
/// 落在周末的节假日不重复扣减。
pub fn count_working_days(month: &TargetMonth, holidays: &HashSet<NaiveDate>) -> u32 {
    month
        .days()
        .filter(|d| !is_weekend(*d) && !holidays.contains(d))
        .count() as u32
}

// ==========================================
// WorkingCalendar - 基于节假日表的工作日历
// ==========================================
pub struct WorkingCalendar {
    holiday_repo: Arc<HolidayRepository>,
}

impl WorkingCalendar {
    pub fn new(holiday_repo: Arc<HolidayRepository>) -> Self {
        Self { holiday_repo }
    }

    /// 目标月工作日数
    #[instrument(skip(self), fields(month = %month))]
    pub fn working_day_count(&self, month: &TargetMonth) -> AllocationResult<u32> {
        let holidays: HashSet<NaiveDate> = self
            .holiday_repo
            .find_in_range(month.first_day, month.last_day)?
            .into_iter()
            .collect();
        let count = count_working_days(month, &holidays);
        debug!(holidays = holidays.len(), working_days = count, "工作日统计完成");
        Ok(count)
    }

    /// 单日是否工作日
    pub fn is_working_day(&self, date: NaiveDate) -> AllocationResult<bool> {
        if is_weekend(date) {
            return Ok(false);
        }
        Ok(!self.holiday_repo.is_holiday(date)?)
    }
}
