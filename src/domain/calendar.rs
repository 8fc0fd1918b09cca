// ==========================================
// 月度拜访计划分配系统 - 目标月份
// ==========================================
// 规则: 目标月份恒为运行日期的下一个自然月
// ==========================================

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

// ==========================================
// TargetMonth - 排程目标月份
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetMonth {
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
}

impl TargetMonth {
    /// 由运行日期推导目标月份 (下一个自然月)
    pub fn next_after(run_date: NaiveDate) -> Option<Self> {
        let first_of_current = run_date.with_day(1)?;
        let first_day = first_of_current.checked_add_months(Months::new(1))?;
        Self::starting(first_day)
    }

    /// 以某月 1 日构造目标月份
    pub fn starting(first_day: NaiveDate) -> Option<Self> {
        let first_day = first_day.with_day(1)?;
        let last_day = first_day
            .checked_add_months(Months::new(1))?
            .pred_opt()?;
        Some(Self { first_day, last_day })
    }

    /// 月份英文全称 (如 "March")
    pub fn month_name(&self) -> String {
        self.first_day.format("%B").to_string()
    }

    /// 月内天数
    pub fn len_days(&self) -> u32 {
        self.last_day.day()
    }

    /// 按升序迭代月内所有日期
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let last_day = self.last_day;
        self.first_day.iter_days().take_while(move |d| *d <= last_day)
    }
}

impl std::fmt::Display for TargetMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.first_day.format("%Y-%m"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_next_after_mid_month() {
        let month = TargetMonth::next_after(d(2026, 10, 16)).unwrap();
        assert_eq!(month.first_day, d(2026, 11, 1));
        assert_eq!(month.last_day, d(2026, 11, 30));
        assert_eq!(month.len_days(), 30);
        assert_eq!(month.month_name(), "November");
    }

    #[test]
    fn test_next_after_rolls_year() {
        let month = TargetMonth::next_after(d(2026, 12, 31)).unwrap();
        assert_eq!(month.first_day, d(2027, 1, 1));
        assert_eq!(month.last_day, d(2027, 1, 31));
    }

    #[test]
    fn test_leap_february() {
        let month = TargetMonth::next_after(d(2028, 1, 31)).unwrap();
        assert_eq!(month.last_day, d(2028, 2, 29));
        assert_eq!(month.days().count(), 29);
    }
}
