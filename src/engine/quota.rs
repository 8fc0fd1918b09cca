// ==========================================
// 月度拜访计划分配系统 - 拜访配额规划
// ==========================================
// per_day = quota / working_days, remainder = quota % working_days
// 不变式: per_day · working_days + remainder == quota
// ==========================================

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitQuotaPlan {
    pub quota: u32,
    pub working_days: u32,
    pub per_day: u32,
    pub remainder: u32,
}

impl VisitQuotaPlan {
    /// 计算每日拜访数与余量
    ///
    /// # 返回
    /// - None: working_days 为 0 (无法分配)
    pub fn compute(quota: u32, working_days: u32) -> Option<Self> {
        if working_days == 0 {
            return None;
        }
        Some(Self {
            quota,
            working_days,
            per_day: quota / working_days,
            remainder: quota % working_days,
        })
    }

    /// 主循环 + 余量分配后应产生的拜访任务总数
    pub fn total_visits(&self) -> u32 {
        self.per_day * self.working_days + self.remainder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_example() {
        let plan = VisitQuotaPlan::compute(45, 22).unwrap();
        assert_eq!(plan.per_day, 2);
        assert_eq!(plan.remainder, 1);
    }

    #[test]
    fn test_zero_working_days_is_guarded() {
        assert!(VisitQuotaPlan::compute(45, 0).is_none());
    }

    #[test]
    fn test_quota_invariant() {
        for quota in 0..200 {
            for working_days in 1..32 {
                let plan = VisitQuotaPlan::compute(quota, working_days).unwrap();
                assert_eq!(plan.total_visits(), quota);
                assert!(plan.remainder < working_days);
            }
        }
    }
}
