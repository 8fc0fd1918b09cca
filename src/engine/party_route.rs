// ==========================================
// 月度拜访计划分配系统 - 线路客户分配
// ==========================================
// 每条权重 > 0 的线路:
//   slots = count / per_day
//   slots > 0 且 缺口 (per_day - count % per_day) <= 上限 → slots + 1, 补缺口个占位
//   slots == 0 → slots = 1, 补 (per_day - count) 个占位
// 全局线路序列: 按线路权重降序, 每条线路连续出现 slots 次
// ==========================================

use crate::domain::account::Account;
use crate::domain::visit::{AccountSlot, RouteSlot};
use serde::{Deserialize, Serialize};

/// 默认占位补齐上限
pub const DEFAULT_SHORTFALL_LIMIT: u32 = 3;

// ==========================================
// SlotPlan - 单条线路的天数与占位数
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotPlan {
    pub slots: u32,
    pub placeholders: u32,
}

/// 计算线路占用天数与需补齐的占位数
///
/// # 参数
/// - count: 线路上可拜访客户数
/// - per_day: 每日拜访数
/// - shortfall_limit: 缺口不超过此值时多占一天并以占位补齐
pub fn compute_slots(count: u32, per_day: u32, shortfall_limit: u32) -> SlotPlan {
    if per_day == 0 {
        return SlotPlan {
            slots: 1,
            placeholders: 0,
        };
    }

    let slots = count / per_day;
    let shortfall = per_day - count % per_day;

    if slots > 0 && shortfall <= shortfall_limit {
        SlotPlan {
            slots: slots + 1,
            placeholders: shortfall,
        }
    } else if slots == 0 {
        SlotPlan {
            slots: 1,
            placeholders: per_day - count,
        }
    } else {
        SlotPlan {
            slots,
            placeholders: 0,
        }
    }
}

// ==========================================
// RoutePartyPlan - 单条线路的客户清单
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePartyPlan {
    pub route_id: String,
    pub weight: i32,
    pub slot_plan: SlotPlan,
    pub parties: Vec<AccountSlot>, // 真实客户 (权重降序) + 尾部占位
}

impl RoutePartyPlan {
    pub fn real_count(&self) -> usize {
        self.parties.iter().filter(|p| !p.is_placeholder()).count()
    }

    pub fn placeholder_count(&self) -> usize {
        self.parties.iter().filter(|p| p.is_placeholder()).count()
    }
}

/// 为单条线路构造客户清单
///
/// # 返回
/// - None: 线路上没有可拜访客户
pub fn build_route_plan(
    route_id: &str,
    weight: i32,
    accounts: Vec<Account>,
    per_day: u32,
    shortfall_limit: u32,
) -> Option<RoutePartyPlan> {
    if accounts.is_empty() {
        return None;
    }

    let slot_plan = compute_slots(accounts.len() as u32, per_day, shortfall_limit);
    let parties = accounts
        .into_iter()
        .map(AccountSlot::Real)
        .chain(std::iter::repeat(AccountSlot::Placeholder).take(slot_plan.placeholders as usize))
        .collect();

    Some(RoutePartyPlan {
        route_id: route_id.to_string(),
        weight,
        slot_plan,
        parties,
    })
}

// ==========================================
// RouteAllocation - 代表的全部线路计划
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteAllocation {
    pub plans: Vec<RoutePartyPlan>,
    pub slot_sequence: Vec<RouteSlot>,
}

impl RouteAllocation {
    /// 由已按权重降序排列的线路计划构造全局线路序列
    pub fn from_plans(plans: Vec<RoutePartyPlan>, user_id: &str) -> Self {
        let slot_sequence = plans
            .iter()
            .flat_map(|plan| {
                std::iter::repeat(RouteSlot {
                    route_id: plan.route_id.clone(),
                    user_id: user_id.to_string(),
                })
                .take(plan.slot_plan.slots as usize)
            })
            .collect();
        Self {
            plans,
            slot_sequence,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slot_sequence.is_empty()
    }

    pub fn plan_for(&self, route_id: &str) -> Option<&RoutePartyPlan> {
        self.plans.iter().find(|p| p.route_id == route_id)
    }
}
