// ==========================================
// 月度拜访计划分配系统 - 分配参数
// ==========================================

use crate::domain::types::UserRole;
use crate::engine::party_route::DEFAULT_SHORTFALL_LIMIT;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_LOB_CODE: i64 = 100_000_000;
pub const DEFAULT_DEGROWTH_CUTOFF_PCT: f64 = -10.0;

/// 一次批处理运行所需的全部参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocatorConfig {
    pub region_id: String,
    pub lob_code: i64,
    pub roles: Vec<UserRole>,
    pub degrowth_cutoff_pct: f64,
    pub placeholder_shortfall_limit: u32,
    pub run_date: Option<NaiveDate>, // None → 当天
}

impl AllocatorConfig {
    /// 以默认参数构造指定区域的配置
    pub fn for_region(region_id: &str) -> Self {
        Self {
            region_id: region_id.to_string(),
            lob_code: DEFAULT_LOB_CODE,
            roles: default_roles(),
            degrowth_cutoff_pct: DEFAULT_DEGROWTH_CUTOFF_PCT,
            placeholder_shortfall_limit: DEFAULT_SHORTFALL_LIMIT,
            run_date: None,
        }
    }
}

pub fn default_roles() -> Vec<UserRole> {
    vec![
        UserRole::DealerOfficer,
        UserRole::AreaManager,
        UserRole::RetailOfficer,
    ]
}
