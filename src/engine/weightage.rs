// ==========================================
// 月度拜访计划分配系统 - 客户权重评分引擎
// ==========================================
// 规则: 按名次百分位分档
//   队列长度 N, 名次 r (1 起), 档位 {p1→w1, p2→w2, ...} 按百分比升序
//   r <= ceil(N·p1) → w1; 否则 r <= ceil(N·p2) → w2; ...; 都不满足 → 尾档权重
// 红线: 名次只由队列既有顺序决定, 不做二次排序
// ==========================================

use crate::domain::account::Account;
use crate::domain::types::{CustomerType, UserRole};
use serde::{Deserialize, Serialize};

// ==========================================
// ScoringPass - 评分轮次
// ==========================================
// 固定顺序: 下滑客户 → 经销商 → 零售商
// 后两轮只评尚未获得权重的客户, 因此顺序不可调换
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScoringPass {
    Degrowing,
    Dealer,
    Retailer,
}

impl ScoringPass {
    pub const ORDERED: [ScoringPass; 3] =
        [ScoringPass::Degrowing, ScoringPass::Dealer, ScoringPass::Retailer];

    /// 本轮对应的客户类型 (下滑轮不限类型)
    pub fn customer_type(&self) -> Option<CustomerType> {
        match self {
            ScoringPass::Degrowing => None,
            ScoringPass::Dealer => Some(CustomerType::Dealer),
            ScoringPass::Retailer => Some(CustomerType::Retailer),
        }
    }
}

impl std::fmt::Display for ScoringPass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoringPass::Degrowing => write!(f, "DEGROWING"),
            ScoringPass::Dealer => write!(f, "DEALER"),
            ScoringPass::Retailer => write!(f, "RETAILER"),
        }
    }
}

// ==========================================
// ThresholdTable - 百分位阈值表
// ==========================================

/// 单个档位: 累计百分比上限 → 权重
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdBand {
    pub percent: u32,
    pub weight: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdTable {
    pub bands: &'static [ThresholdBand],
    pub tail_weight: i32,
}

const TOP_DECILE_BANDS: &[ThresholdBand] = &[ThresholdBand { percent: 10, weight: 4 }];

const QUARTILE_BANDS: &[ThresholdBand] = &[
    ThresholdBand { percent: 20, weight: 4 },
    ThresholdBand { percent: 50, weight: 3 },
    ThresholdBand { percent: 75, weight: 2 },
];

const RETAIL_SPLIT_BANDS: &[ThresholdBand] = &[
    ThresholdBand { percent: 30, weight: 4 },
    ThresholdBand { percent: 50, weight: 3 },
];

impl ThresholdTable {
    /// 前 10% 得 4 分, 其余 0 分
    pub const TOP_DECILE: ThresholdTable = ThresholdTable {
        bands: TOP_DECILE_BANDS,
        tail_weight: 0,
    };

    /// {20%→4, 50%→3, 75%→2}, 其余 1 分
    pub const QUARTILES_WITH_TAIL: ThresholdTable = ThresholdTable {
        bands: QUARTILE_BANDS,
        tail_weight: 1,
    };

    /// {20%→4, 50%→3, 75%→2}, 其余 0 分
    pub const QUARTILES: ThresholdTable = ThresholdTable {
        bands: QUARTILE_BANDS,
        tail_weight: 0,
    };

    /// {30%→4, 50%→3}, 其余 0 分
    pub const RETAIL_SPLIT: ThresholdTable = ThresholdTable {
        bands: RETAIL_SPLIT_BANDS,
        tail_weight: 0,
    };

    /// 不参与评分: 全部 0 分
    pub const NONE: ThresholdTable = ThresholdTable {
        bands: &[],
        tail_weight: 0,
    };

    /// 按 (评分轮次, 代表角色) 选取阈值表
    pub fn for_pass(pass: ScoringPass, role: UserRole) -> ThresholdTable {
        match (pass, role) {
            (ScoringPass::Degrowing, _) => Self::TOP_DECILE,

            (ScoringPass::Dealer, UserRole::DealerOfficer) => Self::QUARTILES_WITH_TAIL,
            (ScoringPass::Dealer, UserRole::AreaManager) => Self::QUARTILES,
            (ScoringPass::Dealer, _) => Self::NONE,

            (ScoringPass::Retailer, UserRole::RetailOfficer) => Self::QUARTILES_WITH_TAIL,
            (ScoringPass::Retailer, UserRole::DealerOfficer) => Self::RETAIL_SPLIT,
            (ScoringPass::Retailer, UserRole::AreaManager) => Self::TOP_DECILE,
            (ScoringPass::Retailer, _) => Self::NONE,
        }
    }

    /// 名次 (1 起) 对应的权重, 名次上限为 ceil(N·p/100)
    pub fn weight_for_rank(&self, rank: usize, cohort_len: usize) -> i32 {
        self.bands
            .iter()
            .find(|band| rank <= ceil_percent(cohort_len, band.percent))
            .map(|band| band.weight)
            .unwrap_or(self.tail_weight)
    }

    /// 为长度为 N 的队列逐名次给出权重
    pub fn score(&self, cohort_len: usize) -> Vec<i32> {
        (1..=cohort_len)
            .map(|rank| self.weight_for_rank(rank, cohort_len))
            .collect()
    }
}

/// ceil(n · percent / 100)，整数运算避免浮点误差
fn ceil_percent(n: usize, percent: u32) -> usize {
    let scaled = n * percent as usize;
    (scaled + 99) / 100
}

// ==========================================
// ScoredAccount - 单个客户的评分结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredAccount {
    pub account_id: String,
    pub route_id: String,
    pub rank: usize,
    pub weight: i32,
}

/// 对一个评分队列打分
///
/// 队列须已按本轮规则排好序; 未映射线路的客户不计名次也不出现在结果中。
pub fn score_cohort(pass: ScoringPass, role: UserRole, cohort: &[Account]) -> Vec<ScoredAccount> {
    let routed: Vec<(&Account, &String)> = cohort
        .iter()
        .filter_map(|a| a.route_id.as_ref().map(|r| (a, r)))
        .collect();

    let table = ThresholdTable::for_pass(pass, role);
    let weights = table.score(routed.len());

    routed
        .into_iter()
        .zip(weights)
        .enumerate()
        .map(|(idx, ((account, route_id), weight))| ScoredAccount {
            account_id: account.account_id.clone(),
            route_id: route_id.clone(),
            rank: idx + 1,
            weight,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(id: &str, route: Option<&str>) -> Account {
        Account {
            account_id: id.to_string(),
            name: format!("Party {}", id),
            owner_id: "U1".to_string(),
            region_id: "R1".to_string(),
            route_id: route.map(|r| r.to_string()),
            customer_type: CustomerType::Dealer,
            actual_sale: 0.0,
            sale_till_last_month: 0.0,
            ytd_sale: Some(0.0),
            growth_pct: None,
            weightage: 0,
            visit_count: 0,
        }
    }

    #[test]
    fn test_ceil_percent() {
        assert_eq!(ceil_percent(10, 20), 2);
        assert_eq!(ceil_percent(11, 20), 3);
        assert_eq!(ceil_percent(7, 10), 1);
        assert_eq!(ceil_percent(0, 75), 0);
        assert_eq!(ceil_percent(4, 75), 3);
    }

    #[test]
    fn test_quartiles_with_tail_for_ten_accounts() {
        // 名次上限: 2, 5, 8
        let weights = ThresholdTable::QUARTILES_WITH_TAIL.score(10);
        assert_eq!(weights, vec![4, 4, 3, 3, 3, 2, 2, 2, 1, 1]);
    }

    #[test]
    fn test_quartiles_without_tail_for_ten_accounts() {
        let weights = ThresholdTable::QUARTILES.score(10);
        assert_eq!(weights, vec![4, 4, 3, 3, 3, 2, 2, 2, 0, 0]);
    }

    #[test]
    fn test_top_decile_always_scores_first_rank() {
        // ceil(3·0.1) = 1
        assert_eq!(ThresholdTable::TOP_DECILE.score(3), vec![4, 0, 0]);
        // ceil(11·0.1) = 2
        let weights = ThresholdTable::TOP_DECILE.score(11);
        assert_eq!(weights.iter().filter(|w| **w == 4).count(), 2);
    }

    #[test]
    fn test_retail_split() {
        // 名次上限: ceil(3)=3, ceil(5)=5
        assert_eq!(
            ThresholdTable::RETAIL_SPLIT.score(10),
            vec![4, 4, 4, 3, 3, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_weight_for_rank_band_edges() {
        let table = ThresholdTable::QUARTILES_WITH_TAIL;
        // N=2: 名次上限 1, 1, 2
        assert_eq!(table.weight_for_rank(1, 2), 4);
        assert_eq!(table.weight_for_rank(2, 2), 2);
        // N=4: 名次上限 1, 2, 3
        assert_eq!(table.weight_for_rank(3, 4), 2);
        assert_eq!(table.weight_for_rank(4, 4), 1);
        assert_eq!(ThresholdTable::NONE.weight_for_rank(1, 4), 0);
    }

    #[test]
    fn test_table_selection_by_role() {
        assert_eq!(
            ThresholdTable::for_pass(ScoringPass::Dealer, UserRole::DealerOfficer),
            ThresholdTable::QUARTILES_WITH_TAIL
        );
        assert_eq!(
            ThresholdTable::for_pass(ScoringPass::Dealer, UserRole::RetailOfficer),
            ThresholdTable::NONE
        );
        assert_eq!(
            ThresholdTable::for_pass(ScoringPass::Retailer, UserRole::AreaManager),
            ThresholdTable::TOP_DECILE
        );
        assert_eq!(
            ThresholdTable::for_pass(ScoringPass::Degrowing, UserRole::Other(1)),
            ThresholdTable::TOP_DECILE
        );
    }

    #[test]
    fn test_score_cohort_skips_unrouted_accounts() {
        let cohort = vec![
            account("A1", Some("RT1")),
            account("A2", None),
            account("A3", Some("RT2")),
        ];
        let scored = score_cohort(ScoringPass::Dealer, UserRole::DealerOfficer, &cohort);
        assert_eq!(scored.len(), 2);
        assert_eq!(scored[0].account_id, "A1");
        assert_eq!(scored[0].rank, 1);
        assert_eq!(scored[1].account_id, "A3");
        assert_eq!(scored[1].rank, 2);
        // N=2: 名次上限 1, 1, 2 → [4, 2]
        assert_eq!(scored[0].weight, 4);
        assert_eq!(scored[1].weight, 2);
    }
}
