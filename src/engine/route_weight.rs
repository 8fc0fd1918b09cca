// ==========================================
// 月度拜访计划分配系统 - 线路权重聚合
// ==========================================
// 规则: 线路权重 = 三轮评分中其成员客户权重之和
// 红线: 只累加, 不覆盖; 每轮以上一轮结果为起点
// ==========================================

use crate::engine::weightage::ScoredAccount;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// RouteWeights - 线路 → 累计权重
// ==========================================
// 保留线路首次出现的顺序, 便于日志与回写顺序稳定
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteWeights {
    order: Vec<String>,
    weights: HashMap<String, i32>,
}

impl RouteWeights {
    pub fn new() -> Self {
        Self::default()
    }

    /// 累加单条线路的权重
    pub fn add(&mut self, route_id: &str, weight: i32) {
        match self.weights.get_mut(route_id) {
            Some(total) => *total += weight,
            None => {
                self.order.push(route_id.to_string());
                self.weights.insert(route_id.to_string(), weight);
            }
        }
    }

    pub fn get(&self, route_id: &str) -> Option<i32> {
        self.weights.get(route_id).copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// 线路ID (首次出现顺序)
    pub fn route_ids(&self) -> Vec<String> {
        self.order.clone()
    }

    /// (线路ID, 累计权重) 列表 (首次出现顺序)
    pub fn as_pairs(&self) -> Vec<(String, i32)> {
        self.order
            .iter()
            .map(|route_id| (route_id.clone(), self.weights.get(route_id).copied().unwrap_or(0)))
            .collect()
    }

    /// 权重 > 0 的线路数
    pub fn positive_count(&self) -> usize {
        self.weights.values().filter(|w| **w > 0).count()
    }
}

/// 把一轮评分结果并入已有映射
///
/// # 参数
/// - existing: 上一轮结束时的映射
/// - contribution: 本轮评分结果
///
/// # 返回
/// 新映射: 未见过的线路插入, 已有线路权重递增
pub fn aggregate(existing: RouteWeights, contribution: &[ScoredAccount]) -> RouteWeights {
    contribution.iter().fold(existing, |mut acc, scored| {
        acc.add(&scored.route_id, scored.weight);
        acc
    })
}
