// ==========================================
// 月度拜访计划分配系统 - 客户领域模型
// ==========================================
// 职责: 客户 (Account) 实体定义
// 红线: 评分时每个客户只归属一条线路
// ==========================================

use crate::domain::types::CustomerType;
use serde::{Deserialize, Serialize};

// ==========================================
// Account - 客户
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    // ===== 主键 =====
    pub account_id: String,
    pub name: String,

    // ===== 归属 =====
    pub owner_id: String,          // 所属销售代表
    pub region_id: String,         // 所属区域
    pub route_id: Option<String>,  // 线路映射 (未映射的客户不参与评分)
    pub customer_type: CustomerType,

    // ===== 销量 =====
    pub actual_sale: f64,            // 本期实际销量
    pub sale_till_last_month: f64,   // 截至上月累计销量
    pub ytd_sale: Option<f64>,       // 年累计销量 (actual + till_last_month)
    pub growth_pct: Option<f64>,     // 按比例折算的年累计增长率 (%), 负数为下滑

    // ===== 计算输出 =====
    pub weightage: i32,    // 权重 0-4
    pub visit_count: i32,  // 本月计划拜访次数
}

impl Account {
    /// 是否为下滑客户 (增长率严格低于阈值)
    pub fn is_degrowing(&self, cutoff_pct: f64) -> bool {
        matches!(self.growth_pct, Some(g) if g < cutoff_pct)
    }

    /// 拜访任务主题
    pub fn visit_subject(&self) -> String {
        format!("Visit for {}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(growth: Option<f64>) -> Account {
        Account {
            account_id: "A1".to_string(),
            name: "Shree Traders".to_string(),
            owner_id: "U1".to_string(),
            region_id: "R1".to_string(),
            route_id: Some("RT1".to_string()),
            customer_type: CustomerType::Dealer,
            actual_sale: 0.0,
            sale_till_last_month: 0.0,
            ytd_sale: Some(0.0),
            growth_pct: growth,
            weightage: 0,
            visit_count: 0,
        }
    }

    #[test]
    fn test_is_degrowing_strictly_below_cutoff() {
        assert!(account(Some(-10.5)).is_degrowing(-10.0));
        assert!(!account(Some(-10.0)).is_degrowing(-10.0));
        assert!(!account(None).is_degrowing(-10.0));
    }

    #[test]
    fn test_visit_subject() {
        assert_eq!(account(None).visit_subject(), "Visit for Shree Traders");
    }
}
