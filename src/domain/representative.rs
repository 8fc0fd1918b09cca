// ==========================================
// 月度拜访计划分配系统 - 销售代表领域模型
// ==========================================

use crate::domain::types::UserRole;
use serde::{Deserialize, Serialize};

// ==========================================
// Representative - 销售代表
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Representative {
    pub user_id: String,
    pub full_name: String,
    pub role: UserRole,
    pub region_id: Option<String>, // 用户档案上的区域 (配额以地理映射为准)
    pub lob_code: i64,             // 业务线
}

// ==========================================
// ComplianceQuota - 合规拜访配额
// ==========================================
// (区域, 角色) → 月度应拜访总次数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceQuota {
    pub region_id: String,
    pub role: UserRole,
    pub lob_code: i64,
    pub visit_count: i32,
}
