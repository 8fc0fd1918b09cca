// ==========================================
// 月度拜访计划分配系统 - 领域类型定义
// ==========================================
// 说明: 业务平台以整数选项码 (option set) 存储枚举,
//       这里统一做 选项码 <-> 枚举 的双向映射
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 销售代表角色 (User Role)
// ==========================================
// 决定评分阈值表与合规拜访配额
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    DealerOfficer,  // 100000001: 经销商专员
    AreaManager,    // 100000004: 区域经理
    RetailOfficer,  // 515140009: 零售专员
    Other(i64),     // 未参与评分的其他角色
}

impl UserRole {
    pub const DEALER_OFFICER_CODE: i64 = 100_000_001;
    pub const AREA_MANAGER_CODE: i64 = 100_000_004;
    pub const RETAIL_OFFICER_CODE: i64 = 515_140_009;

    pub fn from_code(code: i64) -> Self {
        match code {
            Self::DEALER_OFFICER_CODE => UserRole::DealerOfficer,
            Self::AREA_MANAGER_CODE => UserRole::AreaManager,
            Self::RETAIL_OFFICER_CODE => UserRole::RetailOfficer,
            other => UserRole::Other(other),
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            UserRole::DealerOfficer => Self::DEALER_OFFICER_CODE,
            UserRole::AreaManager => Self::AREA_MANAGER_CODE,
            UserRole::RetailOfficer => Self::RETAIL_OFFICER_CODE,
            UserRole::Other(code) => *code,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::DealerOfficer => write!(f, "DEALER_OFFICER"),
            UserRole::AreaManager => write!(f, "AREA_MANAGER"),
            UserRole::RetailOfficer => write!(f, "RETAIL_OFFICER"),
            UserRole::Other(code) => write!(f, "OTHER({})", code),
        }
    }
}

// ==========================================
// 客户类型 (Customer Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerType {
    Dealer,     // 100000002: 经销商
    Retailer,   // 100000003: 零售商
    Other(i64),
}

impl CustomerType {
    pub const DEALER_CODE: i64 = 100_000_002;
    pub const RETAILER_CODE: i64 = 100_000_003;

    pub fn from_code(code: i64) -> Self {
        match code {
            Self::DEALER_CODE => CustomerType::Dealer,
            Self::RETAILER_CODE => CustomerType::Retailer,
            other => CustomerType::Other(other),
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            CustomerType::Dealer => Self::DEALER_CODE,
            CustomerType::Retailer => Self::RETAILER_CODE,
            CustomerType::Other(code) => *code,
        }
    }
}

impl fmt::Display for CustomerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CustomerType::Dealer => write!(f, "DEALER"),
            CustomerType::Retailer => write!(f, "RETAILER"),
            CustomerType::Other(code) => write!(f, "OTHER({})", code),
        }
    }
}

// ==========================================
// 拜访计划审批状态 (Approval Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    Pending, // 100000000: 待审批
}

impl ApprovalStatus {
    pub fn code(&self) -> i64 {
        match self {
            ApprovalStatus::Pending => 100_000_000,
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApprovalStatus::Pending => write!(f, "PENDING"),
        }
    }
}

// ==========================================
// 拜访任务类型 (Task Type)
// ==========================================
// CustomerVisit: 真实客户拜访
// NonCustomerVisit: 占位拜访 (无对应客户)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    CustomerVisit,
    NonCustomerVisit,
}

impl TaskType {
    /// 占位拜访在业务平台上的 (task_type, other_task_type) 选项码
    pub const NON_CUSTOMER_TASK_CODE: i64 = 100_000_002;
    pub const NON_CUSTOMER_OTHER_TASK_CODE: i64 = 100_000_005;

    /// 任务类型选项码 (真实客户拜访不填)
    pub fn task_code(&self) -> Option<i64> {
        match self {
            TaskType::CustomerVisit => None,
            TaskType::NonCustomerVisit => Some(Self::NON_CUSTOMER_TASK_CODE),
        }
    }

    /// 其他任务类型选项码 (真实客户拜访不填)
    pub fn other_task_code(&self) -> Option<i64> {
        match self {
            TaskType::CustomerVisit => None,
            TaskType::NonCustomerVisit => Some(Self::NON_CUSTOMER_OTHER_TASK_CODE),
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskType::CustomerVisit => write!(f, "CUSTOMER_VISIT"),
            TaskType::NonCustomerVisit => write!(f, "NON_CUSTOMER_VISIT"),
        }
    }
}

impl std::str::FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CUSTOMER_VISIT" => Ok(TaskType::CustomerVisit),
            "NON_CUSTOMER_VISIT" => Ok(TaskType::NonCustomerVisit),
            other => Err(format!("未知任务类型: {}", other)),
        }
    }
}

// ==========================================
// 计划状态 (Plan Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanStatus {
    Planned, // 100000000: 已计划
}

impl PlanStatus {
    pub fn code(&self) -> i64 {
        match self {
            PlanStatus::Planned => 100_000_000,
        }
    }
}
