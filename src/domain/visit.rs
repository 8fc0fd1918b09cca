// ==========================================
// 月度拜访计划分配系统 - 拜访计划领域模型
// ==========================================
// 实体: VisitHeader (月度计划头) / RouteVisit (日线路拜访) / VisitTask (拜访任务)
// 生命周期: 每次运行新建, 分配器不更新也不删除
// ==========================================

use crate::domain::account::Account;
use crate::domain::types::{ApprovalStatus, PlanStatus, TaskType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 占位拜访的主题
pub const PLACEHOLDER_SUBJECT: &str = "Visit for NON-UTCL";

/// 占位拜访的客户名称
pub const PLACEHOLDER_NAME: &str = "not defined";

// ==========================================
// VisitHeader - 月度拜访计划头
// ==========================================
// 每个销售代表每月一条, 分配开始前创建
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitHeader {
    pub visit_header_id: String,
    pub name: String,               // "{代表姓名}-{月份}"
    pub month: String,              // 月份英文全称
    pub header_date: NaiveDate,     // 目标月 1 日
    pub salesperson_id: String,
    pub approver_id: String,
    pub approval_status: ApprovalStatus,
    pub visit_count: i32,           // 月度总拜访次数 (配额)
}

// ==========================================
// RouteSlot - 线路日槽位
// ==========================================
// 全局线路序列中的一项: 一条线路占用一天
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSlot {
    pub route_id: String,
    pub user_id: String, // 当天负责该线路的销售代表
}

// ==========================================
// AccountSlot - 客户槽位
// ==========================================
// Real: 真实客户拜访; Placeholder: 无可用客户时的占位拜访
#[derive(Debug, Clone, PartialEq)]
pub enum AccountSlot {
    Real(Account),
    Placeholder,
}

impl AccountSlot {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, AccountSlot::Placeholder)
    }

    pub fn account(&self) -> Option<&Account> {
        match self {
            AccountSlot::Real(account) => Some(account),
            AccountSlot::Placeholder => None,
        }
    }

    pub fn subject(&self) -> String {
        match self {
            AccountSlot::Real(account) => account.visit_subject(),
            AccountSlot::Placeholder => PLACEHOLDER_SUBJECT.to_string(),
        }
    }

    pub fn task_type(&self) -> TaskType {
        match self {
            AccountSlot::Real(_) => TaskType::CustomerVisit,
            AccountSlot::Placeholder => TaskType::NonCustomerVisit,
        }
    }
}

// ==========================================
// RouteVisit - 日线路拜访记录
// ==========================================
// 每个 (工作日, 线路) 一条
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteVisit {
    pub route_visit_id: String,
    pub visit_header_id: String,
    pub route_id: String,
    pub user_id: String,
    pub visit_date: NaiveDate,
    pub name: String, // 代表姓名
}

// ==========================================
// VisitTask - 拜访任务
// ==========================================
// 每个 (日期, 客户或占位) 槽位一条
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitTask {
    pub task_id: String,
    pub visit_header_id: String,
    pub route_id: String,
    pub account_id: Option<String>,           // 占位拜访为 None
    pub regarding_account_id: Option<String>, // 占位拜访为 None
    pub subject: String,
    pub visit_date: NaiveDate,
    pub owner_id: String,
    pub plan_status: Option<PlanStatus>,      // 仅真实客户拜访
    pub task_type: TaskType,
}

impl VisitTask {
    pub fn is_placeholder(&self) -> bool {
        self.task_type == TaskType::NonCustomerVisit
    }
}
