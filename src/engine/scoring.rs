// ==========================================
// 月度拜访计划分配系统 - 三轮评分流水线
// ==========================================
// 顺序: 下滑客户 → 经销商 → 零售商
// 每轮: 读取队列 → 打分 → 回写客户权重 → 并入线路权重
// 红线: 引擎不拼 SQL, 队列筛选与排序由 AccountRepository 完成
// ==========================================

use crate::domain::account::Account;
use crate::domain::representative::Representative;
use crate::engine::error::AllocationResult;
use crate::engine::route_weight::{aggregate, RouteWeights};
use crate::engine::weightage::{score_cohort, ScoredAccount, ScoringPass};
use crate::repository::AccountRepository;
use std::sync::Arc;
use tracing::{debug, instrument};

// ==========================================
// ScoringPipeline - 评分流水线
// ==========================================
pub struct ScoringPipeline {
    account_repo: Arc<AccountRepository>,
    degrowth_cutoff_pct: f64,
}

impl ScoringPipeline {
    pub fn new(account_repo: Arc<AccountRepository>, degrowth_cutoff_pct: f64) -> Self {
        Self {
            account_repo,
            degrowth_cutoff_pct,
        }
    }

    /// 为一个代表依次执行三轮评分
    ///
    /// # 参数
    /// - rep: 销售代表
    /// - region_id: 运行区域 (经销商/零售商队列按此过滤)
    ///
    /// # 返回
    /// 三轮累加后的线路权重
    #[instrument(skip(self, rep), fields(user_id = %rep.user_id, role = %rep.role))]
    pub fn score_representative(
        &self,
        rep: &Representative,
        region_id: &str,
    ) -> AllocationResult<RouteWeights> {
        ScoringPass::ORDERED
            .iter()
            .try_fold(RouteWeights::new(), |weights, pass| -> AllocationResult<RouteWeights> {
                let cohort = self.load_cohort(*pass, rep, region_id)?;
                let scored = score_cohort(*pass, rep.role, &cohort);
                self.persist_weights(&scored)?;

                debug!(
                    pass = %pass,
                    cohort_size = cohort.len(),
                    scored_positive = scored.iter().filter(|s| s.weight > 0).count(),
                    "评分轮次完成"
                );
                Ok(aggregate(weights, &scored))
            })
    }

    fn load_cohort(
        &self,
        pass: ScoringPass,
        rep: &Representative,
        region_id: &str,
    ) -> AllocationResult<Vec<Account>> {
        let cohort = match pass.customer_type() {
            None => self
                .account_repo
                .find_degrowing(&rep.user_id, self.degrowth_cutoff_pct)?,
            Some(customer_type) => {
                self.account_repo
                    .find_cohort_candidates(&rep.user_id, region_id, customer_type)?
            }
        };
        Ok(cohort)
    }

    fn persist_weights(&self, scored: &[ScoredAccount]) -> AllocationResult<()> {
        for item in scored {
            self.account_repo.update_weightage(&item.account_id, item.weight)?;
        }
        Ok(())
    }
}
