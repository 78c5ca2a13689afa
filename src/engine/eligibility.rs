// ==========================================
// 班次排班系统 - 资格过滤引擎
// ==========================================
// 红线: 全部为硬约束，任何一步都不回退
// ==========================================
// 职责: 槽位 → 申请池中的合格候选集合
// 步骤: 匹配 → 当日占用 → 时段 → 周配额 → 资质
// 输出: 候选集合 + 决定性淘汰原因（集合为空时）
// ==========================================

use crate::config::ScheduleConfig;
use crate::domain::assignment::BusyRegistry;
use crate::domain::ledger::FairnessLedger;
use crate::domain::request::{EmployeeRequest, RequestPool};
use crate::domain::shift::ShiftSlot;
use crate::domain::types::UnfilledReason;
use tracing::trace;

/// 过滤规则参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EligibilityRules {
    pub weekly_limit: u32,
    pub strict_hours: bool,
}

impl From<&ScheduleConfig> for EligibilityRules {
    fn from(config: &ScheduleConfig) -> Self {
        Self {
            weekly_limit: config.weekly_limit,
            strict_hours: config.strict_hours,
        }
    }
}

/// 过滤结果
#[derive(Debug, Clone)]
pub struct EligibilityResult<'a> {
    /// 合格候选（保持申请池顺序）
    pub candidates: Vec<&'a EmployeeRequest>,
    /// 匹配日期/站点/班次的申请行数
    pub requester_count: usize,
    /// 候选集合被清空时的决定性步骤
    pub eliminated_by: Option<UnfilledReason>,
}

impl<'a> EligibilityResult<'a> {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// 未排原因（有候选却未选中时归为 UNKNOWN）
    pub fn unfilled_reason(&self) -> UnfilledReason {
        self.eliminated_by.unwrap_or(UnfilledReason::Unknown)
    }
}

// ==========================================
// EligibilityFilter - 资格过滤引擎
// ==========================================
// 红线: 不修改账本与占用，只读快照
#[derive(Debug, Clone)]
pub struct EligibilityFilter {
    rules: EligibilityRules,
}

impl EligibilityFilter {
    pub fn new(rules: EligibilityRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> EligibilityRules {
        self.rules
    }

    /// 计算槽位的合格候选
    ///
    /// # 参数
    /// - slot: 待填充槽位
    /// - pool: 申请池
    /// - busy: 当前的当日占用（随循环变化）
    /// - ledger: 当前账本快照（随循环变化）
    ///
    /// # 返回
    /// 候选集合；集合为空时 eliminated_by 指明最后清空集合的步骤
    pub fn evaluate<'a>(
        &self,
        slot: &ShiftSlot,
        pool: &'a RequestPool,
        busy: &BusyRegistry,
        ledger: &FairnessLedger,
    ) -> EligibilityResult<'a> {
        let date = slot.date();

        // === 步骤 1: 日期 + 班次 + 站点匹配 ===
        let candidates: Vec<&EmployeeRequest> = pool.iter().filter(|r| r.matches_slot(slot)).collect();
        let requester_count = candidates.len();
        if candidates.is_empty() {
            return Self::eliminated(candidates, requester_count, UnfilledReason::NoRequests);
        }

        // === 步骤 2: 当日未被占用 ===
        let candidates: Vec<&EmployeeRequest> = candidates
            .into_iter()
            .filter(|r| !busy.is_busy(date, &r.employee))
            .collect();
        if candidates.is_empty() {
            return Self::eliminated(candidates, requester_count, UnfilledReason::AllRequestersBusy);
        }

        // === 步骤 3: 时段严格匹配（槽位未声明时段则跳过） ===
        let candidates = match (&slot.hours, self.rules.strict_hours) {
            (Some(required), true) => {
                let matched: Vec<&EmployeeRequest> = candidates
                    .into_iter()
                    .filter(|r| r.hours.as_ref() == Some(required))
                    .collect();
                if matched.is_empty() {
                    return Self::eliminated(matched, requester_count, UnfilledReason::HoursMismatch);
                }
                matched
            }
            _ => candidates,
        };

        // === 步骤 4: 周配额 ===
        let weekly_limit = self.rules.weekly_limit;
        let candidates: Vec<&EmployeeRequest> = candidates
            .into_iter()
            .filter(|r| ledger.week_count(&r.employee, date) < weekly_limit)
            .collect();
        if candidates.is_empty() {
            return Self::eliminated(candidates, requester_count, UnfilledReason::WeeklyQuotaExhausted);
        }

        // === 步骤 5: 专项资质 ===
        let candidates = match &slot.required_certification {
            Some(tag) => {
                let certified: Vec<&EmployeeRequest> =
                    candidates.into_iter().filter(|r| r.has_certification(tag)).collect();
                if certified.is_empty() {
                    return Self::eliminated(
                        certified,
                        requester_count,
                        UnfilledReason::CertificationUnavailable,
                    );
                }
                certified
            }
            None => candidates,
        };

        trace!(slot = %slot.key, eligible = candidates.len(), requester_count, "资格过滤完成");

        EligibilityResult {
            candidates,
            requester_count,
            eliminated_by: None,
        }
    }

    fn eliminated<'a>(
        candidates: Vec<&'a EmployeeRequest>,
        requester_count: usize,
        reason: UnfilledReason,
    ) -> EligibilityResult<'a> {
        EligibilityResult {
            candidates,
            requester_count,
            eliminated_by: Some(reason),
        }
    }
}
