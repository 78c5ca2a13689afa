// ==========================================
// 班次排班系统 - 排班编排器
// ==========================================
// 用途: 按固定顺序遍历 (日期, 槽位)，驱动过滤与选择
// 红线: 单线程顺序执行；每个槽位的 分配 + 占用 + 账本递增 作为整体提交
// ==========================================
// 顺序: 日期升序（解析后的日期） → 目录顺序
// 输出: 分配列表 + 未排报告 + 已跳过的取消槽位 + 最终账本
// ==========================================

use crate::config::ScheduleConfig;
use crate::domain::assignment::{Assignment, ScheduleOutcome, UnfilledSlot};
use crate::domain::ledger::FairnessLedger;
use crate::domain::request::RequestPool;
use crate::domain::shift::{CancelledSlots, ShiftCatalog, ShiftSlot};
use crate::domain::types::{AssignmentOrigin, UnfilledReason};
use crate::engine::eligibility::{EligibilityFilter, EligibilityRules};
use crate::engine::selector::AssignmentSelector;
use chrono::NaiveDate;
use tracing::{debug, info, instrument};

// ==========================================
// ScheduleOrchestrator - 排班编排器
// ==========================================
#[derive(Debug, Clone)]
pub struct ScheduleOrchestrator {
    filter: EligibilityFilter,
    selector: AssignmentSelector,
}

impl ScheduleOrchestrator {
    /// 创建新的编排器实例
    pub fn new(rules: EligibilityRules) -> Self {
        Self {
            filter: EligibilityFilter::new(rules),
            selector: AssignmentSelector::new(),
        }
    }

    pub fn from_config(config: &ScheduleConfig) -> Self {
        Self::new(EligibilityRules::from(config))
    }

    pub fn rules(&self) -> EligibilityRules {
        self.filter.rules()
    }

    /// 执行一次完整的自动排班
    ///
    /// # 参数
    /// - dates: 待排日期（内部排序去重）
    /// - catalog: 班次目录
    /// - pool: 申请池
    /// - cancelled: 人工取消的槽位
    /// - ledger: 账本初始快照（由调用方从历史记录播种）
    ///
    /// # 返回
    /// 排班结果；不可填充的槽位记为未排，不作为错误返回
    #[instrument(skip_all, fields(
        dates = dates.len(),
        catalog_size = catalog.len(),
        requests = pool.len(),
        weekly_limit = self.rules().weekly_limit,
        strict_hours = self.rules().strict_hours,
    ))]
    pub fn run(
        &self,
        dates: &[NaiveDate],
        catalog: &ShiftCatalog,
        pool: &RequestPool,
        cancelled: &CancelledSlots,
        ledger: FairnessLedger,
    ) -> ScheduleOutcome {
        let mut ordered: Vec<NaiveDate> = dates.to_vec();
        ordered.sort();
        ordered.dedup();

        info!(
            first_date = ?ordered.first(),
            last_date = ?ordered.last(),
            employees = pool.employee_count(),
            "开始执行自动排班"
        );

        let mut outcome = ScheduleOutcome::start(ledger);

        for date in ordered {
            debug!(%date, "排班日期");

            for slot in catalog.slots_for(date) {
                // ==========================================
                // 步骤1: 取消槽位直接跳过，不触碰账本
                // ==========================================
                if cancelled.contains(&slot.key) {
                    debug!(slot = %slot.key, "槽位已取消，跳过");
                    outcome.cancelled.push(slot.key.clone());
                    continue;
                }

                // ==========================================
                // 步骤2: 资格过滤 + 选择
                // ==========================================
                match self.fill_slot(&slot, pool, &outcome) {
                    Ok(assignment) => {
                        debug!(
                            slot = %slot.key,
                            employee = %assignment.employee,
                            lifetime = outcome.ledger.lifetime(&assignment.employee),
                            "槽位已分配"
                        );
                        // ==========================================
                        // 步骤3: 提交（分配 + 占用 + 账本）
                        // ==========================================
                        outcome.commit(assignment);
                    }
                    Err(unfilled) => {
                        debug!(
                            slot = %slot.key,
                            reason = %unfilled.reason,
                            requester_count = unfilled.requester_count,
                            "槽位未排"
                        );
                        outcome.unfilled.push(unfilled);
                    }
                }
            }
        }

        let summary = outcome.summary();
        info!(
            total_slots = summary.total_slots,
            filled = summary.filled,
            unfilled = summary.unfilled,
            cancelled = summary.cancelled,
            "自动排班完成"
        );

        outcome
    }

    /// 诊断单个槽位在当前结果状态下的未排原因
    ///
    /// 用于恢复取消槽位或撤销后重新标注原因，不修改结果
    pub fn diagnose_slot(&self, slot: &ShiftSlot, pool: &RequestPool, outcome: &ScheduleOutcome) -> UnfilledSlot {
        match self.fill_slot(slot, pool, outcome) {
            Err(unfilled) => unfilled,
            // 仍有候选：交由调用方决定是否人工分配
            Ok(_) => UnfilledSlot {
                slot: slot.key.clone(),
                category: slot.category.clone(),
                reason: UnfilledReason::Unknown,
                requester_count: pool.requests_for(slot).count(),
            },
        }
    }

    fn fill_slot(
        &self,
        slot: &ShiftSlot,
        pool: &RequestPool,
        outcome: &ScheduleOutcome,
    ) -> Result<Assignment, UnfilledSlot> {
        let result = self.filter.evaluate(slot, pool, &outcome.busy, &outcome.ledger);

        match self.selector.select(&result.candidates, &outcome.ledger) {
            Some(chosen) => Ok(Assignment {
                slot: slot.key.clone(),
                employee: chosen.employee.clone(),
                requested_station: chosen.station.clone(),
                hours: chosen.hours.clone(),
                origin: AssignmentOrigin::Automatic,
            }),
            None => Err(UnfilledSlot {
                slot: slot.key.clone(),
                category: slot.category.clone(),
                reason: result.unfilled_reason(),
                requester_count: result.requester_count,
            }),
        }
    }
}
