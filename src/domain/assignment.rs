// ==========================================
// 班次排班系统 - 分配结果
// ==========================================
// 职责: 分配记录、未排记录、当日占用跟踪、运行结果
// 红线: 同一日期同一员工至多一条分配；取消槽位不得分配
// ==========================================

use crate::domain::hours::HoursWindow;
use crate::domain::ledger::FairnessLedger;
use crate::domain::shift::SlotKey;
use crate::domain::types::{AssignmentOrigin, UnfilledReason};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ==========================================
// Assignment - 已提交分配
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub slot: SlotKey,
    pub employee: String,
    /// 命中申请行的站点（人工分配可能与槽位站点不同）
    pub requested_station: String,
    /// 命中申请行声明的时段
    pub hours: Option<HoursWindow>,
    pub origin: AssignmentOrigin,
}

impl Assignment {
    pub fn date(&self) -> NaiveDate {
        self.slot.date
    }

    pub fn station_mismatch(&self) -> bool {
        self.requested_station != self.slot.station
    }
}

// ==========================================
// UnfilledSlot - 未排槽位
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnfilledSlot {
    pub slot: SlotKey,
    pub category: String,
    pub reason: UnfilledReason,
    /// 匹配日期/站点/班次的申请行数
    pub requester_count: usize,
}

// ==========================================
// BusyRegistry - 当日占用
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyRegistry {
    by_date: BTreeMap<NaiveDate, BTreeSet<String>>,
}

impl BusyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self, date: NaiveDate, employee: &str) -> bool {
        self.by_date
            .get(&date)
            .map(|set| set.contains(employee))
            .unwrap_or(false)
    }

    /// 返回 false 表示该员工当日已被占用
    pub fn mark(&mut self, date: NaiveDate, employee: &str) -> bool {
        self.by_date.entry(date).or_default().insert(employee.to_string())
    }

    pub fn working_on(&self, date: NaiveDate) -> impl Iterator<Item = &String> {
        self.by_date.get(&date).into_iter().flat_map(|set| set.iter())
    }
}

// ==========================================
// RunSummary - 运行汇总
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_slots: usize,
    pub filled: usize,
    pub unfilled: usize,
    pub cancelled: usize,
    pub manual: usize,
    pub unfilled_by_reason: BTreeMap<UnfilledReason, usize>,
}

impl RunSummary {
    /// 填充率（已排 / 非取消槽位），无槽位时为 0
    pub fn fill_rate(&self) -> f64 {
        let open = self.total_slots.saturating_sub(self.cancelled);
        if open == 0 {
            return 0.0;
        }
        self.filled as f64 / open as f64
    }

    pub fn is_complete(&self) -> bool {
        self.unfilled == 0
    }
}

// ==========================================
// ScheduleOutcome - 排班结果（可继续人工编辑）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleOutcome {
    pub assignments: Vec<Assignment>,
    pub unfilled: Vec<UnfilledSlot>,
    pub cancelled: Vec<SlotKey>,
    pub ledger: FairnessLedger,
    pub busy: BusyRegistry,
}

impl ScheduleOutcome {
    /// 以账本快照开始一次运行
    pub fn start(ledger: FairnessLedger) -> Self {
        Self {
            ledger,
            ..Self::default()
        }
    }

    /// 提交一条分配（分配 + 当日占用 + 账本递增，作为一个整体）
    ///
    /// 调用方负责事先校验当日占用与取消状态
    pub fn commit(&mut self, assignment: Assignment) {
        let date = assignment.date();
        self.busy.mark(date, &assignment.employee);
        self.ledger.record_assignment(&assignment.employee, date);
        self.unfilled.retain(|u| u.slot != assignment.slot);
        self.assignments.push(assignment);
    }

    pub fn assignment_for(&self, key: &SlotKey) -> Option<&Assignment> {
        self.assignments.iter().find(|a| &a.slot == key)
    }

    pub fn is_filled(&self, key: &SlotKey) -> bool {
        self.assignment_for(key).is_some()
    }

    pub fn is_cancelled(&self, key: &SlotKey) -> bool {
        self.cancelled.contains(key)
    }

    pub fn unfilled_for(&self, key: &SlotKey) -> Option<&UnfilledSlot> {
        self.unfilled.iter().find(|u| &u.slot == key)
    }

    /// 员工在各日期的分配
    pub fn assignments_of<'a>(&'a self, employee: &'a str) -> impl Iterator<Item = &'a Assignment> + 'a {
        self.assignments.iter().filter(move |a| a.employee == employee)
    }

    pub fn summary(&self) -> RunSummary {
        let mut unfilled_by_reason = BTreeMap::new();
        for u in &self.unfilled {
            *unfilled_by_reason.entry(u.reason).or_insert(0) += 1;
        }

        RunSummary {
            total_slots: self.assignments.len() + self.unfilled.len() + self.cancelled.len(),
            filled: self.assignments.len(),
            unfilled: self.unfilled.len(),
            cancelled: self.cancelled.len(),
            manual: self
                .assignments
                .iter()
                .filter(|a| a.origin == AssignmentOrigin::Manual)
                .count(),
            unfilled_by_reason,
        }
    }
}
