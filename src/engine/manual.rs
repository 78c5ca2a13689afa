// ==========================================
// 班次排班系统 - 人工分配
// ==========================================
// 职责: 为未排槽位列出候选、提交人工指定的员工
// 红线: 同日不可重复上班；取消槽位不可分配；走同一账本递增路径
// ==========================================
// 说明: 人工分配绕过选择器与周配额，站点不一致时允许但会提示
// ==========================================

use crate::domain::assignment::{Assignment, ScheduleOutcome};
use crate::domain::hours::HoursWindow;
use crate::domain::request::{EmployeeRequest, RequestPool};
use crate::domain::shift::{CancelledSlots, ShiftSlot};
use crate::domain::types::AssignmentOrigin;
use crate::engine::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{info, instrument};

/// 人工分配候选
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualCandidate {
    pub employee: String,
    pub requested_station: String,
    pub hours: Option<HoursWindow>,
    /// 槽位要求资质时给出是否具备；否则为 None
    pub certified: Option<bool>,
    pub station_match: bool,
    pub lifetime: u32,
}

/// 人工分配结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualAssignment {
    pub assignment: Assignment,
    /// 申请站点与槽位站点不同时的提示
    pub station_note: Option<String>,
    pub certified: Option<bool>,
}

// ==========================================
// ManualAssigner - 人工分配
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ManualAssigner {
    // 无状态引擎，不需要注入依赖
}

impl ManualAssigner {
    pub fn new() -> Self {
        Self {}
    }

    /// 列出可人工指定的候选
    ///
    /// 同日期同班次的申请人（不限站点），当日未被占用，按员工去重（首条为准）；
    /// 排序: 站点一致优先，其次累计班次升序（稳定）
    pub fn candidates(
        &self,
        slot: &ShiftSlot,
        pool: &RequestPool,
        outcome: &ScheduleOutcome,
    ) -> Vec<ManualCandidate> {
        let date = slot.date();
        let mut seen = HashSet::new();

        let mut candidates: Vec<ManualCandidate> = pool
            .iter()
            .filter(|r| r.date == date && r.shift_label == slot.key.shift_label)
            .filter(|r| !outcome.busy.is_busy(date, &r.employee))
            .filter(|r| seen.insert(r.employee.clone()))
            .map(|r| Self::to_candidate(slot, r, outcome))
            .collect();

        candidates.sort_by_key(|c| (!c.station_match, c.lifetime));
        candidates
    }

    /// 提交人工分配
    ///
    /// # 错误
    /// - SlotCancelled: 槽位已取消
    /// - SlotAlreadyFilled: 槽位已有人
    /// - EmployeeAlreadyBusy: 员工当日已有班次
    /// - NoMatchingRequest: 员工没有该日期/班次的申请
    ///
    /// 员工有多条同班次申请时，优先使用站点一致的那条
    #[instrument(skip(self, slot, pool, cancelled, outcome), fields(slot = %slot.key))]
    pub fn assign(
        &self,
        slot: &ShiftSlot,
        employee: &str,
        pool: &RequestPool,
        cancelled: &CancelledSlots,
        outcome: &mut ScheduleOutcome,
    ) -> EngineResult<ManualAssignment> {
        let date = slot.date();

        if cancelled.contains(&slot.key) || outcome.is_cancelled(&slot.key) {
            return Err(EngineError::SlotCancelled(slot.key.clone()));
        }

        if let Some(existing) = outcome.assignment_for(&slot.key) {
            return Err(EngineError::SlotAlreadyFilled {
                slot: slot.key.clone(),
                employee: existing.employee.clone(),
            });
        }

        if outcome.busy.is_busy(date, employee) {
            return Err(EngineError::EmployeeAlreadyBusy {
                employee: employee.to_string(),
                date,
            });
        }

        let request = pool
            .request_for_slot(employee, slot)
            .ok_or_else(|| EngineError::NoMatchingRequest {
                employee: employee.to_string(),
                slot: slot.key.clone(),
            })?;

        let certified = Self::certification_of(slot, request);
        let assignment = Assignment {
            slot: slot.key.clone(),
            employee: request.employee.clone(),
            requested_station: request.station.clone(),
            hours: request.hours.clone(),
            origin: AssignmentOrigin::Manual,
        };

        let station_note = assignment.station_mismatch().then(|| {
            format!(
                "申请站点 {} 与槽位站点 {} 不一致",
                assignment.requested_station, assignment.slot.station
            )
        });

        outcome.commit(assignment.clone());

        info!(
            employee = %assignment.employee,
            lifetime = outcome.ledger.lifetime(&assignment.employee),
            station_mismatch = station_note.is_some(),
            "人工分配已提交"
        );

        Ok(ManualAssignment {
            assignment,
            station_note,
            certified,
        })
    }

    fn to_candidate(slot: &ShiftSlot, request: &EmployeeRequest, outcome: &ScheduleOutcome) -> ManualCandidate {
        ManualCandidate {
            employee: request.employee.clone(),
            requested_station: request.station.clone(),
            hours: request.hours.clone(),
            certified: Self::certification_of(slot, request),
            station_match: request.station == slot.key.station,
            lifetime: outcome.ledger.lifetime(&request.employee),
        }
    }

    fn certification_of(slot: &ShiftSlot, request: &EmployeeRequest) -> Option<bool> {
        slot.required_certification
            .as_deref()
            .map(|tag| request.has_certification(tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ledger::FairnessLedger;
    use crate::domain::shift::ShiftTemplate;
    use crate::domain::types::UnfilledReason;
    use crate::domain::assignment::UnfilledSlot;
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 7).unwrap()
    }

    fn slot() -> ShiftSlot {
        ShiftSlot::from_template(date(), &ShiftTemplate::new(0, "A", "Night", "regular"))
    }

    #[test]
    fn test_candidates_prefer_station_match_then_score() {
        let pool = RequestPool::new(vec![
            EmployeeRequest::new("Noa", date(), "Night", "B"),
            EmployeeRequest::new("Avi", date(), "Night", "A"),
            EmployeeRequest::new("Dana", date(), "Night", "A"),
            EmployeeRequest::new("Avi", date(), "Night", "C"),
        ]);
        let outcome = ScheduleOutcome::start(FairnessLedger::from_lifetime(vec![("Avi", 4), ("Dana", 1)]));

        let names: Vec<String> = ManualAssigner::new()
            .candidates(&slot(), &pool, &outcome)
            .into_iter()
            .map(|c| c.employee)
            .collect();
        assert_eq!(names, vec!["Dana", "Avi", "Noa"]);
    }

    #[test]
    fn test_assign_clears_unfilled_entry_and_notes_station() {
        let pool = RequestPool::new(vec![EmployeeRequest::new("Noa", date(), "Night", "B")]);
        let mut outcome = ScheduleOutcome::start(FairnessLedger::new());
        outcome.unfilled.push(UnfilledSlot {
            slot: slot().key,
            category: "regular".to_string(),
            reason: UnfilledReason::NoRequests,
            requester_count: 0,
        });

        let result = ManualAssigner::new()
            .assign(&slot(), "Noa", &pool, &CancelledSlots::new(), &mut outcome)
            .unwrap();

        assert!(result.station_note.is_some());
        assert_eq!(result.certified, None);
        assert!(outcome.unfilled.is_empty());
        assert_eq!(outcome.ledger.lifetime("Noa"), 1);
        assert!(outcome.busy.is_busy(date(), "Noa"));
    }

    #[test]
    fn test_assign_rejects_unknown_requester() {
        let pool = RequestPool::new(vec![EmployeeRequest::new("Noa", date(), "Morning", "A")]);
        let mut outcome = ScheduleOutcome::start(FairnessLedger::new());

        let err = ManualAssigner::new()
            .assign(&slot(), "Noa", &pool, &CancelledSlots::new(), &mut outcome)
            .unwrap_err();
        assert!(matches!(err, EngineError::NoMatchingRequest { .. }));
        assert_eq!(outcome.ledger.total(), 0);
    }

    #[test]
    fn test_assign_uses_request_at_slot_station() {
        let pool = RequestPool::new(vec![
            EmployeeRequest::new("Avi", date(), "Night", "B"),
            EmployeeRequest::new("Avi", date(), "Night", "A").with_certification("ATAN"),
        ]);
        let mut outcome = ScheduleOutcome::start(FairnessLedger::new());

        let result = ManualAssigner::new()
            .assign(&slot(), "Avi", &pool, &CancelledSlots::new(), &mut outcome)
            .unwrap();

        assert_eq!(result.assignment.requested_station, "A");
        assert!(result.station_note.is_none());
    }
}
