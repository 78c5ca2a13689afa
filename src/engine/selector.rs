// ==========================================
// 班次排班系统 - 分配选择器
// ==========================================
// 职责: 从合格候选中确定性地选出一人
// 规则: 累计班次数升序；平局按申请池顺序（稳定排序，先到先得）
// ==========================================

use crate::domain::ledger::FairnessLedger;
use crate::domain::request::EmployeeRequest;

// ==========================================
// AssignmentSelector - 分配选择器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct AssignmentSelector {
    // 无状态引擎，不需要注入依赖
}

impl AssignmentSelector {
    pub fn new() -> Self {
        Self {}
    }

    /// 按公平性分数排序候选（稳定）
    pub fn rank<'a>(
        &self,
        candidates: &[&'a EmployeeRequest],
        ledger: &FairnessLedger,
    ) -> Vec<&'a EmployeeRequest> {
        let mut ranked = candidates.to_vec();
        ranked.sort_by_key(|r| ledger.lifetime(&r.employee));
        ranked
    }

    /// 选出分数最低的候选；候选为空返回 None
    pub fn select<'a>(
        &self,
        candidates: &[&'a EmployeeRequest],
        ledger: &FairnessLedger,
    ) -> Option<&'a EmployeeRequest> {
        self.rank(candidates, ledger).into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn request(name: &str) -> EmployeeRequest {
        EmployeeRequest::new(name, NaiveDate::from_ymd_opt(2026, 1, 6).unwrap(), "Morning", "A")
    }

    #[test]
    fn test_lowest_score_wins() {
        let a = request("Avi");
        let b = request("Dana");
        let ledger = FairnessLedger::from_lifetime(vec![("Avi", 3), ("Dana", 1)]);

        let selected = AssignmentSelector::new().select(&[&a, &b], &ledger).unwrap();
        assert_eq!(selected.employee, "Dana");
    }

    #[test]
    fn test_tie_broken_by_pool_order() {
        let a = request("Noa");
        let b = request("Avi");
        let c = request("Dana");
        let ledger = FairnessLedger::from_lifetime(vec![("Noa", 2), ("Avi", 1), ("Dana", 1)]);

        let ranked = AssignmentSelector::new().rank(&[&a, &b, &c], &ledger);
        let names: Vec<&str> = ranked.iter().map(|r| r.employee.as_str()).collect();
        assert_eq!(names, vec!["Avi", "Dana", "Noa"]);
    }

    #[test]
    fn test_unseen_employee_scores_zero() {
        let a = request("Veteran");
        let b = request("Newcomer");
        let ledger = FairnessLedger::from_lifetime(vec![("Veteran", 1)]);

        let selected = AssignmentSelector::new().select(&[&a, &b], &ledger).unwrap();
        assert_eq!(selected.employee, "Newcomer");
    }

    #[test]
    fn test_empty_candidates() {
        assert!(AssignmentSelector::new().select(&[], &FairnessLedger::new()).is_none());
    }
}
