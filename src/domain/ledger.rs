// ==========================================
// 班次排班系统 - 公平性账本
// ==========================================
// 职责: 员工累计班次数 + 按周班次数
// 红线: 运行期间只允许通过 record_assignment 递增，不递减
// ==========================================

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 周起始日：不晚于 date 的最近一个周日
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let days_since_sunday = date.weekday().num_days_from_sunday() as i64;
    date - Duration::days(days_since_sunday)
}

// ==========================================
// FairnessLedger - 公平性账本
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FairnessLedger {
    lifetime: BTreeMap<String, u32>,
    weekly: BTreeMap<String, BTreeMap<NaiveDate, u32>>,
}

impl FairnessLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 由历史累计值初始化（周计数为空）
    pub fn from_lifetime<I, S>(history: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        Self {
            lifetime: history.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            weekly: BTreeMap::new(),
        }
    }

    /// 累计班次数（未出现的员工为 0）
    pub fn lifetime(&self, employee: &str) -> u32 {
        self.lifetime.get(employee).copied().unwrap_or(0)
    }

    /// date 所在周的班次数
    pub fn week_count(&self, employee: &str, date: NaiveDate) -> u32 {
        let key = week_start(date);
        self.weekly
            .get(employee)
            .and_then(|weeks| weeks.get(&key))
            .copied()
            .unwrap_or(0)
    }

    /// 记录一次分配：累计 +1，所在周 +1
    pub fn record_assignment(&mut self, employee: &str, date: NaiveDate) {
        *self.lifetime.entry(employee.to_string()).or_insert(0) += 1;
        *self
            .weekly
            .entry(employee.to_string())
            .or_default()
            .entry(week_start(date))
            .or_insert(0) += 1;
    }

    /// 扣除已计入历史的班次，得到重新运行前的播种账本
    ///
    /// 每个员工名出现一次扣 1，不低于 0；周计数清空
    pub fn without_committed<'a, I>(&self, committed: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut lifetime = self.lifetime.clone();
        for employee in committed {
            if let Some(count) = lifetime.get_mut(employee) {
                *count = count.saturating_sub(1);
            }
        }
        Self {
            lifetime,
            weekly: BTreeMap::new(),
        }
    }

    /// 全部累计值（按员工名排序）
    pub fn lifetime_counts(&self) -> &BTreeMap<String, u32> {
        &self.lifetime
    }

    /// 员工各周计数
    pub fn weeks_of(&self, employee: &str) -> Option<&BTreeMap<NaiveDate, u32>> {
        self.weekly.get(employee)
    }

    /// 累计值总和
    pub fn total(&self) -> u64 {
        self.lifetime.values().map(|v| *v as u64).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_week_start_is_previous_sunday() {
        // 2026-01-04 为周日
        assert_eq!(week_start(d(2026, 1, 4)), d(2026, 1, 4));
        assert_eq!(week_start(d(2026, 1, 7)), d(2026, 1, 4));
        assert_eq!(week_start(d(2026, 1, 10)), d(2026, 1, 4));
        assert_eq!(week_start(d(2026, 1, 11)), d(2026, 1, 11));
        // 跨年
        assert_eq!(week_start(d(2026, 1, 1)), d(2025, 12, 28));
    }

    #[test]
    fn test_record_assignment_scopes_weeks() {
        let mut ledger = FairnessLedger::from_lifetime(vec![("Dana", 4)]);
        ledger.record_assignment("Dana", d(2026, 1, 5));
        ledger.record_assignment("Dana", d(2026, 1, 9));
        ledger.record_assignment("Dana", d(2026, 1, 12));

        assert_eq!(ledger.lifetime("Dana"), 7);
        assert_eq!(ledger.week_count("Dana", d(2026, 1, 6)), 2);
        assert_eq!(ledger.week_count("Dana", d(2026, 1, 11)), 1);
        assert_eq!(ledger.week_count("Dana", d(2025, 12, 30)), 0);
        assert_eq!(ledger.lifetime("Avi"), 0);
        assert_eq!(ledger.total(), 7);
    }

    #[test]
    fn test_without_committed_restores_base() {
        let mut ledger = FairnessLedger::from_lifetime(vec![("Dana", 3), ("Avi", 1)]);
        ledger.record_assignment("Avi", d(2026, 1, 5));

        let base = ledger.without_committed(vec!["Dana", "Dana", "Avi", "Noa"]);
        assert_eq!(base.lifetime("Dana"), 1);
        assert_eq!(base.lifetime("Avi"), 1);
        assert_eq!(base.lifetime("Noa"), 0);
        assert_eq!(base.week_count("Avi", d(2026, 1, 5)), 0);

        let floor = FairnessLedger::from_lifetime(vec![("Eli", 1)]).without_committed(vec!["Eli", "Eli"]);
        assert_eq!(floor.lifetime("Eli"), 0);
    }
}
