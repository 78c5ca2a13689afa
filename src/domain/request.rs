// ==========================================
// 班次排班系统 - 员工申请
// ==========================================
// 职责: 员工申请实体 + 申请池（只读输入）
// 红线: 加载后不可变，引擎决策时不再解析原始文本
// ==========================================

use crate::domain::hours::HoursWindow;
use crate::domain::shift::ShiftSlot;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

// ==========================================
// EmployeeRequest - 员工申请
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRequest {
    pub employee: String,
    pub date: NaiveDate,
    pub shift_label: String,
    pub station: String,
    pub hours: Option<HoursWindow>,
    pub certifications: BTreeSet<String>,
    /// 源文件行号（1 起，表头之后）
    pub row_number: usize,
}

impl EmployeeRequest {
    pub fn new(
        employee: impl Into<String>,
        date: NaiveDate,
        shift_label: impl Into<String>,
        station: impl Into<String>,
    ) -> Self {
        Self {
            employee: employee.into(),
            date,
            shift_label: shift_label.into(),
            station: station.into(),
            hours: None,
            certifications: BTreeSet::new(),
            row_number: 0,
        }
    }

    pub fn with_hours(mut self, hours: HoursWindow) -> Self {
        self.hours = Some(hours);
        self
    }

    pub fn with_certification(mut self, tag: impl Into<String>) -> Self {
        self.certifications.insert(tag.into());
        self
    }

    pub fn with_row_number(mut self, row_number: usize) -> Self {
        self.row_number = row_number;
        self
    }

    pub fn has_certification(&self, tag: &str) -> bool {
        self.certifications.contains(tag)
    }

    /// 日期 + 班次 + 站点三者一致
    pub fn matches_slot(&self, slot: &ShiftSlot) -> bool {
        self.date == slot.key.date
            && self.shift_label == slot.key.shift_label
            && self.station == slot.key.station
    }

    /// 申请去重键 (employee, date, shift, station)
    fn identity(&self) -> (&str, NaiveDate, &str, &str) {
        (&self.employee, self.date, &self.shift_label, &self.station)
    }
}

// ==========================================
// RequestPool - 申请池
// ==========================================
// 顺序即加载顺序，选择器的平局规则依赖此顺序
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestPool {
    requests: Vec<EmployeeRequest>,
}

impl RequestPool {
    pub fn new(requests: Vec<EmployeeRequest>) -> Self {
        Self { requests }
    }

    pub fn iter(&self) -> impl Iterator<Item = &EmployeeRequest> {
        self.requests.iter()
    }

    pub fn as_slice(&self) -> &[EmployeeRequest] {
        &self.requests
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// 申请中出现的日期（按日期升序，去重）
    pub fn distinct_dates(&self) -> Vec<NaiveDate> {
        let dates: BTreeSet<NaiveDate> = self.requests.iter().map(|r| r.date).collect();
        dates.into_iter().collect()
    }

    /// 不同员工数
    pub fn employee_count(&self) -> usize {
        self.requests
            .iter()
            .map(|r| r.employee.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// 具备指定资质的申请行数
    pub fn certified_count(&self, tag: &str) -> usize {
        self.requests.iter().filter(|r| r.has_certification(tag)).count()
    }

    /// 与班次匹配的申请（保持池内顺序）
    pub fn requests_for<'a>(
        &'a self,
        slot: &'a ShiftSlot,
    ) -> impl Iterator<Item = &'a EmployeeRequest> + 'a {
        self.requests.iter().filter(move |r| r.matches_slot(slot))
    }

    /// 员工对指定槽位的申请
    ///
    /// 优先取站点一致的首条；没有时退回同日期同班次的任意站点首条
    pub fn request_for_slot(&self, employee: &str, slot: &ShiftSlot) -> Option<&EmployeeRequest> {
        let date = slot.date();
        let mut fallback = None;

        for r in self
            .requests
            .iter()
            .filter(|r| r.employee == employee && r.date == date && r.shift_label == slot.key.shift_label)
        {
            if r.station == slot.key.station {
                return Some(r);
            }
            fallback.get_or_insert(r);
        }

        fallback
    }

    /// 重复申请（同一 employee/date/shift/station 的第二条及以后）
    pub fn duplicate_rows(&self) -> Vec<&EmployeeRequest> {
        let mut seen = HashSet::new();
        self.requests
            .iter()
            .filter(|r| !seen.insert(r.identity()))
            .collect()
    }
}
