// ==========================================
// 班次排班系统 - CSV 导出
// ==========================================
// 职责: 排班表 / 未排报告 → CSV（表头与状态按语言本地化）
// 排序: 日期 → 站点 → 班次 → 目录序号
// ==========================================

use crate::api::error::ApiResult;
use crate::domain::assignment::ScheduleOutcome;
use crate::domain::shift::{ShiftCatalog, SlotKey};
use crate::domain::types::SlotStatus;
use crate::i18n::{reason_label, status_label, t_in, weekday_label};
use csv::Writer;
use std::io::Write;

/// 导出器（无状态，只保存语言）
#[derive(Debug, Clone)]
pub struct ScheduleExporter {
    locale: String,
}

impl ScheduleExporter {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
        }
    }

    fn label(&self, key: &str) -> String {
        t_in(key, &self.locale)
    }

    fn category_of(catalog: &ShiftCatalog, key: &SlotKey) -> String {
        catalog
            .get(key.catalog_index)
            .map(|t| t.category.clone())
            .unwrap_or_default()
    }

    /// 排班表：已分配 + 已取消槽位
    ///
    /// # 返回
    /// 写入的数据行数
    pub fn write_schedule<W: Write>(
        &self,
        outcome: &ScheduleOutcome,
        catalog: &ShiftCatalog,
        writer: W,
    ) -> ApiResult<usize> {
        let mut csv = Writer::from_writer(writer);
        csv.write_record([
            self.label("export.date"),
            self.label("export.weekday"),
            self.label("export.hours"),
            self.label("export.shift"),
            self.label("export.station"),
            self.label("export.requested_station"),
            self.label("export.category"),
            self.label("export.employee"),
            self.label("export.balance"),
            self.label("export.status"),
        ])?;

        let mut rows: Vec<(&SlotKey, Vec<String>)> = Vec::new();

        for a in &outcome.assignments {
            let hours = catalog
                .get(a.slot.catalog_index)
                .and_then(|t| t.hours.as_ref())
                .or(a.hours.as_ref())
                .map(|h| h.to_string())
                .unwrap_or_default();

            rows.push((
                &a.slot,
                vec![
                    a.slot.date.format("%Y-%m-%d").to_string(),
                    weekday_label(a.slot.date, &self.locale),
                    hours,
                    a.slot.shift_label.clone(),
                    a.slot.station.clone(),
                    a.requested_station.clone(),
                    Self::category_of(catalog, &a.slot),
                    a.employee.clone(),
                    outcome.ledger.lifetime(&a.employee).to_string(),
                    status_label(SlotStatus::Assigned, &self.locale),
                ],
            ));
        }

        for key in &outcome.cancelled {
            let hours = catalog
                .get(key.catalog_index)
                .and_then(|t| t.hours.as_ref())
                .map(|h| h.to_string())
                .unwrap_or_default();

            rows.push((
                key,
                vec![
                    key.date.format("%Y-%m-%d").to_string(),
                    weekday_label(key.date, &self.locale),
                    hours,
                    key.shift_label.clone(),
                    key.station.clone(),
                    String::new(),
                    Self::category_of(catalog, key),
                    String::new(),
                    String::new(),
                    status_label(SlotStatus::Cancelled, &self.locale),
                ],
            ));
        }

        rows.sort_by(|a, b| a.0.cmp(b.0));
        for (_, record) in &rows {
            csv.write_record(record)?;
        }
        csv.flush()?;

        Ok(rows.len())
    }

    /// 未排报告
    pub fn write_unfilled<W: Write>(&self, outcome: &ScheduleOutcome, writer: W) -> ApiResult<usize> {
        let mut csv = Writer::from_writer(writer);
        csv.write_record([
            self.label("export.date"),
            self.label("export.weekday"),
            self.label("export.station"),
            self.label("export.shift"),
            self.label("export.category"),
            self.label("export.reason"),
        ])?;

        let mut unfilled: Vec<_> = outcome.unfilled.iter().collect();
        unfilled.sort_by(|a, b| a.slot.cmp(&b.slot));

        for u in &unfilled {
            csv.write_record([
                u.slot.date.format("%Y-%m-%d").to_string(),
                weekday_label(u.slot.date, &self.locale),
                u.slot.station.clone(),
                u.slot.shift_label.clone(),
                u.category.clone(),
                reason_label(u.reason, &self.locale),
            ])?;
        }
        csv.flush()?;

        Ok(unfilled.len())
    }
}
