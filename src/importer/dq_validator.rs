// ==========================================
// 班次排班系统 - 数据质量校验器实现
// ==========================================
// 职责: 结构校验（缺列 → 致命） + 行级校验（缺值/重复 → 诊断）
// ==========================================

use crate::domain::diagnostics::{DqKind, DqLevel, DqViolation};
use crate::domain::request::RequestPool;
use crate::domain::types::InputSource;
use crate::importer::error::ColumnGap;
use crate::importer::field_mapper::{FieldMapping, LogicalField, ResolvedColumns};
use crate::importer::file_parser::{RawRow, RawTable};

pub struct DqValidator;

impl DqValidator {
    /// 同时校验两张表的表头，缺列全部汇总后返回
    pub fn validate_columns(
        &self,
        requests: (&FieldMapping, &RawTable),
        shifts: (&FieldMapping, &RawTable),
    ) -> Result<(ResolvedColumns, ResolvedColumns), Vec<ColumnGap>> {
        let request_columns = requests.0.resolve(&requests.1.headers);
        let shift_columns = shifts.0.resolve(&shifts.1.headers);

        match (request_columns, shift_columns) {
            (Ok(r), Ok(s)) => Ok((r, s)),
            (r, s) => {
                let mut gaps = r.err().unwrap_or_default();
                gaps.extend(s.err().unwrap_or_default());
                Err(gaps)
            }
        }
    }

    /// 必填字段缺值（行被剔除）
    pub fn validate_required_values(
        &self,
        source: InputSource,
        row: &RawRow,
        columns: &ResolvedColumns,
        required: &[LogicalField],
    ) -> Vec<DqViolation> {
        required
            .iter()
            .filter(|field| columns.value(row, **field).is_none())
            .map(|field| DqViolation {
                source,
                row_number: row.row_number,
                field: field.to_string(),
                kind: DqKind::MissingValue,
                level: DqLevel::Error,
                message: format!("必填字段 {} 为空，该行已剔除", field),
            })
            .collect()
    }

    /// 重复申请（同一 employee/date/shift/station，保留首条）
    pub fn validate_duplicates(&self, pool: &RequestPool) -> Vec<DqViolation> {
        pool.duplicate_rows()
            .into_iter()
            .map(|r| DqViolation {
                source: InputSource::Requests,
                row_number: r.row_number,
                field: "employee".to_string(),
                kind: DqKind::DuplicateRequest,
                level: DqLevel::Info,
                message: format!(
                    "{} 在 {} 的 {}/{} 重复申请，仅首条参与候选",
                    r.employee, r.date, r.station, r.shift_label
                ),
            })
            .collect()
    }
}
