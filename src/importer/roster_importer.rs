// ==========================================
// 班次排班系统 - 排班输入导入器
// ==========================================
// 流程:
//   阶段 0: 文件解析（CSV / Excel）
//   阶段 1: 表头映射 + 缺列校验（致命，任何排班开始前）
//   阶段 2: 行级清洗（日期 / 时段 / 资质标记）
//   阶段 3: 诊断汇总（不可解析日期、歧义时段、重复申请、纠正记录）
// 输出: 强类型的 RequestPool + ShiftCatalog
// ==========================================

use crate::config::ScheduleConfig;
use crate::domain::diagnostics::{DqKind, DqLevel, DqViolation, ImportDiagnostics};
use crate::domain::request::{EmployeeRequest, RequestPool};
use crate::domain::shift::{ShiftCatalog, ShiftTemplate};
use crate::domain::types::InputSource;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::dq_validator::DqValidator;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::{FieldMapping, LogicalField, ResolvedColumns};
use crate::importer::file_parser::{FileParser, RawTable, UniversalFileParser};
use chrono::NaiveDate;
use std::path::Path;
use tracing::{info, instrument, warn};

const REQUIRED_REQUEST_FIELDS: [LogicalField; 4] = [
    LogicalField::Employee,
    LogicalField::RequestedDate,
    LogicalField::ShiftLabel,
    LogicalField::Station,
];

const REQUIRED_SHIFT_FIELDS: [LogicalField; 3] =
    [LogicalField::Station, LogicalField::ShiftLabel, LogicalField::Category];

/// 导入结果
#[derive(Debug, Clone, Default)]
pub struct LoadedInput {
    pub pool: RequestPool,
    pub catalog: ShiftCatalog,
    pub diagnostics: ImportDiagnostics,
}

impl LoadedInput {
    /// 申请中出现的日期（升序）
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.pool.distinct_dates()
    }
}

// ==========================================
// RosterImporter - 排班输入导入器
// ==========================================
pub struct RosterImporter<P = UniversalFileParser>
where
    P: FileParser,
{
    parser: P,
    request_mapping: FieldMapping,
    shift_mapping: FieldMapping,
    cleaner: DataCleaner,
    validator: DqValidator,
}

impl RosterImporter<UniversalFileParser> {
    pub fn new() -> Self {
        Self::with_parser(UniversalFileParser)
    }
}

impl Default for RosterImporter<UniversalFileParser> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> RosterImporter<P>
where
    P: FileParser,
{
    pub fn with_parser(parser: P) -> Self {
        Self {
            parser,
            request_mapping: FieldMapping::requests(),
            shift_mapping: FieldMapping::shifts(),
            cleaner: DataCleaner,
            validator: DqValidator,
        }
    }

    /// 替换默认表头映射
    pub fn with_mappings(mut self, request_mapping: FieldMapping, shift_mapping: FieldMapping) -> Self {
        self.request_mapping = request_mapping;
        self.shift_mapping = shift_mapping;
        self
    }

    /// 从文件导入申请表与班次目录
    #[instrument(skip(self, config), fields(requests = %requests_path.display(), shifts = %shifts_path.display()))]
    pub fn load(&self, requests_path: &Path, shifts_path: &Path, config: &ScheduleConfig) -> ImportResult<LoadedInput> {
        // === 阶段 0: 文件解析 ===
        let requests = self.parser.parse(requests_path)?;
        let shifts = self.parser.parse(shifts_path)?;

        self.load_tables(&requests, &shifts, config)
    }

    /// 从已解析的原始表导入
    pub fn load_tables(
        &self,
        requests: &RawTable,
        shifts: &RawTable,
        config: &ScheduleConfig,
    ) -> ImportResult<LoadedInput> {
        // === 阶段 1: 缺列校验 ===
        let (request_columns, shift_columns) = self
            .validator
            .validate_columns((&self.request_mapping, requests), (&self.shift_mapping, shifts))
            .map_err(ImportError::MissingColumns)?;

        if shifts.is_empty() {
            return Err(ImportError::EmptyInput(InputSource::Shifts));
        }
        if requests.is_empty() {
            warn!("申请表无数据行，所有槽位将为未排");
        }

        // === 阶段 2: 行级清洗 ===
        let mut diagnostics = ImportDiagnostics::default();
        let pool = self.build_pool(requests, &request_columns, config, &mut diagnostics);
        let catalog = self.build_catalog(shifts, &shift_columns, config, &mut diagnostics);

        // === 阶段 3: 诊断汇总 ===
        for violation in self.validator.validate_duplicates(&pool) {
            diagnostics.push(violation);
        }

        info!(
            requests = pool.len(),
            employees = pool.employee_count(),
            catalog_size = catalog.len(),
            unparseable_dates = diagnostics.count(DqKind::UnparseableDate),
            ambiguous_hours = diagnostics.count(DqKind::AmbiguousHours),
            corrections = diagnostics.corrections.len(),
            "排班输入导入完成"
        );

        Ok(LoadedInput {
            pool,
            catalog,
            diagnostics,
        })
    }

    fn build_pool(
        &self,
        table: &RawTable,
        columns: &ResolvedColumns,
        config: &ScheduleConfig,
        diagnostics: &mut ImportDiagnostics,
    ) -> RequestPool {
        let source = InputSource::Requests;
        let has_certification_column = columns.has(LogicalField::Certification);
        let mut requests = Vec::with_capacity(table.rows.len());

        for row in &table.rows {
            let missing =
                self.validator
                    .validate_required_values(source, row, columns, &REQUIRED_REQUEST_FIELDS);
            if !missing.is_empty() {
                missing.into_iter().for_each(|v| diagnostics.push(v));
                continue;
            }

            let raw_date = columns.value(row, LogicalField::RequestedDate).unwrap_or_default();
            let date = match self.cleaner.parse_date(raw_date) {
                Some(date) => date,
                None => {
                    diagnostics.push(DqViolation {
                        source,
                        row_number: row.row_number,
                        field: LogicalField::RequestedDate.to_string(),
                        kind: DqKind::UnparseableDate,
                        level: DqLevel::Error,
                        message: format!("无法解析日期 '{}'，该行已剔除", raw_date),
                    });
                    continue;
                }
            };

            let text = |field| self.cleaner.clean_text(columns.value(row, field).unwrap_or_default());
            let mut request = EmployeeRequest::new(
                text(LogicalField::Employee),
                date,
                text(LogicalField::ShiftLabel),
                text(LogicalField::Station),
            )
            .with_row_number(row.row_number);

            if let Some(hours) = self.cleaner.clean_hours(
                columns.value(row, LogicalField::Hours),
                source,
                row.row_number,
                diagnostics,
            ) {
                request = request.with_hours(hours);
            }

            if has_certification_column
                && self.cleaner.parse_flag(columns.value(row, LogicalField::Certification))
            {
                request = request.with_certification(config.certification_tag.clone());
            }

            requests.push(request);
        }

        RequestPool::new(requests)
    }

    fn build_catalog(
        &self,
        table: &RawTable,
        columns: &ResolvedColumns,
        config: &ScheduleConfig,
        diagnostics: &mut ImportDiagnostics,
    ) -> ShiftCatalog {
        let source = InputSource::Shifts;
        let mut templates = Vec::with_capacity(table.rows.len());

        for row in &table.rows {
            let missing = self
                .validator
                .validate_required_values(source, row, columns, &REQUIRED_SHIFT_FIELDS);
            if !missing.is_empty() {
                missing.into_iter().for_each(|v| diagnostics.push(v));
                continue;
            }

            let text = |field| self.cleaner.clean_text(columns.value(row, field).unwrap_or_default());
            let mut template = ShiftTemplate::new(
                templates.len(),
                text(LogicalField::Station),
                text(LogicalField::ShiftLabel),
                text(LogicalField::Category),
            );

            if let Some(hours) = self.cleaner.clean_hours(
                columns.value(row, LogicalField::Hours),
                source,
                row.row_number,
                diagnostics,
            ) {
                template = template.with_hours(hours);
            }

            templates.push(template.resolve_certification(&config.specialized_marker, &config.certification_tag));
        }

        ShiftCatalog::from_rows(templates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::file_parser::RawRow;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .enumerate()
                .map(|(idx, values)| RawRow {
                    row_number: idx + 2,
                    values: values.iter().map(|s| s.to_string()).collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_missing_columns_reported_for_both_sources() {
        let requests = table(&["name", "date", "shift"], &[]);
        let shifts = table(&["station", "shift"], &[]);

        let err = RosterImporter::new()
            .load_tables(&requests, &shifts, &ScheduleConfig::default())
            .unwrap_err();
        match err {
            ImportError::MissingColumns(gaps) => {
                assert_eq!(gaps.len(), 2);
                assert_eq!(gaps[0].source, InputSource::Requests);
                assert_eq!(gaps[1].source, InputSource::Shifts);
            }
            other => panic!("期望 MissingColumns，实际 {:?}", other),
        }
    }

    #[test]
    fn test_bad_rows_excluded_not_fatal() {
        let requests = table(
            &["name", "date", "shift", "station", "ATAN"],
            &[
                &["Dana", "05/01/2026", "Morning", "A", "כן"],
                &["Avi", "someday", "Morning", "A", ""],
                &["", "05/01/2026", "Morning", "A", ""],
            ],
        );
        let shifts = table(&["station", "shift", "category"], &[&["A", "Morning", "ATAN guard"]]);

        let loaded = RosterImporter::new()
            .load_tables(&requests, &shifts, &ScheduleConfig::default())
            .unwrap();

        assert_eq!(loaded.pool.len(), 1);
        assert!(loaded.pool.as_slice()[0].has_certification("ATAN"));
        assert_eq!(loaded.diagnostics.count(DqKind::UnparseableDate), 1);
        assert_eq!(loaded.diagnostics.count(DqKind::MissingValue), 1);
        assert_eq!(loaded.catalog.get(0).unwrap().required_certification.as_deref(), Some("ATAN"));
    }
}
