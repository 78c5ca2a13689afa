// ==========================================
// 班次排班系统 - 导入层
// ==========================================
// 职责: 申请表 / 班次目录 → 强类型领域对象
// 红线: 缺列在排班开始前失败；行级异常只进入诊断
// ==========================================

pub mod data_cleaner;
pub mod dq_validator;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod roster_importer;

// 重导出核心类型
pub use data_cleaner::{DataCleaner, DATE_FORMATS};
pub use dq_validator::DqValidator;
pub use error::{describe_gaps, ColumnGap, ImportError, ImportResult};
pub use field_mapper::{FieldMapping, FieldRule, LogicalField, ResolvedColumns};
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawRow, RawTable, UniversalFileParser};
pub use roster_importer::{LoadedInput, RosterImporter};
