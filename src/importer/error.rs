// ==========================================
// 班次排班系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 只有结构性错误在此；行级异常进入 ImportDiagnostics
// ==========================================

use crate::domain::types::InputSource;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 缺失的必填列
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnGap {
    pub source: InputSource,
    /// 逻辑字段名
    pub field: String,
    /// 可接受的表头别名
    pub accepted: Vec<String>,
}

/// 拼接缺列说明，例如 "REQUESTS: employee (שם / name)"
pub fn describe_gaps(gaps: &[ColumnGap]) -> String {
    gaps.iter()
        .map(|g| format!("{}: {} ({})", g.source, g.field, g.accepted.join(" / ")))
        .collect::<Vec<_>>()
        .join("; ")
}

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xls/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 结构校验错误 =====
    #[error("缺少必填列: {}", describe_gaps(.0))]
    MissingColumns(Vec<ColumnGap>),

    #[error("输入无数据行: {0}")]
    EmptyInput(InputSource),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
