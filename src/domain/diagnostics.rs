// ==========================================
// 班次排班系统 - 数据质量诊断
// ==========================================
// 职责: 行级异常汇总（不中断导入）
// 说明: 结构性错误（缺列）走 ImportError，不在此处
// ==========================================

use crate::domain::types::InputSource;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 诊断级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DqLevel {
    Error,   // 行被剔除
    Warning, // 行保留，约束放宽
    Info,    // 提示
}

impl fmt::Display for DqLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DqLevel::Error => write!(f, "ERROR"),
            DqLevel::Warning => write!(f, "WARNING"),
            DqLevel::Info => write!(f, "INFO"),
        }
    }
}

/// 诊断类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DqKind {
    UnparseableDate,
    AmbiguousHours,
    MissingValue,
    DuplicateRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DqViolation {
    pub source: InputSource,
    pub row_number: usize,
    pub field: String,
    pub kind: DqKind,
    pub level: DqLevel,
    pub message: String,
}

/// 导入诊断汇总
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportDiagnostics {
    pub violations: Vec<DqViolation>,
    /// 自动纠正说明（去空白、反向时段）
    pub corrections: Vec<String>,
}

impl ImportDiagnostics {
    pub fn push(&mut self, violation: DqViolation) {
        self.violations.push(violation);
    }

    pub fn count(&self, kind: DqKind) -> usize {
        self.violations.iter().filter(|v| v.kind == kind).count()
    }

    /// 被剔除的行数
    pub fn rejected_rows(&self) -> usize {
        self.violations.iter().filter(|v| v.level == DqLevel::Error).count()
    }

    pub fn is_clean(&self) -> bool {
        self.violations.is_empty() && self.corrections.is_empty()
    }

    pub fn merge(&mut self, other: ImportDiagnostics) {
        self.violations.extend(other.violations);
        self.corrections.extend(other.corrections);
    }
}
