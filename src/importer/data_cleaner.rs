// ==========================================
// 班次排班系统 - 数据清洗器实现
// ==========================================
// 职责: TRIM / NULL 标准化 / 多格式日期 / 时段标准化 / 标记位解析
// 红线: 行级异常只记录诊断，不中断导入
// ==========================================

use crate::domain::diagnostics::{DqKind, DqLevel, DqViolation, ImportDiagnostics};
use crate::domain::hours::{HoursParse, HoursWindow};
use crate::domain::types::InputSource;
use chrono::NaiveDate;

/// 接受的日期格式（按顺序尝试）
pub const DATE_FORMATS: [&str; 5] = ["%d/%m/%Y", "%Y-%m-%d", "%d-%m-%Y", "%Y/%m/%d", "%d.%m.%Y"];

/// 视为"是"的标记值
const TRUTHY_FLAGS: [&str; 6] = ["yes", "y", "true", "1", "כן", "✅"];

pub struct DataCleaner;

impl DataCleaner {
    /// 去首尾空白并把内部连续空白压缩为一个空格
    pub fn clean_text(&self, value: &str) -> String {
        value.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// 空串 / nan / null / none 统一为 None
    pub fn normalize_null(&self, value: Option<&str>) -> Option<String> {
        value.map(|v| self.clean_text(v)).filter(|v| {
            !v.is_empty() && !matches!(v.to_lowercase().as_str(), "nan" | "null" | "none")
        })
    }

    /// 多格式日期解析；带时间部分（"2026-01-05 00:00:00"）时只取日期
    pub fn parse_date(&self, value: &str) -> Option<NaiveDate> {
        let value = value.trim();
        let date_part = value.split_whitespace().next().unwrap_or(value);

        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
    }

    /// 资质等标记列
    pub fn parse_flag(&self, value: Option<&str>) -> bool {
        match self.normalize_null(value) {
            Some(v) => TRUTHY_FLAGS.contains(&v.to_lowercase().as_str()),
            None => false,
        }
    }

    /// 时段标准化
    ///
    /// - 反向时段纠正后记录到 corrections
    /// - 无法解析时记录 WARNING，按"未声明时段"处理
    pub fn clean_hours(
        &self,
        value: Option<&str>,
        source: InputSource,
        row_number: usize,
        diagnostics: &mut ImportDiagnostics,
    ) -> Option<HoursWindow> {
        let raw = value?;

        match HoursWindow::parse(raw) {
            HoursParse::Parsed { window, swapped, .. } => {
                if swapped {
                    diagnostics.corrections.push(format!(
                        "{} 第 {} 行: 时段 '{}' 起止颠倒，已纠正为 '{}'",
                        source,
                        row_number,
                        raw.trim(),
                        window
                    ));
                }
                Some(window)
            }
            HoursParse::Empty => None,
            HoursParse::Ambiguous(compact) => {
                diagnostics.push(DqViolation {
                    source,
                    row_number,
                    field: "hours".to_string(),
                    kind: DqKind::AmbiguousHours,
                    level: DqLevel::Warning,
                    message: format!("无法识别时段 '{}'，按未声明时段处理", compact),
                });
                None
            }
        }
    }
}
