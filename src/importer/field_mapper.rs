// ==========================================
// 班次排班系统 - 字段映射器实现
// ==========================================
// 职责: 表头 → 逻辑字段（一次性解析，引擎不再读取原始表头）
// 规则: 先按别名做大小写不敏感的精确匹配；
//       可选列（时段/资质）再按关键词做包含匹配
// ==========================================

use crate::domain::types::InputSource;
use crate::importer::error::ColumnGap;
use crate::importer::file_parser::RawRow;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ==========================================
// 逻辑字段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalField {
    Employee,
    RequestedDate,
    ShiftLabel,
    Station,
    Category,
    Hours,
    Certification,
}

impl LogicalField {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalField::Employee => "employee",
            LogicalField::RequestedDate => "requested_date",
            LogicalField::ShiftLabel => "shift",
            LogicalField::Station => "station",
            LogicalField::Category => "category",
            LogicalField::Hours => "hours",
            LogicalField::Certification => "certification",
        }
    }
}

impl fmt::Display for LogicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单个字段的映射规则
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRule {
    pub field: LogicalField,
    pub required: bool,
    /// 精确匹配的表头别名
    pub aliases: Vec<String>,
    /// 包含匹配关键词（仅在精确匹配失败时使用）
    pub hints: Vec<String>,
}

impl FieldRule {
    fn new(field: LogicalField, required: bool, aliases: &[&str], hints: &[&str]) -> Self {
        Self {
            field,
            required,
            aliases: aliases.iter().map(|s| s.to_string()).collect(),
            hints: hints.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn matches_exact(&self, header: &str) -> bool {
        let header = header.trim().to_lowercase();
        self.aliases.iter().any(|a| a.to_lowercase() == header)
    }

    fn matches_hint(&self, header: &str) -> bool {
        let header = header.trim().to_lowercase();
        self.hints.iter().any(|h| header.contains(&h.to_lowercase()))
    }
}

// ==========================================
// FieldMapping - 字段映射配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub source: InputSource,
    pub rules: Vec<FieldRule>,
}

impl FieldMapping {
    /// 申请表默认映射（希伯来语 + 英语表头）
    pub fn requests() -> Self {
        Self {
            source: InputSource::Requests,
            rules: vec![
                FieldRule::new(LogicalField::Employee, true, &["שם", "name", "employee"], &[]),
                FieldRule::new(
                    LogicalField::RequestedDate,
                    true,
                    &["תאריך מבוקש", "תאריך", "date", "requested date"],
                    &[],
                ),
                FieldRule::new(LogicalField::ShiftLabel, true, &["משמרת", "shift"], &[]),
                FieldRule::new(LogicalField::Station, true, &["תחנה", "station"], &[]),
                FieldRule::new(
                    LogicalField::Hours,
                    false,
                    &["שעות", "hours", "time"],
                    &["שע", "זמן", "hour", "time"],
                ),
                FieldRule::new(
                    LogicalField::Certification,
                    false,
                    &["אט\"ן", "אט״ן", "אטן", "atan", "certified", "certification"],
                    &["אט", "atan", "מורשה", "certif"],
                ),
            ],
        }
    }

    /// 班次目录默认映射
    pub fn shifts() -> Self {
        Self {
            source: InputSource::Shifts,
            rules: vec![
                FieldRule::new(LogicalField::ShiftLabel, true, &["משמרת", "shift"], &[]),
                FieldRule::new(LogicalField::Station, true, &["תחנה", "station"], &[]),
                FieldRule::new(LogicalField::Category, true, &["סוג תקן", "category", "type"], &[]),
                FieldRule::new(
                    LogicalField::Hours,
                    false,
                    &["שעות", "hours", "time"],
                    &["שע", "זמן", "hour", "time"],
                ),
            ],
        }
    }

    /// 追加一个表头别名
    pub fn with_alias(mut self, field: LogicalField, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        if let Some(rule) = self.rules.iter_mut().find(|r| r.field == field) {
            rule.aliases.push(alias);
        }
        self
    }

    /// 解析表头
    ///
    /// # 返回
    /// - Ok(ResolvedColumns): 全部必填列已定位
    /// - Err(Vec<ColumnGap>): 缺失的必填列（全部列出）
    pub fn resolve(&self, headers: &[String]) -> Result<ResolvedColumns, Vec<ColumnGap>> {
        let mut columns = BTreeMap::new();
        let mut gaps = Vec::new();

        for rule in &self.rules {
            // 已被其他字段占用的列不再参与匹配
            let taken: Vec<usize> = columns.values().copied().collect();
            let free = |idx: &usize| !taken.contains(idx);

            let exact = headers
                .iter()
                .enumerate()
                .filter(|(idx, _)| free(idx))
                .find(|(_, h)| rule.matches_exact(h))
                .map(|(idx, _)| idx);

            let found = exact.or_else(|| {
                if rule.required {
                    return None;
                }
                headers
                    .iter()
                    .enumerate()
                    .filter(|(idx, _)| free(idx))
                    .find(|(_, h)| rule.matches_hint(h))
                    .map(|(idx, _)| idx)
            });

            match found {
                Some(idx) => {
                    columns.insert(rule.field, idx);
                }
                None if rule.required => gaps.push(ColumnGap {
                    source: self.source,
                    field: rule.field.to_string(),
                    accepted: rule.aliases.clone(),
                }),
                None => {}
            }
        }

        if gaps.is_empty() {
            Ok(ResolvedColumns { columns })
        } else {
            Err(gaps)
        }
    }
}

// ==========================================
// ResolvedColumns - 已定位的列
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedColumns {
    columns: BTreeMap<LogicalField, usize>,
}

impl ResolvedColumns {
    pub fn index_of(&self, field: LogicalField) -> Option<usize> {
        self.columns.get(&field).copied()
    }

    pub fn has(&self, field: LogicalField) -> bool {
        self.columns.contains_key(&field)
    }

    /// 取行内字段值；列不存在或值为空返回 None
    pub fn value<'a>(&self, row: &'a RawRow, field: LogicalField) -> Option<&'a str> {
        self.index_of(field)
            .map(|idx| row.get(idx).trim())
            .filter(|v| !v.is_empty())
    }
}
