// ==========================================
// 班次排班系统 - 班次目录与班次槽位
// ==========================================
// 职责: 班次模板（目录行）、槽位标识、取消集合
// 说明: 槽位 = 日期 × 目录行；目录序号区分同站点同班次的多行
// ==========================================

use crate::domain::hours::HoursWindow;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// ==========================================
// ShiftTemplate - 班次目录行
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftTemplate {
    pub catalog_index: usize,
    pub station: String,
    pub shift_label: String,
    /// 原始类别文本（仅用于展示 / 导出）
    pub category: String,
    pub hours: Option<HoursWindow>,
    /// 加载时由类别解析出的资质要求
    pub required_certification: Option<String>,
}

impl ShiftTemplate {
    pub fn new(
        catalog_index: usize,
        station: impl Into<String>,
        shift_label: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            catalog_index,
            station: station.into(),
            shift_label: shift_label.into(),
            category: category.into(),
            hours: None,
            required_certification: None,
        }
    }

    pub fn with_hours(mut self, hours: HoursWindow) -> Self {
        self.hours = Some(hours);
        self
    }

    pub fn requiring(mut self, certification: impl Into<String>) -> Self {
        self.required_certification = Some(certification.into());
        self
    }

    /// 类别含任一专项标记时，设置资质要求
    ///
    /// specialized_markers 为逗号分隔的别名列表（如 "ATAN,אט"），空别名忽略
    pub fn resolve_certification(mut self, specialized_markers: &str, certification_tag: &str) -> Self {
        let specialized = specialized_markers
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .any(|m| self.category.contains(m));

        if specialized {
            self.required_certification = Some(certification_tag.to_string());
        }
        self
    }

    pub fn is_specialized(&self) -> bool {
        self.required_certification.is_some()
    }
}

// ==========================================
// ShiftCatalog - 班次目录
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftCatalog {
    templates: Vec<ShiftTemplate>,
}

impl ShiftCatalog {
    pub fn new(templates: Vec<ShiftTemplate>) -> Self {
        Self { templates }
    }

    /// 按给定顺序构建目录，目录序号取位置
    pub fn from_rows(rows: Vec<ShiftTemplate>) -> Self {
        let templates = rows
            .into_iter()
            .enumerate()
            .map(|(idx, mut t)| {
                t.catalog_index = idx;
                t
            })
            .collect();
        Self { templates }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ShiftTemplate> {
        self.templates.iter()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn get(&self, catalog_index: usize) -> Option<&ShiftTemplate> {
        self.templates.iter().find(|t| t.catalog_index == catalog_index)
    }

    /// 指定日期的全部槽位（目录顺序）
    pub fn slots_for(&self, date: NaiveDate) -> impl Iterator<Item = ShiftSlot> + '_ {
        self.templates.iter().map(move |t| ShiftSlot::from_template(date, t))
    }

    /// 校验槽位标识与目录一致
    pub fn resolve(&self, key: &SlotKey) -> Option<ShiftSlot> {
        self.get(key.catalog_index)
            .filter(|t| t.station == key.station && t.shift_label == key.shift_label)
            .map(|t| ShiftSlot::from_template(key.date, t))
    }
}

// ==========================================
// SlotKey - 槽位标识
// ==========================================
// 排序: 日期 → 站点 → 班次 → 目录序号（导出顺序）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotKey {
    pub date: NaiveDate,
    pub station: String,
    pub shift_label: String,
    pub catalog_index: usize,
}

impl SlotKey {
    pub fn new(
        date: NaiveDate,
        station: impl Into<String>,
        shift_label: impl Into<String>,
        catalog_index: usize,
    ) -> Self {
        Self {
            date,
            station: station.into(),
            shift_label: shift_label.into(),
            catalog_index,
        }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}_{}",
            self.date.format("%Y-%m-%d"),
            self.station,
            self.shift_label,
            self.catalog_index
        )
    }
}

// ==========================================
// ShiftSlot - 待填充槽位
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftSlot {
    pub key: SlotKey,
    pub category: String,
    pub hours: Option<HoursWindow>,
    pub required_certification: Option<String>,
}

impl ShiftSlot {
    pub fn from_template(date: NaiveDate, template: &ShiftTemplate) -> Self {
        Self {
            key: SlotKey::new(
                date,
                template.station.clone(),
                template.shift_label.clone(),
                template.catalog_index,
            ),
            category: template.category.clone(),
            hours: template.hours.clone(),
            required_certification: template.required_certification.clone(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.key.date
    }
}

// ==========================================
// CancelledSlots - 人工取消集合
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelledSlots(BTreeSet<SlotKey>);

impl CancelledSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &SlotKey) -> bool {
        self.0.contains(key)
    }

    /// 返回 false 表示此前已取消
    pub fn insert(&mut self, key: SlotKey) -> bool {
        self.0.insert(key)
    }

    pub fn remove(&mut self, key: &SlotKey) -> bool {
        self.0.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SlotKey> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<SlotKey> for CancelledSlots {
    fn from_iter<I: IntoIterator<Item = SlotKey>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
