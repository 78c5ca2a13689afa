// ==========================================
// 班次排班系统 - 排班配置
// ==========================================
// 职责: 排班运行参数 + 默认值 + 范围校验
// 存储: config_kv 表（见 config_manager）
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

// ==========================================
// 配置键
// ==========================================
pub mod config_keys {
    pub const WEEKLY_SHIFT_LIMIT: &str = "weekly_shift_limit";
    pub const STRICT_HOURS_MATCHING: &str = "strict_hours_matching";
    pub const SPECIALIZED_MARKER: &str = "specialized_marker";
    pub const CERTIFICATION_TAG: &str = "certification_tag";
}

/// 周配额允许范围
pub const WEEKLY_LIMIT_MIN: u32 = 1;
pub const WEEKLY_LIMIT_MAX: u32 = 7;

pub const DEFAULT_WEEKLY_LIMIT: u32 = 5;
pub const DEFAULT_STRICT_HOURS: bool = true;
/// 专项标记别名（逗号分隔）：英文与希伯来语类别
pub const DEFAULT_SPECIALIZED_MARKER: &str = "ATAN,אט";
pub const DEFAULT_CERTIFICATION_TAG: &str = "ATAN";

// ==========================================
// ScheduleConfig - 排班配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// 每员工每周最多班次数（1-7）
    pub weekly_limit: u32,
    /// 严格时段匹配
    pub strict_hours: bool,
    /// 专项标记别名，逗号分隔；类别中出现任一别名即为专项班次
    pub specialized_marker: String,
    /// 专项班次要求的资质标签
    pub certification_tag: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            weekly_limit: DEFAULT_WEEKLY_LIMIT,
            strict_hours: DEFAULT_STRICT_HOURS,
            specialized_marker: DEFAULT_SPECIALIZED_MARKER.to_string(),
            certification_tag: DEFAULT_CERTIFICATION_TAG.to_string(),
        }
    }
}

impl ScheduleConfig {
    pub fn with_weekly_limit(mut self, weekly_limit: u32) -> Self {
        self.weekly_limit = weekly_limit;
        self
    }

    pub fn with_strict_hours(mut self, strict_hours: bool) -> Self {
        self.strict_hours = strict_hours;
        self
    }

    /// 范围校验
    pub fn validate(&self) -> ConfigResult<()> {
        if !(WEEKLY_LIMIT_MIN..=WEEKLY_LIMIT_MAX).contains(&self.weekly_limit) {
            return Err(ConfigError::OutOfRange {
                key: config_keys::WEEKLY_SHIFT_LIMIT.to_string(),
                value: self.weekly_limit as i64,
                min: WEEKLY_LIMIT_MIN as i64,
                max: WEEKLY_LIMIT_MAX as i64,
            });
        }

        if self.specialized_marker.split(',').all(|m| m.trim().is_empty()) {
            return Err(ConfigError::ValueError {
                key: config_keys::SPECIALIZED_MARKER.to_string(),
                value: self.specialized_marker.clone(),
                message: "专项标记不能为空".to_string(),
            });
        }

        if self.certification_tag.trim().is_empty() {
            return Err(ConfigError::ValueError {
                key: config_keys::CERTIFICATION_TAG.to_string(),
                value: self.certification_tag.clone(),
                message: "资质标签不能为空".to_string(),
            });
        }

        Ok(())
    }
}
