// ==========================================
// 班次排班系统 - 领域类型定义
// ==========================================
// 职责: 排班结果状态、未排原因码、分配来源
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库 / 导出一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 未排原因码 (Unfilled Reason)
// ==========================================
// 红线: 每个未排班次必须给出决定性原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnfilledReason {
    NoRequests,               // 无人申请
    AllRequestersBusy,        // 申请人当日均已排班
    CertificationUnavailable, // 无具备资质的申请人
    HoursMismatch,            // 时段不匹配（严格模式）
    WeeklyQuotaExhausted,     // 周配额已满
    Unknown,                  // 无法归类
}

impl UnfilledReason {
    /// 全部原因码（按过滤步骤顺序）
    pub const ALL: [UnfilledReason; 6] = [
        UnfilledReason::NoRequests,
        UnfilledReason::AllRequestersBusy,
        UnfilledReason::HoursMismatch,
        UnfilledReason::WeeklyQuotaExhausted,
        UnfilledReason::CertificationUnavailable,
        UnfilledReason::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UnfilledReason::NoRequests => "NO_REQUESTS",
            UnfilledReason::AllRequestersBusy => "ALL_REQUESTERS_BUSY",
            UnfilledReason::CertificationUnavailable => "CERTIFICATION_UNAVAILABLE",
            UnfilledReason::HoursMismatch => "HOURS_MISMATCH",
            UnfilledReason::WeeklyQuotaExhausted => "WEEKLY_QUOTA_EXHAUSTED",
            UnfilledReason::Unknown => "UNKNOWN",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == value)
    }

    /// 国际化键（locales/*.yml）
    pub fn i18n_key(&self) -> &'static str {
        match self {
            UnfilledReason::NoRequests => "reason.no_requests",
            UnfilledReason::AllRequestersBusy => "reason.all_requesters_busy",
            UnfilledReason::CertificationUnavailable => "reason.certification_unavailable",
            UnfilledReason::HoursMismatch => "reason.hours_mismatch",
            UnfilledReason::WeeklyQuotaExhausted => "reason.weekly_quota_exhausted",
            UnfilledReason::Unknown => "reason.unknown",
        }
    }
}

impl fmt::Display for UnfilledReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 班次终态 (Slot Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlotStatus {
    Assigned,  // 已分配
    Cancelled, // 人工取消
    Unfilled,  // 未排
}

impl SlotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotStatus::Assigned => "ASSIGNED",
            SlotStatus::Cancelled => "CANCELLED",
            SlotStatus::Unfilled => "UNFILLED",
        }
    }

    /// 从数据库字符串解析
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ASSIGNED" => Some(SlotStatus::Assigned),
            "CANCELLED" => Some(SlotStatus::Cancelled),
            "UNFILLED" => Some(SlotStatus::Unfilled),
            _ => None,
        }
    }

    pub fn i18n_key(&self) -> &'static str {
        match self {
            SlotStatus::Assigned => "status.assigned",
            SlotStatus::Cancelled => "status.cancelled",
            SlotStatus::Unfilled => "status.unfilled",
        }
    }
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 分配来源 (Assignment Origin)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentOrigin {
    Automatic, // 自动排班循环
    Manual,    // 人工指定
}

impl AssignmentOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentOrigin::Automatic => "AUTOMATIC",
            AssignmentOrigin::Manual => "MANUAL",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "AUTOMATIC" => Some(AssignmentOrigin::Automatic),
            "MANUAL" => Some(AssignmentOrigin::Manual),
            _ => None,
        }
    }
}

impl fmt::Display for AssignmentOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 数据来源 (Input Source)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InputSource {
    Requests, // 申请表
    Shifts,   // 班次目录
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSource::Requests => write!(f, "REQUESTS"),
            InputSource::Shifts => write!(f, "SHIFTS"),
        }
    }
}
