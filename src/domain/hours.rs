// ==========================================
// 班次排班系统 - 时段窗口
// ==========================================
// 职责: 时段字符串标准化（去空白 / 反向时段纠正）
// 说明: 匹配只比较标准化后的文本，不做时间换算
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 标准化后的时段窗口，例如 "15:00-23:00"
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HoursWindow(String);

/// 时段解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoursParse {
    /// 解析成功；swapped 表示原值起止颠倒并已纠正
    Parsed {
        window: HoursWindow,
        swapped: bool,
        had_whitespace: bool,
    },
    /// 空值（未声明时段）
    Empty,
    /// 无法确定起止时间
    Ambiguous(String),
}

impl HoursWindow {
    /// 解析原始时段文本
    ///
    /// 规则：
    /// 1) 去除全部空白字符
    /// 2) 必须是 "起-止" 两段，每段为 H、HH、H:MM 或 HH:MM
    /// 3) 起始小时大于结束小时视为录入颠倒，交换两段
    pub fn parse(raw: &str) -> HoursParse {
        let had_whitespace = raw.trim().chars().any(char::is_whitespace);
        let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();

        if compact.is_empty() || compact.eq_ignore_ascii_case("nan") {
            return HoursParse::Empty;
        }

        let parts: Vec<&str> = compact.split('-').collect();
        if parts.len() != 2 {
            return HoursParse::Ambiguous(compact);
        }

        let (start, end) = (parts[0], parts[1]);
        let (start_hour, end_hour) = match (parse_clock(start), parse_clock(end)) {
            (Some((sh, _)), Some((eh, _))) => (sh, eh),
            _ => return HoursParse::Ambiguous(compact),
        };

        if start_hour > end_hour {
            return HoursParse::Parsed {
                window: HoursWindow(format!("{}-{}", end, start)),
                swapped: true,
                had_whitespace,
            };
        }

        HoursParse::Parsed {
            window: HoursWindow(compact),
            swapped: false,
            had_whitespace,
        }
    }

    /// 解析并只保留窗口本身（空值 / 歧义 → None）
    pub fn normalized(raw: &str) -> Option<HoursWindow> {
        match Self::parse(raw) {
            HoursParse::Parsed { window, .. } => Some(window),
            HoursParse::Empty | HoursParse::Ambiguous(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HoursWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 解析 "HH" / "HH:MM"，返回 (小时, 分钟)
fn parse_clock(value: &str) -> Option<(u32, u32)> {
    let mut pieces = value.split(':');
    let hour_part = pieces.next()?;
    let minute_part = pieces.next();
    if pieces.next().is_some() {
        return None;
    }

    if hour_part.is_empty() || hour_part.len() > 2 || !hour_part.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let hour: u32 = hour_part.parse().ok()?;
    if hour > 24 {
        return None;
    }

    let minute = match minute_part {
        None => 0,
        Some(m) => {
            if m.len() != 2 || !m.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            let minute: u32 = m.parse().ok()?;
            if minute > 59 {
                return None;
            }
            minute
        }
    };

    Some((hour, minute))
}
