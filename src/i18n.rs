// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持英文（默认）和希伯来语
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

use crate::domain::types::{SlotStatus, UnfilledReason};
use chrono::{Datelike, NaiveDate, Weekday};

/// 支持的语言
pub const SUPPORTED_LOCALES: [&str; 2] = ["en", "he"];

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言
///
/// # 参数
/// - locale: 语言代码（"en" 或 "he"）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

pub fn is_supported(locale: &str) -> bool {
    SUPPORTED_LOCALES.contains(&locale)
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use shift_roster::i18n::t;
/// let msg = t("export.employee");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 按指定语言翻译，不改变全局语言
pub fn t_in(key: &str, locale: &str) -> String {
    rust_i18n::t!(key, locale = locale).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use shift_roster::i18n::t_with_args;
/// let msg = t_with_args("summary.filled", &[("count", "12")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

/// 星期名称
pub fn weekday_label(date: NaiveDate, locale: &str) -> String {
    let key = match date.weekday() {
        Weekday::Sun => "weekday.sunday",
        Weekday::Mon => "weekday.monday",
        Weekday::Tue => "weekday.tuesday",
        Weekday::Wed => "weekday.wednesday",
        Weekday::Thu => "weekday.thursday",
        Weekday::Fri => "weekday.friday",
        Weekday::Sat => "weekday.saturday",
    };
    t_in(key, locale)
}

pub fn reason_label(reason: UnfilledReason, locale: &str) -> String {
    t_in(reason.i18n_key(), locale)
}

pub fn status_label(status: SlotStatus, locale: &str) -> String {
    t_in(status.i18n_key(), locale)
}
