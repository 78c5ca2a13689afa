// ==========================================
// 班次排班系统 - 配置层
// ==========================================
// 职责: 排班配置管理（默认值 / 校验 / 覆写）
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod config_reader;
pub mod error;
pub mod schedule_config;

// 重导出核心配置类型
pub use config_manager::ConfigManager;
pub use config_reader::ScheduleConfigReader;
pub use error::{ConfigError, ConfigResult};
pub use schedule_config::{config_keys, ScheduleConfig};
