// ==========================================
// 班次排班系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::config_reader::ScheduleConfigReader;
use crate::config::error::{ConfigError, ConfigResult};
use crate::config::schedule_config::{
    config_keys, ScheduleConfig, DEFAULT_CERTIFICATION_TAG, DEFAULT_SPECIALIZED_MARKER,
    DEFAULT_STRICT_HOURS, DEFAULT_WEEKLY_LIMIT,
};
use crate::db::open_sqlite_connection;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA 与建表（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn.lock().map_err(|e| ConfigError::LockError(e.to_string()))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
            crate::db::ensure_schema(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    fn get_conn(&self) -> ConfigResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ConfigError::LockError(e.to_string()))
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.get_conn()?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(value)
    }

    /// 写入配置值（UPSERT）
    pub fn set_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 整体保存排班配置（先校验）
    pub fn save_schedule_config(&self, config: &ScheduleConfig) -> ConfigResult<()> {
        config.validate()?;
        self.set_config_value(config_keys::WEEKLY_SHIFT_LIMIT, &config.weekly_limit.to_string())?;
        self.set_config_value(config_keys::STRICT_HOURS_MATCHING, &config.strict_hours.to_string())?;
        self.set_config_value(config_keys::SPECIALIZED_MARKER, &config.specialized_marker)?;
        self.set_config_value(config_keys::CERTIFICATION_TAG, &config.certification_tag)?;
        Ok(())
    }

    /// 获取所有 global 配置的快照（JSON格式）
    ///
    /// # 用途
    /// - 保存排班运行时记录配置快照
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        let mut config_map = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        serde_json::to_string(&config_map).map_err(|e| ConfigError::StorageError(e.to_string()))
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }
}

#[async_trait]
impl ScheduleConfigReader for ConfigManager {
    async fn get_weekly_limit(&self) -> ConfigResult<u32> {
        let value =
            self.get_config_or_default(config_keys::WEEKLY_SHIFT_LIMIT, &DEFAULT_WEEKLY_LIMIT.to_string())?;
        value.trim().parse::<u32>().map_err(|_| ConfigError::ValueError {
            key: config_keys::WEEKLY_SHIFT_LIMIT.to_string(),
            value: value.clone(),
            message: "无法解析为整数".to_string(),
        })
    }

    async fn get_strict_hours(&self) -> ConfigResult<bool> {
        let value = self.get_config_or_default(
            config_keys::STRICT_HOURS_MATCHING,
            &DEFAULT_STRICT_HOURS.to_string(),
        )?;
        match value.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "y" => Ok(true),
            "false" | "0" | "no" | "n" => Ok(false),
            other => {
                warn!(key = config_keys::STRICT_HOURS_MATCHING, value = other, "配置值无法识别，使用默认值");
                Ok(DEFAULT_STRICT_HOURS)
            }
        }
    }

    async fn get_specialized_marker(&self) -> ConfigResult<String> {
        self.get_config_or_default(config_keys::SPECIALIZED_MARKER, DEFAULT_SPECIALIZED_MARKER)
    }

    async fn get_certification_tag(&self) -> ConfigResult<String> {
        self.get_config_or_default(config_keys::CERTIFICATION_TAG, DEFAULT_CERTIFICATION_TAG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[tokio::test]
    async fn test_defaults_when_table_empty() {
        let manager = memory_manager();
        let config = manager.load_schedule_config().await.unwrap();
        assert_eq!(config, ScheduleConfig::default());
    }

    #[tokio::test]
    async fn test_save_and_reload() {
        let manager = memory_manager();
        let config = ScheduleConfig::default()
            .with_weekly_limit(3)
            .with_strict_hours(false);
        manager.save_schedule_config(&config).unwrap();

        let loaded = manager.load_schedule_config().await.unwrap();
        assert_eq!(loaded.weekly_limit, 3);
        assert!(!loaded.strict_hours);

        let snapshot = manager.get_config_snapshot().unwrap();
        assert!(snapshot.contains("\"weekly_shift_limit\":\"3\""));
    }

    #[tokio::test]
    async fn test_out_of_range_weekly_limit_rejected_on_load() {
        let manager = memory_manager();
        manager.set_config_value(config_keys::WEEKLY_SHIFT_LIMIT, "9").unwrap();
        let err = manager.load_schedule_config().await.unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { .. }));
    }

    #[tokio::test]
    async fn test_malformed_weekly_limit() {
        let manager = memory_manager();
        manager.set_config_value(config_keys::WEEKLY_SHIFT_LIMIT, "five").unwrap();
        assert!(matches!(
            manager.get_weekly_limit().await,
            Err(ConfigError::ValueError { .. })
        ));
    }
}
