// ==========================================
// 班次排班系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::ScheduleApi;
use crate::config::ConfigManager;
use crate::db::open_sqlite_connection;
use crate::repository::{LedgerRepository, ScheduleRepository};

/// 应用状态
///
/// 配置、账本、运行记录共用一个 SQLite 连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 配置管理（config_kv）
    pub config_manager: Arc<ConfigManager>,

    /// 公平性账本仓储
    pub ledger_repo: Arc<LedgerRepository>,

    /// 排班运行记录仓储
    pub schedule_repo: Arc<ScheduleRepository>,

    /// 排班API
    pub schedule_api: Arc<ScheduleApi<ConfigManager>>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（":memory:" 用于测试）
    ///
    /// # 返回
    /// - Err(String): 初始化错误
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        let ledger_repo = Arc::new(LedgerRepository::from_connection(conn.clone()));
        let schedule_repo = Arc::new(ScheduleRepository::from_connection(conn));

        let schedule_api = Arc::new(ScheduleApi::new(
            config_manager.clone(),
            ledger_repo.clone(),
            schedule_repo.clone(),
        ));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            config_manager,
            ledger_repo,
            schedule_repo,
            schedule_api,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 SHIFT_ROSTER_DB_PATH → 用户数据目录 → 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("SHIFT_ROSTER_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./shift_roster.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("shift-roster");
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("shift_roster.db");
        }
    }

    path.to_string_lossy().to_string()
}
