// ==========================================
// 班次排班系统 - 仓储层错误类型
// ==========================================
// 覆盖: employee_history / schedule_run / shift_assignment
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("排班运行记录不存在: run_id={0}")]
    RunNotFound(String),

    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    /// 主键冲突（如重复写入同一 run_id）
    #[error("排班记录重复: {0}")]
    DuplicateRecord(String),

    /// 槽位结果引用了不存在的运行
    #[error("槽位结果缺少所属运行: {0}")]
    OrphanSlotRows(String),

    /// 库中存储的值无法还原为领域类型
    #[error("存储值无法识别 (column={column}): {message}")]
    InvalidStoredValue { column: String, message: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if msg.contains("UNIQUE") || msg.contains("PRIMARY KEY") {
                    RepositoryError::DuplicateRecord(msg)
                } else if msg.contains("FOREIGN KEY") {
                    RepositoryError::OrphanSlotRows(msg)
                } else {
                    RepositoryError::DatabaseQueryError(msg)
                }
            }
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
