// ==========================================
// 班次排班系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，把下层错误转换为用户可读的消息
// 红线: 所有错误信息必须包含显式原因
// ==========================================

use crate::config::ConfigError;
use crate::engine::EngineError;
use crate::importer::{describe_gaps, ColumnGap, ImportError};
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入校验错误（排班开始前）
    // ==========================================
    #[error("缺少必填列: {}", describe_gaps(.0))]
    MissingColumns(Vec<ColumnGap>),

    #[error("文件导入失败: {0}")]
    ImportError(String),

    #[error("无效输入: {0}")]
    InvalidInput(String),

    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("工作区不存在: {0}")]
    WorkspaceNotFound(String),

    #[error("工作区尚未排班: {0}")]
    NotScheduled(String),

    #[error("人工操作被拒绝: {0}")]
    ManualOperationRejected(EngineError),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 配置 / 数据访问错误
    // ==========================================
    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    // ==========================================
    // 导出错误
    // ==========================================
    #[error("导出失败: {0}")]
    ExportError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 ImportError 转换
// 缺列保持结构化，便于调用方列出每一列
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::MissingColumns(gaps) => ApiError::MissingColumns(gaps),
            ImportError::Other(err) => ApiError::Other(err),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("配置锁获取失败: {}", msg))
            }
            other => ApiError::ConfigError(other.to_string()),
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::UnknownSlot(key) => ApiError::NotFound(format!("槽位 {}", key)),
            other => ApiError::ManualOperationRejected(other),
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::RunNotFound(run_id) => {
                ApiError::NotFound(format!("排班运行记录(run_id={})不存在", run_id))
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::DuplicateRecord(msg) => {
                ApiError::BusinessRuleViolation(format!("排班记录重复: {}", msg))
            }
            RepositoryError::OrphanSlotRows(msg) => ApiError::DatabaseError(msg),
            RepositoryError::InvalidStoredValue { column, message } => {
                ApiError::DatabaseError(format!("存储值无法识别 ({}): {}", column, message))
            }
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

impl From<csv::Error> for ApiError {
    fn from(err: csv::Error) -> Self {
        ApiError::ExportError(err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::ExportError(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
