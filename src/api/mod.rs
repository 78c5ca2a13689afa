// ==========================================
// 班次排班系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供命令行 / 上层应用调用
// ==========================================

pub mod error;
pub mod export;
pub mod schedule_api;
pub mod workspace;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use export::ScheduleExporter;
pub use schedule_api::{CommitReceipt, LoadSummary, ScheduleApi};
pub use workspace::{ScheduleWorkspace, WorkspaceRegistry};
