// ==========================================
// 班次排班系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 排班辅助（自动排班 + 人工最终调整）
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 排班规则
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 共享状态组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{AssignmentOrigin, InputSource, SlotStatus, UnfilledReason};

// 领域实体
pub use domain::{
    Assignment, CancelledSlots, EmployeeRequest, FairnessLedger, HoursWindow, RequestPool,
    RunSummary, ScheduleOutcome, ShiftCatalog, ShiftSlot, ShiftTemplate, SlotKey, UnfilledSlot,
};

// 引擎
pub use engine::{AssignmentSelector, EligibilityFilter, ManualAssigner, ScheduleOrchestrator};

// API
pub use api::{ApiError, ApiResult, ScheduleApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "班次排班系统";
