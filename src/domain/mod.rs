// ==========================================
// 班次排班系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod assignment;
pub mod diagnostics;
pub mod hours;
pub mod ledger;
pub mod request;
pub mod shift;
pub mod types;

// 重导出核心类型
pub use assignment::{Assignment, BusyRegistry, RunSummary, ScheduleOutcome, UnfilledSlot};
pub use diagnostics::{DqKind, DqLevel, DqViolation, ImportDiagnostics};
pub use hours::{HoursParse, HoursWindow};
pub use ledger::{week_start, FairnessLedger};
pub use request::{EmployeeRequest, RequestPool};
pub use shift::{CancelledSlots, ShiftCatalog, ShiftSlot, ShiftTemplate, SlotKey};
pub use types::{AssignmentOrigin, InputSource, SlotStatus, UnfilledReason};
