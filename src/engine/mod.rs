// ==========================================
// 班次排班系统 - 引擎层
// ==========================================
// 职责: 实现排班规则，不拼 SQL，不做 I/O
// 红线: 所有未排槽位必须输出 reason
// ==========================================

pub mod eligibility;
pub mod error;
pub mod manual;
pub mod orchestrator;
pub mod selector;

// 重导出核心引擎
pub use eligibility::{EligibilityFilter, EligibilityResult, EligibilityRules};
pub use error::{EngineError, EngineResult};
pub use manual::{ManualAssigner, ManualAssignment, ManualCandidate};
pub use orchestrator::ScheduleOrchestrator;
pub use selector::AssignmentSelector;
