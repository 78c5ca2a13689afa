// ==========================================
// 班次排班系统 - 引擎层错误类型
// ==========================================
// 说明: 自动排班不产生错误（未排是正常结果）
// 只有人工干预会违反不变量，需要显式拒绝
// ==========================================

use crate::domain::shift::SlotKey;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("槽位已取消，不可分配: {0}")]
    SlotCancelled(SlotKey),

    #[error("槽位已由 {employee} 占据: {slot}")]
    SlotAlreadyFilled { slot: SlotKey, employee: String },

    #[error("员工 {employee} 在 {date} 已有班次")]
    EmployeeAlreadyBusy { employee: String, date: NaiveDate },

    #[error("员工 {employee} 没有该日期/班次的申请: {slot}")]
    NoMatchingRequest { employee: String, slot: SlotKey },

    #[error("槽位不在班次目录中: {0}")]
    UnknownSlot(SlotKey),
}

pub type EngineResult<T> = Result<T, EngineError>;
