// ==========================================
// 班次排班系统 - 排班结果仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 存储: schedule_run（运行头） + shift_assignment（每个槽位一行）
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::assignment::ScheduleOutcome;
use crate::domain::shift::{CancelledSlots, SlotKey};
use crate::domain::types::{AssignmentOrigin, SlotStatus, UnfilledReason};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;
use uuid::Uuid;

/// 排班运行记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRunRecord {
    pub run_id: String,
    pub workspace_id: String,
    pub created_at: String,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub filled_count: usize,
    pub unfilled_count: usize,
    pub cancelled_count: usize,
    pub config_json: String,
}

/// 已保存的槽位结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSlot {
    pub slot: SlotKey,
    pub status: SlotStatus,
    pub employee: Option<String>,
    pub origin: Option<AssignmentOrigin>,
    pub reason: Option<UnfilledReason>,
}

// ==========================================
// ScheduleRepository - 排班结果仓储
// ==========================================
pub struct ScheduleRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ScheduleRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 保存一次排班结果（单事务）
    ///
    /// # 返回
    /// 新生成的 run_id
    pub fn save_run(
        &self,
        workspace_id: &str,
        outcome: &ScheduleOutcome,
        config_json: &str,
    ) -> RepositoryResult<String> {
        let run_id = Uuid::new_v4().to_string();
        let summary = outcome.summary();

        let dates = outcome
            .assignments
            .iter()
            .map(|a| a.slot.date)
            .chain(outcome.unfilled.iter().map(|u| u.slot.date))
            .chain(outcome.cancelled.iter().map(|k| k.date));
        let (first_date, last_date) = dates.fold((None, None), |(lo, hi): (Option<NaiveDate>, Option<NaiveDate>), d| {
            (Some(lo.map_or(d, |x| x.min(d))), Some(hi.map_or(d, |x| x.max(d))))
        });

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            r#"INSERT INTO schedule_run (
                run_id, workspace_id, created_at, first_date, last_date,
                filled_count, unfilled_count, cancelled_count, config_json
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"#,
            params![
                run_id,
                workspace_id,
                Utc::now().to_rfc3339(),
                first_date.map(format_date),
                last_date.map(format_date),
                summary.filled as i64,
                summary.unfilled as i64,
                summary.cancelled as i64,
                config_json,
            ],
        )?;

        {
            let mut stmt = tx.prepare(
                r#"INSERT INTO shift_assignment (
                    run_id, slot_key, shift_date, station, shift_label, catalog_index,
                    employee, status, origin, reason
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"#,
            )?;

            let mut insert = |key: &SlotKey,
                              employee: Option<&str>,
                              status: SlotStatus,
                              origin: Option<&str>,
                              reason: Option<&str>|
             -> rusqlite::Result<usize> {
                stmt.execute(params![
                    run_id,
                    key.to_string(),
                    format_date(key.date),
                    key.station,
                    key.shift_label,
                    key.catalog_index as i64,
                    employee,
                    status.as_str(),
                    origin,
                    reason,
                ])
            };

            for a in &outcome.assignments {
                insert(&a.slot, Some(a.employee.as_str()), SlotStatus::Assigned, Some(a.origin.as_str()), None)?;
            }
            for u in &outcome.unfilled {
                insert(&u.slot, None, SlotStatus::Unfilled, None, Some(u.reason.as_str()))?;
            }
            for key in &outcome.cancelled {
                insert(key, None, SlotStatus::Cancelled, None, None)?;
            }
        }

        tx.commit()?;

        info!(run_id = %run_id, workspace_id, filled = summary.filled, "排班结果已保存");
        Ok(run_id)
    }

    /// 工作区最近一次运行
    pub fn latest_run(&self, workspace_id: &str) -> RepositoryResult<Option<ScheduleRunRecord>> {
        let conn = self.get_conn()?;
        let raw = conn
            .query_row(
                r#"
                SELECT run_id, workspace_id, created_at, first_date, last_date,
                       filled_count, unfilled_count, cancelled_count, config_json
                FROM schedule_run
                WHERE workspace_id = ?1
                ORDER BY created_at DESC, rowid DESC
                LIMIT 1
                "#,
                params![workspace_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, Option<String>>(4)?,
                        row.get::<_, i64>(5)?,
                        row.get::<_, i64>(6)?,
                        row.get::<_, i64>(7)?,
                        row.get::<_, String>(8)?,
                    ))
                },
            )
            .optional()?;

        raw.map(
            |(run_id, workspace_id, created_at, first, last, filled, unfilled, cancelled, config_json)|
             -> RepositoryResult<ScheduleRunRecord> {
                Ok(ScheduleRunRecord {
                    run_id,
                    workspace_id,
                    created_at,
                    first_date: first.as_deref().map(parse_date).transpose()?,
                    last_date: last.as_deref().map(parse_date).transpose()?,
                    filled_count: filled as usize,
                    unfilled_count: unfilled as usize,
                    cancelled_count: cancelled as usize,
                    config_json,
                })
            },
        )
        .transpose()
    }

    /// 运行内全部槽位结果（日期 → 站点 → 班次 → 目录序号）
    ///
    /// # 错误
    /// run_id 不存在时返回 RunNotFound
    pub fn list_slots(&self, run_id: &str) -> RepositoryResult<Vec<StoredSlot>> {
        let conn = self.get_conn()?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM schedule_run WHERE run_id = ?1)",
            params![run_id],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(RepositoryError::RunNotFound(run_id.to_string()));
        }

        let mut stmt = conn.prepare(
            r#"
            SELECT shift_date, station, shift_label, catalog_index, status, employee, origin, reason
            FROM shift_assignment
            WHERE run_id = ?1
            ORDER BY shift_date, station, shift_label, catalog_index
            "#,
        )?;

        let rows = stmt.query_map(params![run_id], RawSlotRow::from_row)?;

        let mut slots = Vec::new();
        for row in rows {
            slots.push(row?.into_stored()?);
        }
        Ok(slots)
    }

    /// 运行内的取消槽位
    pub fn list_cancelled(&self, run_id: &str) -> RepositoryResult<CancelledSlots> {
        Ok(self
            .list_slots(run_id)?
            .into_iter()
            .filter(|s| s.status == SlotStatus::Cancelled)
            .map(|s| s.slot)
            .collect())
    }
}

struct RawSlotRow {
    date: String,
    station: String,
    shift_label: String,
    catalog_index: i64,
    status: String,
    employee: Option<String>,
    origin: Option<String>,
    reason: Option<String>,
}

impl RawSlotRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            date: row.get(0)?,
            station: row.get(1)?,
            shift_label: row.get(2)?,
            catalog_index: row.get(3)?,
            status: row.get(4)?,
            employee: row.get(5)?,
            origin: row.get(6)?,
            reason: row.get(7)?,
        })
    }

    fn into_stored(self) -> RepositoryResult<StoredSlot> {
        let status = SlotStatus::parse(&self.status).ok_or_else(|| invalid("status", &self.status))?;
        let origin = match self.origin.as_deref() {
            Some(raw) => Some(AssignmentOrigin::parse(raw).ok_or_else(|| invalid("origin", raw))?),
            None => None,
        };
        let reason = match self.reason.as_deref() {
            Some(raw) => Some(UnfilledReason::parse(raw).ok_or_else(|| invalid("reason", raw))?),
            None => None,
        };

        Ok(StoredSlot {
            slot: SlotKey::new(
                parse_date(&self.date)?,
                self.station,
                self.shift_label,
                self.catalog_index as usize,
            ),
            status,
            employee: self.employee,
            origin,
            reason,
        })
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn parse_date(raw: &str) -> RepositoryResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| RepositoryError::InvalidStoredValue {
        column: "shift_date".to_string(),
        message: format!("{}: {}", raw, e),
    })
}

fn invalid(column: &str, value: &str) -> RepositoryError {
    RepositoryError::InvalidStoredValue {
        column: column.to_string(),
        message: format!("无法识别的值: {}", value),
    }
}
