// ==========================================
// 班次排班系统 - 公平性账本仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 存储: employee_history 表（按员工的累计班次数）
// ==========================================
// 说明: 写入的是累计总数（绝对值），重复提交同一结果是幂等的
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::assignment::Assignment;
use crate::domain::ledger::FairnessLedger;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// 员工历史记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeHistory {
    pub employee: String,
    pub total_shifts: u32,
    pub last_shift_date: Option<NaiveDate>,
    pub updated_at: String,
}

// ==========================================
// LedgerRepository - 账本仓储
// ==========================================
pub struct LedgerRepository {
    conn: Arc<Mutex<Connection>>,
}

impl LedgerRepository {
    /// 创建新的账本仓储实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取累计班次数，构造账本快照（周计数为空）
    pub fn load_ledger(&self) -> RepositoryResult<FairnessLedger> {
        let history = self.list_history()?;
        Ok(FairnessLedger::from_lifetime(
            history.into_iter().map(|h| (h.employee, h.total_shifts)),
        ))
    }

    /// 保存账本累计数
    ///
    /// # 参数
    /// - ledger: 运行结束时的账本
    /// - assignments: 本次分配（用于更新最近上班日期）
    ///
    /// # 返回
    /// 写入的员工数
    pub fn save_ledger(&self, ledger: &FairnessLedger, assignments: &[Assignment]) -> RepositoryResult<usize> {
        let mut last_dates: BTreeMap<&str, NaiveDate> = BTreeMap::new();
        for a in assignments {
            let entry = last_dates.entry(a.employee.as_str()).or_insert(a.date());
            if a.date() > *entry {
                *entry = a.date();
            }
        }

        let now = Utc::now().to_rfc3339();
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        for (employee, total) in ledger.lifetime_counts() {
            let last_date = last_dates
                .get(employee.as_str())
                .map(|d| d.format("%Y-%m-%d").to_string());

            tx.execute(
                r#"INSERT INTO employee_history (employee, total_shifts, last_shift_date, updated_at)
                   VALUES (?1, ?2, ?3, ?4)
                   ON CONFLICT(employee) DO UPDATE SET
                       total_shifts = excluded.total_shifts,
                       last_shift_date = CASE
                           WHEN employee_history.last_shift_date IS NULL
                                OR excluded.last_shift_date > employee_history.last_shift_date
                           THEN COALESCE(excluded.last_shift_date, employee_history.last_shift_date)
                           ELSE employee_history.last_shift_date
                       END,
                       updated_at = excluded.updated_at"#,
                params![employee, total, last_date, now],
            )?;
        }

        tx.commit()?;
        Ok(ledger.lifetime_counts().len())
    }

    /// 全部员工历史（累计数降序，其次姓名）
    pub fn list_history(&self) -> RepositoryResult<Vec<EmployeeHistory>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT employee, total_shifts, last_shift_date, updated_at
            FROM employee_history
            ORDER BY total_shifts DESC, employee ASC
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u32>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut history = Vec::new();
        for row in rows {
            let (employee, total_shifts, last_shift_date, updated_at) = row?;
            let last_shift_date = match last_shift_date {
                Some(raw) => Some(NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|e| {
                    RepositoryError::InvalidStoredValue {
                        column: "last_shift_date".to_string(),
                        message: format!("{}: {}", raw, e),
                    }
                })?),
                None => None,
            };
            history.push(EmployeeHistory {
                employee,
                total_shifts,
                last_shift_date,
                updated_at,
            });
        }

        Ok(history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ensure_schema;

    fn memory_repo() -> LedgerRepository {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        LedgerRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_save_is_idempotent() {
        let repo = memory_repo();
        let ledger = FairnessLedger::from_lifetime(vec![("Dana", 3), ("Avi", 1)]);

        repo.save_ledger(&ledger, &[]).unwrap();
        repo.save_ledger(&ledger, &[]).unwrap();

        let loaded = repo.load_ledger().unwrap();
        assert_eq!(loaded.lifetime("Dana"), 3);
        assert_eq!(loaded.lifetime("Avi"), 1);
        assert_eq!(loaded.week_count("Dana", NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()), 0);

        let history = repo.list_history().unwrap();
        assert_eq!(history[0].employee, "Dana");
    }
}
