// ==========================================
// 班次排班系统 - 排班工作区
// ==========================================
// 职责: 一个打开的排班（输入 + 取消集合 + 当前结果）
// 红线: 同一工作区的运行 / 人工修改串行执行（每个工作区一把锁）
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ScheduleConfig;
use crate::domain::assignment::{Assignment, ScheduleOutcome};
use crate::domain::diagnostics::ImportDiagnostics;
use crate::domain::request::RequestPool;
use crate::domain::shift::{CancelledSlots, ShiftCatalog, ShiftSlot, SlotKey};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

/// 排班工作区状态
#[derive(Debug, Clone)]
pub struct ScheduleWorkspace {
    pub id: String,
    pub pool: RequestPool,
    pub catalog: ShiftCatalog,
    pub diagnostics: ImportDiagnostics,
    /// 待排日期（升序）
    pub dates: Vec<NaiveDate>,
    pub cancelled: CancelledSlots,
    /// 最近一次运行使用的配置
    pub config: ScheduleConfig,
    pub outcome: Option<ScheduleOutcome>,
    /// 当前结果已提交时的 run_id；任何修改都会清空
    pub committed_run_id: Option<String>,
    /// 本工作区最近一次提交时已计入历史的分配
    pub committed_assignments: Vec<Assignment>,
}

impl ScheduleWorkspace {
    pub fn new(
        pool: RequestPool,
        catalog: ShiftCatalog,
        diagnostics: ImportDiagnostics,
        dates: Vec<NaiveDate>,
        config: ScheduleConfig,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            pool,
            catalog,
            diagnostics,
            dates,
            cancelled: CancelledSlots::new(),
            config,
            outcome: None,
            committed_run_id: None,
            committed_assignments: Vec::new(),
        }
    }

    /// 校验槽位属于本工作区（日期在范围内且与目录一致）
    pub fn resolve_slot(&self, key: &SlotKey) -> ApiResult<ShiftSlot> {
        if !self.dates.contains(&key.date) {
            return Err(ApiError::NotFound(format!("槽位日期不在排班范围内: {}", key)));
        }
        self.catalog
            .resolve(key)
            .ok_or_else(|| ApiError::NotFound(format!("槽位不在班次目录中: {}", key)))
    }

    pub fn outcome(&self) -> ApiResult<&ScheduleOutcome> {
        self.outcome
            .as_ref()
            .ok_or_else(|| ApiError::NotScheduled(self.id.clone()))
    }

    pub fn outcome_mut(&mut self) -> ApiResult<&mut ScheduleOutcome> {
        let id = self.id.clone();
        self.outcome.as_mut().ok_or(ApiError::NotScheduled(id))
    }
}

// ==========================================
// WorkspaceRegistry - 工作区注册表
// ==========================================
#[derive(Default)]
pub struct WorkspaceRegistry {
    workspaces: Mutex<HashMap<String, Arc<Mutex<ScheduleWorkspace>>>>,
}

impl WorkspaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self) -> ApiResult<MutexGuard<'_, HashMap<String, Arc<Mutex<ScheduleWorkspace>>>>> {
        self.workspaces
            .lock()
            .map_err(|e| ApiError::InternalError(format!("工作区注册表锁获取失败: {}", e)))
    }

    /// 注册工作区，返回其 id
    pub fn insert(&self, workspace: ScheduleWorkspace) -> ApiResult<String> {
        let id = workspace.id.clone();
        self.map()?.insert(id.clone(), Arc::new(Mutex::new(workspace)));
        Ok(id)
    }

    pub fn get(&self, workspace_id: &str) -> ApiResult<Arc<Mutex<ScheduleWorkspace>>> {
        self.map()?
            .get(workspace_id)
            .cloned()
            .ok_or_else(|| ApiError::WorkspaceNotFound(workspace_id.to_string()))
    }

    /// 在工作区锁内执行操作
    pub fn with_workspace<T>(
        &self,
        workspace_id: &str,
        f: impl FnOnce(&mut ScheduleWorkspace) -> ApiResult<T>,
    ) -> ApiResult<T> {
        let handle = self.get(workspace_id)?;
        let mut workspace = handle
            .lock()
            .map_err(|e| ApiError::InternalError(format!("工作区锁获取失败: {}", e)))?;
        f(&mut workspace)
    }

    pub fn remove(&self, workspace_id: &str) -> ApiResult<bool> {
        Ok(self.map()?.remove(workspace_id).is_some())
    }

    pub fn ids(&self) -> ApiResult<Vec<String>> {
        let mut ids: Vec<String> = self.map()?.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}
