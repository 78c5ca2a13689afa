// ==========================================
// 班次排班系统 - 排班API
// ==========================================
// 职责: 导入 → 自动排班 → 人工调整 → 导出 / 提交
// 红线: 同一工作区的所有修改在工作区锁内串行执行
// 红线: 人工操作必须给出显式拒绝原因
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::export::ScheduleExporter;
use crate::api::workspace::{ScheduleWorkspace, WorkspaceRegistry};
use crate::config::{ScheduleConfig, ScheduleConfigReader};
use crate::domain::assignment::{RunSummary, ScheduleOutcome};
use crate::domain::diagnostics::ImportDiagnostics;
use crate::domain::shift::SlotKey;
use crate::engine::{ManualAssigner, ManualAssignment, ManualCandidate, ScheduleOrchestrator};
use crate::importer::{LoadedInput, RosterImporter};
use crate::repository::{LedgerRepository, ScheduleRepository};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// 导入完成后的工作区概况
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadSummary {
    pub workspace_id: String,
    pub request_count: usize,
    pub employee_count: usize,
    pub catalog_size: usize,
    pub dates: Vec<NaiveDate>,
    pub diagnostics: ImportDiagnostics,
}

/// 提交回执
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitReceipt {
    pub run_id: String,
    pub employees_saved: usize,
}

// ==========================================
// ScheduleApi - 排班API
// ==========================================
pub struct ScheduleApi<C>
where
    C: ScheduleConfigReader,
{
    config: Arc<C>,
    ledger_repo: Arc<LedgerRepository>,
    schedule_repo: Arc<ScheduleRepository>,
    registry: WorkspaceRegistry,
    importer: RosterImporter,
    manual: ManualAssigner,
}

impl<C> ScheduleApi<C>
where
    C: ScheduleConfigReader,
{
    pub fn new(
        config: Arc<C>,
        ledger_repo: Arc<LedgerRepository>,
        schedule_repo: Arc<ScheduleRepository>,
    ) -> Self {
        Self {
            config,
            ledger_repo,
            schedule_repo,
            registry: WorkspaceRegistry::new(),
            importer: RosterImporter::new(),
            manual: ManualAssigner::new(),
        }
    }

    // ==========================================
    // 导入
    // ==========================================

    /// 导入申请表与班次目录，创建工作区
    ///
    /// # 参数
    /// - range: 显式排班日期范围（含两端）；None 时使用申请中出现的日期
    ///
    /// # 错误
    /// 缺列时返回 MissingColumns，不创建工作区
    #[instrument(skip(self))]
    pub async fn load_inputs(
        &self,
        requests_path: &Path,
        shifts_path: &Path,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> ApiResult<LoadSummary> {
        let config = self.config.load_schedule_config().await?;
        let input = self.importer.load(requests_path, shifts_path, &config)?;
        self.register(input, range, config)
    }

    /// 以已导入的数据创建工作区
    pub async fn load_from_input(
        &self,
        input: LoadedInput,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> ApiResult<LoadSummary> {
        let config = self.config.load_schedule_config().await?;
        self.register(input, range, config)
    }

    fn register(
        &self,
        input: LoadedInput,
        range: Option<(NaiveDate, NaiveDate)>,
        config: ScheduleConfig,
    ) -> ApiResult<LoadSummary> {
        let dates = match range {
            Some((from, to)) => {
                if from > to {
                    return Err(ApiError::InvalidInput(format!(
                        "起始日期 {} 晚于结束日期 {}",
                        from, to
                    )));
                }
                from.iter_days().take_while(|d| *d <= to).collect()
            }
            None => input.dates(),
        };

        if dates.is_empty() {
            warn!("没有待排日期");
        }

        let summary = LoadSummary {
            workspace_id: String::new(),
            request_count: input.pool.len(),
            employee_count: input.pool.employee_count(),
            catalog_size: input.catalog.len(),
            dates: dates.clone(),
            diagnostics: input.diagnostics.clone(),
        };

        let workspace = ScheduleWorkspace::new(input.pool, input.catalog, input.diagnostics, dates, config);
        let workspace_id = self.registry.insert(workspace)?;

        info!(
            workspace_id = %workspace_id,
            requests = summary.request_count,
            dates = summary.dates.len(),
            "工作区已创建"
        );

        Ok(LoadSummary {
            workspace_id,
            ..summary
        })
    }

    // ==========================================
    // 自动排班
    // ==========================================

    /// 执行自动排班（覆盖当前结果，保留取消集合）
    ///
    /// 账本从已提交的历史记录播种，并扣除本工作区此前提交过的分配；
    /// 配置在每次运行时重新读取
    #[instrument(skip(self))]
    pub async fn run_auto_schedule(&self, workspace_id: &str) -> ApiResult<RunSummary> {
        let config = self.config.load_schedule_config().await?;
        let history = self.ledger_repo.load_ledger()?;
        let orchestrator = ScheduleOrchestrator::from_config(&config);

        self.registry.with_workspace(workspace_id, |ws| {
            let ledger = history.without_committed(ws.committed_assignments.iter().map(|a| a.employee.as_str()));
            let outcome = orchestrator.run(&ws.dates, &ws.catalog, &ws.pool, &ws.cancelled, ledger);
            let summary = outcome.summary();

            ws.outcome = Some(outcome);
            ws.config = config;
            ws.committed_run_id = None;

            Ok(summary)
        })
    }

    pub fn summary(&self, workspace_id: &str) -> ApiResult<RunSummary> {
        self.registry
            .with_workspace(workspace_id, |ws| Ok(ws.outcome()?.summary()))
    }

    /// 当前结果快照
    pub fn outcome(&self, workspace_id: &str) -> ApiResult<ScheduleOutcome> {
        self.registry
            .with_workspace(workspace_id, |ws| Ok(ws.outcome()?.clone()))
    }

    pub fn diagnostics(&self, workspace_id: &str) -> ApiResult<ImportDiagnostics> {
        self.registry
            .with_workspace(workspace_id, |ws| Ok(ws.diagnostics.clone()))
    }

    // ==========================================
    // 人工调整
    // ==========================================

    pub fn manual_candidates(&self, workspace_id: &str, slot: &SlotKey) -> ApiResult<Vec<ManualCandidate>> {
        self.registry.with_workspace(workspace_id, |ws| {
            let resolved = ws.resolve_slot(slot)?;
            let outcome = ws.outcome()?;
            Ok(self.manual.candidates(&resolved, &ws.pool, outcome))
        })
    }

    #[instrument(skip(self, slot), fields(slot = %slot))]
    pub fn manual_assign(&self, workspace_id: &str, slot: &SlotKey, employee: &str) -> ApiResult<ManualAssignment> {
        self.registry.with_workspace(workspace_id, |ws| {
            let resolved = ws.resolve_slot(slot)?;
            let ScheduleWorkspace {
                pool,
                cancelled,
                outcome,
                committed_run_id,
                id,
                ..
            } = ws;
            let outcome = outcome
                .as_mut()
                .ok_or_else(|| ApiError::NotScheduled(id.clone()))?;

            let result = self.manual.assign(&resolved, employee, pool, cancelled, outcome)?;
            *committed_run_id = None;
            Ok(result)
        })
    }

    /// 取消槽位
    ///
    /// 已分配的槽位不可直接取消；未排槽位移出未排报告
    #[instrument(skip(self, slot), fields(slot = %slot))]
    pub fn cancel_slot(&self, workspace_id: &str, slot: &SlotKey) -> ApiResult<()> {
        self.registry.with_workspace(workspace_id, |ws| {
            ws.resolve_slot(slot)?;

            if let Some(outcome) = ws.outcome.as_mut() {
                if let Some(existing) = outcome.assignment_for(slot) {
                    return Err(ApiError::BusinessRuleViolation(format!(
                        "槽位 {} 已分配给 {}，不可取消",
                        slot, existing.employee
                    )));
                }
                outcome.unfilled.retain(|u| &u.slot != slot);
                if !outcome.cancelled.contains(slot) {
                    outcome.cancelled.push(slot.clone());
                }
            }

            ws.cancelled.insert(slot.clone());
            ws.committed_run_id = None;
            info!("槽位已取消");
            Ok(())
        })
    }

    /// 恢复已取消的槽位（重新诊断未排原因）
    #[instrument(skip(self, slot), fields(slot = %slot))]
    pub fn restore_slot(&self, workspace_id: &str, slot: &SlotKey) -> ApiResult<()> {
        self.registry.with_workspace(workspace_id, |ws| {
            let resolved = ws.resolve_slot(slot)?;

            if !ws.cancelled.remove(slot) {
                return Err(ApiError::BusinessRuleViolation(format!("槽位 {} 未被取消", slot)));
            }

            let orchestrator = ScheduleOrchestrator::from_config(&ws.config);
            if let Some(outcome) = ws.outcome.as_mut() {
                outcome.cancelled.retain(|k| k != slot);
                let diagnosis = orchestrator.diagnose_slot(&resolved, &ws.pool, outcome);
                outcome.unfilled.push(diagnosis);
            }

            ws.committed_run_id = None;
            info!("槽位已恢复");
            Ok(())
        })
    }

    // ==========================================
    // 导出 / 提交
    // ==========================================

    pub fn export_schedule_csv<W: Write>(&self, workspace_id: &str, locale: &str, writer: W) -> ApiResult<usize> {
        self.registry.with_workspace(workspace_id, |ws| {
            ScheduleExporter::new(locale).write_schedule(ws.outcome()?, &ws.catalog, writer)
        })
    }

    pub fn export_unfilled_csv<W: Write>(&self, workspace_id: &str, locale: &str, writer: W) -> ApiResult<usize> {
        self.registry.with_workspace(workspace_id, |ws| {
            ScheduleExporter::new(locale).write_unfilled(ws.outcome()?, writer)
        })
    }

    /// 提交当前结果：保存账本累计数与运行记录
    ///
    /// 同一结果重复提交会被拒绝；重新运行或人工修改后再次提交，
    /// 写入的累计数覆盖本工作区上一次提交的计数
    #[instrument(skip(self))]
    pub fn commit(&self, workspace_id: &str) -> ApiResult<CommitReceipt> {
        self.registry.with_workspace(workspace_id, |ws| {
            if let Some(run_id) = &ws.committed_run_id {
                return Err(ApiError::BusinessRuleViolation(format!(
                    "当前结果已提交 (run_id={})",
                    run_id
                )));
            }

            let outcome = ws.outcome()?;
            let config_json = serde_json::to_string(&ws.config)
                .map_err(|e| ApiError::InternalError(format!("配置序列化失败: {}", e)))?;

            let employees_saved = self.ledger_repo.save_ledger(&outcome.ledger, &outcome.assignments)?;
            let run_id = self.schedule_repo.save_run(&ws.id, outcome, &config_json)?;
            let committed = outcome.assignments.clone();

            ws.committed_assignments = committed;
            ws.committed_run_id = Some(run_id.clone());
            info!(run_id = %run_id, employees_saved, "排班结果已提交");

            Ok(CommitReceipt {
                run_id,
                employees_saved,
            })
        })
    }

    pub fn close_workspace(&self, workspace_id: &str) -> ApiResult<bool> {
        self.registry.remove(workspace_id)
    }
}
