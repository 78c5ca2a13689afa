// ==========================================
// 班次排班系统 - 命令行入口
// ==========================================
// 子命令:
// - run: 导入 → 自动排班 → 导出 → (可选) 提交
// - ledger: 查看公平性账本
// - config: 查看 / 保存排班配置
// ==========================================

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use shift_roster::api::ScheduleApi;
use shift_roster::app::{get_default_db_path, AppState};
use shift_roster::config::{ScheduleConfig, ScheduleConfigReader};
use shift_roster::domain::RunSummary;
use shift_roster::i18n;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "shift-roster",
    about = "班次排班系统 - 公平性约束下的自动排班",
    version,
    propagate_version = true
)]
struct Cli {
    /// 数据库路径（默认: SHIFT_ROSTER_DB_PATH 或用户数据目录）
    #[arg(long, global = true)]
    db: Option<String>,

    /// 以 JSON 行输出日志
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 导入申请与班次目录并自动排班
    Run {
        /// 员工申请表（CSV / Excel）
        #[arg(long)]
        requests: PathBuf,
        /// 班次目录（CSV / Excel）
        #[arg(long)]
        shifts: PathBuf,
        /// 起始日期 YYYY-MM-DD（需与 --to 同时给出）
        #[arg(long)]
        from: Option<NaiveDate>,
        /// 结束日期 YYYY-MM-DD（含）
        #[arg(long)]
        to: Option<NaiveDate>,
        /// 覆盖周配额（本次运行）
        #[arg(long)]
        weekly_limit: Option<u32>,
        /// 关闭严格时段匹配（本次运行）
        #[arg(long)]
        no_strict_hours: bool,
        /// 导出语言: en / he
        #[arg(long, default_value = "en")]
        locale: String,
        /// 排班表输出路径（默认 stdout）
        #[arg(long)]
        out: Option<PathBuf>,
        /// 未排报告输出路径
        #[arg(long)]
        unfilled_out: Option<PathBuf>,
        /// 提交结果（写入账本与运行记录）
        #[arg(long)]
        commit: bool,
    },
    /// 查看公平性账本
    Ledger,
    /// 查看或保存排班配置
    Config {
        #[arg(long)]
        weekly_limit: Option<u32>,
        #[arg(long)]
        strict_hours: Option<bool>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.json_logs {
        shift_roster::logging::init_json();
    } else {
        shift_roster::logging::init();
    }

    tracing::info!("{} v{}", shift_roster::APP_NAME, shift_roster::VERSION);

    let db_path = cli.db.clone().unwrap_or_else(get_default_db_path);
    tracing::info!("使用数据库: {}", db_path);
    let state = AppState::new(db_path).map_err(anyhow::Error::msg)?;

    let runtime = tokio::runtime::Runtime::new().context("无法创建 tokio 运行时")?;

    match cli.command {
        Commands::Run {
            requests,
            shifts,
            from,
            to,
            weekly_limit,
            no_strict_hours,
            locale,
            out,
            unfilled_out,
            commit,
        } => {
            let range = match (from, to) {
                (Some(from), Some(to)) => Some((from, to)),
                (None, None) => None,
                _ => bail!("--from 与 --to 必须同时给出"),
            };
            if !i18n::is_supported(&locale) {
                bail!("不支持的语言: {}（可选: {:?}）", locale, i18n::SUPPORTED_LOCALES);
            }

            let mut config = runtime.block_on(state.config_manager.load_schedule_config())?;
            if let Some(limit) = weekly_limit {
                config = config.with_weekly_limit(limit);
            }
            if no_strict_hours {
                config = config.with_strict_hours(false);
            }
            config.validate()?;

            let api = ScheduleApi::new(
                Arc::new(config),
                state.ledger_repo.clone(),
                state.schedule_repo.clone(),
            );

            runtime.block_on(run_schedule(
                &api,
                RunArgs {
                    requests,
                    shifts,
                    range,
                    locale,
                    out,
                    unfilled_out,
                    commit,
                },
            ))
        }
        Commands::Ledger => {
            let history = state.ledger_repo.list_history()?;
            println!("employee,total_shifts,last_shift_date");
            for row in history {
                println!(
                    "{},{},{}",
                    row.employee,
                    row.total_shifts,
                    row.last_shift_date.map(|d| d.to_string()).unwrap_or_default()
                );
            }
            Ok(())
        }
        Commands::Config {
            weekly_limit,
            strict_hours,
        } => {
            let mut config = runtime.block_on(state.config_manager.load_schedule_config())?;
            if weekly_limit.is_some() || strict_hours.is_some() {
                if let Some(limit) = weekly_limit {
                    config = config.with_weekly_limit(limit);
                }
                if let Some(strict) = strict_hours {
                    config = config.with_strict_hours(strict);
                }
                state.config_manager.save_schedule_config(&config)?;
                tracing::info!("配置已保存");
            }
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

struct RunArgs {
    requests: PathBuf,
    shifts: PathBuf,
    range: Option<(NaiveDate, NaiveDate)>,
    locale: String,
    out: Option<PathBuf>,
    unfilled_out: Option<PathBuf>,
    commit: bool,
}

async fn run_schedule(api: &ScheduleApi<ScheduleConfig>, args: RunArgs) -> anyhow::Result<()> {
    let loaded = api
        .load_inputs(&args.requests, &args.shifts, args.range)
        .await?;
    let ws = loaded.workspace_id.as_str();

    for violation in &loaded.diagnostics.violations {
        tracing::warn!(
            source = ?violation.source,
            row = violation.row_number,
            kind = ?violation.kind,
            "{}",
            violation.message
        );
    }

    let summary = api.run_auto_schedule(ws).await?;

    match &args.out {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("无法创建 {}", path.display()))?;
            api.export_schedule_csv(ws, &args.locale, file)?;
        }
        None => {
            api.export_schedule_csv(ws, &args.locale, std::io::stdout())?;
        }
    }

    if let Some(path) = &args.unfilled_out {
        let file = File::create(path).with_context(|| format!("无法创建 {}", path.display()))?;
        api.export_unfilled_csv(ws, &args.locale, file)?;
    }

    print_summary(
        &summary,
        &args.locale,
        loaded.diagnostics.corrections.len(),
        loaded.diagnostics.violations.len(),
    );

    if args.commit {
        let receipt = api.commit(ws)?;
        tracing::info!(run_id = %receipt.run_id, employees = receipt.employees_saved, "已提交");
    }

    Ok(())
}

fn print_summary(summary: &RunSummary, locale: &str, corrections: usize, warnings: usize) {
    i18n::set_locale(locale);
    let rate = format!("{:.1}", summary.fill_rate() * 100.0);
    let counts = [
        ("summary.filled", summary.filled.to_string()),
        ("summary.unfilled", summary.unfilled.to_string()),
        ("summary.cancelled", summary.cancelled.to_string()),
        ("summary.corrections", corrections.to_string()),
        ("summary.warnings", warnings.to_string()),
    ];
    for (key, count) in &counts {
        eprintln!("{}", i18n::t_with_args(key, &[("count", count.as_str())]));
    }
    eprintln!("{}", i18n::t_with_args("summary.fill_rate", &[("rate", rate.as_str())]));

    for (reason, count) in &summary.unfilled_by_reason {
        eprintln!("  {}: {}", i18n::reason_label(*reason, locale), count);
    }
}
