// ==========================================
// 排班API端到端测试
// ==========================================
// 测试目标: 导入 → 自动排班 → 人工调整 → 导出 → 提交
// ==========================================


use shift_roster::api::{ApiError, ScheduleApi};
use shift_roster::config::ScheduleConfig;
use shift_roster::domain::{SlotKey, UnfilledReason};
use shift_roster::engine::EngineError;
use shift_roster::repository::{LedgerRepository, ScheduleRepository};
use std::sync::Arc;
use tempfile::NamedTempFile;
use test_helpers::{
    create_test_db, date, write_csv, HEBREW_REQUESTS_CSV, HEBREW_SHIFTS_CSV, HEBREW_SPECIALIZED_SHIFTS_CSV,
};

struct Fixture {
    api: ScheduleApi<ScheduleConfig>,
    ledger_repo: Arc<LedgerRepository>,
    requests: NamedTempFile,
    shifts: NamedTempFile,
    _db: NamedTempFile,
}

fn fixture() -> Fixture {
    let (db, db_path) = create_test_db().expect("Failed to create test db");
    let ledger_repo = Arc::new(LedgerRepository::new(&db_path).expect("Failed to create LedgerRepository"));
    let schedule_repo = Arc::new(ScheduleRepository::new(&db_path).expect("Failed to create ScheduleRepository"));
    let api = ScheduleApi::new(Arc::new(ScheduleConfig::default()), ledger_repo.clone(), schedule_repo);

    Fixture {
        api,
        ledger_repo,
        requests: write_csv(HEBREW_REQUESTS_CSV),
        shifts: write_csv(HEBREW_SHIFTS_CSV),
        _db: db,
    }
}

fn morning(day: u32) -> SlotKey {
    SlotKey::new(date(2026, 1, day), "A", "Morning", 0)
}

fn evening(day: u32) -> SlotKey {
    SlotKey::new(date(2026, 1, day), "B", "Evening", 1)
}

// ==========================================
// 主流程
// ==========================================

#[tokio::test]
async fn test_full_flow_load_run_export_commit() {
    println!("=== 测试：导入 → 排班 → 导出 → 提交 ===");
    let fx = fixture();

    let loaded = fx
        .api
        .load_inputs(fx.requests.path(), fx.shifts.path(), None)
        .await
        .expect("导入应成功");
    assert_eq!(loaded.request_count, 4);
    assert_eq!(loaded.dates, vec![date(2026, 1, 5), date(2026, 1, 6)]);
    let ws = loaded.workspace_id.as_str();

    let summary = fx.api.run_auto_schedule(ws).await.expect("排班应成功");
    assert_eq!(summary.total_slots, 4);
    assert_eq!(summary.filled, 3);
    assert_eq!(summary.unfilled, 1);
    assert_eq!(summary.unfilled_by_reason.get(&UnfilledReason::NoRequests), Some(&1));

    let outcome = fx.api.outcome(ws).unwrap();
    assert_eq!(outcome.assignment_for(&morning(5)).map(|a| a.employee.as_str()), Some("Dana"));
    assert_eq!(outcome.assignment_for(&evening(5)).map(|a| a.employee.as_str()), Some("Noa"));
    assert_eq!(outcome.assignment_for(&evening(6)).map(|a| a.employee.as_str()), Some("Dana"));

    // === 导出 ===
    let mut schedule_csv = Vec::new();
    let rows = fx.api.export_schedule_csv(ws, "en", &mut schedule_csv).unwrap();
    assert_eq!(rows, 3);
    let text = String::from_utf8(schedule_csv).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("Date,Day,Hours,Shift,Station,Requested station,Category,Employee,Lifetime balance,Status")
    );
    assert_eq!(
        lines.next(),
        Some("2026-01-05,Monday,07:00-15:00,Morning,A,A,רגיל,Dana,2,Assigned")
    );

    let mut unfilled_csv = Vec::new();
    assert_eq!(fx.api.export_unfilled_csv(ws, "en", &mut unfilled_csv).unwrap(), 1);
    let text = String::from_utf8(unfilled_csv).unwrap();
    assert!(text.contains("2026-01-06,Tuesday,A,Morning,רגיל,No requests"));

    // === 提交 ===
    let receipt = fx.api.commit(ws).expect("提交应成功");
    assert_eq!(receipt.employees_saved, 2);
    let err = fx.api.commit(ws).expect_err("重复提交应被拒绝");
    assert!(matches!(err, ApiError::BusinessRuleViolation(_)));

    let history = fx.ledger_repo.list_history().unwrap();
    assert_eq!(history[0].employee, "Dana");
    assert_eq!(history[0].total_shifts, 2);
}

#[tokio::test]
async fn test_committed_history_seeds_next_run() {
    println!("=== 测试：已提交的累计值参与下一次排班 ===");
    let fx = fixture();

    let first = fx.api.load_inputs(fx.requests.path(), fx.shifts.path(), None).await.unwrap();
    fx.api.run_auto_schedule(&first.workspace_id).await.unwrap();
    fx.api.commit(&first.workspace_id).unwrap();

    let second = fx.api.load_inputs(fx.requests.path(), fx.shifts.path(), None).await.unwrap();
    fx.api.run_auto_schedule(&second.workspace_id).await.unwrap();
    let outcome = fx.api.outcome(&second.workspace_id).unwrap();

    // Dana 已有 2 个班次，Avi 为 0
    assert_eq!(outcome.assignment_for(&morning(5)).map(|a| a.employee.as_str()), Some("Avi"));
    assert_eq!(outcome.ledger.lifetime("Dana"), 3);
}

#[tokio::test]
async fn test_rerun_and_recommit_do_not_double_count() {
    println!("=== 测试：提交后重新排班再提交，累计值不重复计入 ===");
    let fx = fixture();
    let loaded = fx.api.load_inputs(fx.requests.path(), fx.shifts.path(), None).await.unwrap();
    let ws = loaded.workspace_id.as_str();

    fx.api.run_auto_schedule(ws).await.unwrap();
    fx.api.commit(ws).expect("首次提交应成功");

    fx.api.run_auto_schedule(ws).await.unwrap();
    let outcome = fx.api.outcome(ws).unwrap();
    assert_eq!(outcome.assignment_for(&morning(5)).map(|a| a.employee.as_str()), Some("Dana"));
    assert_eq!(outcome.ledger.lifetime("Dana"), 2, "重新排班不应叠加本工作区已提交的班次");

    fx.api.commit(ws).expect("重新排班后可再次提交");

    let history = fx.ledger_repo.list_history().unwrap();
    let total_of = |name: &str| history.iter().find(|h| h.employee == name).map(|h| h.total_shifts);
    assert_eq!(total_of("Dana"), Some(2));
    assert_eq!(total_of("Noa"), Some(1));
}

// ==========================================
// 专项班次
// ==========================================

#[tokio::test]
async fn test_hebrew_specialized_category_requires_certification() {
    println!("=== 测试：希伯来语专项类别启用资质约束 ===");
    let fx = fixture();
    let shifts = write_csv(HEBREW_SPECIALIZED_SHIFTS_CSV);

    let loaded = fx.api.load_inputs(fx.requests.path(), shifts.path(), None).await.unwrap();
    let ws = loaded.workspace_id.as_str();
    fx.api.run_auto_schedule(ws).await.unwrap();

    let outcome = fx.api.outcome(ws).unwrap();
    // Dana 无资质，Avi 标记 כן
    assert_eq!(
        outcome.assignment_for(&morning(5)).map(|a| a.employee.as_str()),
        Some("Avi"),
        "专项槽位只能分给有资质的员工"
    );
    assert_eq!(outcome.assignment_for(&evening(5)).map(|a| a.employee.as_str()), Some("Noa"));
}

// ==========================================
// 人工调整
// ==========================================

#[tokio::test]
async fn test_cancel_and_restore_slot() {
    println!("=== 测试：取消 / 恢复槽位 ===");
    let fx = fixture();
    let loaded = fx.api.load_inputs(fx.requests.path(), fx.shifts.path(), None).await.unwrap();
    let ws = loaded.workspace_id.as_str();
    fx.api.run_auto_schedule(ws).await.unwrap();

    let err = fx.api.cancel_slot(ws, &morning(5)).expect_err("已分配槽位不可取消");
    assert!(matches!(err, ApiError::BusinessRuleViolation(_)));

    fx.api.cancel_slot(ws, &morning(6)).expect("未排槽位可取消");
    let summary = fx.api.summary(ws).unwrap();
    assert_eq!(summary.cancelled, 1);
    assert_eq!(summary.unfilled, 0);

    // 重新排班保留取消集合
    let rerun = fx.api.run_auto_schedule(ws).await.unwrap();
    assert_eq!(rerun.cancelled, 1);
    assert_eq!(rerun.filled, 3);

    fx.api.restore_slot(ws, &morning(6)).expect("恢复应成功");
    let outcome = fx.api.outcome(ws).unwrap();
    assert!(outcome.cancelled.is_empty());
    assert_eq!(outcome.unfilled_for(&morning(6)).map(|u| u.reason), Some(UnfilledReason::NoRequests));

    let err = fx.api.restore_slot(ws, &morning(6)).expect_err("未取消的槽位不可恢复");
    assert!(matches!(err, ApiError::BusinessRuleViolation(_)));
}

#[tokio::test]
async fn test_manual_operations_through_api() {
    let fx = fixture();
    let loaded = fx.api.load_inputs(fx.requests.path(), fx.shifts.path(), None).await.unwrap();
    let ws = loaded.workspace_id.as_str();
    fx.api.run_auto_schedule(ws).await.unwrap();

    let candidates = fx.api.manual_candidates(ws, &morning(6)).unwrap();
    assert!(candidates.is_empty(), "01-06 没有早班申请");

    let err = fx.api.manual_assign(ws, &morning(6), "Dana").expect_err("Dana 当日已有晚班");
    assert!(matches!(
        err,
        ApiError::ManualOperationRejected(EngineError::EmployeeAlreadyBusy { .. })
    ));

    let err = fx.api.manual_assign(ws, &morning(6), "Avi").expect_err("Avi 没有 01-06 的申请");
    assert!(matches!(
        err,
        ApiError::ManualOperationRejected(EngineError::NoMatchingRequest { .. })
    ));

    let unknown = SlotKey::new(date(2026, 1, 5), "Z", "Morning", 0);
    let err = fx.api.manual_candidates(ws, &unknown).expect_err("目录外槽位");
    assert!(matches!(err, ApiError::NotFound(_)));
}

// ==========================================
// 输入与状态校验
// ==========================================

#[tokio::test]
async fn test_explicit_date_range() {
    let fx = fixture();

    let err = fx
        .api
        .load_inputs(fx.requests.path(), fx.shifts.path(), Some((date(2026, 1, 7), date(2026, 1, 5))))
        .await
        .expect_err("起始晚于结束应失败");
    assert!(matches!(err, ApiError::InvalidInput(_)));

    let loaded = fx
        .api
        .load_inputs(fx.requests.path(), fx.shifts.path(), Some((date(2026, 1, 5), date(2026, 1, 7))))
        .await
        .unwrap();
    assert_eq!(loaded.dates.len(), 3);

    let summary = fx.api.run_auto_schedule(&loaded.workspace_id).await.unwrap();
    assert_eq!(summary.total_slots, 6);
    assert_eq!(summary.unfilled_by_reason.get(&UnfilledReason::NoRequests), Some(&3));
}

#[tokio::test]
async fn test_workspace_state_errors() {
    let fx = fixture();

    let err = fx.api.summary("missing").expect_err("工作区不存在");
    assert!(matches!(err, ApiError::WorkspaceNotFound(_)));

    let loaded = fx.api.load_inputs(fx.requests.path(), fx.shifts.path(), None).await.unwrap();
    let err = fx.api.commit(&loaded.workspace_id).expect_err("未排班不可提交");
    assert!(matches!(err, ApiError::NotScheduled(_)));

    assert!(fx.api.close_workspace(&loaded.workspace_id).unwrap());
    assert!(!fx.api.close_workspace(&loaded.workspace_id).unwrap());
}

#[tokio::test]
async fn test_missing_columns_surface_as_api_error() {
    let fx = fixture();
    let bad_shifts = write_csv("משמרת,תחנה\nMorning,A\n");

    let err = fx
        .api
        .load_inputs(fx.requests.path(), bad_shifts.path(), None)
        .await
        .expect_err("缺列应失败");
    match err {
        ApiError::MissingColumns(gaps) => assert_eq!(gaps.len(), 1),
        other => panic!("期望 MissingColumns，实际 {:?}", other),
    }
}
