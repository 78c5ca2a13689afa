// ==========================================
// 仓储层集成测试
// ==========================================
// 测试目标: 账本累计值持久化、排班运行记录保存与读取
// ==========================================


use shift_roster::config::ScheduleConfig;
use shift_roster::domain::{CancelledSlots, FairnessLedger, SlotKey, SlotStatus, UnfilledReason};
use shift_roster::engine::ScheduleOrchestrator;
use shift_roster::repository::{LedgerRepository, RepositoryError, ScheduleRepository};
use test_helpers::{catalog, create_test_db, date, pool, request, template};

#[test]
fn test_ledger_round_trip_and_idempotent_save() {
    println!("=== 测试：账本保存累计值，重复保存不重复累加 ===");

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let repo = LedgerRepository::new(&db_path).expect("Failed to create LedgerRepository");

    assert_eq!(repo.load_ledger().unwrap(), FairnessLedger::new(), "空库账本为空");

    let day = date(2026, 1, 5);
    let shifts = catalog(vec![template("A", "Morning", "regular")]);
    let requests = pool(vec![request("Dana", day, "Morning", "A")]);
    let outcome = ScheduleOrchestrator::from_config(&ScheduleConfig::default()).run(
        &[day],
        &shifts,
        &requests,
        &CancelledSlots::new(),
        FairnessLedger::from_lifetime(vec![("Avi", 2)]),
    );

    assert_eq!(repo.save_ledger(&outcome.ledger, &outcome.assignments).unwrap(), 2);
    assert_eq!(repo.save_ledger(&outcome.ledger, &outcome.assignments).unwrap(), 2);

    let history = repo.list_history().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].employee, "Avi", "累计数降序");
    assert_eq!(history[0].total_shifts, 2);
    assert_eq!(history[0].last_shift_date, None);
    assert_eq!(history[1].employee, "Dana");
    assert_eq!(history[1].total_shifts, 1, "重复保存后仍为 1");
    assert_eq!(history[1].last_shift_date, Some(day));

    let reloaded = repo.load_ledger().unwrap();
    assert_eq!(reloaded.lifetime("Dana"), 1);
    assert_eq!(reloaded.week_count("Dana", day), 0, "周计数不持久化");
}

#[test]
fn test_last_shift_date_never_moves_backwards() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let repo = LedgerRepository::new(&db_path).unwrap();
    let shifts = catalog(vec![template("A", "Morning", "regular")]);
    let orchestrator = ScheduleOrchestrator::from_config(&ScheduleConfig::default());

    let later = date(2026, 1, 12);
    let earlier = date(2026, 1, 5);

    for day in [later, earlier] {
        let requests = pool(vec![request("Dana", day, "Morning", "A")]);
        let outcome = orchestrator.run(&[day], &shifts, &requests, &CancelledSlots::new(), repo.load_ledger().unwrap());
        repo.save_ledger(&outcome.ledger, &outcome.assignments).unwrap();
    }

    let history = repo.list_history().unwrap();
    assert_eq!(history[0].total_shifts, 2);
    assert_eq!(history[0].last_shift_date, Some(later));
}

#[test]
fn test_schedule_run_persisted_with_every_slot() {
    println!("=== 测试：运行记录包含已排 / 未排 / 取消槽位 ===");

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let repo = ScheduleRepository::new(&db_path).expect("Failed to create ScheduleRepository");

    let day = date(2026, 1, 5);
    let shifts = catalog(vec![
        template("A", "Morning", "regular"),
        template("B", "Morning", "regular"),
        template("C", "Morning", "regular"),
    ]);
    let requests = pool(vec![request("Dana", day, "Morning", "A")]);
    let cancelled_key = SlotKey::new(day, "C", "Morning", 2);
    let mut cancelled = CancelledSlots::new();
    cancelled.insert(cancelled_key.clone());

    let outcome = ScheduleOrchestrator::from_config(&ScheduleConfig::default()).run(
        &[day],
        &shifts,
        &requests,
        &cancelled,
        FairnessLedger::new(),
    );

    let run_id = repo.save_run("ws-1", &outcome, "{}").expect("保存运行记录失败");

    let latest = repo.latest_run("ws-1").unwrap().expect("应有运行记录");
    assert_eq!(latest.run_id, run_id);
    assert_eq!(latest.filled_count, 1);
    assert_eq!(latest.unfilled_count, 1);
    assert_eq!(latest.cancelled_count, 1);
    assert_eq!(latest.first_date, Some(day));
    assert!(repo.latest_run("other").unwrap().is_none());

    let slots = repo.list_slots(&run_id).unwrap();
    assert_eq!(slots.len(), 3);
    let unfilled = slots
        .iter()
        .find(|s| s.status == SlotStatus::Unfilled)
        .expect("应有未排槽位");
    assert_eq!(unfilled.slot.station, "B");
    assert_eq!(unfilled.reason, Some(UnfilledReason::NoRequests));
    let assigned = slots
        .iter()
        .find(|s| s.status == SlotStatus::Assigned)
        .expect("应有已排槽位");
    assert_eq!(assigned.employee.as_deref(), Some("Dana"));

    let restored = repo.list_cancelled(&run_id).unwrap();
    assert!(restored.contains(&cancelled_key));
    assert_eq!(restored.len(), 1);
}

#[test]
fn test_unknown_run_is_reported() {
    println!("=== 测试：读取不存在的运行记录 ===");

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let repo = ScheduleRepository::new(&db_path).expect("Failed to create ScheduleRepository");

    let err = repo.list_slots("missing-run").expect_err("不存在的 run_id 应报错");
    assert!(matches!(err, RepositoryError::RunNotFound(ref id) if id == "missing-run"));

    let err = repo.list_cancelled("missing-run").expect_err("取消集合同样报错");
    assert!(matches!(err, RepositoryError::RunNotFound(_)));
}
