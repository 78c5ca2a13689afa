// ==========================================
// ConfigManager 集成测试
// ==========================================
// 测试目标: 配置持久化，以及排班每次运行重新读取配置
// ==========================================


use shift_roster::api::ScheduleApi;
use shift_roster::config::{config_keys, ConfigManager, ScheduleConfig, ScheduleConfigReader};
use shift_roster::domain::UnfilledReason;
use shift_roster::repository::{LedgerRepository, ScheduleRepository};
use std::sync::Arc;
use test_helpers::{create_test_db, write_csv};

#[tokio::test]
async fn test_config_manager_creation() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");

    let config_manager = ConfigManager::new(&db_path);
    assert!(config_manager.is_ok(), "ConfigManager should be created successfully");

    let config = config_manager.unwrap().load_schedule_config().await.unwrap();
    assert_eq!(config, ScheduleConfig::default(), "空表使用默认值");
}

#[tokio::test]
async fn test_config_persists_across_connections() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");

    {
        let manager = ConfigManager::new(&db_path).unwrap();
        manager
            .save_schedule_config(&ScheduleConfig::default().with_weekly_limit(2))
            .unwrap();
    }

    let manager = ConfigManager::new(&db_path).unwrap();
    assert_eq!(manager.get_weekly_limit().await.unwrap(), 2);
    assert_eq!(
        manager.get_config_value(config_keys::WEEKLY_SHIFT_LIMIT).unwrap().as_deref(),
        Some("2")
    );
}

#[tokio::test]
async fn test_invalid_config_blocks_save() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let manager = ConfigManager::new(&db_path).unwrap();

    assert!(manager
        .save_schedule_config(&ScheduleConfig::default().with_weekly_limit(0))
        .is_err());
    assert_eq!(manager.get_weekly_limit().await.unwrap(), 5, "校验失败不写入");
}

#[tokio::test]
async fn test_schedule_run_rereads_config() {
    println!("=== 测试：排班每次运行重新读取配置 ===");

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let manager = Arc::new(ConfigManager::new(&db_path).unwrap());
    let api = ScheduleApi::new(
        manager.clone(),
        Arc::new(LedgerRepository::new(&db_path).unwrap()),
        Arc::new(ScheduleRepository::new(&db_path).unwrap()),
    );

    let requests = write_csv("name,date,shift,station,hours\nDana,2026-01-05,Evening,A,08:00-16:00\n");
    let shifts = write_csv("shift,station,category,hours\nEvening,A,regular,15:00-23:00\n");

    let loaded = api.load_inputs(requests.path(), shifts.path(), None).await.unwrap();
    let ws = loaded.workspace_id.as_str();

    let strict = api.run_auto_schedule(ws).await.unwrap();
    assert_eq!(strict.unfilled_by_reason.get(&UnfilledReason::HoursMismatch), Some(&1));

    manager
        .save_schedule_config(&ScheduleConfig::default().with_strict_hours(false))
        .unwrap();

    let relaxed = api.run_auto_schedule(ws).await.unwrap();
    assert_eq!(relaxed.filled, 1, "关闭严格时段后应能分配");
}
