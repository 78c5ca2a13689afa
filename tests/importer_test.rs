// ==========================================
// 导入层集成测试
// ==========================================
// 测试目标: 表头映射、缺列报错、行级清洗与诊断
// ==========================================


use shift_roster::config::ScheduleConfig;
use shift_roster::domain::{DqKind, DqLevel, InputSource};
use shift_roster::importer::{ImportError, RosterImporter};
use test_helpers::{date, hours, write_csv, HEBREW_REQUESTS_CSV, HEBREW_SHIFTS_CSV};

fn load(requests: &str, shifts: &str) -> Result<shift_roster::importer::LoadedInput, ImportError> {
    let requests_file = write_csv(requests);
    let shifts_file = write_csv(shifts);
    RosterImporter::new().load(requests_file.path(), shifts_file.path(), &ScheduleConfig::default())
}

// ==========================================
// 正常导入
// ==========================================

#[test]
fn test_load_hebrew_headers() {
    println!("=== 测试：希伯来语表头导入 ===");

    let input = load(HEBREW_REQUESTS_CSV, HEBREW_SHIFTS_CSV).expect("导入应成功");

    assert_eq!(input.pool.len(), 4);
    assert_eq!(input.pool.employee_count(), 3);
    assert_eq!(input.catalog.len(), 2);
    assert_eq!(input.dates(), vec![date(2026, 1, 5), date(2026, 1, 6)]);

    let avi = input
        .pool
        .iter()
        .find(|r| r.employee == "Avi")
        .expect("应包含 Avi");
    assert!(avi.has_certification("ATAN"), "כן 视为具备资质");
    assert_eq!(avi.hours, Some(hours("07:00-15:00")));
    assert_eq!(avi.row_number, 3, "行号从表头之后的第 2 行开始计");

    let dana = input.pool.iter().next().expect("应有申请");
    assert!(!dana.has_certification("ATAN"));
    assert!(input.diagnostics.is_clean());
}

#[test]
fn test_load_english_headers_with_bom_and_padding() {
    let requests = "\u{feff}Name,Date,Shift,Station,Hours\n  Dana  ,2026-01-05,Morning,A, 15:00 - 07:00 \n";
    let shifts = "Shift,Station,Category\nMorning,A,ATAN senior\n";

    let input = load(requests, shifts).expect("导入应成功");

    let dana = input.pool.iter().next().expect("应有申请");
    assert_eq!(dana.employee, "Dana", "去首尾空白");
    assert_eq!(dana.hours, Some(hours("07:00-15:00")), "反向时段已纠正");
    assert_eq!(input.diagnostics.corrections.len(), 1);

    let template = input.catalog.get(0).expect("目录应有一行");
    assert_eq!(template.required_certification.as_deref(), Some("ATAN"), "类别含专项标记");
    assert!(template.hours.is_none());
}

// ==========================================
// 结构错误
// ==========================================

#[test]
fn test_missing_columns_reported_before_scheduling() {
    println!("=== 测试：缺列在排班前报错，并列出每一列 ===");

    let requests = "שם,תאריך מבוקש,תחנה\nDana,05/01/2026,A\n";
    let shifts = "משמרת,תחנה\nMorning,A\n";

    let err = load(requests, shifts).expect_err("缺列应失败");
    match err {
        ImportError::MissingColumns(gaps) => {
            let described: Vec<(InputSource, &str)> =
                gaps.iter().map(|g| (g.source, g.field.as_str())).collect();
            assert_eq!(
                described,
                vec![(InputSource::Requests, "shift"), (InputSource::Shifts, "category")]
            );
            assert!(gaps[1].accepted.iter().any(|a| a == "סוג תקן"));
        }
        other => panic!("期望 MissingColumns，实际 {:?}", other),
    }
}

#[test]
fn test_empty_shift_catalog_is_an_error() {
    let err = load(HEBREW_REQUESTS_CSV, "משמרת,תחנה,סוג תקן\n").expect_err("空目录应失败");
    assert!(matches!(err, ImportError::EmptyInput(InputSource::Shifts)));
}

#[test]
fn test_empty_requests_are_allowed() {
    let input = load("שם,תאריך מבוקש,משמרת,תחנה\n", HEBREW_SHIFTS_CSV).expect("空申请表允许导入");
    assert!(input.pool.is_empty());
    assert!(input.dates().is_empty());
}

#[test]
fn test_unsupported_file_format() {
    let mut file = tempfile::Builder::new().suffix(".txt").tempfile().expect("临时文件");
    std::io::Write::write_all(&mut file, b"x").expect("写入");
    let shifts = write_csv(HEBREW_SHIFTS_CSV);

    let err = RosterImporter::new()
        .load(file.path(), shifts.path(), &ScheduleConfig::default())
        .expect_err("不支持的格式应失败");
    assert!(matches!(err, ImportError::UnsupportedFormat(_)));
}

// ==========================================
// 行级诊断
// ==========================================

#[test]
fn test_row_level_problems_become_diagnostics() {
    println!("=== 测试：行级异常不中断导入 ===");

    let requests = "\
שם,תאריך מבוקש,משמרת,תחנה,שעות
Dana,not-a-date,Morning,A,07:00-15:00
,05/01/2026,Morning,A,
Avi,05/01/2026,Morning,A,morning-ish
Avi,05/01/2026,Morning,A,
Noa,05/01/2026 00:00:00,Morning,A,
";

    let input = load(requests, HEBREW_SHIFTS_CSV).expect("导入应成功");
    let diagnostics = &input.diagnostics;

    assert_eq!(input.pool.len(), 3, "无法解析日期与缺员工名的行被剔除");
    assert_eq!(diagnostics.count(DqKind::UnparseableDate), 1);
    assert_eq!(diagnostics.count(DqKind::MissingValue), 1);
    assert_eq!(diagnostics.count(DqKind::AmbiguousHours), 1);
    assert_eq!(diagnostics.count(DqKind::DuplicateRequest), 1);
    assert_eq!(diagnostics.rejected_rows(), 2);

    let bad_date = diagnostics
        .violations
        .iter()
        .find(|v| v.kind == DqKind::UnparseableDate)
        .expect("应有日期诊断");
    assert_eq!(bad_date.row_number, 2);
    assert_eq!(bad_date.level, DqLevel::Error);

    let ambiguous = input
        .pool
        .iter()
        .find(|r| r.employee == "Avi")
        .expect("应保留 Avi");
    assert!(ambiguous.hours.is_none(), "无法识别的时段按未声明处理");
}
