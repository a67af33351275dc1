// ==========================================
// 启动序列集成测试
// ==========================================


use medassist::app::AppState;
use medassist::config::AppConfig;
use medassist::domain::{CatalogSortField, ImportOutcome, SkipReason, SortDirection};
use medassist::logging;
use tempfile::tempdir;
use test_helpers::{set_mtime, write_csv};

#[test]
fn test_restart_skips_unchanged_catalog() {
    logging::init_test();
    let dir = tempdir().unwrap();
    let csv = write_csv(
        dir.path(),
        "medicine.csv",
        b"name,type,form,strength\nAspirin,Analgesic,Tablet,100mg\nIbuprofen,NSAID,Tablet,200mg\n",
    );
    set_mtime(&csv, 1_700_000_000);

    let config = AppConfig {
        db_path: dir.path().join("medassist.db").to_string_lossy().to_string(),
        catalog_csv_path: csv.clone(),
        page_size: 1,
    };

    let first = AppState::bootstrap(&config).unwrap();
    assert!(matches!(first.import_outcome, Some(ImportOutcome::Imported(_))));
    drop(first);

    // 第二次启动：文件未变更，沿用已有目录
    let second = AppState::bootstrap(&config).unwrap();
    assert!(matches!(
        second.import_outcome,
        Some(ImportOutcome::Skipped(SkipReason::Unchanged { .. }))
    ));

    let page = second
        .medicine_api
        .search_medicines(None, 2, second.page_size, CatalogSortField::Name, SortDirection::Asc)
        .unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.items[0].name, "Ibuprofen");
    assert_eq!(page.items[0].strength.as_deref(), Some("200mg"));
}
