// ==========================================
// API 集成测试
// ==========================================
// 测试目标: 录入校验、级联删除、检索分页排序、导入后关联数据
// ==========================================


use chrono::NaiveDate;
use medassist::api::{
    ApiError, InventoryApi, InventoryForm, MedicineApi, ScheduleApi, ScheduleForm,
};
use medassist::domain::{CatalogSortField, NewMedicine, SortDirection};
use medassist::importer::{CatalogImporter, CatalogImporterImpl};
use medassist::logging;
use medassist::repository::{
    CatalogImportRepositoryImpl, InventoryRepository, MedicineRepository, ScheduleRepository,
};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tempfile::tempdir;
use test_helpers::{create_test_db, open_conn, write_csv};

struct Apis {
    conn: Arc<Mutex<Connection>>,
    medicine: MedicineApi,
    schedule: ScheduleApi,
    inventory: InventoryApi,
}

fn create_test_apis(db_path: &str) -> Apis {
    let conn = Arc::new(Mutex::new(open_conn(db_path)));
    let medicine_repo = Arc::new(MedicineRepository::from_connection(conn.clone()));

    Apis {
        medicine: MedicineApi::new(medicine_repo.clone()),
        schedule: ScheduleApi::new(
            Arc::new(ScheduleRepository::from_connection(conn.clone())),
            medicine_repo.clone(),
        ),
        inventory: InventoryApi::with_clock(
            Arc::new(InventoryRepository::from_connection(conn.clone())),
            medicine_repo,
            Box::new(|| NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()),
        ),
        conn,
    }
}

fn medicine(name: &str, med_type: &str, manufacturer: &str) -> NewMedicine {
    NewMedicine {
        manufacturer: Some(manufacturer.to_string()),
        ..NewMedicine::named(name, Some(med_type))
    }
}

fn schedule_form(med_id: i64) -> ScheduleForm {
    ScheduleForm {
        med_id: med_id.to_string(),
        consumption_start: "2026-10-20".to_string(),
        consumption_end: "2026-11-02".to_string(),
        frequency: "3x daily".to_string(),
    }
}

fn inventory_form(med_id: i64, quantity: &str) -> InventoryForm {
    InventoryForm {
        med_id: med_id.to_string(),
        quantity: quantity.to_string(),
        expiration: "2027-06-30".to_string(),
    }
}

#[test]
fn test_delete_medicine_cascades_to_schedule_and_inventory() {
    logging::init_test();
    let (_db, db_path) = create_test_db().unwrap();
    let apis = create_test_apis(&db_path);

    let aspirin = apis
        .medicine
        .add_medicine(&medicine("Aspirin", "Analgesic", "Bayer"))
        .unwrap();
    let keep = apis
        .medicine
        .add_medicine(&medicine("Ibuprofen", "NSAID", "Advil"))
        .unwrap();

    apis.schedule.add_schedule(&schedule_form(aspirin)).unwrap();
    apis.schedule.add_schedule(&schedule_form(aspirin)).unwrap();
    apis.inventory.add_inventory(&inventory_form(aspirin, "40")).unwrap();
    apis.inventory.add_inventory(&inventory_form(keep, "12")).unwrap();

    let summary = apis.medicine.delete_medicine(aspirin).unwrap();
    assert_eq!(summary.med_name, "Aspirin");
    assert_eq!(summary.schedules_removed, 2);
    assert_eq!(summary.inventory_removed, 1);

    assert!(apis.schedule.list_schedules().unwrap().is_empty());
    let stock = apis.inventory.list_inventory().unwrap();
    assert_eq!(stock.len(), 1);
    assert_eq!(stock[0].med_name, "Ibuprofen");
    assert!(matches!(apis.medicine.get_medicine(aspirin), Err(ApiError::NotFound(_))));
}

#[test]
fn test_validation_blocks_writes() {
    logging::init_test();
    let (_db, db_path) = create_test_db().unwrap();
    let apis = create_test_apis(&db_path);

    let mut bad = NewMedicine::named("Aspirin", Some("Analgesic"));
    bad.strength = Some("extra strong".to_string());
    match apis.medicine.add_medicine(&bad) {
        Err(ApiError::ValidationFailed(violations)) => {
            assert_eq!(violations.len(), 1);
            assert_eq!(violations[0].field, "strength");
        }
        other => panic!("expected validation failure, got {other:?}"),
    }

    let med_id = apis
        .medicine
        .add_medicine(&medicine("Aspirin", "Analgesic", "Bayer"))
        .unwrap();
    let err = apis
        .inventory
        .add_inventory(&inventory_form(med_id, "-1"))
        .unwrap_err();
    assert!(matches!(err, ApiError::ValidationFailed(ref v) if v[0].field == "quantity"));

    assert!(apis.inventory.list_inventory().unwrap().is_empty());
}

#[test]
fn test_search_keyword_paging_and_sort() {
    logging::init_test();
    let (_db, db_path) = create_test_db().unwrap();
    let apis = create_test_apis(&db_path);

    for (name, med_type, maker) in [
        ("Aspirin", "Analgesic", "Bayer"),
        ("Ibuprofen", "NSAID", "Advil"),
        ("Naproxen", "NSAID", "Aleve"),
        ("Amoxicillin", "Antibiotic", "Sandoz"),
        ("Diclofenac", "NSAID", "Novartis"),
    ] {
        apis.medicine
            .add_medicine(&medicine(name, med_type, maker))
            .unwrap();
    }

    // 关键字匹配任一字段
    let page = apis
        .medicine
        .search_medicines(Some("nsaid"), 1, 2, CatalogSortField::Name, SortDirection::Desc)
        .unwrap();
    assert_eq!(page.total, 3);
    let names: Vec<_> = page.items.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Naproxen", "Ibuprofen"]);

    let page2 = apis
        .medicine
        .search_medicines(Some("nsaid"), 2, 2, CatalogSortField::Name, SortDirection::Desc)
        .unwrap();
    assert_eq!(page2.items.len(), 1);
    assert_eq!(page2.items[0].name, "Diclofenac");

    let by_maker = apis
        .medicine
        .search_medicines(Some("Sandoz"), 1, 10, CatalogSortField::Manufacturer, SortDirection::Asc)
        .unwrap();
    assert_eq!(by_maker.total, 1);
    assert_eq!(by_maker.items[0].name, "Amoxicillin");
}

#[test]
fn test_reimport_removes_dependent_rows() {
    logging::init_test();
    let (_db, db_path) = create_test_db().unwrap();
    let dir = tempdir().unwrap();
    let csv = write_csv(dir.path(), "medicine.csv", b"name,type\nAspirin,Analgesic\n");

    let apis = create_test_apis(&db_path);
    let aspirin = apis
        .medicine
        .add_medicine(&medicine("Aspirin", "Analgesic", "Bayer"))
        .unwrap();
    apis.schedule.add_schedule(&schedule_form(aspirin)).unwrap();

    // 与 API 共享同一连接
    let importer = CatalogImporterImpl::with_defaults(CatalogImportRepositoryImpl::from_connection(
        apis.conn.clone(),
    ));
    importer.sync_from_csv(&csv).unwrap();

    // 整表替换后药品获得新 med_id，旧计划随级联删除
    assert!(apis.schedule.list_schedules().unwrap().is_empty());
    let page = apis
        .medicine
        .search_medicines(None, 1, 10, CatalogSortField::Name, SortDirection::Asc)
        .unwrap();
    assert_eq!(page.total, 1);
    assert_ne!(page.items[0].med_id, aspirin);
}
