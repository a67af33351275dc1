// ==========================================
// 药品管理系统 - 药品目录 API
// ==========================================
// 职责: 药品目录的新增、修改、删除、检索
// 约定: 先校验，违规列表非空时不触达存储
// ==========================================

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{normalize_medicine, validate_medicine};
use crate::domain::medicine::{CatalogQuery, CatalogSortField, MedicineRecord, NewMedicine, SortDirection};
use crate::repository::medicine_repo::{MedicineDeletion, MedicineRepository};

/// 删除药品的汇总（含级联删除计数）
pub type DeleteMedicineSummary = MedicineDeletion;

// ==========================================
// Page - 分页结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    /// 页码（从 1 开始）
    pub page: i64,
    pub page_size: i64,
}

impl<T> Page<T> {
    /// 总页数（至少 1 页）
    pub fn total_pages(&self) -> i64 {
        if self.page_size <= 0 || self.total == 0 {
            return 1;
        }
        (self.total - 1) / self.page_size + 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }
}

// ==========================================
// MedicineApi - 药品目录 API
// ==========================================
pub struct MedicineApi {
    medicine_repo: Arc<MedicineRepository>,
}

impl MedicineApi {
    pub fn new(medicine_repo: Arc<MedicineRepository>) -> Self {
        Self { medicine_repo }
    }

    /// 新增药品
    ///
    /// # 返回
    /// - Ok(med_id): 新记录主键
    /// - Err(ValidationFailed): 字段校验失败
    /// - Err(DuplicateName): 药品名已存在
    pub fn add_medicine(&self, input: &NewMedicine) -> ApiResult<i64> {
        let medicine = normalize_medicine(input);
        let violations = validate_medicine(&medicine);
        if !violations.is_empty() {
            return Err(ApiError::ValidationFailed(violations));
        }

        let name = medicine.name.clone().unwrap_or_default();
        if self.medicine_repo.find_by_name(&name)?.is_some() {
            warn!(med_name = %name, "新增药品被拒绝: 名称已存在");
            return Err(ApiError::DuplicateName(name));
        }

        let med_id = self.medicine_repo.insert(&medicine)?;
        info!(med_id, med_name = %name, "药品已新增");
        Ok(med_id)
    }

    /// 修改药品
    ///
    /// # 返回
    /// - Err(NotFound): med_id 不存在
    /// - Err(DuplicateName): 名称被其他药品占用
    pub fn update_medicine(&self, med_id: i64, input: &NewMedicine) -> ApiResult<()> {
        let medicine = normalize_medicine(input);
        let violations = validate_medicine(&medicine);
        if !violations.is_empty() {
            return Err(ApiError::ValidationFailed(violations));
        }

        if self.medicine_repo.find_by_id(med_id)?.is_none() {
            return Err(ApiError::NotFound(format!("药品(id={})不存在", med_id)));
        }

        let name = medicine.name.clone().unwrap_or_default();
        if self.medicine_repo.exists_name_except(&name, med_id)? {
            warn!(med_id, med_name = %name, "修改药品被拒绝: 名称已被占用");
            return Err(ApiError::DuplicateName(name));
        }

        self.medicine_repo.update(med_id, &medicine)?;
        info!(med_id, med_name = %name, "药品已修改");
        Ok(())
    }

    /// 删除药品（级联删除用药计划与库存）
    pub fn delete_medicine(&self, med_id: i64) -> ApiResult<DeleteMedicineSummary> {
        let summary = self.medicine_repo.delete(med_id)?;
        info!(
            med_id,
            med_name = %summary.med_name,
            schedules_removed = summary.schedules_removed,
            inventory_removed = summary.inventory_removed,
            "药品已删除"
        );
        Ok(summary)
    }

    /// 按 med_id 查询
    pub fn get_medicine(&self, med_id: i64) -> ApiResult<MedicineRecord> {
        self.medicine_repo
            .find_by_id(med_id)?
            .ok_or_else(|| ApiError::NotFound(format!("药品(id={})不存在", med_id)))
    }

    /// 关键字检索 + 分页 + 排序
    ///
    /// # 参数
    /// - keyword: 匹配任一目录字段（空则不过滤）
    /// - page: 页码，从 1 开始
    /// - page_size: 每页条数，必须为正
    pub fn search_medicines(
        &self,
        keyword: Option<&str>,
        page: i64,
        page_size: i64,
        sort: CatalogSortField,
        direction: SortDirection,
    ) -> ApiResult<Page<MedicineRecord>> {
        if page < 1 {
            return Err(ApiError::InvalidInput(format!("页码必须从 1 开始: {}", page)));
        }
        if page_size < 1 {
            return Err(ApiError::InvalidInput(format!("每页条数必须为正: {}", page_size)));
        }

        // 页码过大时偏移量溢出，按非法输入拒绝
        let offset = (page - 1).checked_mul(page_size).ok_or_else(|| {
            ApiError::InvalidInput(format!("页码超出范围: {} (每页 {} 条)", page, page_size))
        })?;

        let query = CatalogQuery {
            keyword: keyword.map(str::to_string),
            limit: page_size,
            offset,
            sort,
            direction,
        };

        let total = self.medicine_repo.count(&query)?;
        let items = self.medicine_repo.search(&query)?;

        Ok(Page {
            items,
            total,
            page,
            page_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;
    use std::sync::Mutex;

    fn setup() -> MedicineApi {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        let repo = MedicineRepository::from_connection(Arc::new(Mutex::new(conn)));
        MedicineApi::new(Arc::new(repo))
    }

    #[test]
    fn test_add_rejects_invalid_input_without_writing() {
        let api = setup();
        let err = api.add_medicine(&NewMedicine::named("Aspirin", None)).unwrap_err();

        match err {
            ApiError::ValidationFailed(violations) => {
                assert_eq!(violations.len(), 1);
                assert_eq!(violations[0].field, "med_type");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(api.medicine_repo.find_by_name("Aspirin").unwrap().is_none());
    }

    #[test]
    fn test_add_rejects_duplicate_name() {
        let api = setup();
        api.add_medicine(&NewMedicine::named("Aspirin", Some("Analgesic"))).unwrap();

        let err = api
            .add_medicine(&NewMedicine::named(" Aspirin ", Some("NSAID")))
            .unwrap_err();
        assert!(matches!(err, ApiError::DuplicateName(ref n) if n == "Aspirin"));
    }

    #[test]
    fn test_update_checks_existence_and_other_names() {
        let api = setup();
        let aspirin = api.add_medicine(&NewMedicine::named("Aspirin", Some("Analgesic"))).unwrap();
        api.add_medicine(&NewMedicine::named("Ibuprofen", Some("NSAID"))).unwrap();

        // 保留自身名称允许
        api.update_medicine(aspirin, &NewMedicine::named("Aspirin", Some("Salicylate")))
            .unwrap();
        assert_eq!(
            api.get_medicine(aspirin).unwrap().med_type.as_deref(),
            Some("Salicylate")
        );

        let err = api
            .update_medicine(aspirin, &NewMedicine::named("Ibuprofen", Some("NSAID")))
            .unwrap_err();
        assert!(matches!(err, ApiError::DuplicateName(_)));

        let err = api
            .update_medicine(999, &NewMedicine::named("Naproxen", Some("NSAID")))
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_search_pages() {
        let api = setup();
        for name in ["Cetirizine", "Aspirin", "Ibuprofen", "Naproxen", "Amoxicillin"] {
            api.add_medicine(&NewMedicine::named(name, Some("Tablet"))).unwrap();
        }

        let first = api
            .search_medicines(None, 1, 2, CatalogSortField::Name, SortDirection::Asc)
            .unwrap();
        assert_eq!(first.total, 5);
        assert_eq!(first.total_pages(), 3);
        assert!(first.has_next());
        let names: Vec<_> = first.items.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Amoxicillin", "Aspirin"]);

        let last = api
            .search_medicines(None, 3, 2, CatalogSortField::Name, SortDirection::Asc)
            .unwrap();
        assert_eq!(last.items.len(), 1);
        assert!(!last.has_next());

        let err = api
            .search_medicines(None, 0, 2, CatalogSortField::Name, SortDirection::Asc)
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    #[test]
    fn test_search_rejects_page_beyond_offset_range() {
        let api = setup();
        api.add_medicine(&NewMedicine::named("Aspirin", Some("Analgesic"))).unwrap();

        let err = api
            .search_medicines(None, i64::MAX, 20, CatalogSortField::Name, SortDirection::Asc)
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));

        let page: Page<MedicineRecord> = Page {
            items: Vec::new(),
            total: 1,
            page: 1,
            page_size: i64::MAX,
        };
        assert_eq!(page.total_pages(), 1);
        assert!(!page.has_next());
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let api = setup();
        assert!(matches!(api.delete_medicine(42), Err(ApiError::NotFound(_))));
    }
}
