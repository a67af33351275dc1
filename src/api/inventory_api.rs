// ==========================================
// 药品管理系统 - 库存 API
// ==========================================
// 约定: 有效期校验以注入的"今天"为准（默认取本地日期）
// ==========================================

use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{parse_inventory, InventoryForm};
use crate::domain::inventory::{InventoryRecord, InventoryView, NewInventory};
use crate::repository::inventory_repo::InventoryRepository;
use crate::repository::medicine_repo::MedicineRepository;

/// 日期来源
pub type Clock = Box<dyn Fn() -> NaiveDate + Send + Sync>;

pub struct InventoryApi {
    inventory_repo: Arc<InventoryRepository>,
    medicine_repo: Arc<MedicineRepository>,
    today: Clock,
}

impl InventoryApi {
    pub fn new(inventory_repo: Arc<InventoryRepository>, medicine_repo: Arc<MedicineRepository>) -> Self {
        Self::with_clock(inventory_repo, medicine_repo, Box::new(|| Local::now().date_naive()))
    }

    /// 指定日期来源（测试用固定日期）
    pub fn with_clock(
        inventory_repo: Arc<InventoryRepository>,
        medicine_repo: Arc<MedicineRepository>,
        today: Clock,
    ) -> Self {
        Self {
            inventory_repo,
            medicine_repo,
            today,
        }
    }

    fn checked(&self, form: &InventoryForm) -> ApiResult<NewInventory> {
        let inventory = parse_inventory(form, (self.today)()).map_err(ApiError::ValidationFailed)?;
        if self.medicine_repo.find_by_id(inventory.med_id)?.is_none() {
            return Err(ApiError::NotFound(format!("药品(id={})不存在", inventory.med_id)));
        }
        Ok(inventory)
    }

    /// 新增库存，返回 inventory_id
    pub fn add_inventory(&self, form: &InventoryForm) -> ApiResult<i64> {
        let inventory = self.checked(form)?;
        let inventory_id = self.inventory_repo.insert(&inventory)?;
        info!(
            inventory_id,
            med_id = inventory.med_id,
            quantity = inventory.quantity,
            "库存已新增"
        );
        Ok(inventory_id)
    }

    pub fn update_inventory(&self, inventory_id: i64, form: &InventoryForm) -> ApiResult<()> {
        let inventory = self.checked(form)?;
        self.inventory_repo.update(inventory_id, &inventory)?;
        info!(inventory_id, quantity = inventory.quantity, "库存已修改");
        Ok(())
    }

    pub fn delete_inventory(&self, inventory_id: i64) -> ApiResult<()> {
        self.inventory_repo.delete(inventory_id)?;
        info!(inventory_id, "库存已删除");
        Ok(())
    }

    pub fn get_inventory(&self, inventory_id: i64) -> ApiResult<InventoryRecord> {
        self.inventory_repo
            .find_by_id(inventory_id)?
            .ok_or_else(|| ApiError::NotFound(format!("库存(id={})不存在", inventory_id)))
    }

    /// 全部库存（附药品名，按有效期排序）
    pub fn list_inventory(&self) -> ApiResult<Vec<InventoryView>> {
        Ok(self.inventory_repo.list_all()?)
    }

    /// 已过期的库存（相对当前日期）
    pub fn list_expired(&self) -> ApiResult<Vec<InventoryView>> {
        let today = (self.today)();
        Ok(self
            .inventory_repo
            .list_all()?
            .into_iter()
            .filter(|v| v.inventory.is_expired(today))
            .collect())
    }
}
