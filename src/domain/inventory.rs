// ==========================================
// 药品管理系统 - 库存领域模型
// ==========================================
// 对齐: inventory 表（med_id 外键，随药品级联删除）
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 库存记录（已落库）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub inventory_id: i64,
    pub med_id: i64,
    pub quantity: i64,          // 数量（非负）
    pub expiration: NaiveDate,  // 有效期
}

impl InventoryRecord {
    /// 相对 today 是否已过期
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expiration < today
    }
}

/// 待写入的库存记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInventory {
    pub med_id: i64,
    pub quantity: i64,
    pub expiration: NaiveDate,
}

/// 列表视图：附带药品名
#[derive(Debug, Clone, Serialize)]
pub struct InventoryView {
    pub inventory: InventoryRecord,
    pub med_name: String,
}
