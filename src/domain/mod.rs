// ==========================================
// 药品管理系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体与值类型
// 红线: 不含数据访问逻辑
// ==========================================

pub mod import;
pub mod inventory;
pub mod medicine;
pub mod schedule;
pub mod user;

// 重导出核心类型
pub use import::{
    ImportLedgerEntry, ImportOutcome, ImportReport, RawCatalogRow, RowFailure, SkipReason,
};
pub use inventory::{InventoryRecord, InventoryView, NewInventory};
pub use medicine::{
    CatalogQuery, CatalogSortField, MedicineRecord, NewMedicine, SortDirection,
    CATALOG_COLUMN_COUNT,
};
pub use schedule::{NewSchedule, ScheduleRecord, ScheduleView};
pub use user::UserAccount;
