// ==========================================
// 药品管理系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入；每个实体一个仓储
// ==========================================

pub mod catalog_import_repo;
pub mod catalog_import_repo_impl;
pub mod error;
pub mod import_ledger_repo;
pub mod inventory_repo;
pub mod medicine_repo;
pub mod schedule_repo;
pub mod user_repo;

// 重导出核心仓储
pub use catalog_import_repo::{CatalogImportRepository, CatalogReplaceSummary, MappedCatalogRow};
pub use catalog_import_repo_impl::CatalogImportRepositoryImpl;
pub use error::{RepositoryError, RepositoryResult};
pub use import_ledger_repo::ImportLedgerRepository;
pub use inventory_repo::InventoryRepository;
pub use medicine_repo::{MedicineDeletion, MedicineRepository};
pub use schedule_repo::ScheduleRepository;
pub use user_repo::UserRepository;
