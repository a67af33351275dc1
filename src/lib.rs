// ==========================================
// 药品管理系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 药品目录 CSV 同步 + 用药计划/库存数据维护
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 外部目录 CSV
pub mod importer;

// 配置层 - 启动配置
pub mod config;

// 数据库基础设施（连接初始化/建表/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 校验 + 持久化接口
pub mod api;

// 应用层 - 启动序列
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{
    ImportOutcome, ImportReport, InventoryRecord, MedicineRecord, NewMedicine, RowFailure,
    ScheduleRecord, SkipReason, UserAccount,
};

// 导入
pub use importer::{CatalogImporter, CatalogImporterImpl, ImportError};

// API
pub use api::{ApiError, AuthApi, InventoryApi, MedicineApi, ScheduleApi};

// 应用
pub use app::{AppError, AppState};
pub use config::AppConfig;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "MedAssist 药品管理系统";
