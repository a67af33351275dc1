// ==========================================
// 药品管理系统 - API 层
// ==========================================
// 职责: 为录入/查询界面提供校验 + 持久化接口
// ==========================================

pub mod auth_api;
pub mod error;
pub mod inventory_api;
pub mod medicine_api;
pub mod schedule_api;
pub mod validator;

// 重导出核心类型
pub use auth_api::AuthApi;
pub use error::{ApiError, ApiResult, ValidationViolation};
pub use inventory_api::InventoryApi;
pub use medicine_api::{DeleteMedicineSummary, MedicineApi, Page};
pub use schedule_api::ScheduleApi;
pub use validator::{InventoryForm, ScheduleForm};
