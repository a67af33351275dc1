// ==========================================
// 药品管理系统 - 应用层
// ==========================================
// 职责: 启动序列与共享状态
// ==========================================

pub mod state;

// 重导出
pub use state::{AppError, AppState};
