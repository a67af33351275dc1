// ==========================================
// 药品管理系统 - 配置层
// ==========================================
// 职责: 启动配置（数据库路径、目录 CSV 路径、分页默认值）
// ==========================================

pub mod app_config;

pub use app_config::{default_db_path, AppConfig};
