// ==========================================
// 药品管理系统 - 启动配置
// ==========================================
// 来源: 环境变量（未设置时使用默认值）
//   MEDASSIST_DB_PATH      数据库文件路径
//   MEDASSIST_CATALOG_CSV  目录 CSV 路径
//   MEDASSIST_PAGE_SIZE    检索默认每页条数
// ==========================================

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

pub const ENV_DB_PATH: &str = "MEDASSIST_DB_PATH";
pub const ENV_CATALOG_CSV: &str = "MEDASSIST_CATALOG_CSV";
pub const ENV_PAGE_SIZE: &str = "MEDASSIST_PAGE_SIZE";

pub const DEFAULT_CATALOG_CSV: &str = "medicine.csv";
pub const DEFAULT_PAGE_SIZE: i64 = 20;

const DB_FILE_NAME: &str = "medassist.db";

// ==========================================
// AppConfig
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub db_path: String,
    pub catalog_csv_path: PathBuf,
    pub page_size: i64,
}

impl AppConfig {
    /// 从进程环境变量加载
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源加载（空白值视为未设置）
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let db_path = get(ENV_DB_PATH).unwrap_or_else(default_db_path);
        let catalog_csv_path = PathBuf::from(
            get(ENV_CATALOG_CSV).unwrap_or_else(|| DEFAULT_CATALOG_CSV.to_string()),
        );

        let page_size = match get(ENV_PAGE_SIZE) {
            None => DEFAULT_PAGE_SIZE,
            Some(raw) => match raw.parse::<i64>() {
                Ok(n) if n > 0 => n,
                _ => {
                    warn!(value = %raw, default = DEFAULT_PAGE_SIZE, "{} 无效，使用默认值", ENV_PAGE_SIZE);
                    DEFAULT_PAGE_SIZE
                }
            },
        };

        Self {
            db_path,
            catalog_csv_path,
            page_size,
        }
    }
}

/// 默认数据库路径
///
/// 优先用户数据目录（medassist/medassist.db），不可用时回退到当前目录
pub fn default_db_path() -> String {
    let mut path = PathBuf::from(".").join(DB_FILE_NAME);

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("medassist");
        match std::fs::create_dir_all(&dir) {
            Ok(()) => path = dir.join(DB_FILE_NAME),
            Err(e) => warn!(dir = %dir.display(), error = %e, "数据目录不可用，回退到当前目录"),
        }
    }

    path.to_string_lossy().to_string()
}
