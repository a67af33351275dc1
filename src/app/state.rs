// ==========================================
// 药品管理系统 - 应用状态
// ==========================================
// 职责: 持有共享存储句柄与各 API 实例；执行启动序列
// 启动序列: 打开数据库 → 建表 → 目录导入 → 表计数自检 → 构造 API
// ==========================================

use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::api::{AuthApi, InventoryApi, MedicineApi, ScheduleApi};
use crate::config::AppConfig;
use crate::db::{init_schema, open_sqlite_connection, table_counts, TableCount};
use crate::domain::import::ImportOutcome;
use crate::importer::{CatalogImporter, CatalogImporterImpl};
use crate::repository::{
    CatalogImportRepositoryImpl, InventoryRepository, MedicineRepository, ScheduleRepository,
    UserRepository,
};

/// 启动错误
#[derive(Error, Debug)]
pub enum AppError {
    /// 数据库不可用（致命）
    #[error("数据库不可用: db_path={db_path}, {message}")]
    Storage { db_path: String, message: String },

    #[error("存储句柄锁获取失败: {0}")]
    LockError(String),
}

/// 应用状态
///
/// 所有仓储共享同一个连接；不使用全局单例
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 共享存储句柄
    pub conn: Arc<Mutex<Connection>>,

    /// 药品目录API
    pub medicine_api: Arc<MedicineApi>,

    /// 用药计划API
    pub schedule_api: Arc<ScheduleApi>,

    /// 库存API
    pub inventory_api: Arc<InventoryApi>,

    /// 登录账户API
    pub auth_api: Arc<AuthApi>,

    /// 本次启动的目录导入结果（导入出错时为 None）
    pub import_outcome: Option<ImportOutcome>,

    /// 检索默认每页条数
    pub page_size: i64,
}

impl AppState {
    /// 启动应用
    ///
    /// # 返回
    /// - Err(AppError::Storage): 数据库无法打开或建表失败
    ///
    /// # 说明
    /// 目录导入失败只记录日志，沿用已有目录继续启动
    pub fn bootstrap(config: &AppConfig) -> Result<Self, AppError> {
        let db_path = config.db_path.clone();
        info!(db_path = %db_path, "初始化AppState");

        let storage_err = |e: rusqlite::Error| AppError::Storage {
            db_path: db_path.clone(),
            message: e.to_string(),
        };

        let conn = open_sqlite_connection(&db_path).map_err(storage_err)?;
        init_schema(&conn).map_err(storage_err)?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 目录导入（仅运行一次，先于任何 API 调用）
        // ==========================================
        let importer =
            CatalogImporterImpl::with_defaults(CatalogImportRepositoryImpl::from_connection(conn.clone()));
        let import_outcome = match importer.sync_from_csv(&config.catalog_csv_path) {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                error!(
                    catalog_csv = %config.catalog_csv_path.display(),
                    error = %e,
                    "目录导入失败，沿用现有目录继续启动"
                );
                None
            }
        };

        // ==========================================
        // 表计数自检
        // ==========================================
        match Self::table_counts_of(&conn) {
            Ok(counts) => {
                for c in &counts {
                    info!(table = c.table.table_name(), rows = c.rows, "表计数");
                }
            }
            Err(e) => warn!(error = %e, "表计数自检失败"),
        }

        // ==========================================
        // API 实例
        // ==========================================
        let medicine_repo = Arc::new(MedicineRepository::from_connection(conn.clone()));
        let schedule_repo = Arc::new(ScheduleRepository::from_connection(conn.clone()));
        let inventory_repo = Arc::new(InventoryRepository::from_connection(conn.clone()));

        let medicine_api = Arc::new(MedicineApi::new(medicine_repo.clone()));
        let schedule_api = Arc::new(ScheduleApi::new(schedule_repo, medicine_repo.clone()));
        let inventory_api = Arc::new(InventoryApi::new(inventory_repo, medicine_repo));
        let auth_api = Arc::new(AuthApi::new(Arc::new(UserRepository::from_connection(
            conn.clone(),
        ))));

        info!("AppState初始化成功");

        Ok(Self {
            db_path,
            conn,
            medicine_api,
            schedule_api,
            inventory_api,
            auth_api,
            import_outcome,
            page_size: config.page_size,
        })
    }

    fn table_counts_of(conn: &Arc<Mutex<Connection>>) -> Result<Vec<TableCount>, AppError> {
        let guard = conn
            .lock()
            .map_err(|e| AppError::LockError(e.to_string()))?;
        table_counts(&guard).map_err(|e| AppError::Storage {
            db_path: String::new(),
            message: e.to_string(),
        })
    }

    /// 当前各表行数
    pub fn table_counts(&self) -> Result<Vec<TableCount>, AppError> {
        Self::table_counts_of(&self.conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::AppTable;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn config(dir: &std::path::Path, csv: &str) -> AppConfig {
        AppConfig {
            db_path: dir.join("medassist.db").to_string_lossy().to_string(),
            catalog_csv_path: PathBuf::from(csv),
            page_size: 10,
        }
    }

    fn rows_of(state: &AppState, table: AppTable) -> i64 {
        state
            .table_counts()
            .unwrap()
            .into_iter()
            .find(|c| c.table == table)
            .map(|c| c.rows)
            .unwrap()
    }

    #[test]
    fn test_bootstrap_imports_catalog() {
        let dir = tempdir().unwrap();
        let csv = dir.path().join("medicine.csv");
        std::fs::write(&csv, "name,type\nAspirin,Analgesic\nIbuprofen,NSAID\n").unwrap();

        let state = AppState::bootstrap(&config(dir.path(), &csv.to_string_lossy())).unwrap();

        assert!(matches!(state.import_outcome, Some(ImportOutcome::Imported(_))));
        assert_eq!(rows_of(&state, AppTable::MedInfo), 2);
        assert_eq!(rows_of(&state, AppTable::CsvImportStatus), 1);
        assert_eq!(state.page_size, 10);
    }

    #[test]
    fn test_bootstrap_without_csv_starts_empty() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("absent.csv");

        let state = AppState::bootstrap(&config(dir.path(), &missing.to_string_lossy())).unwrap();

        assert!(matches!(
            state.import_outcome,
            Some(ImportOutcome::Skipped(crate::domain::SkipReason::FileNotFound))
        ));
        assert_eq!(rows_of(&state, AppTable::MedInfo), 0);
    }

    #[test]
    fn test_bootstrap_continues_after_import_error() {
        let dir = tempdir().unwrap();
        let csv = dir.path().join("medicine.csv");
        std::fs::write(&csv, b"name,type\n\xff\xfe,broken\n").unwrap();

        let state = AppState::bootstrap(&config(dir.path(), &csv.to_string_lossy())).unwrap();

        assert!(state.import_outcome.is_none());
        assert_eq!(rows_of(&state, AppTable::MedInfo), 0);
    }

    #[test]
    fn test_bootstrap_fails_on_unusable_db_path() {
        let dir = tempdir().unwrap();
        let cfg = AppConfig {
            db_path: dir
                .path()
                .join("missing_dir")
                .join("medassist.db")
                .to_string_lossy()
                .to_string(),
            catalog_csv_path: PathBuf::from("medicine.csv"),
            page_size: 10,
        };

        assert!(matches!(
            AppState::bootstrap(&cfg),
            Err(AppError::Storage { .. })
        ));
    }
}
