// ==========================================
// 药品管理系统 - 目录导入 Repository 实现
// ==========================================
// 实现: CatalogImportRepository（rusqlite）
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::import::RowFailure;
use crate::repository::catalog_import_repo::{
    CatalogImportRepository, CatalogReplaceSummary, MappedCatalogRow,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::import_ledger_repo;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// CatalogImportRepositoryImpl
// ==========================================
pub struct CatalogImportRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl CatalogImportRepositoryImpl {
    /// 创建新的 Repository 实例（幂等建表）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 返回
    /// - Err(DatabaseConnectionError): 数据库不可用
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        crate::db::init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建（与 CRUD 仓储共享同一存储句柄）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 在事务中逐行插入；单行失败只影响该行
    ///
    /// SQLite 默认冲突策略 ABORT 只回滚出错语句本身，事务继续有效；
    /// 若出错后连接已回到自动提交模式，说明整个事务已被回滚，立即返回错误
    fn insert_rows_tx(
        tx: &Connection,
        rows: &[MappedCatalogRow],
    ) -> RepositoryResult<(usize, Vec<RowFailure>)> {
        let mut stmt = tx.prepare(
            r#"
            INSERT INTO med_info (
                med_name, med_type, dosage_form, strength,
                manufacturer, indication, classification
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )?;

        let mut inserted = 0;
        let mut failures = Vec::new();
        for row in rows {
            let m = &row.medicine;
            let result = stmt.execute(params![
                m.name,
                m.med_type,
                m.dosage_form,
                m.strength,
                m.manufacturer,
                m.indication,
                m.classification,
            ]);

            match result {
                Ok(_) => inserted += 1,
                Err(e) if tx.is_autocommit() => {
                    return Err(RepositoryError::DatabaseTransactionError(format!(
                        "第 {} 行插入失败且事务已回滚: {}",
                        row.row_number, e
                    )));
                }
                Err(e) => failures.push(RowFailure {
                    row_number: row.row_number,
                    raw: row.raw.clone(),
                    reason: RepositoryError::from(e).to_string(),
                }),
            }
        }

        Ok((inserted, failures))
    }
}

impl CatalogImportRepository for CatalogImportRepositoryImpl {
    fn find_ledger_mtime(&self, file_path: &str) -> RepositoryResult<Option<i64>> {
        let conn = self.get_conn()?;
        import_ledger_repo::find_last_modified(&conn, file_path)
    }

    fn replace_catalog(
        &self,
        file_path: &str,
        file_mtime: i64,
        rows: &[MappedCatalogRow],
    ) -> RepositoryResult<CatalogReplaceSummary> {
        let conn = self.get_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        // 未提交即 drop 的事务自动回滚
        let deleted = tx.execute("DELETE FROM med_info", [])?;
        let (inserted, failures) = Self::insert_rows_tx(&tx, rows)?;
        import_ledger_repo::upsert_last_modified(&tx, file_path, file_mtime)?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Ok(CatalogReplaceSummary {
            deleted,
            inserted,
            failures,
        })
    }
}
