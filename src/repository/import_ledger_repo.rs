// ==========================================
// 药品管理系统 - 导入台账仓储
// ==========================================
// 职责: 读取 csv_import_status 表
// 说明: 写入只发生在导入事务内（见 catalog_import_repo_impl）
// ==========================================

use crate::domain::import::ImportLedgerEntry;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex};

pub struct ImportLedgerRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ImportLedgerRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取文件上次导入时记录的修改时间
    pub fn find_last_modified(&self, file_path: &str) -> RepositoryResult<Option<i64>> {
        let conn = self.get_conn()?;
        find_last_modified(&conn, file_path)
    }

    pub fn list_all(&self) -> RepositoryResult<Vec<ImportLedgerEntry>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT filename, last_modified FROM csv_import_status ORDER BY filename",
        )?;
        let entries = stmt
            .query_map([], |row| {
                Ok(ImportLedgerEntry {
                    file_path: row.get(0)?,
                    last_modified: row.get(1)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(entries)
    }
}

/// 在给定连接（或事务）上查询台账
pub(crate) fn find_last_modified(conn: &Connection, file_path: &str) -> RepositoryResult<Option<i64>> {
    let value = conn
        .query_row(
            "SELECT last_modified FROM csv_import_status WHERE filename = ?1",
            params![file_path],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value)
}

/// 在给定连接（或事务）上写入/覆盖台账
pub(crate) fn upsert_last_modified(
    conn: &Connection,
    file_path: &str,
    last_modified: i64,
) -> RepositoryResult<()> {
    conn.execute(
        r#"
        INSERT INTO csv_import_status (filename, last_modified) VALUES (?1, ?2)
        ON CONFLICT(filename) DO UPDATE SET last_modified = excluded.last_modified
        "#,
        params![file_path, last_modified],
    )?;
    Ok(())
}
