// ==========================================
// 药品管理系统 - 登录账户仓储
// ==========================================
// 职责: 管理 user 表的读写
// 红线: 只存取口令摘要，摘要的生成与比对在 API 层
// ==========================================

use crate::domain::user::UserAccount;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

pub struct UserRepository {
    conn: Arc<Mutex<Connection>>,
}

impl UserRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增账户
    ///
    /// 用户名已存在时返回 UniqueConstraintViolation
    pub fn insert(&self, username: &str, password_hash: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO user (username, password_hash) VALUES (?1, ?2)",
            params![username, password_hash],
        )?;
        Ok(())
    }

    pub fn find_by_username(&self, username: &str) -> RepositoryResult<Option<UserAccount>> {
        let conn = self.get_conn()?;
        let account = conn
            .query_row(
                "SELECT username, created_at FROM user WHERE username = ?1",
                [username],
                |row| {
                    Ok(UserAccount {
                        username: row.get(0)?,
                        created_at: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(account)
    }

    /// 读取口令摘要（账户不存在时返回 None）
    pub fn find_password_hash(&self, username: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let hash = conn
            .query_row(
                "SELECT password_hash FROM user WHERE username = ?1",
                [username],
                |row| row.get(0),
            )
            .optional()?;
        Ok(hash)
    }

    pub fn update_password_hash(&self, username: &str, password_hash: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE user SET password_hash = ?1 WHERE username = ?2",
            params![password_hash, username],
        )?;

        if affected == 0 {
            return Err(RepositoryError::not_found("UserAccount", username));
        }
        Ok(())
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM user", [], |row| row.get(0))?;
        Ok(count)
    }
}
