// ==========================================
// 药品管理系统 - 库存仓储
// ==========================================
// 职责: 管理 inventory 表的 CRUD
// 红线: 不含业务逻辑，只负责数据访问
// ==========================================

use crate::domain::inventory::{InventoryRecord, InventoryView, NewInventory};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

fn map_inventory_row(row: &Row<'_>) -> SqliteResult<InventoryRecord> {
    Ok(InventoryRecord {
        inventory_id: row.get(0)?,
        med_id: row.get(1)?,
        quantity: row.get(2)?,
        expiration: row.get(3)?,
    })
}

pub struct InventoryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl InventoryRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, inventory: &NewInventory) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO inventory (med_id, quantity, expiration) VALUES (?1, ?2, ?3)",
            params![inventory.med_id, inventory.quantity, inventory.expiration],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update(&self, inventory_id: i64, inventory: &NewInventory) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE inventory SET med_id = ?1, quantity = ?2, expiration = ?3
            WHERE inventory_id = ?4
            "#,
            params![
                inventory.med_id,
                inventory.quantity,
                inventory.expiration,
                inventory_id,
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::not_found("InventoryRecord", inventory_id));
        }
        Ok(())
    }

    pub fn delete(&self, inventory_id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM inventory WHERE inventory_id = ?1",
            params![inventory_id],
        )?;

        if affected == 0 {
            return Err(RepositoryError::not_found("InventoryRecord", inventory_id));
        }
        Ok(())
    }

    pub fn find_by_id(&self, inventory_id: i64) -> RepositoryResult<Option<InventoryRecord>> {
        let conn = self.get_conn()?;
        let record = conn
            .query_row(
                r#"
                SELECT inventory_id, med_id, quantity, expiration
                FROM inventory WHERE inventory_id = ?1
                "#,
                params![inventory_id],
                map_inventory_row,
            )
            .optional()?;
        Ok(record)
    }

    /// 全部库存（附药品名，按有效期升序，临期在前）
    pub fn list_all(&self) -> RepositoryResult<Vec<InventoryView>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT i.inventory_id, i.med_id, i.quantity, i.expiration, m.med_name
            FROM inventory i
            JOIN med_info m ON m.med_id = i.med_id
            ORDER BY i.expiration, i.inventory_id
            "#,
        )?;

        let views = stmt
            .query_map([], |row| {
                Ok(InventoryView {
                    inventory: map_inventory_row(row)?,
                    med_name: row.get(4)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(views)
    }

    pub fn count_by_medicine(&self, med_id: i64) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM inventory WHERE med_id = ?1",
            params![med_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
