// ==========================================
// 药品管理系统 - 药品目录仓储
// ==========================================
// 职责: 管理 med_info 表的 CRUD 与检索
// 红线: 不含业务逻辑，只负责数据访问
// 约束: 排序列经枚举白名单，其余全部参数化
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::medicine::{CatalogQuery, MedicineRecord, NewMedicine};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use serde::Serialize;
use std::sync::{Arc, Mutex};

const MEDICINE_COLUMNS: &str = r#"
    med_id, med_name, med_type, dosage_form, strength,
    manufacturer, indication, classification
"#;

const KEYWORD_FILTER: &str = r#"
    WHERE med_name LIKE ?1 OR med_type LIKE ?1 OR
          dosage_form LIKE ?1 OR strength LIKE ?1 OR
          manufacturer LIKE ?1 OR indication LIKE ?1 OR
          classification LIKE ?1
"#;

fn map_medicine_row(row: &Row<'_>) -> SqliteResult<MedicineRecord> {
    Ok(MedicineRecord {
        med_id: row.get(0)?,
        name: row.get(1)?,
        med_type: row.get(2)?,
        dosage_form: row.get(3)?,
        strength: row.get(4)?,
        manufacturer: row.get(5)?,
        indication: row.get(6)?,
        classification: row.get(7)?,
    })
}

/// 删除药品的结果（含级联删除的关联记录数）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MedicineDeletion {
    pub med_id: i64,
    pub med_name: String,
    pub schedules_removed: usize,
    pub inventory_removed: usize,
}

// ==========================================
// MedicineRepository - 药品目录仓储
// ==========================================
pub struct MedicineRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MedicineRepository {
    /// 创建新的 MedicineRepository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增药品
    ///
    /// # 返回
    /// - Ok(i64): 新分配的 med_id
    /// - Err(UniqueConstraintViolation): 药品名已存在
    pub fn insert(&self, medicine: &NewMedicine) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO med_info (
                med_name, med_type, dosage_form, strength,
                manufacturer, indication, classification
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                medicine.name,
                medicine.med_type,
                medicine.dosage_form,
                medicine.strength,
                medicine.manufacturer,
                medicine.indication,
                medicine.classification,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 更新药品（整行覆盖）
    pub fn update(&self, med_id: i64, medicine: &NewMedicine) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE med_info SET
                med_name = ?1, med_type = ?2, dosage_form = ?3,
                strength = ?4, manufacturer = ?5, indication = ?6,
                classification = ?7
            WHERE med_id = ?8
            "#,
            params![
                medicine.name,
                medicine.med_type,
                medicine.dosage_form,
                medicine.strength,
                medicine.manufacturer,
                medicine.indication,
                medicine.classification,
                med_id,
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::not_found("MedicineRecord", med_id));
        }
        Ok(())
    }

    /// 删除药品及其用药计划、库存记录（同一事务）
    pub fn delete(&self, med_id: i64) -> RepositoryResult<MedicineDeletion> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let med_name: String = tx
            .query_row(
                "SELECT med_name FROM med_info WHERE med_id = ?1",
                params![med_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| RepositoryError::not_found("MedicineRecord", med_id))?;

        let schedules_removed = tx.execute("DELETE FROM schedule WHERE med_id = ?1", params![med_id])?;
        let inventory_removed = tx.execute("DELETE FROM inventory WHERE med_id = ?1", params![med_id])?;
        tx.execute("DELETE FROM med_info WHERE med_id = ?1", params![med_id])?;

        tx.commit()?;

        Ok(MedicineDeletion {
            med_id,
            med_name,
            schedules_removed,
            inventory_removed,
        })
    }

    /// 按 med_id 查询
    pub fn find_by_id(&self, med_id: i64) -> RepositoryResult<Option<MedicineRecord>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM med_info WHERE med_id = ?1", MEDICINE_COLUMNS);
        let record = conn
            .query_row(&sql, params![med_id], map_medicine_row)
            .optional()?;
        Ok(record)
    }

    /// 按药品名精确查询
    pub fn find_by_name(&self, name: &str) -> RepositoryResult<Option<MedicineRecord>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM med_info WHERE med_name = ?1", MEDICINE_COLUMNS);
        let record = conn
            .query_row(&sql, params![name], map_medicine_row)
            .optional()?;
        Ok(record)
    }

    /// 药品名是否已被其他记录占用（更新时排除自身）
    pub fn exists_name_except(&self, name: &str, med_id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let exists = conn
            .query_row(
                "SELECT 1 FROM med_info WHERE med_name = ?1 AND med_id != ?2 LIMIT 1",
                params![name, med_id],
                |_row| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        Ok(exists)
    }

    /// 统计满足查询条件的记录数（忽略分页）
    pub fn count(&self, query: &CatalogQuery) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = match query.normalized_keyword() {
            Some(keyword) => {
                let sql = format!("SELECT COUNT(*) FROM med_info {}", KEYWORD_FILTER);
                conn.query_row(&sql, params![like_pattern(keyword)], |row| row.get(0))?
            }
            None => conn.query_row("SELECT COUNT(*) FROM med_info", [], |row| row.get(0))?,
        };
        Ok(count)
    }

    /// 检索目录（关键字 + 排序 + 分页）
    ///
    /// # 说明
    /// - 关键字对七个文本列做 LIKE %kw% 匹配
    /// - limit <= 0 表示不限制（SQLite LIMIT -1）
    /// - 排序相同时按 med_id 升序，保证分页稳定
    pub fn search(&self, query: &CatalogQuery) -> RepositoryResult<Vec<MedicineRecord>> {
        let conn = self.get_conn()?;
        let limit = if query.limit > 0 { query.limit } else { -1 };
        let offset = query.offset.max(0);
        let order = format!(
            "ORDER BY {} {}, med_id ASC",
            query.sort.column(),
            query.direction.keyword()
        );

        let records = match query.normalized_keyword() {
            Some(keyword) => {
                let sql = format!(
                    "SELECT {} FROM med_info {} {} LIMIT ?2 OFFSET ?3",
                    MEDICINE_COLUMNS, KEYWORD_FILTER, order
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params![like_pattern(keyword), limit, offset], map_medicine_row)?
                    .collect::<SqliteResult<Vec<_>>>()?;
                rows
            }
            None => {
                let sql = format!(
                    "SELECT {} FROM med_info {} LIMIT ?1 OFFSET ?2",
                    MEDICINE_COLUMNS, order
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params![limit, offset], map_medicine_row)?
                    .collect::<SqliteResult<Vec<_>>>()?;
                rows
            }
        };

        Ok(records)
    }

    /// 查询全部药品（按名称排序）
    pub fn list_all(&self) -> RepositoryResult<Vec<MedicineRecord>> {
        self.search(&CatalogQuery::default())
    }
}

fn like_pattern(keyword: &str) -> String {
    format!("%{}%", keyword)
}
