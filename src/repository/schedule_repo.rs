// ==========================================
// 药品管理系统 - 用药计划仓储
// ==========================================
// 职责: 管理 schedule 表的 CRUD
// 红线: 不含业务逻辑，只负责数据访问
// ==========================================

use crate::domain::schedule::{NewSchedule, ScheduleRecord, ScheduleView};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

fn map_schedule_row(row: &Row<'_>) -> SqliteResult<ScheduleRecord> {
    Ok(ScheduleRecord {
        schedule_id: row.get(0)?,
        med_id: row.get(1)?,
        consumption_start: row.get(2)?,
        consumption_end: row.get(3)?,
        frequency: row.get(4)?,
    })
}

pub struct ScheduleRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ScheduleRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增用药计划，返回 schedule_id
    ///
    /// med_id 不存在时返回 ForeignKeyViolation
    pub fn insert(&self, schedule: &NewSchedule) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO schedule (med_id, consumption_start, consumption_end, frequency)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                schedule.med_id,
                schedule.consumption_start,
                schedule.consumption_end,
                schedule.frequency,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update(&self, schedule_id: i64, schedule: &NewSchedule) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE schedule SET
                med_id = ?1, consumption_start = ?2,
                consumption_end = ?3, frequency = ?4
            WHERE schedule_id = ?5
            "#,
            params![
                schedule.med_id,
                schedule.consumption_start,
                schedule.consumption_end,
                schedule.frequency,
                schedule_id,
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::not_found("ScheduleRecord", schedule_id));
        }
        Ok(())
    }

    pub fn delete(&self, schedule_id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM schedule WHERE schedule_id = ?1",
            params![schedule_id],
        )?;

        if affected == 0 {
            return Err(RepositoryError::not_found("ScheduleRecord", schedule_id));
        }
        Ok(())
    }

    pub fn find_by_id(&self, schedule_id: i64) -> RepositoryResult<Option<ScheduleRecord>> {
        let conn = self.get_conn()?;
        let record = conn
            .query_row(
                r#"
                SELECT schedule_id, med_id, consumption_start, consumption_end, frequency
                FROM schedule WHERE schedule_id = ?1
                "#,
                params![schedule_id],
                map_schedule_row,
            )
            .optional()?;
        Ok(record)
    }

    /// 全部用药计划（附药品名，按开始日期排序）
    pub fn list_all(&self) -> RepositoryResult<Vec<ScheduleView>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT s.schedule_id, s.med_id, s.consumption_start, s.consumption_end,
                   s.frequency, m.med_name
            FROM schedule s
            JOIN med_info m ON m.med_id = s.med_id
            ORDER BY s.consumption_start, s.schedule_id
            "#,
        )?;

        let views = stmt
            .query_map([], |row| {
                Ok(ScheduleView {
                    schedule: map_schedule_row(row)?,
                    med_name: row.get(5)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(views)
    }

    pub fn count_by_medicine(&self, med_id: i64) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM schedule WHERE med_id = ?1",
            params![med_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
