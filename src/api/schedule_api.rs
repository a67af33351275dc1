// ==========================================
// 药品管理系统 - 用药计划 API
// ==========================================

use std::sync::Arc;
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{parse_schedule, ScheduleForm};
use crate::domain::schedule::{NewSchedule, ScheduleRecord, ScheduleView};
use crate::repository::medicine_repo::MedicineRepository;
use crate::repository::schedule_repo::ScheduleRepository;

pub struct ScheduleApi {
    schedule_repo: Arc<ScheduleRepository>,
    medicine_repo: Arc<MedicineRepository>,
}

impl ScheduleApi {
    pub fn new(schedule_repo: Arc<ScheduleRepository>, medicine_repo: Arc<MedicineRepository>) -> Self {
        Self {
            schedule_repo,
            medicine_repo,
        }
    }

    /// 校验表单并确认引用的药品存在
    fn checked(&self, form: &ScheduleForm) -> ApiResult<NewSchedule> {
        let schedule = parse_schedule(form).map_err(ApiError::ValidationFailed)?;
        if self.medicine_repo.find_by_id(schedule.med_id)?.is_none() {
            return Err(ApiError::NotFound(format!("药品(id={})不存在", schedule.med_id)));
        }
        Ok(schedule)
    }

    /// 新增用药计划，返回 schedule_id
    pub fn add_schedule(&self, form: &ScheduleForm) -> ApiResult<i64> {
        let schedule = self.checked(form)?;
        let schedule_id = self.schedule_repo.insert(&schedule)?;
        info!(schedule_id, med_id = schedule.med_id, "用药计划已新增");
        Ok(schedule_id)
    }

    pub fn update_schedule(&self, schedule_id: i64, form: &ScheduleForm) -> ApiResult<()> {
        let schedule = self.checked(form)?;
        self.schedule_repo.update(schedule_id, &schedule)?;
        info!(schedule_id, med_id = schedule.med_id, "用药计划已修改");
        Ok(())
    }

    pub fn delete_schedule(&self, schedule_id: i64) -> ApiResult<()> {
        self.schedule_repo.delete(schedule_id)?;
        info!(schedule_id, "用药计划已删除");
        Ok(())
    }

    pub fn get_schedule(&self, schedule_id: i64) -> ApiResult<ScheduleRecord> {
        self.schedule_repo
            .find_by_id(schedule_id)?
            .ok_or_else(|| ApiError::NotFound(format!("用药计划(id={})不存在", schedule_id)))
    }

    /// 全部用药计划（附药品名，按开始日期排序）
    pub fn list_schedules(&self) -> ApiResult<Vec<ScheduleView>> {
        Ok(self.schedule_repo.list_all()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;
    use std::sync::Mutex;

    fn setup() -> (ScheduleApi, i64) {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO med_info (med_name, med_type) VALUES ('Aspirin', 'Analgesic')",
            [],
        )
        .unwrap();
        let med_id = conn.last_insert_rowid();

        let conn = Arc::new(Mutex::new(conn));
        let api = ScheduleApi::new(
            Arc::new(ScheduleRepository::from_connection(conn.clone())),
            Arc::new(MedicineRepository::from_connection(conn)),
        );
        (api, med_id)
    }

    fn form(med_id: &str, frequency: &str) -> ScheduleForm {
        ScheduleForm {
            med_id: med_id.to_string(),
            consumption_start: "2026-10-01".to_string(),
            consumption_end: "2026-10-14".to_string(),
            frequency: frequency.to_string(),
        }
    }

    #[test]
    fn test_add_get_update_delete() {
        let (api, med_id) = setup();
        let id = api.add_schedule(&form(&med_id.to_string(), "daily")).unwrap();
        assert_eq!(api.get_schedule(id).unwrap().frequency, "daily");

        api.update_schedule(id, &form(&med_id.to_string(), "twice daily"))
            .unwrap();
        let views = api.list_schedules().unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].med_name, "Aspirin");
        assert_eq!(views[0].schedule.frequency, "twice daily");

        api.delete_schedule(id).unwrap();
        assert!(matches!(api.get_schedule(id), Err(ApiError::NotFound(_))));
    }

    #[test]
    fn test_unknown_medicine_is_not_found() {
        let (api, _) = setup();
        let err = api.add_schedule(&form("999", "daily")).unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_invalid_form_is_validation_failed() {
        let (api, med_id) = setup();
        let err = api.add_schedule(&form(&med_id.to_string(), "")).unwrap_err();
        assert!(matches!(err, ApiError::ValidationFailed(ref v) if v[0].field == "frequency"));
    }
}
