// ==========================================
// 药品管理系统 - 用药计划领域模型
// ==========================================
// 对齐: schedule 表（med_id 外键，随药品级联删除）
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 用药计划（已落库）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRecord {
    pub schedule_id: i64,
    pub med_id: i64,
    pub consumption_start: NaiveDate, // 开始服用日期
    pub consumption_end: NaiveDate,   // 结束服用日期
    pub frequency: String,            // 服用频次（自由文本，如 "2x daily"）
}

/// 待写入的用药计划
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSchedule {
    pub med_id: i64,
    pub consumption_start: NaiveDate,
    pub consumption_end: NaiveDate,
    pub frequency: String,
}

/// 列表视图：附带药品名
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleView {
    pub schedule: ScheduleRecord,
    pub med_name: String,
}
