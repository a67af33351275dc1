// ==========================================
// 药品管理系统 - 输入校验器
// ==========================================
// 职责: CRUD 录入的字段级校验，返回显式违规列表（不抛错）
// 约定: 违规列表非空时由 API 转为 ApiError::ValidationFailed，且不触达存储
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::error::ValidationViolation;
use crate::domain::inventory::NewInventory;
use crate::domain::medicine::NewMedicine;
use crate::domain::schedule::NewSchedule;

pub const MAX_NAME_CHARS: usize = 100;
pub const MAX_TYPE_CHARS: usize = 50;
pub const MAX_DOSAGE_FORM_CHARS: usize = 50;
pub const MAX_USERNAME_CHARS: usize = 50;
pub const MAX_PASSWORD_CHARS: usize = 128;

/// 日期格式（YYYY-MM-DD）
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ==========================================
// 表单输入（界面原样提交的文本）
// ==========================================

/// 用药计划表单
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleForm {
    pub med_id: String,
    pub consumption_start: String,
    pub consumption_end: String,
    pub frequency: String,
}

/// 库存表单
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryForm {
    pub med_id: String,
    pub quantity: String,
    pub expiration: String,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_id(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    raw.parse::<i64>().ok().filter(|id| *id > 0)
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

fn check_required_id(field: &str, raw: &str, violations: &mut Vec<ValidationViolation>) {
    if raw.trim().is_empty() {
        violations.push(ValidationViolation::new(field, "必填"));
    } else if parse_id(raw).is_none() {
        violations.push(ValidationViolation::new(field, "必须为正整数"));
    }
}

fn check_required_date(field: &str, raw: &str, violations: &mut Vec<ValidationViolation>) {
    if raw.trim().is_empty() {
        violations.push(ValidationViolation::new(field, "必填"));
    } else if parse_date(raw).is_none() {
        violations.push(ValidationViolation::new(field, "日期格式应为 YYYY-MM-DD"));
    }
}

// ==========================================
// 药品
// ==========================================

/// 校验药品录入
///
/// - 名称、类型必填
/// - 名称最多 100 字符，类型与剂型最多 50 字符
/// - 规格如填写，必须包含数字
pub fn validate_medicine(input: &NewMedicine) -> Vec<ValidationViolation> {
    let mut violations = Vec::new();

    match non_blank(&input.name) {
        None => violations.push(ValidationViolation::new("name", "必填")),
        Some(name) if name.chars().count() > MAX_NAME_CHARS => violations.push(
            ValidationViolation::new("name", format!("不能超过 {} 个字符", MAX_NAME_CHARS)),
        ),
        Some(_) => {}
    }

    match non_blank(&input.med_type) {
        None => violations.push(ValidationViolation::new("med_type", "必填")),
        Some(t) if t.chars().count() > MAX_TYPE_CHARS => violations.push(
            ValidationViolation::new("med_type", format!("不能超过 {} 个字符", MAX_TYPE_CHARS)),
        ),
        Some(_) => {}
    }

    if let Some(form) = non_blank(&input.dosage_form) {
        if form.chars().count() > MAX_DOSAGE_FORM_CHARS {
            violations.push(ValidationViolation::new(
                "dosage_form",
                format!("不能超过 {} 个字符", MAX_DOSAGE_FORM_CHARS),
            ));
        }
    }

    if let Some(strength) = non_blank(&input.strength) {
        if !strength.chars().any(|c| c.is_ascii_digit()) {
            violations.push(ValidationViolation::new("strength", "必须包含数值"));
        }
    }

    violations
}

/// 录入值归一化：去首尾空白，空串视为未填写
pub fn normalize_medicine(input: &NewMedicine) -> NewMedicine {
    let clean = |v: &Option<String>| non_blank(v).map(str::to_string);
    NewMedicine {
        name: clean(&input.name),
        med_type: clean(&input.med_type),
        dosage_form: clean(&input.dosage_form),
        strength: clean(&input.strength),
        manufacturer: clean(&input.manufacturer),
        indication: clean(&input.indication),
        classification: clean(&input.classification),
    }
}

// ==========================================
// 用药计划
// ==========================================

/// 校验用药计划表单
pub fn validate_schedule(form: &ScheduleForm) -> Vec<ValidationViolation> {
    let mut violations = Vec::new();

    check_required_id("med_id", &form.med_id, &mut violations);
    check_required_date("consumption_start", &form.consumption_start, &mut violations);
    check_required_date("consumption_end", &form.consumption_end, &mut violations);

    if let (Some(start), Some(end)) = (
        parse_date(&form.consumption_start),
        parse_date(&form.consumption_end),
    ) {
        if end < start {
            violations.push(ValidationViolation::new(
                "consumption_end",
                "结束日期不能早于开始日期",
            ));
        }
    }

    if form.frequency.trim().is_empty() {
        violations.push(ValidationViolation::new("frequency", "必填"));
    }

    violations
}

/// 校验并转换用药计划表单
pub fn parse_schedule(form: &ScheduleForm) -> Result<NewSchedule, Vec<ValidationViolation>> {
    let violations = validate_schedule(form);
    match (
        parse_id(&form.med_id),
        parse_date(&form.consumption_start),
        parse_date(&form.consumption_end),
    ) {
        (Some(med_id), Some(consumption_start), Some(consumption_end)) if violations.is_empty() => {
            Ok(NewSchedule {
                med_id,
                consumption_start,
                consumption_end,
                frequency: form.frequency.trim().to_string(),
            })
        }
        _ => Err(violations),
    }
}

// ==========================================
// 库存
// ==========================================

/// 校验库存表单
///
/// # 参数
/// - today: 当前日期（有效期不得早于此日期）
pub fn validate_inventory(form: &InventoryForm, today: NaiveDate) -> Vec<ValidationViolation> {
    let mut violations = Vec::new();

    check_required_id("med_id", &form.med_id, &mut violations);

    let quantity = form.quantity.trim();
    if quantity.is_empty() {
        violations.push(ValidationViolation::new("quantity", "必填"));
    } else if quantity.parse::<i64>().map(|q| q < 0).unwrap_or(true) {
        violations.push(ValidationViolation::new("quantity", "必须为非负整数"));
    }

    check_required_date("expiration", &form.expiration, &mut violations);
    if let Some(expiration) = parse_date(&form.expiration) {
        if expiration < today {
            violations.push(ValidationViolation::new("expiration", "有效期不能早于今天"));
        }
    }

    violations
}

/// 校验并转换库存表单
pub fn parse_inventory(
    form: &InventoryForm,
    today: NaiveDate,
) -> Result<NewInventory, Vec<ValidationViolation>> {
    let violations = validate_inventory(form, today);
    match (
        parse_id(&form.med_id),
        form.quantity.trim().parse::<i64>().ok(),
        parse_date(&form.expiration),
    ) {
        (Some(med_id), Some(quantity), Some(expiration)) if violations.is_empty() => {
            Ok(NewInventory {
                med_id,
                quantity,
                expiration,
            })
        }
        _ => Err(violations),
    }
}

// ==========================================
// 登录账户
// ==========================================

/// 校验注册/登录凭据
///
/// - 用户名去首尾空白后必填，最多 50 字符
/// - 口令原样比对，不得为空白，最多 128 字符
pub fn validate_credentials(username: &str, password: &str) -> Vec<ValidationViolation> {
    let mut violations = Vec::new();

    let username = username.trim();
    if username.is_empty() {
        violations.push(ValidationViolation::new("username", "必填"));
    } else if username.chars().count() > MAX_USERNAME_CHARS {
        violations.push(ValidationViolation::new(
            "username",
            format!("不能超过 {} 个字符", MAX_USERNAME_CHARS),
        ));
    }

    if password.trim().is_empty() {
        violations.push(ValidationViolation::new("password", "必填"));
    } else if password.chars().count() > MAX_PASSWORD_CHARS {
        violations.push(ValidationViolation::new(
            "password",
            format!("不能超过 {} 个字符", MAX_PASSWORD_CHARS),
        ));
    }

    violations
}
