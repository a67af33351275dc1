// ==========================================
// 药品管理系统 - 登录账户领域模型
// ==========================================
// 对齐: user 表（username 主键，仅存加盐口令摘要）
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// 登录账户（不含口令摘要，可安全序列化给界面）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub username: String,
    pub created_at: NaiveDateTime, // 注册时间（UTC）
}
