// ==========================================
// 药品管理系统 - 登录账户 API
// ==========================================
// 职责: 注册、登录、修改口令
// 存储格式: sha256$<迭代次数>$<盐>$<十六进制摘要>
// 红线: 口令明文不落库、不进日志
// ==========================================

use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::validate_credentials;
use crate::domain::user::UserAccount;
use crate::repository::error::RepositoryError;
use crate::repository::user_repo::UserRepository;

const HASH_SCHEME: &str = "sha256";

/// 摘要迭代次数
pub const HASH_ITERATIONS: u32 = 10_000;

// ==========================================
// 口令摘要
// ==========================================

fn digest_password(salt: &str, password: &str, iterations: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    let mut digest = hasher.finalize();

    for _ in 1..iterations {
        let mut hasher = Sha256::new();
        hasher.update(&digest);
        hasher.update(salt.as_bytes());
        digest = hasher.finalize();
    }

    format!("{:x}", digest)
}

/// 生成加盐口令摘要（每次调用使用新盐）
pub fn hash_password(password: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    let digest = digest_password(&salt, password, HASH_ITERATIONS);
    format!("{}${}${}${}", HASH_SCHEME, HASH_ITERATIONS, salt, digest)
}

/// 比对口令与已存摘要；格式无法识别时视为不匹配
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.splitn(4, '$');
    let (Some(scheme), Some(iterations), Some(salt), Some(expected)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    if scheme != HASH_SCHEME {
        return false;
    }
    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    if iterations == 0 {
        return false;
    }

    let actual = digest_password(salt, password, iterations);
    constant_time_eq(actual.as_bytes(), expected.as_bytes())
}

// 比对耗时与首个差异位置无关
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

// ==========================================
// AuthApi - 登录账户 API
// ==========================================
pub struct AuthApi {
    user_repo: Arc<UserRepository>,
}

impl AuthApi {
    pub fn new(user_repo: Arc<UserRepository>) -> Self {
        Self { user_repo }
    }

    /// 注册账户
    ///
    /// # 返回
    /// - Err(ValidationFailed): 用户名或口令不合规
    /// - Err(DuplicateUsername): 用户名已存在
    pub fn register(&self, username: &str, password: &str) -> ApiResult<UserAccount> {
        let violations = validate_credentials(username, password);
        if !violations.is_empty() {
            return Err(ApiError::ValidationFailed(violations));
        }

        let username = username.trim();
        if self.user_repo.find_by_username(username)?.is_some() {
            warn!(username, "注册被拒绝: 用户名已存在");
            return Err(ApiError::DuplicateUsername(username.to_string()));
        }

        match self.user_repo.insert(username, &hash_password(password)) {
            Ok(()) => {}
            Err(RepositoryError::UniqueConstraintViolation(_)) => {
                return Err(ApiError::DuplicateUsername(username.to_string()));
            }
            Err(e) => return Err(e.into()),
        }

        info!(username, "账户已注册");
        self.user_repo
            .find_by_username(username)?
            .ok_or_else(|| ApiError::InternalError(format!("账户写入后读取失败: {}", username)))
    }

    /// 登录
    ///
    /// # 返回
    /// - Err(InvalidCredentials): 用户不存在或口令错误
    pub fn login(&self, username: &str, password: &str) -> ApiResult<UserAccount> {
        let violations = validate_credentials(username, password);
        if !violations.is_empty() {
            return Err(ApiError::ValidationFailed(violations));
        }

        let username = username.trim();
        let stored = self.user_repo.find_password_hash(username)?;
        let verified = stored
            .as_deref()
            .map(|hash| verify_password(password, hash))
            .unwrap_or(false);
        if !verified {
            warn!(username, "登录失败");
            return Err(ApiError::InvalidCredentials);
        }

        info!(username, "登录成功");
        self.user_repo
            .find_by_username(username)?
            .ok_or(ApiError::InvalidCredentials)
    }

    /// 修改口令（需校验旧口令）
    pub fn change_password(
        &self,
        username: &str,
        old_password: &str,
        new_password: &str,
    ) -> ApiResult<()> {
        self.login(username, old_password)?;

        let violations = validate_credentials(username, new_password);
        if !violations.is_empty() {
            return Err(ApiError::ValidationFailed(violations));
        }

        let username = username.trim();
        self.user_repo
            .update_password_hash(username, &hash_password(new_password))?;
        info!(username, "口令已修改");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;
    use std::sync::Mutex;

    fn setup() -> AuthApi {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        let repo = UserRepository::from_connection(Arc::new(Mutex::new(conn)));
        AuthApi::new(Arc::new(repo))
    }

    #[test]
    fn test_hash_is_salted_and_verifiable() {
        let first = hash_password("s3cret");
        let second = hash_password("s3cret");

        assert_ne!(first, second);
        assert!(first.starts_with("sha256$10000$"));
        assert!(!first.contains("s3cret"));
        assert!(verify_password("s3cret", &first));
        assert!(verify_password("s3cret", &second));
        assert!(!verify_password("S3cret", &first));
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        assert!(!verify_password("s3cret", "s3cret"));
        assert!(!verify_password("s3cret", "md5$1$salt$abc"));
        assert!(!verify_password("s3cret", "sha256$many$salt$abc"));
        assert!(!verify_password("s3cret", "sha256$0$salt$abc"));
    }

    #[test]
    fn test_register_then_login() {
        let api = setup();
        let account = api.register(" nurse ", "s3cret").unwrap();
        assert_eq!(account.username, "nurse");

        let logged_in = api.login("nurse", "s3cret").unwrap();
        assert_eq!(logged_in, account);

        let stored = api.user_repo.find_password_hash("nurse").unwrap().unwrap();
        assert_ne!(stored, "s3cret");
    }

    #[test]
    fn test_register_rejects_duplicate_and_blank() {
        let api = setup();
        api.register("nurse", "s3cret").unwrap();

        let err = api.register("nurse ", "other").unwrap_err();
        assert!(matches!(err, ApiError::DuplicateUsername(ref u) if u == "nurse"));

        let err = api.register("", " ").unwrap_err();
        assert!(matches!(err, ApiError::ValidationFailed(ref v) if v.len() == 2));
        assert_eq!(api.user_repo.count().unwrap(), 1);
    }

    #[test]
    fn test_login_failures_are_indistinguishable() {
        let api = setup();
        api.register("nurse", "s3cret").unwrap();

        let wrong_password = api.login("nurse", "guess").unwrap_err();
        let unknown_user = api.login("doctor", "s3cret").unwrap_err();
        assert!(matches!(wrong_password, ApiError::InvalidCredentials));
        assert!(matches!(unknown_user, ApiError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[test]
    fn test_change_password_requires_old_password() {
        let api = setup();
        api.register("nurse", "s3cret").unwrap();

        let err = api.change_password("nurse", "guess", "n3w").unwrap_err();
        assert!(matches!(err, ApiError::InvalidCredentials));

        api.change_password("nurse", "s3cret", "n3w").unwrap();
        assert!(matches!(api.login("nurse", "s3cret"), Err(ApiError::InvalidCredentials)));
        assert!(api.login("nurse", "n3w").is_ok());
    }
}
