// ==========================================
// 药品管理系统 - SQLite 连接与 Schema 初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键级联依赖 foreign_keys）
// - 统一 busy_timeout
// - 建表集中在一处，启动时幂等执行
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use serde::Serialize;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启（schedule/inventory 的级联删除依赖它）
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 初始化全部业务表（幂等）
///
/// - user: 登录账户（仅存加盐口令摘要）
/// - med_info: 药品目录（代理主键 med_id，药品名唯一）
/// - csv_import_status: 导入台账（文件路径 → 上次导入时的修改时间）
/// - schedule / inventory: 引用 med_info，随药品删除级联
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS med_info (
            med_id INTEGER PRIMARY KEY AUTOINCREMENT,
            med_name TEXT NOT NULL UNIQUE CHECK (length(trim(med_name)) > 0),
            med_type TEXT,
            dosage_form TEXT,
            strength TEXT,
            manufacturer TEXT,
            indication TEXT,
            classification TEXT
        );

        CREATE TABLE IF NOT EXISTS user (
            username TEXT PRIMARY KEY CHECK (length(trim(username)) > 0),
            password_hash TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS csv_import_status (
            filename TEXT PRIMARY KEY,
            last_modified INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS schedule (
            schedule_id INTEGER PRIMARY KEY AUTOINCREMENT,
            med_id INTEGER NOT NULL,
            consumption_start TEXT NOT NULL,
            consumption_end TEXT NOT NULL,
            frequency TEXT NOT NULL,
            FOREIGN KEY (med_id) REFERENCES med_info(med_id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS inventory (
            inventory_id INTEGER PRIMARY KEY AUTOINCREMENT,
            med_id INTEGER NOT NULL,
            quantity INTEGER NOT NULL CHECK (quantity >= 0),
            expiration TEXT NOT NULL,
            FOREIGN KEY (med_id) REFERENCES med_info(med_id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_schedule_med ON schedule(med_id);
        CREATE INDEX IF NOT EXISTS idx_inventory_med ON inventory(med_id);
        CREATE INDEX IF NOT EXISTS idx_inventory_expiration ON inventory(expiration);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

// ==========================================
// AppTable - 业务表枚举（健康检查用，禁止运行时拼接表名）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AppTable {
    User,
    MedInfo,
    Schedule,
    Inventory,
    CsvImportStatus,
}

impl AppTable {
    pub const ALL: [AppTable; 5] = [
        AppTable::User,
        AppTable::MedInfo,
        AppTable::Schedule,
        AppTable::Inventory,
        AppTable::CsvImportStatus,
    ];

    pub fn table_name(&self) -> &'static str {
        match self {
            AppTable::User => "user",
            AppTable::MedInfo => "med_info",
            AppTable::Schedule => "schedule",
            AppTable::Inventory => "inventory",
            AppTable::CsvImportStatus => "csv_import_status",
        }
    }

    fn count_sql(&self) -> &'static str {
        match self {
            AppTable::User => "SELECT COUNT(*) FROM user",
            AppTable::MedInfo => "SELECT COUNT(*) FROM med_info",
            AppTable::Schedule => "SELECT COUNT(*) FROM schedule",
            AppTable::Inventory => "SELECT COUNT(*) FROM inventory",
            AppTable::CsvImportStatus => "SELECT COUNT(*) FROM csv_import_status",
        }
    }
}

/// 单表行数
#[derive(Debug, Clone, Serialize)]
pub struct TableCount {
    pub table: AppTable,
    pub rows: i64,
}

/// 启动健康检查：统计每张业务表的行数
pub fn table_counts(conn: &Connection) -> rusqlite::Result<Vec<TableCount>> {
    AppTable::ALL
        .iter()
        .map(|table| {
            let rows: i64 = conn.query_row(table.count_sql(), [], |row| row.get(0))?;
            Ok(TableCount { table: *table, rows })
        })
        .collect()
}
