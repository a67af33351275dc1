// ==========================================
// 药品管理系统 - 主入口
// ==========================================
// 启动: 加载配置 → 建表 → 目录导入 → 表计数自检
// 用法: medassist [catalog_csv]
// ==========================================

use anyhow::Context;
use medassist::app::AppState;
use medassist::config::AppConfig;
use medassist::domain::ImportOutcome;
use medassist::repository::ImportLedgerRepository;
use serde_json::json;
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    match std::env::var("MEDASSIST_LOG_JSON").as_deref() {
        Ok("1") | Ok("true") => medassist::logging::init_json(),
        _ => medassist::logging::init(),
    }

    tracing::info!("==================================================");
    tracing::info!("{}", medassist::APP_NAME);
    tracing::info!("系统版本: {}", medassist::VERSION);
    tracing::info!("==================================================");

    let mut config = AppConfig::from_env();
    if let Some(csv) = std::env::args().nth(1).filter(|s| !s.trim().is_empty()) {
        config.catalog_csv_path = PathBuf::from(csv);
    }
    tracing::info!(
        db_path = %config.db_path,
        catalog_csv = %config.catalog_csv_path.display(),
        "使用配置"
    );

    let state = AppState::bootstrap(&config).context("无法初始化AppState")?;

    let import = match &state.import_outcome {
        Some(ImportOutcome::Imported(report)) => json!({
            "status": "imported",
            "run_id": report.run_id,
            "total_rows": report.total_rows,
            "inserted": report.inserted,
            "failed": report.failed(),
            "elapsed_ms": report.elapsed_ms as u64,
        }),
        Some(ImportOutcome::Skipped(reason)) => json!({
            "status": "skipped",
            "reason": reason,
        }),
        None => json!({ "status": "failed" }),
    };

    let counts = state.table_counts().context("表计数失败")?;
    let tables: serde_json::Map<String, serde_json::Value> = counts
        .iter()
        .map(|c| (c.table.table_name().to_string(), json!(c.rows)))
        .collect();

    let ledger = ImportLedgerRepository::from_connection(state.conn.clone())
        .list_all()
        .context("导入台账读取失败")?;

    let summary = json!({
        "app": medassist::APP_NAME,
        "version": medassist::VERSION,
        "db_path": state.db_path,
        "import": import,
        "tables": tables,
        "ledger": ledger,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
