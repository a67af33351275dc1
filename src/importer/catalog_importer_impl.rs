// ==========================================
// 药品管理系统 - 目录导入器实现
// ==========================================
// 职责: 让 med_info 与外部 CSV 保持同步，文件未变更时不重复导入
// 流程: 台账比对 → 解析 → 映射 → 整表替换（单事务，含台账写入）
// ==========================================

use crate::domain::import::{ImportOutcome, ImportReport, SkipReason};
use crate::importer::catalog_importer_trait::{CatalogImporter, FieldMapper, FileParser};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::PositionalFieldMapper;
use crate::importer::file_parser::CsvParser;
use crate::repository::{CatalogImportRepository, CatalogImportRepositoryImpl};
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// 文件修改时间（Unix 秒）
pub fn file_mtime_secs(metadata: &std::fs::Metadata) -> ImportResult<i64> {
    let modified = metadata.modified()?;
    Ok(DateTime::<Utc>::from(modified).timestamp())
}

// ==========================================
// CatalogImporterImpl - 目录导入器实现
// ==========================================
pub struct CatalogImporterImpl<R>
where
    R: CatalogImportRepository,
{
    // 数据访问层
    import_repo: R,

    // 导入组件
    file_parser: Box<dyn FileParser>,
    field_mapper: Box<dyn FieldMapper>,
}

impl<R> CatalogImporterImpl<R>
where
    R: CatalogImportRepository,
{
    /// 创建新的 CatalogImporter 实例
    ///
    /// # 参数
    /// - import_repo: 目录导入仓储
    /// - file_parser: 文件解析器
    /// - field_mapper: 字段映射器
    pub fn new(
        import_repo: R,
        file_parser: Box<dyn FileParser>,
        field_mapper: Box<dyn FieldMapper>,
    ) -> Self {
        Self {
            import_repo,
            file_parser,
            field_mapper,
        }
    }

    /// 使用默认组件（CsvParser + PositionalFieldMapper）
    pub fn with_defaults(import_repo: R) -> Self {
        Self::new(
            import_repo,
            Box::new(CsvParser),
            Box::new(PositionalFieldMapper),
        )
    }
}

impl CatalogImporterImpl<CatalogImportRepositoryImpl> {
    /// 打开数据库并构造导入器
    ///
    /// # 返回
    /// - Err(DatabaseConnectionError): 数据库不可用
    pub fn open(db_path: &str) -> ImportResult<Self> {
        let repo = CatalogImportRepositoryImpl::new(db_path).map_err(|e| {
            error!(db_path = %db_path, error = %e, "目录导入: 数据库不可用");
            ImportError::from(e)
        })?;
        Ok(Self::with_defaults(repo))
    }
}

impl<R> CatalogImporter for CatalogImporterImpl<R>
where
    R: CatalogImportRepository,
{
    #[instrument(skip(self, file_path), fields(run_id = tracing::field::Empty))]
    fn sync_from_csv<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<ImportOutcome> {
        let path = file_path.as_ref();
        let path_str = path.display().to_string();

        // === 步骤 1: 文件存在性与修改时间 ===
        let metadata = match std::fs::metadata(path) {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(file_path = %path_str, "目录 CSV 不存在，跳过导入");
                return Ok(ImportOutcome::Skipped(SkipReason::FileNotFound));
            }
            Err(e) => {
                error!(file_path = %path_str, error = %e, "目录 CSV 元数据读取失败");
                return Err(e.into());
            }
        };
        let file_mtime = file_mtime_secs(&metadata)?;

        // === 步骤 2: 台账比对 ===
        let ledger_mtime = self.import_repo.find_ledger_mtime(&path_str)?;
        if let Some(ledger_mtime) = ledger_mtime {
            if ledger_mtime >= file_mtime {
                info!(
                    file_path = %path_str,
                    ledger_mtime,
                    file_mtime,
                    "目录 CSV 自上次导入后未修改，跳过"
                );
                return Ok(ImportOutcome::Skipped(SkipReason::Unchanged {
                    ledger_mtime,
                    file_mtime,
                }));
            }
        }

        let start_time = Instant::now();
        let run_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("run_id", run_id.as_str());
        info!(
            run_id = %run_id,
            file_path = %path_str,
            file_mtime,
            ledger_mtime = ?ledger_mtime,
            "开始导入目录 CSV"
        );

        // === 步骤 3: 解析文件（失败则整体中止，数据库未做任何变更）===
        let raw_rows = self.file_parser.parse_rows(path).map_err(|e| {
            error!(run_id = %run_id, file_path = %path_str, error = %e, "目录 CSV 读取失败，导入中止");
            e
        })?;
        debug!(rows = raw_rows.len(), "文件解析完成");

        // === 步骤 4: 字段映射 ===
        let mut mapped = Vec::with_capacity(raw_rows.len());
        let mut failures = Vec::new();
        let mut total_rows = 0usize;
        for row in &raw_rows {
            if row.is_blank() {
                debug!(row_number = row.row_number, "跳过空白行");
                continue;
            }
            total_rows += 1;
            match self.field_mapper.map_row(row) {
                Ok(m) => mapped.push(m),
                Err(failure) => failures.push(failure),
            }
        }

        // === 步骤 5: 整表替换 + 台账（单事务）===
        let summary = self
            .import_repo
            .replace_catalog(&path_str, file_mtime, &mapped)
            .map_err(|e| {
                error!(run_id = %run_id, file_path = %path_str, error = %e, "目录整表替换失败，已回滚");
                ImportError::from(e)
            })?;

        failures.extend(summary.failures);
        failures.sort_by_key(|f| f.row_number);
        for failure in &failures {
            warn!(
                run_id = %run_id,
                row_number = failure.row_number,
                raw = ?failure.raw,
                reason = %failure.reason,
                "目录行导入失败，已跳过"
            );
        }

        let elapsed_ms = start_time.elapsed().as_millis();
        info!(
            run_id = %run_id,
            file_path = %path_str,
            deleted = summary.deleted,
            total = total_rows,
            inserted = summary.inserted,
            failed = failures.len(),
            elapsed_ms = elapsed_ms as u64,
            "目录 CSV 导入完成"
        );

        Ok(ImportOutcome::Imported(ImportReport {
            run_id,
            file_path: path_str,
            file_mtime,
            total_rows,
            inserted: summary.inserted,
            failures,
            elapsed_ms,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::import::RowFailure;
    use crate::repository::{CatalogReplaceSummary, MappedCatalogRow, RepositoryError, RepositoryResult};
    use std::cell::RefCell;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// 内存版仓储：记录 replace 调用，可模拟事务失败
    #[derive(Default)]
    struct MemoryImportRepo {
        ledger: RefCell<Option<i64>>,
        replaced: RefCell<Vec<Vec<MappedCatalogRow>>>,
        fail_replace: bool,
    }

    impl CatalogImportRepository for MemoryImportRepo {
        fn find_ledger_mtime(&self, _file_path: &str) -> RepositoryResult<Option<i64>> {
            Ok(*self.ledger.borrow())
        }

        fn replace_catalog(
            &self,
            _file_path: &str,
            file_mtime: i64,
            rows: &[MappedCatalogRow],
        ) -> RepositoryResult<CatalogReplaceSummary> {
            if self.fail_replace {
                return Err(RepositoryError::DatabaseTransactionError("disk full".to_string()));
            }
            self.replaced.borrow_mut().push(rows.to_vec());
            *self.ledger.borrow_mut() = Some(file_mtime);
            Ok(CatalogReplaceSummary {
                deleted: 0,
                inserted: rows.len(),
                failures: Vec::<RowFailure>::new(),
            })
        }
    }

    fn csv_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_missing_file_is_skipped() {
        let importer = CatalogImporterImpl::with_defaults(MemoryImportRepo::default());
        let outcome = importer.sync_from_csv("no/such/medicine.csv").unwrap();

        assert!(matches!(outcome, ImportOutcome::Skipped(SkipReason::FileNotFound)));
        assert!(importer.import_repo.replaced.borrow().is_empty());
    }

    #[test]
    fn test_ledger_newer_or_equal_skips() {
        let file = csv_file("name,type\nAspirin,Analgesic\n");
        let repo = MemoryImportRepo {
            ledger: RefCell::new(Some(i64::MAX)),
            ..MemoryImportRepo::default()
        };
        let importer = CatalogImporterImpl::with_defaults(repo);

        let outcome = importer.sync_from_csv(file.path()).unwrap();
        assert!(matches!(
            outcome,
            ImportOutcome::Skipped(SkipReason::Unchanged { .. })
        ));
        assert!(importer.import_repo.replaced.borrow().is_empty());
    }

    #[test]
    fn test_blank_rows_and_nameless_rows() {
        let file = csv_file("name,type\nAspirin,Analgesic\n,,\n,NSAID\nIbuprofen\n");
        let importer = CatalogImporterImpl::with_defaults(MemoryImportRepo::default());

        let outcome = importer.sync_from_csv(file.path()).unwrap();
        let report = outcome.report().unwrap();

        // 空白行不计数；无名称行计为失败
        assert_eq!(report.total_rows, 3);
        assert_eq!(report.inserted, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].row_number, 4);
        assert_eq!(importer.import_repo.replaced.borrow()[0].len(), 2);
    }

    #[test]
    fn test_replace_failure_aborts_and_leaves_ledger() {
        let file = csv_file("name\nAspirin\n");
        let repo = MemoryImportRepo {
            fail_replace: true,
            ..MemoryImportRepo::default()
        };
        let importer = CatalogImporterImpl::with_defaults(repo);

        let err = importer.sync_from_csv(file.path()).unwrap_err();
        assert!(matches!(err, ImportError::DatabaseTransactionError(_)));
        assert_eq!(*importer.import_repo.ledger.borrow(), None);
    }
}
