// ==========================================
// 药品管理系统 - 目录导入 Trait
// ==========================================
// 职责: 定义目录导入接口（不包含实现）
// 导入管道: 解析(FileParser) → 映射(FieldMapper) → 整表替换(CatalogImportRepository)
// ==========================================

use crate::domain::import::{ImportOutcome, RawCatalogRow, RowFailure};
use crate::importer::error::ImportResult;
use crate::repository::MappedCatalogRow;
use std::path::Path;

// ==========================================
// CatalogImporter Trait
// ==========================================
// 实现者: CatalogImporterImpl
pub trait CatalogImporter {
    /// 按修改时间同步目录 CSV
    ///
    /// # 返回
    /// - Ok(Skipped(FileNotFound)): 文件不存在，无事可做
    /// - Ok(Skipped(Unchanged)): 台账时间戳 >= 文件修改时间
    /// - Ok(Imported(report)): 已整表替换（report 含逐行失败）
    /// - Err: 读取/解码失败或数据库不可用（数据库状态保持不变）
    fn sync_from_csv<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<ImportOutcome>;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口（阶段 0）
// 实现者: CsvParser
pub trait FileParser {
    /// 解析文件为按位置的原始行（表头已丢弃）
    ///
    /// # 返回
    /// - Err: 文件读取错误、编码错误、CSV 结构错误（整次导入中止）
    fn parse_rows(&self, file_path: &Path) -> ImportResult<Vec<RawCatalogRow>>;
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 用途: 字段映射接口（阶段 1）
// 实现者: PositionalFieldMapper
pub trait FieldMapper {
    /// 将原始行映射为待落库的目录行
    ///
    /// # 返回
    /// - Err(RowFailure): 该行不可导入（仅丢弃此行）
    fn map_row(&self, row: &RawCatalogRow) -> Result<MappedCatalogRow, RowFailure>;
}
