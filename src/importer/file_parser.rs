// ==========================================
// 药品管理系统 - 文件解析器实现
// ==========================================
// 阶段 0: 文件读取与解析
// 输入: UTF-8 CSV（可带 BOM），逗号分隔，首行为表头（丢弃）
// 输出: 按位置的原始行（不按列名映射）
// ==========================================

use crate::domain::import::RawCatalogRow;
use crate::importer::catalog_importer_trait::FileParser;
use crate::importer::error::{ImportError, ImportResult};
use csv::ReaderBuilder;
use std::path::Path;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// 读取整份文件并解码为 UTF-8（去除 BOM）
///
/// 整份读入后再解析，保证任何读取/解码错误都发生在数据库变更之前
pub fn read_utf8_content(path: &Path) -> ImportResult<String> {
    let bytes = std::fs::read(path)?;
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes[..]);

    String::from_utf8(body.to_vec()).map_err(|e| ImportError::EncodingError {
        path: path.display().to_string(),
        message: e.utf8_error().to_string(),
    })
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl CsvParser {
    /// 解析已解码的 CSV 文本
    pub fn parse_str(&self, content: &str) -> ImportResult<Vec<RawCatalogRow>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致（短行补齐、长行截断在映射阶段处理）
            .from_reader(content.as_bytes());

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            // 物理行号；表头为第 1 行
            let row_number = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(idx + 2);

            rows.push(RawCatalogRow {
                row_number,
                fields: record.iter().map(str::to_string).collect(),
            });
        }

        Ok(rows)
    }
}

impl FileParser for CsvParser {
    fn parse_rows(&self, file_path: &Path) -> ImportResult<Vec<RawCatalogRow>> {
        let content = read_utf8_content(file_path)?;
        self.parse_str(&content)
    }
}
