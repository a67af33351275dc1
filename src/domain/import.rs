// ==========================================
// 药品管理系统 - 目录导入领域模型
// ==========================================
// 对齐: csv_import_status 表（导入台账）
// 用途: 导入器的输入行、结果与逐行失败记录
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// ImportLedgerEntry - 导入台账
// ==========================================
// 每个文件路径一条：上次实际导入时的文件修改时间（Unix 秒）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportLedgerEntry {
    pub file_path: String,
    pub last_modified: i64,
}

// ==========================================
// RawCatalogRow - 解析后的按位置原始行
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCatalogRow {
    pub row_number: usize,   // CSV 物理行号（1 起，表头为第 1 行）
    pub fields: Vec<String>, // 原始字段（未补齐/未截断）
}

impl RawCatalogRow {
    /// 是否整行为空白
    pub fn is_blank(&self) -> bool {
        self.fields.iter().all(|f| f.trim().is_empty())
    }
}

// ==========================================
// RowFailure - 单行导入失败
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowFailure {
    pub row_number: usize,
    pub raw: Vec<String>, // 出错行原始内容
    pub reason: String,
}

// ==========================================
// ImportReport - 一次实际导入的结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub run_id: String,
    pub file_path: String,
    pub file_mtime: i64,
    pub total_rows: usize, // 数据行数（不含表头与空白行）
    pub inserted: usize,
    pub failures: Vec<RowFailure>,
    pub elapsed_ms: u128,
}

impl ImportReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// 跳过原因
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// 文件不存在：无可导入内容，不视为错误
    FileNotFound,
    /// 台账时间戳 >= 文件当前修改时间
    Unchanged { ledger_mtime: i64, file_mtime: i64 },
}

/// 导入结果：跳过或实际导入
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ImportOutcome {
    Skipped(SkipReason),
    Imported(ImportReport),
}

impl ImportOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, ImportOutcome::Skipped(_))
    }

    pub fn report(&self) -> Option<&ImportReport> {
        match self {
            ImportOutcome::Imported(report) => Some(report),
            ImportOutcome::Skipped(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_row_detection() {
        let blank = RawCatalogRow {
            row_number: 3,
            fields: vec!["".to_string(), "  ".to_string()],
        };
        assert!(blank.is_blank());

        let filled = RawCatalogRow {
            row_number: 4,
            fields: vec!["".to_string(), "NSAID".to_string()],
        };
        assert!(!filled.is_blank());
    }

    #[test]
    fn test_outcome_report_accessor() {
        let skipped = ImportOutcome::Skipped(SkipReason::FileNotFound);
        assert!(skipped.is_skipped());
        assert!(skipped.report().is_none());
    }
}
