// ==========================================
// 药品管理系统 - 导入层
// ==========================================
// 职责: 启动时把外部 CSV 同步进药品目录（整表替换）
// 触发: 仅当文件修改时间新于台账记录
// ==========================================

// 模块声明
pub mod catalog_importer_impl;
pub mod catalog_importer_trait;
pub mod error;
pub mod field_mapper;
pub mod file_parser;

// 重导出核心类型
pub use catalog_importer_impl::{file_mtime_secs, CatalogImporterImpl};
pub use error::{ImportError, ImportResult};
pub use field_mapper::PositionalFieldMapper;
pub use file_parser::CsvParser;

// 重导出 Trait 接口
pub use catalog_importer_trait::{CatalogImporter, FieldMapper, FileParser};
