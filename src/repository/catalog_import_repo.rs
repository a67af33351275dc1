// ==========================================
// 药品管理系统 - 目录导入 Repository Trait
// ==========================================
// 职责: 定义导入相关数据访问接口（不包含业务逻辑）
// 红线: 整表替换 + 台账写入必须在同一事务内完成
// ==========================================

use crate::domain::import::RowFailure;
use crate::domain::medicine::NewMedicine;
use crate::repository::error::RepositoryResult;

/// 已完成字段映射、待落库的一行
#[derive(Debug, Clone)]
pub struct MappedCatalogRow {
    pub row_number: usize,
    pub raw: Vec<String>,
    pub medicine: NewMedicine,
}

/// 整表替换结果
#[derive(Debug, Clone, Default)]
pub struct CatalogReplaceSummary {
    pub deleted: usize,
    pub inserted: usize,
    pub failures: Vec<RowFailure>,
}

// ==========================================
// CatalogImportRepository Trait
// ==========================================
// 实现者: CatalogImportRepositoryImpl（使用 rusqlite）
pub trait CatalogImportRepository {
    /// 查询台账中该文件上次导入时的修改时间
    fn find_ledger_mtime(&self, file_path: &str) -> RepositoryResult<Option<i64>>;

    /// 整表替换目录并更新台账（单事务）
    ///
    /// # 流程
    /// 1. DELETE 全部目录行
    /// 2. 逐行 INSERT；单行失败记入 failures，继续处理
    /// 3. 写入/覆盖台账 (file_path → file_mtime)
    /// 4. COMMIT
    ///
    /// # 返回
    /// - Err: 事务级错误（整体回滚，台账不变）
    fn replace_catalog(
        &self,
        file_path: &str,
        file_mtime: i64,
        rows: &[MappedCatalogRow],
    ) -> RepositoryResult<CatalogReplaceSummary>;
}
