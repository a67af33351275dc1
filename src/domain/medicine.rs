// ==========================================
// 药品管理系统 - 药品目录领域模型
// ==========================================
// 对齐: med_info 表
// 用途: 导入层整表替换写入，CRUD 接口单行维护
// ==========================================

use serde::{Deserialize, Serialize};

/// 目录列数（CSV 按位置映射的列数）
pub const CATALOG_COLUMN_COUNT: usize = 7;

// ==========================================
// MedicineRecord - 药品目录记录（已落库）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicineRecord {
    // ===== 主键 =====
    pub med_id: i64, // 代理主键（自增）

    // ===== 基础信息 =====
    pub name: String,                   // 药品名（必填、唯一）
    pub med_type: Option<String>,       // 药品类型
    pub dosage_form: Option<String>,    // 剂型
    pub strength: Option<String>,       // 规格/强度
    pub manufacturer: Option<String>,   // 生产厂家
    pub indication: Option<String>,     // 适应症
    pub classification: Option<String>, // 分类
}

// ==========================================
// NewMedicine - 待写入的药品数据（无主键）
// ==========================================
// 导入层与 CRUD 新增/更新共用
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMedicine {
    pub name: Option<String>,
    pub med_type: Option<String>,
    pub dosage_form: Option<String>,
    pub strength: Option<String>,
    pub manufacturer: Option<String>,
    pub indication: Option<String>,
    pub classification: Option<String>,
}

impl NewMedicine {
    /// 仅含名称和类型的简易构造（测试与手工录入常用）
    pub fn named(name: &str, med_type: Option<&str>) -> Self {
        Self {
            name: Some(name.to_string()),
            med_type: med_type.map(str::to_string),
            ..Self::default()
        }
    }
}

// ==========================================
// 查询参数
// ==========================================

/// 目录可排序字段（白名单，禁止拼接任意列名）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CatalogSortField {
    MedId,
    #[default]
    Name,
    MedType,
    Manufacturer,
    Classification,
}

impl CatalogSortField {
    pub fn column(&self) -> &'static str {
        match self {
            CatalogSortField::MedId => "med_id",
            CatalogSortField::Name => "med_name",
            CatalogSortField::MedType => "med_type",
            CatalogSortField::Manufacturer => "manufacturer",
            CatalogSortField::Classification => "classification",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn keyword(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// 目录查询（关键字模糊匹配 + 分页 + 排序）
///
/// - keyword 为空时不过滤
/// - limit <= 0 表示不限制
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogQuery {
    pub keyword: Option<String>,
    pub limit: i64,
    pub offset: i64,
    pub sort: CatalogSortField,
    pub direction: SortDirection,
}

impl CatalogQuery {
    /// 归一化后的关键字（去空白，空串视为无关键字）
    pub fn normalized_keyword(&self) -> Option<&str> {
        self.keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}
