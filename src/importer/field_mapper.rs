// ==========================================
// 药品管理系统 - 字段映射器实现
// ==========================================
// 阶段 1: 按位置映射
// 第 1-7 列依次 → name, type, dosage_form, strength,
//                 manufacturer, indication, classification
// 不足 7 列右侧补空；超出第 7 列的字段丢弃
// ==========================================

use crate::domain::import::{RawCatalogRow, RowFailure};
use crate::domain::medicine::{NewMedicine, CATALOG_COLUMN_COUNT};
use crate::importer::catalog_importer_trait::FieldMapper;
use crate::repository::MappedCatalogRow;

pub struct PositionalFieldMapper;

impl PositionalFieldMapper {
    /// 补齐/截断到 7 列；字段值原样保留，空串或纯空白转 None
    fn normalize(fields: &[String]) -> Vec<Option<String>> {
        let mut normalized: Vec<Option<String>> = fields
            .iter()
            .take(CATALOG_COLUMN_COUNT)
            .map(|f| {
                if f.trim().is_empty() {
                    None
                } else {
                    Some(f.clone())
                }
            })
            .collect();
        normalized.resize(CATALOG_COLUMN_COUNT, None);
        normalized
    }
}

impl FieldMapper for PositionalFieldMapper {
    fn map_row(&self, row: &RawCatalogRow) -> Result<MappedCatalogRow, RowFailure> {
        let mut columns = Self::normalize(&row.fields).into_iter();
        let mut next = || columns.next().flatten();

        let medicine = NewMedicine {
            name: next(),
            med_type: next(),
            dosage_form: next(),
            strength: next(),
            manufacturer: next(),
            indication: next(),
            classification: next(),
        };

        if medicine.name.is_none() {
            return Err(RowFailure {
                row_number: row.row_number,
                raw: row.fields.clone(),
                reason: "药品名为空（第 1 列必填）".to_string(),
            });
        }

        Ok(MappedCatalogRow {
            row_number: row.row_number,
            raw: row.fields.clone(),
            medicine,
        })
    }
}
