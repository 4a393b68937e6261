// ==========================================
// 订单对账系统 - 导入层
// ==========================================
// 职责: 平台订单导出文件 → 原始订单集合
// 支持: Excel, CSV
// ==========================================

pub mod conflict_handler;
pub mod data_cleaner;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod order_importer;
pub mod order_importer_trait;

pub use conflict_handler::{BatchMergeStats, ConflictHandler};
pub use data_cleaner::StatusFilter;
pub use error::{ImportError, ImportResult};
pub use field_mapper::FieldMapper;
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use order_importer::{ImportSummary, OrderImporter};
pub use order_importer_trait::{FileParser, RawRow, RowFilter, RowMapper};
