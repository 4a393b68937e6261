// ==========================================
// 订单对账系统 - 订单导入器
// ==========================================
// 管道: 解析 → 取消状态过滤 → 字段映射 → 批次合并 → 落库 → 生成报表
// 批次合并与报表生成在编排器写闸门内完成
// ==========================================

use crate::engine::orchestrator::{GenerationOutcome, ReportOrchestrator};
use crate::importer::conflict_handler::{BatchMergeStats, ConflictHandler};
use crate::importer::data_cleaner::StatusFilter;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::order_importer_trait::RowFilter;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// 导入汇总
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub batch_id: String,
    pub file_name: String,
    pub append: bool,
    pub total_rows: usize,
    pub canceled_removed: usize,
    pub kept_rows: usize,
    pub in_batch_duplicates: usize,
    pub existing_rows: usize,
    pub added_rows: usize,
    pub duplicates_skipped: usize,
    pub elapsed_ms: u128,
    pub generation: GenerationOutcome,
}

pub struct OrderImporter {
    orchestrator: Arc<ReportOrchestrator>,
    parser: UniversalFileParser,
    mapper: FieldMapper,
    conflicts: ConflictHandler,
}

impl OrderImporter {
    pub fn new(orchestrator: Arc<ReportOrchestrator>) -> Self {
        Self {
            orchestrator,
            parser: UniversalFileParser,
            mapper: FieldMapper,
            conflicts: ConflictHandler,
        }
    }

    /// 导入订单导出文件
    ///
    /// # 参数
    /// - file_path: .xlsx / .xls / .csv
    /// - append: true 并入已存原始订单；false 替换
    ///
    /// # 返回
    /// - Ok(ImportSummary): 导入与报表生成统计
    /// - Err: 文件错误、存储错误、报表生成失败
    #[instrument(skip(self, file_path), fields(file = %file_path.as_ref().display()))]
    pub async fn import_file<P: AsRef<Path>>(&self, file_path: P, append: bool) -> ImportResult<ImportSummary> {
        let started = Instant::now();
        let path = file_path.as_ref();
        let batch_id = Uuid::new_v4().to_string();
        let settings = self.orchestrator.load_settings().await?;

        // 阶段 1: 解析
        let rows = self.parser.parse(path)?;
        if rows.is_empty() {
            return Err(ImportError::EmptyFile(path.display().to_string()));
        }
        let total_rows = rows.len();

        // 阶段 2: 取消状态过滤
        let (rows, canceled_removed) = StatusFilter::new(&settings.canceled_status).filter(rows);

        // 阶段 3: 字段映射
        let batch = self.mapper.map_rows(&rows);
        let in_batch_duplicates = self.conflicts.detect_duplicates(&batch);
        if !in_batch_duplicates.is_empty() {
            warn!(count = in_batch_duplicates.len(), "批次内存在重复组合键");
        }
        let kept_rows = batch.len();

        // 阶段 4-6: 合并、落库、生成报表
        let conflicts = &self.conflicts;
        let (stats, generation): (BatchMergeStats, GenerationOutcome) = self
            .orchestrator
            .ingest_and_generate(move |previous| {
                let (merged, stats) = conflicts.merge_batches(previous, batch, append);
                (merged, stats)
            })
            .await?;

        let summary = ImportSummary {
            batch_id,
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            append,
            total_rows,
            canceled_removed,
            kept_rows,
            in_batch_duplicates: in_batch_duplicates.len(),
            existing_rows: stats.existing_rows,
            added_rows: stats.added_rows,
            duplicates_skipped: stats.duplicates_skipped,
            elapsed_ms: started.elapsed().as_millis(),
            generation,
        };

        info!(
            batch_id = %summary.batch_id,
            total = summary.total_rows,
            canceled = summary.canceled_removed,
            added = summary.added_rows,
            duplicates = summary.duplicates_skipped,
            "订单导入完成"
        );
        Ok(summary)
    }
}
