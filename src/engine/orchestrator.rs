// ==========================================
// 订单对账系统 - 报表编排器
// ==========================================
// 主流程: 快照加载 → 隐式删除推断 → 逐单派生 → 合并 → CAS 写回
// 并发: 进程内所有写操作经单写者闸门（tokio Mutex）串行；
//       跨进程由存储 revision CAS 兜底
// ==========================================

use crate::config::{ConfigError, ReportConfigReader};
use crate::domain::catalog::Catalog;
use crate::domain::fee_rule::FeeRuleSet;
use crate::domain::order::RawOrder;
use crate::domain::report::{DeletedOrderSet, Report, ReportSummary};
use crate::domain::types::order_key;
use crate::engine::deletion_tracker::DeletionTracker;
use crate::engine::error::{ReportError, ReportResult};
use crate::engine::manual_entry::ManualEntryProcessor;
use crate::engine::order_processor::{BatchResult, OrderFailure, OrderProcessor};
use crate::engine::report_merger::{build_report, ReportMerger};
use crate::engine::settings::ReconSettings;
use crate::repository::ReportStore;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

// ==========================================
// 操作结果
// ==========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOutcome {
    pub source_orders: usize,
    pub processed: usize,
    pub skipped_deleted: usize,
    pub failed: usize,
    pub added: usize,
    pub duplicates: usize,
    pub inferred_deletions: Vec<String>,
    pub report_written: bool,
    pub summary: ReportSummary,
    pub failures: Vec<OrderFailure>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewOutcome {
    pub report: Report,
    pub skipped_deleted: usize,
    pub failures: Vec<OrderFailure>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub requested: usize,
    pub newly_tracked: usize,
    pub removed_rows: usize,
    pub remaining_rows: usize,
    pub report_found: bool,
    pub backup_id: Option<String>,
    pub summary: ReportSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualEntryOutcome {
    pub append: bool,
    pub total_entries: usize,
    pub existing_entries: usize,
    pub added: usize,
    pub duplicates_skipped: usize,
    pub skipped_deleted: usize,
    pub failures: Vec<OrderFailure>,
    pub summary: ReportSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreOutcome {
    pub restored_rows: usize,
    pub dropped_deleted: usize,
    pub summary: ReportSummary,
}

// 一次操作的只读输入快照
struct Snapshot {
    orders: Vec<RawOrder>,
    catalog: Catalog,
    fee_rules: FeeRuleSet,
    deleted: DeletedOrderSet,
    deleted_revision: i64,
    prior: Option<Report>,
    report_revision: i64,
}

// ==========================================
// ReportOrchestrator
// ==========================================

pub struct ReportOrchestrator {
    store: Arc<dyn ReportStore>,
    config: Arc<dyn ReportConfigReader>,
    tracker: DeletionTracker,
    write_gate: Mutex<()>,
}

impl ReportOrchestrator {
    pub fn new(store: Arc<dyn ReportStore>, config: Arc<dyn ReportConfigReader>) -> Self {
        Self {
            store,
            config,
            tracker: DeletionTracker::new(),
            write_gate: Mutex::new(()),
        }
    }

    pub fn store(&self) -> Arc<dyn ReportStore> {
        Arc::clone(&self.store)
    }

    /// 操作开始前确认存储可用
    async fn ensure_store_ready(&self) -> ReportResult<()> {
        self.store.health_check().await.map_err(|e| {
            warn!(error = %e, "存储健康检查失败");
            ReportError::from(e)
        })
    }

    /// 读取本次操作的配置快照
    pub async fn load_settings(&self) -> ReportResult<ReconSettings> {
        let map = |e: ConfigError| ReportError::ConfigError(e.to_string());
        Ok(ReconSettings {
            default_category: self.config.get_default_category().await.map_err(map)?,
            canceled_status: self.config.get_canceled_status().await.map_err(map)?,
            backup_before_delete: self.config.get_backup_before_delete().await.map_err(map)?,
        })
    }

    // ===== 报表生成 =====

    /// 以当前原始订单重新生成报表（推断源 = 当前原始订单）
    #[instrument(skip(self))]
    pub async fn generate(&self) -> ReportResult<GenerationOutcome> {
        let _gate = self.write_gate.lock().await;
        let settings = self.load_settings().await?;
        let snapshot = self.load_snapshot().await?;
        let inference_source = snapshot.orders.clone();
        self.generate_from(snapshot, &inference_source, &settings).await
    }

    /// 写入新批次原始订单后生成报表
    ///
    /// # 参数
    /// - merge_batch: 接收写入前的原始订单，返回要保存的完整订单列表和附带统计
    ///
    /// # 说明
    /// 推断源为写入前的原始订单，新导入订单不会被误判为人工删除
    #[instrument(skip(self, merge_batch))]
    pub async fn ingest_and_generate<F, T>(&self, merge_batch: F) -> ReportResult<(T, GenerationOutcome)>
    where
        F: FnOnce(&[RawOrder]) -> (Vec<RawOrder>, T) + Send,
        T: Send,
    {
        let _gate = self.write_gate.lock().await;
        let settings = self.load_settings().await?;

        self.ensure_store_ready().await?;
        let previous = self.store.load_orders().await?;
        let (merged, stats) = merge_batch(&previous);
        self.store.save_orders(&merged).await?;
        info!(previous = previous.len(), stored = merged.len(), "原始订单已保存");

        let snapshot = self.load_snapshot().await?;
        let outcome = self.generate_from(snapshot, &previous, &settings).await?;
        Ok((stats, outcome))
    }

    /// 试算：处理当前快照，不合并、不落库
    #[instrument(skip(self))]
    pub async fn preview(&self) -> ReportResult<PreviewOutcome> {
        let settings = self.load_settings().await?;
        let snapshot = self.load_snapshot().await?;

        let mut deleted = snapshot.deleted.clone();
        self.tracker
            .infer_silent_deletions(&snapshot.orders, snapshot.prior.as_ref(), &mut deleted);

        let processor = OrderProcessor::new(&snapshot.catalog, &snapshot.fee_rules, &deleted, &settings);
        let batch = processor.process_batch(&snapshot.orders);
        if batch.all_failed(snapshot.orders.len()) {
            return Err(ReportError::AllOrdersFailed {
                count: snapshot.orders.len(),
            });
        }

        Ok(PreviewOutcome {
            report: build_report(batch.orders),
            skipped_deleted: batch.skipped_deleted,
            failures: batch.failures,
        })
    }

    async fn load_snapshot(&self) -> ReportResult<Snapshot> {
        self.ensure_store_ready().await?;
        let orders = self.store.load_orders().await?;
        if orders.is_empty() {
            return Err(ReportError::MissingDataset("orders".to_string()));
        }
        let catalog = self
            .store
            .load_catalog()
            .await?
            .ok_or_else(|| ReportError::MissingDataset("products".to_string()))?;
        let fee_rules = self
            .store
            .load_fee_rules()
            .await?
            .ok_or_else(|| ReportError::MissingDataset("mpfeeRules".to_string()))?;
        let deleted = self.store.load_deleted_orders().await?;
        let prior = self.store.load_prior_report().await?;

        debug!(
            orders = orders.len(),
            products = catalog.products.len(),
            deleted = deleted.value.len(),
            deleted_revision = deleted.revision,
            report_revision = prior.revision,
            "快照已加载"
        );

        Ok(Snapshot {
            orders,
            catalog,
            fee_rules,
            deleted: deleted.value,
            deleted_revision: deleted.revision,
            prior: prior.value,
            report_revision: prior.revision,
        })
    }

    async fn generate_from(
        &self,
        snapshot: Snapshot,
        inference_source: &[RawOrder],
        settings: &ReconSettings,
    ) -> ReportResult<GenerationOutcome> {
        let Snapshot {
            orders,
            catalog,
            fee_rules,
            mut deleted,
            deleted_revision,
            prior,
            report_revision,
        } = snapshot;

        let inferred = self
            .tracker
            .infer_silent_deletions(inference_source, prior.as_ref(), &mut deleted);

        let batch = {
            let processor = OrderProcessor::new(&catalog, &fee_rules, &deleted, settings);
            processor.process_batch(&orders)
        };
        if batch.all_failed(orders.len()) {
            warn!(count = orders.len(), "全部订单处理失败");
            return Err(ReportError::AllOrdersFailed { count: orders.len() });
        }

        let BatchResult {
            orders: processed,
            skipped_deleted,
            failures,
        } = batch;
        let processed_count = processed.len();

        let merged = ReportMerger::merge(prior.as_ref(), processed);
        let report_written = prior.is_none() || merged.added > 0;

        // 报表先写：CAS 失败时整个操作无任何写入
        if report_written {
            self.store.save_report(&merged.report, report_revision).await?;
        }
        if !inferred.is_empty() {
            self.store.save_deleted_orders(&deleted, deleted_revision).await?;
        }

        let summary = match (report_written, prior) {
            (false, Some(prior)) => prior.summary,
            _ => merged.report.summary.clone(),
        };

        info!(
            source = orders.len(),
            processed = processed_count,
            skipped_deleted,
            failed = failures.len(),
            added = merged.added,
            inferred = inferred.len(),
            report_written,
            "报表生成完成"
        );

        Ok(GenerationOutcome {
            source_orders: orders.len(),
            processed: processed_count,
            skipped_deleted,
            failed: failures.len(),
            added: merged.added,
            duplicates: merged.duplicates,
            inferred_deletions: inferred,
            report_written,
            summary,
            failures,
        })
    }

    // ===== 显式删除 =====

    /// 删除订单（并入删除集 + 从报表移除）
    #[instrument(skip(self, order_numbers), fields(count = order_numbers.len()))]
    pub async fn delete_orders(&self, order_numbers: &[String]) -> ReportResult<DeleteOutcome> {
        let _gate = self.write_gate.lock().await;
        let settings = self.load_settings().await?;
        self.ensure_store_ready().await?;

        let deleted = self.store.load_deleted_orders().await?;
        let prior = self.store.load_prior_report().await?;

        let mut set = deleted.value;
        let newly_tracked = self.tracker.record_explicit(&mut set, order_numbers);
        let targets: HashSet<String> = order_numbers
            .iter()
            .map(|n| order_key(n))
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .collect();

        let mut outcome = DeleteOutcome {
            requested: targets.len(),
            newly_tracked: newly_tracked.len(),
            removed_rows: 0,
            remaining_rows: 0,
            report_found: prior.value.is_some(),
            backup_id: None,
            summary: ReportSummary::default(),
        };

        if let Some(report) = prior.value.as_ref() {
            if settings.backup_before_delete {
                outcome.backup_id = Some(self.store.backup_report(report).await?);
            }
            let (updated, removed) = ReportMerger::remove_orders(report, &targets);
            self.store.save_report(&updated, prior.revision).await?;
            outcome.removed_rows = removed;
            outcome.remaining_rows = updated.orders.len();
            outcome.summary = updated.summary;
        } else {
            warn!("报表不存在，仅记录删除集");
        }

        if !newly_tracked.is_empty() {
            self.store.save_deleted_orders(&set, deleted.revision).await?;
        }

        info!(
            newly_tracked = outcome.newly_tracked,
            removed = outcome.removed_rows,
            remaining = outcome.remaining_rows,
            "订单删除完成"
        );
        Ok(outcome)
    }

    // ===== 人工录入 =====

    /// 人工录入订单
    ///
    /// # 参数
    /// - entries: RawOrder 形状的录入
    /// - append: true 合并到现有报表；false 以录入内容重建报表
    #[instrument(skip(self, entries), fields(count = entries.len()))]
    pub async fn add_manual_entries(
        &self,
        entries: &[RawOrder],
        append: bool,
    ) -> ReportResult<ManualEntryOutcome> {
        let _gate = self.write_gate.lock().await;
        let settings = self.load_settings().await?;
        self.ensure_store_ready().await?;

        let catalog = self
            .store
            .load_catalog()
            .await?
            .ok_or_else(|| ReportError::MissingDataset("products".to_string()))?;
        let deleted = self.store.load_deleted_orders().await?;
        let prior = self.store.load_prior_report().await?;

        let batch = ManualEntryProcessor::new(&catalog, &deleted.value, &settings).process_batch(entries);
        if batch.all_failed(entries.len()) {
            return Err(ReportError::AllOrdersFailed {
                count: entries.len(),
            });
        }

        let existing_entries = if append {
            prior.value.as_ref().map(|r| r.orders.len()).unwrap_or(0)
        } else {
            0
        };
        let base = if append { prior.value.as_ref() } else { None };
        let merged = ReportMerger::merge(base, batch.orders);
        self.store.save_report(&merged.report, prior.revision).await?;

        info!(
            added = merged.added,
            duplicates = merged.duplicates,
            failed = batch.failures.len(),
            "人工录入完成"
        );

        Ok(ManualEntryOutcome {
            append,
            total_entries: merged.report.orders.len(),
            existing_entries,
            added: merged.added,
            duplicates_skipped: merged.duplicates,
            skipped_deleted: batch.skipped_deleted,
            failures: batch.failures,
            summary: merged.report.summary,
        })
    }

    // ===== 备份与恢复 =====

    /// 读取当前报表
    pub async fn current_report(&self) -> ReportResult<Report> {
        self.ensure_store_ready().await?;
        self.store
            .load_prior_report()
            .await?
            .value
            .ok_or(ReportError::ReportNotFound)
    }

    /// 备份当前报表
    pub async fn backup_report(&self) -> ReportResult<String> {
        let report = self.current_report().await?;
        let backup_id = self.store.backup_report(&report).await?;
        info!(backup_id = %backup_id, rows = report.orders.len(), "报表已备份");
        Ok(backup_id)
    }

    /// 用上传的报表替换当前报表（汇总重算，已删除订单剔除）
    #[instrument(skip(self, uploaded), fields(rows = uploaded.orders.len()))]
    pub async fn restore_report(&self, uploaded: Report) -> ReportResult<RestoreOutcome> {
        let _gate = self.write_gate.lock().await;
        self.ensure_store_ready().await?;

        let deleted = self.store.load_deleted_orders().await?;
        let prior = self.store.load_prior_report().await?;

        let incoming = uploaded.orders.len();
        let orders: Vec<_> = uploaded
            .orders
            .into_iter()
            .filter(|o| !deleted.value.contains(&o.order_number))
            .collect();
        let dropped_deleted = incoming - orders.len();

        let report = build_report(orders);
        self.store.save_report(&report, prior.revision).await?;

        Ok(RestoreOutcome {
            restored_rows: report.orders.len(),
            dropped_deleted,
            summary: report.summary,
        })
    }
}
