// ==========================================
// 订单对账系统 - 对账引擎层
// ==========================================
// 组件（自底向上）:
//   value_normalizer → catalog_resolver / fee_calculator → order_processor
//   → deletion_tracker → report_merger → orchestrator
// 红线: 纯计算组件不做 I/O，I/O 只在 orchestrator 经存储接口发生
// ==========================================

pub mod catalog_resolver;
pub mod deletion_tracker;
pub mod error;
pub mod fee_calculator;
pub mod manual_entry;
pub mod orchestrator;
pub mod order_processor;
pub mod report_merger;
pub mod settings;
pub mod value_normalizer;

pub use catalog_resolver::CatalogResolver;
pub use deletion_tracker::DeletionTracker;
pub use error::{OrderProcessError, ReportError, ReportResult};
pub use fee_calculator::FeeCalculator;
pub use manual_entry::ManualEntryProcessor;
pub use orchestrator::{
    DeleteOutcome, GenerationOutcome, ManualEntryOutcome, PreviewOutcome, ReportOrchestrator,
    RestoreOutcome,
};
pub use order_processor::{parse_order_date, BatchResult, OrderFailure, OrderProcessor, ProcessOutcome};
pub use report_merger::{compute_summary, MergeOutcome, ReportMerger};
pub use settings::ReconSettings;
pub use value_normalizer::normalize_money_value;
