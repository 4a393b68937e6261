// ==========================================
// 订单对账系统 - 报表存储接口
// ==========================================
// 红线: Repository 不含业务逻辑
// 语义: 每次写入都是整文档替换
// 并发: deletedOrders / reportData 写入携带读取时的 revision（CAS）
//       revision = 0 表示文档不存在
// ==========================================

use crate::domain::catalog::Catalog;
use crate::domain::fee_rule::FeeRuleSet;
use crate::domain::order::RawOrder;
use crate::domain::report::{DeletedOrderSet, Report};
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

// ==========================================
// Collection - 文档集合
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Orders,
    Products,
    MpFeeRules,
    DeletedOrders,
    ReportData,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Orders,
        Collection::Products,
        Collection::MpFeeRules,
        Collection::DeletedOrders,
        Collection::ReportData,
    ];

    /// 集合名（SQLite document_store 主键）
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Orders => "orders",
            Collection::Products => "products",
            Collection::MpFeeRules => "mpfeeRules",
            Collection::DeletedOrders => "deletedOrders",
            Collection::ReportData => "reportData",
        }
    }

    /// JSON 文件名（JsonFileStore）
    pub fn file_name(&self) -> &'static str {
        match self {
            Collection::Orders => "orderData.json",
            Collection::Products => "products-catalog.json",
            Collection::MpFeeRules => "mpfeerules.json",
            Collection::DeletedOrders => "deleted-orders.json",
            Collection::ReportData => "report-data.json",
        }
    }
}

/// 带版本号的文档
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub value: T,
    pub revision: i64,
}

/// 原始文档
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub body_json: String,
    pub revision: i64,
}

// ==========================================
// DocumentStore - 后端能力（原始 JSON 文档）
// ==========================================
// 实现者: SqliteReportStore, JsonFileStore
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// 读取文档；不存在 → None
    async fn read_document(&self, collection: Collection) -> RepositoryResult<Option<StoredDocument>>;

    /// 整文档替换
    ///
    /// # 参数
    /// - expected_revision: Some 时做 CAS，与当前 revision 不一致则失败
    ///
    /// # 返回
    /// 写入后的新 revision
    async fn write_document(
        &self,
        collection: Collection,
        body_json: &str,
        expected_revision: Option<i64>,
    ) -> RepositoryResult<i64>;

    /// 写入报表备份，返回备份标识
    async fn write_backup(&self, body_json: &str) -> RepositoryResult<String>;

    /// 健康检查
    async fn ping(&self) -> RepositoryResult<()>;
}

// ==========================================
// ReportStore - 对账引擎消费的存储能力
// ==========================================
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn load_orders(&self) -> RepositoryResult<Vec<RawOrder>>;
    async fn save_orders(&self, orders: &[RawOrder]) -> RepositoryResult<()>;

    async fn load_catalog(&self) -> RepositoryResult<Option<Catalog>>;
    async fn save_catalog(&self, catalog: &Catalog) -> RepositoryResult<()>;

    async fn load_fee_rules(&self) -> RepositoryResult<Option<FeeRuleSet>>;
    async fn save_fee_rules(&self, rules: &FeeRuleSet) -> RepositoryResult<()>;

    async fn load_deleted_orders(&self) -> RepositoryResult<Versioned<DeletedOrderSet>>;
    async fn save_deleted_orders(
        &self,
        deleted: &DeletedOrderSet,
        expected_revision: i64,
    ) -> RepositoryResult<i64>;

    async fn load_prior_report(&self) -> RepositoryResult<Versioned<Option<Report>>>;
    async fn save_report(&self, report: &Report, expected_revision: i64) -> RepositoryResult<i64>;

    /// 备份当前报表快照
    async fn backup_report(&self, report: &Report) -> RepositoryResult<String>;

    async fn health_check(&self) -> RepositoryResult<()>;
}

fn decode<T: DeserializeOwned>(collection: Collection, body: &str) -> RepositoryResult<T> {
    serde_json::from_str(body).map_err(|e| RepositoryError::SerializationError {
        collection: collection.as_str().to_string(),
        message: e.to_string(),
    })
}

fn encode<T: Serialize + ?Sized>(collection: Collection, value: &T) -> RepositoryResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| RepositoryError::SerializationError {
        collection: collection.as_str().to_string(),
        message: e.to_string(),
    })
}

async fn load_json<S, T>(store: &S, collection: Collection) -> RepositoryResult<Option<Versioned<T>>>
where
    S: DocumentStore + ?Sized,
    T: DeserializeOwned,
{
    match store.read_document(collection).await? {
        Some(doc) => Ok(Some(Versioned {
            value: decode(collection, &doc.body_json)?,
            revision: doc.revision,
        })),
        None => Ok(None),
    }
}

// 所有后端共享同一套序列化逻辑
#[async_trait]
impl<S: DocumentStore> ReportStore for S {
    async fn load_orders(&self) -> RepositoryResult<Vec<RawOrder>> {
        Ok(load_json::<S, Vec<RawOrder>>(self, Collection::Orders)
            .await?
            .map(|v| v.value)
            .unwrap_or_default())
    }

    async fn save_orders(&self, orders: &[RawOrder]) -> RepositoryResult<()> {
        let body = encode(Collection::Orders, orders)?;
        self.write_document(Collection::Orders, &body, None).await?;
        Ok(())
    }

    async fn load_catalog(&self) -> RepositoryResult<Option<Catalog>> {
        Ok(load_json::<S, Catalog>(self, Collection::Products)
            .await?
            .map(|v| v.value))
    }

    async fn save_catalog(&self, catalog: &Catalog) -> RepositoryResult<()> {
        let body = encode(Collection::Products, catalog)?;
        self.write_document(Collection::Products, &body, None).await?;
        Ok(())
    }

    async fn load_fee_rules(&self) -> RepositoryResult<Option<FeeRuleSet>> {
        Ok(load_json::<S, FeeRuleSet>(self, Collection::MpFeeRules)
            .await?
            .map(|v| v.value))
    }

    async fn save_fee_rules(&self, rules: &FeeRuleSet) -> RepositoryResult<()> {
        let body = encode(Collection::MpFeeRules, rules)?;
        self.write_document(Collection::MpFeeRules, &body, None).await?;
        Ok(())
    }

    async fn load_deleted_orders(&self) -> RepositoryResult<Versioned<DeletedOrderSet>> {
        let loaded = load_json::<S, Vec<String>>(self, Collection::DeletedOrders).await?;
        Ok(match loaded {
            Some(v) => Versioned {
                value: DeletedOrderSet::from_list(v.value),
                revision: v.revision,
            },
            None => Versioned {
                value: DeletedOrderSet::new(),
                revision: 0,
            },
        })
    }

    async fn save_deleted_orders(
        &self,
        deleted: &DeletedOrderSet,
        expected_revision: i64,
    ) -> RepositoryResult<i64> {
        let body = encode(Collection::DeletedOrders, deleted.as_slice())?;
        self.write_document(Collection::DeletedOrders, &body, Some(expected_revision))
            .await
    }

    async fn load_prior_report(&self) -> RepositoryResult<Versioned<Option<Report>>> {
        let loaded = load_json::<S, Report>(self, Collection::ReportData).await?;
        Ok(match loaded {
            Some(v) => Versioned {
                value: Some(v.value),
                revision: v.revision,
            },
            None => Versioned {
                value: None,
                revision: 0,
            },
        })
    }

    async fn save_report(&self, report: &Report, expected_revision: i64) -> RepositoryResult<i64> {
        let body = encode(Collection::ReportData, report)?;
        self.write_document(Collection::ReportData, &body, Some(expected_revision))
            .await
    }

    async fn backup_report(&self, report: &Report) -> RepositoryResult<String> {
        let body = encode(Collection::ReportData, report)?;
        self.write_backup(&body).await
    }

    async fn health_check(&self) -> RepositoryResult<()> {
        self.ping().await
    }
}
