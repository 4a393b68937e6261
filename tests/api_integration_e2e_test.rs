// ==========================================
// API 层端到端测试
// ==========================================
// 测试目标: 通过 AppState 组装的 API 验证删除、人工录入、备份与恢复
// ==========================================


use mp_order_report::api::ApiError;
use mp_order_report::domain::{Catalog, Product, Variation};
use mp_order_report::logging;
use mp_order_report::repository::ReportStore;
use test_helpers::{
    approx_eq, create_json_state, create_test_state, raw_order, seed_all, seed_master_data,
};

const MANUAL_ENTRIES: &str = r#"[
    {
        "No. Pesanan": "M1",
        "Waktu Pembayaran Dilakukan": "2025-04-18 10:23",
        "Nama Produk": "Widget",
        "Nama Variasi": "Green",
        "Harga Setelah Diskon": 50000,
        "Jumlah": "2",
        "Voucher Ditanggung Penjual": "",
        "MP Fee Manual": 2500
    },
    {
        "No. Pesanan": "M2",
        "Waktu Pembayaran Dilakukan": "2025-04-18",
        "Nama Produk": "Gadget",
        "Harga Setelah Diskon": "30000",
        "Jumlah": "abc"
    }
]"#;

async fn seeded_state() -> (tempfile::TempDir, mp_order_report::AppState) {
    let (dir, state) = create_test_state().await;
    seed_all(
        state.store.as_ref(),
        &[
            raw_order("X1", "Widget", "Red", 2.0, "50.000"),
            raw_order("X2", "Gadget", "", 1.0, "30.000"),
        ],
    )
    .await;
    state.report_api.generate_report().await.expect("generate should succeed");
    (dir, state)
}

// ===== 删除 =====

#[tokio::test]
async fn test_delete_orders_with_backup() {
    logging::init_test();
    let (_dir, state) = seeded_state().await;

    let outcome = state
        .report_api
        .delete_orders(&["X1".to_string(), " ".to_string()])
        .await
        .unwrap();

    assert_eq!(outcome.requested, 1);
    assert_eq!(outcome.newly_tracked, 1);
    assert_eq!(outcome.removed_rows, 1);
    assert!(outcome.backup_id.is_some());
    assert_eq!(outcome.summary.total_orders, 1);
    assert!(approx_eq(outcome.summary.total_earnings, 28400.0));

    let deleted = state.store.load_deleted_orders().await.unwrap();
    assert_eq!(deleted.value.as_slice(), &["X1".to_string()]);
}

#[tokio::test]
async fn test_delete_orders_rejects_empty_list() {
    logging::init_test();
    let (_dir, state) = seeded_state().await;

    let err = state.report_api.delete_orders(&[]).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));

    let err = state
        .report_api
        .delete_orders(&["  ".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
}

#[tokio::test]
async fn test_delete_without_report_only_tracks() {
    logging::init_test();
    let (_dir, state) = create_test_state().await;

    let outcome = state
        .report_api
        .delete_orders(&["Z9".to_string()])
        .await
        .unwrap();
    assert!(!outcome.report_found);
    assert_eq!(outcome.newly_tracked, 1);
    assert!(state.store.load_deleted_orders().await.unwrap().value.contains("Z9"));
}

// ===== 人工录入 =====

#[tokio::test]
async fn test_manual_entries_append() {
    logging::init_test();
    let (_dir, state) = seeded_state().await;

    let outcome = state
        .report_api
        .add_manual_entries_json(MANUAL_ENTRIES, true)
        .await
        .unwrap();

    assert!(outcome.append);
    assert_eq!(outcome.existing_entries, 2);
    assert_eq!(outcome.added, 2);
    assert_eq!(outcome.total_entries, 4);
    assert!(outcome.failures.is_empty());

    let report = state.report_api.get_report().await.unwrap();

    // 未知规格回退到商品第一个规格的成本
    let m1 = report.orders.iter().find(|o| o.order_number == "M1").unwrap();
    assert_eq!(m1.variation_name, "Green");
    assert!(approx_eq(m1.base_price, 20000.0));
    assert!(approx_eq(m1.mp_fee, 2500.0));
    assert!(approx_eq(m1.earnings, 97500.0));
    assert!(approx_eq(m1.margin, 57500.0));

    // 无法解析的数量按 1 处理，费用缺失为 0
    let m2 = report.orders.iter().find(|o| o.order_number == "M2").unwrap();
    assert!(approx_eq(m2.quantity, 1.0));
    assert!(approx_eq(m2.mp_fee, 0.0));
    assert!(approx_eq(m2.earnings, 30000.0));
}

#[tokio::test]
async fn test_manual_entries_replace_and_dedup() {
    logging::init_test();
    let (_dir, state) = seeded_state().await;

    let outcome = state
        .report_api
        .add_manual_entries_json(MANUAL_ENTRIES, false)
        .await
        .unwrap();
    assert_eq!(outcome.existing_entries, 0);
    assert_eq!(outcome.total_entries, 2);

    let again = state
        .report_api
        .add_manual_entries_json(MANUAL_ENTRIES, true)
        .await
        .unwrap();
    assert_eq!(again.added, 0);
    assert_eq!(again.duplicates_skipped, 2);
    assert_eq!(again.total_entries, 2);
}

#[tokio::test]
async fn test_manual_entries_skip_deleted() {
    logging::init_test();
    let (_dir, state) = seeded_state().await;
    state.report_api.delete_orders(&["M1".to_string()]).await.unwrap();

    let outcome = state
        .report_api
        .add_manual_entries_json(MANUAL_ENTRIES, true)
        .await
        .unwrap();
    assert_eq!(outcome.skipped_deleted, 1);
    assert_eq!(outcome.added, 1);
}

#[tokio::test]
async fn test_manual_entries_invalid_json() {
    logging::init_test();
    let (_dir, state) = seeded_state().await;

    let err = state
        .report_api
        .add_manual_entries_json("{\"not\": \"an array\"}", true)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));

    let err = state.report_api.add_manual_entries_json("[]", true).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
}

// ===== 备份与恢复 =====

#[tokio::test]
async fn test_backup_and_restore() {
    logging::init_test();
    let (_dir, state) = seeded_state().await;

    let backup_id = state.report_api.backup_report().await.unwrap();
    assert!(!backup_id.is_empty());

    let report = state.report_api.get_report().await.unwrap();
    let uploaded = serde_json::to_string(&report).unwrap();

    state.report_api.delete_orders(&["X1".to_string()]).await.unwrap();

    // 恢复时已删除订单被剔除，汇总重算
    let outcome = state.report_api.restore_report(&uploaded).await.unwrap();
    assert_eq!(outcome.dropped_deleted, 1);
    assert_eq!(outcome.restored_rows, 1);
    assert!(approx_eq(outcome.summary.total_earnings, 28400.0));
}

#[tokio::test]
async fn test_restore_rejects_malformed_report() {
    logging::init_test();
    let (_dir, state) = seeded_state().await;

    let err = state.report_api.restore_report("not json").await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));

    let err = state
        .report_api
        .restore_report(r#"{"summary": {}}"#)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::ValidationError(_)));
}

#[tokio::test]
async fn test_backup_without_report() {
    logging::init_test();
    let (_dir, state) = create_test_state().await;

    let err = state.report_api.backup_report().await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

// ===== 主数据 =====

#[tokio::test]
async fn test_catalog_validation() {
    logging::init_test();
    let (_dir, state) = create_test_state().await;

    let invalid = Catalog {
        products: vec![
            Product {
                product_name: "Widget".to_string(),
                category: "A".to_string(),
                variations: vec![Variation {
                    name: "Red".to_string(),
                    base_price: -1.0,
                }],
            },
            Product {
                product_name: "widget".to_string(),
                category: "".to_string(),
                variations: vec![],
            },
        ],
        last_updated: None,
    };

    let err = state.catalog_api.save_catalog(invalid).await.unwrap_err();
    match err {
        ApiError::ValidationFailed { violations, .. } => assert_eq!(violations.len(), 3),
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(matches!(
        state.catalog_api.get_catalog().await.unwrap_err(),
        ApiError::NotFound(_)
    ));

    let saved = state
        .catalog_api
        .save_catalog(test_helpers::sample_catalog())
        .await
        .unwrap();
    assert!(saved.last_updated.is_some());
    assert_eq!(state.catalog_api.get_catalog().await.unwrap().products.len(), 2);
}

// ===== JSON 文件后端 =====

#[tokio::test]
async fn test_json_backend_full_flow() {
    logging::init_test();
    let (_dir, state) = create_json_state().await;
    assert!(state.config_manager.is_none());

    seed_master_data(state.store.as_ref()).await;
    state
        .store
        .save_orders(&[
            raw_order("X1", "Widget", "Red", 2.0, "50.000"),
            raw_order("X2", "Gadget", "", 1.0, "30.000"),
        ])
        .await
        .unwrap();

    let outcome = state.report_api.generate_report().await.unwrap();
    assert_eq!(outcome.added, 2);

    let deletion = state.report_api.delete_orders(&["X2".to_string()]).await.unwrap();
    assert_eq!(deletion.remaining_rows, 1);

    let preview = state.report_api.preview_report().await.unwrap();
    assert_eq!(preview.skipped_deleted, 1);
    assert_eq!(preview.report.orders.len(), 1);
}
