//! Headless dashboard: fetches the ledger, runs the aggregation core
//! and prints the selected month's overview. Exercises the whole read
//! path (client → cache → engine → selection) end to end.

use std::sync::Arc;

use anyhow::Result;
use chrono::Local;
use kakeibo_app::{Dashboard, ExpenseStore};
use kakeibo_client::{RecordStoreClient, SnapshotCache};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let base_url =
        std::env::var("KAKEIBO_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let source = std::env::var("KAKEIBO_SOURCE").ok();

    let client = Arc::new(RecordStoreClient::new(base_url)?);
    let cache = SnapshotCache::open_default();
    if cache.is_none() {
        warn!("no platform data directory; running without a snapshot cache");
    }

    let store = ExpenseStore::new(client, cache, source);
    let mut dashboard = Dashboard::new(store, Local::now().date_naive());

    if let Err(e) = dashboard.refresh().await {
        warn!(error = %e, "refresh failed; showing last cached snapshot");
    }

    let view = dashboard.overview();
    info!(month = %view.selected_month, "rendering overview");

    println!("== {} ==", view.selected_month);
    println!(
        "収入 ¥{}  支出 ¥{}  収支 ¥{}",
        view.totals.income, view.totals.expense, view.totals.balance
    );

    if !view.category_totals.is_empty() {
        println!("-- カテゴリ別 --");
        for slice in &view.category_totals {
            println!("{:>8}  {}  ({})", slice.amount, slice.category, slice.color);
        }
    }

    println!("-- 明細 ({}件) --", view.filtered_transactions.len());
    for tx in &view.filtered_transactions {
        println!("{}  ¥{:>8}  {}", tx.date, tx.amount, tx.merchant);
    }

    Ok(())
}
