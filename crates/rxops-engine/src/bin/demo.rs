//! # Engine Demo
//!
//! Seeds a small pharmacy catalog and walks one end-to-end day at the
//! counter: a stock receipt, a large order that drives an item low, the
//! full fulfilment chain, a couple of queue check-ins, and a final stats
//! snapshot.
//!
//! ## Usage
//! ```bash
//! cargo run -p rxops-engine --bin demo
//!
//! # With full structured logs
//! RUST_LOG=debug cargo run -p rxops-engine --bin demo
//! ```

use chrono::{Duration, NaiveTime, Utc};
use tracing::info;
use tracing_subscriber::EnvFilter;

use rxops_core::types::{BatchInfo, OrderStatus, QueueStatus, QueueType, Schedule};
use rxops_engine::{Engine, QueueConfig};

/// Seed catalog: (sku, name, category, salt, stock, reorder, price, gst bps).
const CATALOG: &[(&str, &str, &str, &str, i64, i64, i64, u32)] = &[
    ("PARA500", "Paracetamol 500mg", "analgesic", "paracetamol", 100, 20, 200, 1200),
    ("AMOX250", "Amoxicillin 250mg", "antibiotic", "amoxicillin", 60, 15, 850, 1200),
    ("CETI10", "Cetirizine 10mg", "antihistamine", "cetirizine", 40, 10, 350, 1200),
    ("ORS200", "ORS Sachet 200ml", "rehydration", "ors", 200, 50, 150, 500),
    ("INSUL30", "Insulin 30/70 Vial", "antidiabetic", "insulin", 12, 5, 18500, 500),
];

fn batch(name: &str, category: &str, salt: &str, reorder: i64, price: i64, gst: u32) -> BatchInfo {
    BatchInfo {
        name: name.to_string(),
        category: category.to_string(),
        reorder_level: reorder,
        price_paise: price,
        mrp_paise: Some(price + price / 10),
        expiry_date: Utc::now().date_naive() + Duration::days(365),
        manufacturer: "Cipla".to_string(),
        shelf_location: "A-1".to_string(),
        batch_number: "B2026-001".to_string(),
        salt: salt.to_string(),
        hsn_code: "3004".to_string(),
        gst_bps: gst,
        schedule: Schedule::Unscheduled,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let engine = Engine::new(QueueConfig {
        day_boundary: NaiveTime::from_hms_opt(6, 0, 0).unwrap_or(NaiveTime::MIN),
    });

    // ----- Seed -----
    for (sku, name, category, salt, stock, reorder, price, gst) in CATALOG {
        engine
            .ledger()
            .receive_stock(sku, batch(name, category, salt, *reorder, *price, *gst), *stock)?;
    }
    info!(items = CATALOG.len(), "catalog seeded");

    // ----- A big order drives PARA500 low -----
    let order = engine
        .orders()
        .create_order("PAT-0001", &[("PARA500".to_string(), 95)])?;
    info!(order_id = %order.id, amount = %order.amount(), "large order placed");

    let low = engine.ledger().query_low_stock();
    for item in &low {
        info!(sku = %item.sku, stock = item.stock, reorder = item.reorder_level, "low stock");
    }

    // ----- Fulfil it end to end -----
    for status in [OrderStatus::Ready, OrderStatus::Dispatched, OrderStatus::Delivered] {
        engine.orders().advance_status(&order.id, status)?;
    }
    // Delivered is terminal; a further advance must fail
    if let Err(err) = engine.orders().advance_status(&order.id, OrderStatus::Delivered) {
        info!(error = %err, "re-advancing a delivered order rejected");
    }

    // ----- Queue traffic -----
    let walk_in = engine.queue().check_in("PAT-0002", QueueType::Otc)?;
    let _insured = engine.queue().check_in("PAT-0003", QueueType::Insurance)?;
    engine.queue().advance_status(&walk_in.id, QueueStatus::Servicing)?;
    engine.queue().advance_status(&walk_in.id, QueueStatus::Completed)?;

    if let Some(next) = engine.queue().next_to_serve() {
        info!(patient_ref = %next.patient_ref, token = next.token_number, "next to serve");
    }

    // ----- Dashboard snapshot -----
    let snapshot = engine.stats().snapshot();
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    Ok(())
}
