//! Property tests: random mutation sequences against the inventory ledger,
//! checked against a plain single-threaded model of its stock semantics.

use std::collections::HashMap;

use chrono::{Duration, Utc};
use proptest::prelude::*;

use rxops_core::types::{BatchInfo, Schedule};
use rxops_engine::InventoryLedger;

const SKUS: &[&str] = &["ALPHA", "BRAVO", "CHARLIE", "DELTA"];
const REORDER_LEVEL: i64 = 10;

fn batch() -> BatchInfo {
    BatchInfo {
        name: "Model Item".to_string(),
        category: "test".to_string(),
        reorder_level: REORDER_LEVEL,
        price_paise: 100,
        mrp_paise: None,
        expiry_date: Utc::now().date_naive() + Duration::days(365),
        manufacturer: "Cipla".to_string(),
        shelf_location: "A-1".to_string(),
        batch_number: "B001".to_string(),
        salt: "test".to_string(),
        hsn_code: "3004".to_string(),
        gst_bps: 0,
        schedule: Schedule::Unscheduled,
    }
}

#[derive(Debug, Clone)]
enum Op {
    Receive { sku: &'static str, qty: i64 },
    Reserve { sku: &'static str, qty: i64 },
    Adjust { sku: &'static str, delta: i64 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let sku = prop::sample::select(SKUS.to_vec());
    prop_oneof![
        (sku.clone(), 1i64..=500).prop_map(|(sku, qty)| Op::Receive { sku, qty }),
        (sku.clone(), 1i64..=500).prop_map(|(sku, qty)| Op::Reserve { sku, qty }),
        (sku, -300i64..=300).prop_map(|(sku, delta)| Op::Adjust { sku, delta }),
    ]
}

/// The reference model: known SKUs and their stock levels. Mirrors exactly
/// which operations succeed and which leave state untouched.
fn apply_model(model: &mut HashMap<&'static str, i64>, op: &Op) {
    match op {
        Op::Receive { sku, qty } => {
            *model.entry(*sku).or_insert(0) += qty;
        }
        Op::Reserve { sku, qty } => {
            if let Some(stock) = model.get_mut(sku) {
                if *stock >= *qty {
                    *stock -= qty;
                }
            }
        }
        Op::Adjust { sku, delta } => {
            if let Some(stock) = model.get_mut(sku) {
                if *stock + delta >= 0 {
                    *stock += delta;
                }
            }
        }
    }
}

fn apply_ledger(ledger: &InventoryLedger, op: &Op) {
    // Errors are expected outcomes here (unknown SKU, insufficient stock,
    // negative result); the model mirrors them as no-ops.
    match op {
        Op::Receive { sku, qty } => {
            let _ = ledger.receive_stock(sku, batch(), *qty);
        }
        Op::Reserve { sku, qty } => {
            let _ = ledger.reserve_and_decrement(sku, *qty);
        }
        Op::Adjust { sku, delta } => {
            let _ = ledger.adjust_stock(sku, *delta);
        }
    }
}

proptest! {
    /// After any operation sequence, the ledger's per-SKU stocks match the
    /// model, and no stock is ever negative.
    #[test]
    fn ledger_matches_model(ops in prop::collection::vec(op_strategy(), 1..200)) {
        let ledger = InventoryLedger::new();
        let mut model: HashMap<&'static str, i64> = HashMap::new();

        for op in &ops {
            apply_model(&mut model, op);
            apply_ledger(&ledger, op);
        }

        for sku in SKUS {
            match model.get(sku) {
                Some(expected) => {
                    let item = ledger.get(sku).unwrap();
                    prop_assert_eq!(item.stock, *expected);
                    prop_assert!(item.stock >= 0);
                }
                None => prop_assert!(ledger.get(sku).is_err()),
            }
        }
    }

    /// The low-stock query agrees with the model's count of SKUs at or
    /// below the reorder level.
    #[test]
    fn low_stock_matches_model(ops in prop::collection::vec(op_strategy(), 1..200)) {
        let ledger = InventoryLedger::new();
        let mut model: HashMap<&'static str, i64> = HashMap::new();

        for op in &ops {
            apply_model(&mut model, op);
            apply_ledger(&ledger, op);
        }

        let expected = model.values().filter(|stock| **stock <= REORDER_LEVEL).count();
        prop_assert_eq!(ledger.query_low_stock().len(), expected);
    }

    /// Receipts followed by reservations conserve units: initial + received
    /// - reserved == final, for a single SKU driven hard.
    #[test]
    fn single_sku_conservation(
        receipts in prop::collection::vec(1i64..=100, 1..20),
        reserves in prop::collection::vec(1i64..=100, 0..20),
    ) {
        let ledger = InventoryLedger::new();
        let mut received = 0i64;
        for qty in &receipts {
            ledger.receive_stock("ALPHA", batch(), *qty).unwrap();
            received += qty;
        }

        let mut reserved = 0i64;
        for qty in &reserves {
            if ledger.reserve_and_decrement("ALPHA", *qty).is_ok() {
                reserved += qty;
            }
        }

        let item = ledger.get("ALPHA").unwrap();
        prop_assert_eq!(item.stock, received - reserved);
        prop_assert!(item.stock >= 0);
    }
}
