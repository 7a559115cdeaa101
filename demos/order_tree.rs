//! Nested Order Validation
//!
//! This example validates an order tree with collections at several levels.
//!
//! Key concepts:
//! - `rule_for_each` rules over scalar collections
//! - Nested validation of collections of models
//! - Index-qualified failure paths such as `lines[1].serials[0]`
//! - Async checks with cancellation
//!
//! Run with: cargo run --example order_tree

use precept::prelude::*;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
struct Order {
    reference: String,
    lines: Vec<Line>,
}

#[derive(Debug)]
struct Line {
    sku: String,
    quantity: i64,
    serials: Vec<String>,
}

model! {
    Order {
        fields: [reference],
        collections: [lines],
    }
}

model! {
    Line {
        fields: [sku, quantity, serials],
    }
}

async fn sku_exists(sku: Value) -> bool {
    tokio::time::sleep(Duration::from_millis(5)).await;
    sku.as_text().is_some_and(|sku| sku.starts_with("SKU-"))
}

#[tokio::main]
async fn main() {
    println!("=== Order Tree Example ===\n");

    let validator = Validator::new();

    let mut rules = validator.configure::<Order>();
    rules.rule_for("reference").required().matches(r"ORD-\d{4}");
    rules.rule_for("lines").not_empty();
    rules.rule_for_each("lines").nested();
    rules.build().expect("order rules are well formed");

    let mut rules = validator.configure::<Line>();
    rules
        .rule_for("sku")
        .required()
        .must_async(sku_exists)
        .with_message("{0} is not in the catalog");
    rules.rule_for("quantity").range(1, 99);
    rules
        .rule_for_each("serials")
        .length(6, 6)
        .with_message("Each serial must have exactly 6 characters");
    rules.build().expect("line rules are well formed");

    let mut order = Order {
        reference: "ORD-0042".to_string(),
        lines: vec![
            Line {
                sku: "SKU-1".to_string(),
                quantity: 2,
                serials: vec!["A00001".to_string(), "A00002".to_string()],
            },
            Line {
                sku: "BOGUS".to_string(),
                quantity: 0,
                serials: vec!["B1".to_string()],
            },
        ],
    };

    let cancel = CancellationToken::new();
    match validator.validate(&mut order) {
        Err(err) => println!("Synchronous validation refused: {err}\n"),
        Ok(_) => println!("Synchronous validation unexpectedly succeeded\n"),
    }

    let report = validator
        .validate_async(&mut order, &cancel)
        .await
        .expect("order rules are built");

    println!("Valid: {}", report.is_valid());
    for failure in report.failures() {
        println!("  {:<20} {}", failure.path.to_string(), failure.message);
    }

    cancel.cancel();
    match validator.validate_async(&mut order, &cancel).await {
        Err(ValidateError::Cancelled) => println!("\nCancelled run discarded its results"),
        other => println!("\nUnexpected outcome: {other:?}"),
    }
}
