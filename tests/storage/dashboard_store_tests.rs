//! DashboardStore contract tests.

use invoice_dashboard::models::{InvoiceStatus, Revenue};
use invoice_dashboard::storage::Storage;

use super::{create_customer, create_invoice};

pub async fn test_card_totals(storage: &Storage) {
    let empty = storage.dashboard.card_totals().await.expect("cards");
    assert_eq!(empty.invoice_count, 0);
    assert_eq!(empty.customer_count, 0);
    assert_eq!(empty.paid_cents, 0);
    assert_eq!(empty.pending_cents, 0);

    let amy = create_customer(storage, "Amy Burns", "amy@burns.com").await;
    create_customer(storage, "Lee Robinson", "lee@robinson.com").await;
    create_invoice(storage, &amy.id, 1500, InvoiceStatus::Paid, "2024-01-01").await;
    create_invoice(storage, &amy.id, 2500, InvoiceStatus::Paid, "2024-01-02").await;
    create_invoice(storage, &amy.id, 700, InvoiceStatus::Pending, "2024-01-03").await;

    let cards = storage.dashboard.card_totals().await.expect("cards");
    assert_eq!(cards.invoice_count, 3);
    assert_eq!(cards.customer_count, 2);
    assert_eq!(cards.paid_cents, 4000);
    assert_eq!(cards.pending_cents, 700);
}

pub async fn test_latest_invoices_newest_five(storage: &Storage) {
    let customer = create_customer(storage, "Hector Simpson", "hector@simpson.com").await;
    for day in 1..=7 {
        let date = format!("2024-04-{:02}", day);
        create_invoice(storage, &customer.id, day * 10000, InvoiceStatus::Pending, &date).await;
    }

    let latest = storage.dashboard.latest_invoices().await.expect("latest");
    assert_eq!(latest.len(), 5);
    assert_eq!(latest[0].amount, "$700.00");
    assert_eq!(latest[4].amount, "$300.00");
    assert_eq!(latest[0].name, "Hector Simpson");
    assert_eq!(latest[0].email, "hector@simpson.com");
}

pub async fn test_revenue_seed_is_idempotent(storage: &Storage) {
    let months = vec![
        Revenue {
            month: "Jan".to_string(),
            revenue: 2000,
        },
        Revenue {
            month: "Feb".to_string(),
            revenue: 1800,
        },
    ];

    storage.dashboard.seed_revenue(&months).await.expect("seed");
    storage.dashboard.seed_revenue(&months).await.expect("reseed");

    let revenue = storage.dashboard.revenue().await.expect("revenue");
    assert_eq!(revenue.len(), 2);
    assert!(revenue.contains(&months[0]));
    assert!(revenue.contains(&months[1]));
}

#[macro_export]
macro_rules! run_dashboard_store_tests {
    ($storage:expr) => {{
        use $crate::storage::dashboard_store_tests::*;

        test_card_totals(&$storage).await;
        println!("  test_card_totals: PASSED");

        test_latest_invoices_newest_five(&$storage).await;
        println!("  test_latest_invoices_newest_five: PASSED");

        test_revenue_seed_is_idempotent(&$storage).await;
        println!("  test_revenue_seed_is_idempotent: PASSED");
    }};
}
