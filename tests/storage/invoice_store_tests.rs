//! InvoiceStore contract tests.

use invoice_dashboard::interfaces::ITEMS_PER_PAGE;
use invoice_dashboard::models::{InvoiceStatus, InvoiceUpdate};
use invoice_dashboard::storage::{Storage, StorageError};

use super::{create_customer, create_invoice, new_invoice};

pub async fn test_create_requires_customer(storage: &Storage) {
    let err = storage
        .invoices
        .create(new_invoice("no-such-customer", 500, InvoiceStatus::Pending, "2024-03-01"))
        .await
        .expect_err("orphan invoice");
    assert!(
        matches!(err, StorageError::CustomerNotFound(ref id) if id == "no-such-customer"),
        "unexpected error: {err}"
    );

    let rows = storage.invoices.filtered("", 1).await.expect("filtered");
    assert!(rows.is_empty());
}

pub async fn test_filtered_pages_newest_first(storage: &Storage) {
    let customer = create_customer(storage, "Lee Robinson", "lee@robinson.com").await;
    for day in 1..=8 {
        let date = format!("2024-05-{:02}", day);
        create_invoice(storage, &customer.id, day * 100, InvoiceStatus::Paid, &date).await;
    }

    let first = storage.invoices.filtered("", 1).await.expect("page 1");
    assert_eq!(first.len() as u64, ITEMS_PER_PAGE);
    assert_eq!(first[0].date, "2024-05-08");
    assert_eq!(first[0].name, "Lee Robinson");
    assert_eq!(first[0].email, "lee@robinson.com");

    let second = storage.invoices.filtered("", 2).await.expect("page 2");
    assert_eq!(second.len(), 2);
    assert_eq!(second[1].date, "2024-05-01");

    // Page 0 is clamped to the first page.
    let zero = storage.invoices.filtered("", 0).await.expect("page 0");
    assert_eq!(zero, first);

    assert_eq!(storage.invoices.total_pages("").await.expect("pages"), 2);
}

pub async fn test_search_matches_joined_columns(storage: &Storage) {
    let delba = create_customer(storage, "Delba de Oliveira", "delba@oliveira.com").await;
    let amy = create_customer(storage, "Amy Burns", "amy@burns.com").await;
    create_invoice(storage, &delba.id, 15795, InvoiceStatus::Pending, "2022-12-06").await;
    create_invoice(storage, &amy.id, 20348, InvoiceStatus::Paid, "2022-11-14").await;

    let by_name = storage.invoices.filtered("oliveira", 1).await.expect("search");
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].customer_id, delba.id);

    let by_email = storage.invoices.filtered("BURNS.COM", 1).await.expect("search");
    assert_eq!(by_email.len(), 1);
    assert_eq!(by_email[0].customer_id, amy.id);

    let by_status = storage.invoices.filtered("paid", 1).await.expect("search");
    assert_eq!(by_status.len(), 1);
    assert_eq!(by_status[0].status, InvoiceStatus::Paid);

    let by_amount = storage.invoices.filtered("15795", 1).await.expect("search");
    assert_eq!(by_amount.len(), 1);

    let by_date = storage.invoices.filtered("2022-11", 1).await.expect("search");
    assert_eq!(by_date.len(), 1);
    assert_eq!(by_date[0].date, "2022-11-14");

    assert_eq!(storage.invoices.total_pages("nothing").await.expect("pages"), 0);
}

pub async fn test_search_folds_non_ascii_names(storage: &Storage) {
    let elodie = create_customer(storage, "Élodie Durand", "elodie@durand.fr").await;
    let amy = create_customer(storage, "Amy Burns", "amy@burns.com").await;
    create_invoice(storage, &elodie.id, 500, InvoiceStatus::Pending, "2023-01-02").await;
    create_invoice(storage, &amy.id, 700, InvoiceStatus::Paid, "2023-01-03").await;

    let rows = storage.invoices.filtered("éLODIE", 1).await.expect("search");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].customer_id, elodie.id);
    assert_eq!(storage.invoices.total_pages("ÉLODIE").await.expect("pages"), 1);

    // `%` is a literal character, not a wildcard.
    assert!(storage.invoices.filtered("%", 1).await.expect("search").is_empty());
}

pub async fn test_page_after_cursor(storage: &Storage) {
    let customer = create_customer(storage, "Steph Dietz", "steph@dietz.com").await;
    for day in 1..=5 {
        let date = format!("2024-06-{:02}", day);
        create_invoice(storage, &customer.id, 1000, InvoiceStatus::Pending, &date).await;
    }

    let first = storage.invoices.page_after("", 0, 2).await.expect("slice");
    assert_eq!(first.data.len(), 2);
    assert_eq!(first.next_cursor, Some(2));

    let second = storage.invoices.page_after("", 2, 2).await.expect("slice");
    assert_eq!(second.next_cursor, Some(4));
    assert_ne!(first.data[0].id, second.data[0].id);

    let last = storage.invoices.page_after("", 4, 2).await.expect("slice");
    assert_eq!(last.data.len(), 1);
    assert_eq!(last.next_cursor, None);
    assert_eq!(last.data[0].date, "2024-06-01");
}

pub async fn test_get_form_in_dollars(storage: &Storage) {
    let customer = create_customer(storage, "Amy Burns", "amy@burns.com").await;
    let invoice = create_invoice(storage, &customer.id, 4250, InvoiceStatus::Paid, "2024-01-10").await;

    let form = storage
        .invoices
        .get_form(&invoice.id)
        .await
        .expect("get form")
        .expect("invoice exists");
    assert_eq!(form.customer_id, customer.id);
    assert!((form.amount - 42.5).abs() < f64::EPSILON);
    assert_eq!(form.status, InvoiceStatus::Paid);

    assert!(storage.invoices.get_form("missing").await.expect("get form").is_none());
}

pub async fn test_update_keeps_date(storage: &Storage) {
    let amy = create_customer(storage, "Amy Burns", "amy@burns.com").await;
    let lee = create_customer(storage, "Lee Robinson", "lee@robinson.com").await;
    let invoice = create_invoice(storage, &amy.id, 100, InvoiceStatus::Pending, "2023-07-01").await;

    let updated = storage
        .invoices
        .update(
            &invoice.id,
            InvoiceUpdate {
                customer_id: lee.id.clone(),
                amount: 9999,
                status: InvoiceStatus::Paid,
            },
        )
        .await
        .expect("update");
    assert_eq!(updated.customer_id, lee.id);
    assert_eq!(updated.amount, 9999);
    assert_eq!(updated.status, InvoiceStatus::Paid);
    assert_eq!(updated.date, "2023-07-01");

    let err = storage
        .invoices
        .update(
            &invoice.id,
            InvoiceUpdate {
                customer_id: "no-such-customer".to_string(),
                amount: 1,
                status: InvoiceStatus::Paid,
            },
        )
        .await
        .expect_err("orphan update");
    assert!(matches!(err, StorageError::CustomerNotFound(_)));

    let err = storage
        .invoices
        .update(
            "no-such-invoice",
            InvoiceUpdate {
                customer_id: lee.id,
                amount: 1,
                status: InvoiceStatus::Paid,
            },
        )
        .await
        .expect_err("missing invoice");
    assert!(matches!(err, StorageError::NotFound { entity: "invoice", .. }));
}

pub async fn test_delete(storage: &Storage) {
    let customer = create_customer(storage, "Amy Burns", "amy@burns.com").await;
    let invoice = create_invoice(storage, &customer.id, 100, InvoiceStatus::Pending, "2023-07-01").await;

    storage.invoices.delete(&invoice.id).await.expect("delete");
    assert!(storage.invoices.get_form(&invoice.id).await.expect("get").is_none());

    let err = storage
        .invoices
        .delete(&invoice.id)
        .await
        .expect_err("second delete");
    assert!(err.is_not_found());
}

#[macro_export]
macro_rules! run_invoice_store_tests {
    ($storage:expr) => {{
        use $crate::storage::invoice_store_tests::*;

        test_create_requires_customer(&$storage).await;
        println!("  test_create_requires_customer: PASSED");

        test_filtered_pages_newest_first(&$storage).await;
        println!("  test_filtered_pages_newest_first: PASSED");

        test_search_matches_joined_columns(&$storage).await;
        println!("  test_search_matches_joined_columns: PASSED");

        test_search_folds_non_ascii_names(&$storage).await;
        println!("  test_search_folds_non_ascii_names: PASSED");

        test_page_after_cursor(&$storage).await;
        println!("  test_page_after_cursor: PASSED");

        test_get_form_in_dollars(&$storage).await;
        println!("  test_get_form_in_dollars: PASSED");

        test_update_keeps_date(&$storage).await;
        println!("  test_update_keeps_date: PASSED");

        test_delete(&$storage).await;
        println!("  test_delete: PASSED");
    }};
}
