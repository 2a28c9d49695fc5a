//! CustomerStore contract tests.

use invoice_dashboard::models::{CustomerStatus, CustomerUpdate, InvoiceStatus};
use invoice_dashboard::storage::{Storage, StorageError};

use super::{create_customer, create_invoice, new_customer};

pub async fn test_create_and_get(storage: &Storage) {
    let created = create_customer(storage, "Evil Rabbit", "evil@rabbit.com").await;
    assert!(!created.id.is_empty());

    let loaded = storage
        .customers
        .get(&created.id)
        .await
        .expect("get")
        .expect("customer exists");
    assert_eq!(loaded, created);

    let missing = storage.customers.get("no-such-id").await.expect("get");
    assert!(missing.is_none());
}

pub async fn test_list_fields_sorted_by_name(storage: &Storage) {
    create_customer(storage, "Michael Novotny", "michael@novotny.com").await;
    create_customer(storage, "Amy Burns", "amy@burns.com").await;
    create_customer(storage, "Lee Robinson", "lee@robinson.com").await;

    let names: Vec<String> = storage
        .customers
        .list_fields()
        .await
        .expect("list fields")
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, ["Amy Burns", "Lee Robinson", "Michael Novotny"]);

    let all = storage.customers.list_all().await.expect("list all");
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].name, "Amy Burns");
}

pub async fn test_filtered_table_aggregates(storage: &Storage) {
    let delba = create_customer(storage, "Delba de Oliveira", "delba@oliveira.com").await;
    let lee = create_customer(storage, "Lee Robinson", "lee@robinson.com").await;
    create_invoice(storage, &delba.id, 1000, InvoiceStatus::Paid, "2024-01-01").await;
    create_invoice(storage, &delba.id, 250, InvoiceStatus::Pending, "2024-01-02").await;
    create_invoice(storage, &delba.id, 300, InvoiceStatus::Paid, "2024-01-03").await;

    let rows = storage.customers.filtered_table("").await.expect("table");
    assert_eq!(rows.len(), 2);

    let delba_row = rows.iter().find(|r| r.id == delba.id).expect("delba row");
    assert_eq!(delba_row.total_invoices, 3);
    assert_eq!(delba_row.total_paid, 1300);
    assert_eq!(delba_row.total_pending, 250);

    // Customers without invoices still appear with zero totals.
    let lee_row = rows.iter().find(|r| r.id == lee.id).expect("lee row");
    assert_eq!(lee_row.total_invoices, 0);
    assert_eq!(lee_row.total_paid, 0);
    assert_eq!(lee_row.total_pending, 0);
}

pub async fn test_filtered_table_search_is_case_insensitive(storage: &Storage) {
    create_customer(storage, "Delba de Oliveira", "delba@oliveira.com").await;
    create_customer(storage, "Lee Robinson", "lee@robinson.com").await;

    let by_name = storage.customers.filtered_table("DELBA").await.expect("table");
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].name, "Delba de Oliveira");

    let by_email = storage.customers.filtered_table("Robinson.COM").await.expect("table");
    assert_eq!(by_email.len(), 1);
    assert_eq!(by_email[0].email, "lee@robinson.com");

    let none = storage.customers.filtered_table("zzz").await.expect("table");
    assert!(none.is_empty());
}

pub async fn test_filtered_table_search_matches_company(storage: &Storage) {
    let mut vercel = new_customer("Lee Robinson", "lee@robinson.com");
    vercel.company = "Vercel Inc".to_string();
    storage.customers.create(vercel).await.expect("create customer");
    create_customer(storage, "Amy Burns", "amy@burns.com").await;

    let rows = storage.customers.filtered_table("vERCEL").await.expect("table");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Lee Robinson");
}

pub async fn test_filtered_table_search_folds_non_ascii(storage: &Storage) {
    create_customer(storage, "Élodie Durand", "elodie@durand.fr").await;
    create_customer(storage, "Amy Burns", "amy@burns.com").await;

    for query in ["élodie", "ÉLODIE", "Élodie"] {
        let rows = storage.customers.filtered_table(query).await.expect("table");
        assert_eq!(rows.len(), 1, "query {:?}", query);
        assert_eq!(rows[0].name, "Élodie Durand");
    }
}

pub async fn test_filtered_table_search_treats_wildcards_literally(storage: &Storage) {
    create_customer(storage, "Amy Burns", "amy@burns.com").await;
    create_customer(storage, "Lee_Robinson", "lee@robinson.com").await;

    let percent = storage.customers.filtered_table("%").await.expect("table");
    assert!(percent.is_empty());

    let underscore = storage.customers.filtered_table("_").await.expect("table");
    assert_eq!(underscore.len(), 1);
    assert_eq!(underscore[0].name, "Lee_Robinson");

    let dot = storage.customers.filtered_table("a.y").await.expect("table");
    assert!(dot.is_empty());
}

pub async fn test_update_keeps_image_unless_replaced(storage: &Storage) {
    let created = create_customer(storage, "Amy Burns", "amy@burns.com").await;

    let update = CustomerUpdate {
        name: "Amy B. Burns".to_string(),
        email: "amy.b@burns.com".to_string(),
        status: CustomerStatus::Inactive,
        phone: "555-0199".to_string(),
        company: "Burns LLC".to_string(),
        location: "Austin".to_string(),
        image_url: None,
    };
    let updated = storage
        .customers
        .update(&created.id, update.clone())
        .await
        .expect("update");
    assert_eq!(updated.name, "Amy B. Burns");
    assert_eq!(updated.status, CustomerStatus::Inactive);
    assert_eq!(updated.image_url, created.image_url);

    let replaced = storage
        .customers
        .update(
            &created.id,
            CustomerUpdate {
                image_url: Some("/uploads/customers/new.png".to_string()),
                ..update
            },
        )
        .await
        .expect("update");
    assert_eq!(replaced.image_url, "/uploads/customers/new.png");
}

pub async fn test_update_missing_customer(storage: &Storage) {
    let update = CustomerUpdate {
        name: "Nobody".to_string(),
        email: "nobody@example.com".to_string(),
        status: CustomerStatus::Active,
        phone: String::new(),
        company: String::new(),
        location: String::new(),
        image_url: None,
    };
    let err = storage
        .customers
        .update("no-such-id", update)
        .await
        .expect_err("missing customer");
    assert!(err.is_not_found(), "unexpected error: {err}");
}

pub async fn test_delete_removes_invoices(storage: &Storage) {
    let keep = create_customer(storage, "Lee Robinson", "lee@robinson.com").await;
    let doomed = create_customer(storage, "Steph Dietz", "steph@dietz.com").await;
    create_invoice(storage, &doomed.id, 100, InvoiceStatus::Paid, "2024-02-01").await;
    create_invoice(storage, &doomed.id, 200, InvoiceStatus::Pending, "2024-02-02").await;
    create_invoice(storage, &keep.id, 300, InvoiceStatus::Paid, "2024-02-03").await;

    let removed = storage
        .customers
        .delete_with_invoices(&doomed.id)
        .await
        .expect("delete");
    assert_eq!(removed, 2);

    assert!(storage.customers.get(&doomed.id).await.expect("get").is_none());
    let remaining = storage.invoices.filtered("", 1).await.expect("filtered");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].customer_id, keep.id);
}

pub async fn test_delete_missing_customer(storage: &Storage) {
    let err = storage
        .customers
        .delete_with_invoices("no-such-id")
        .await
        .expect_err("missing customer");
    assert!(matches!(err, StorageError::NotFound { entity: "customer", .. }));
}

#[macro_export]
macro_rules! run_customer_store_tests {
    ($storage:expr) => {{
        use $crate::storage::customer_store_tests::*;

        test_create_and_get(&$storage).await;
        println!("  test_create_and_get: PASSED");

        test_list_fields_sorted_by_name(&$storage).await;
        println!("  test_list_fields_sorted_by_name: PASSED");

        test_filtered_table_aggregates(&$storage).await;
        println!("  test_filtered_table_aggregates: PASSED");

        test_filtered_table_search_is_case_insensitive(&$storage).await;
        println!("  test_filtered_table_search_is_case_insensitive: PASSED");

        test_filtered_table_search_matches_company(&$storage).await;
        println!("  test_filtered_table_search_matches_company: PASSED");

        test_filtered_table_search_folds_non_ascii(&$storage).await;
        println!("  test_filtered_table_search_folds_non_ascii: PASSED");

        test_filtered_table_search_treats_wildcards_literally(&$storage).await;
        println!("  test_filtered_table_search_treats_wildcards_literally: PASSED");

        test_update_keeps_image_unless_replaced(&$storage).await;
        println!("  test_update_keeps_image_unless_replaced: PASSED");

        test_update_missing_customer(&$storage).await;
        println!("  test_update_missing_customer: PASSED");

        test_delete_removes_invoices(&$storage).await;
        println!("  test_delete_removes_invoices: PASSED");

        test_delete_missing_customer(&$storage).await;
        println!("  test_delete_missing_customer: PASSED");
    }};
}
