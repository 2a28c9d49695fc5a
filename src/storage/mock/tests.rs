use super::*;
use crate::models::{CustomerStatus, Role};

fn new_customer(name: &str, email: &str, company: &str) -> NewCustomer {
    NewCustomer {
        name: name.to_string(),
        email: email.to_string(),
        image_url: "/customers/default.png".to_string(),
        status: CustomerStatus::Active,
        phone: "5551234567".to_string(),
        company: company.to_string(),
        location: "Remote".to_string(),
    }
}

fn new_invoice(customer_id: &str, amount: i64, status: InvoiceStatus, date: &str) -> NewInvoice {
    NewInvoice {
        customer_id: customer_id.to_string(),
        amount,
        status,
        date: date.to_string(),
    }
}

#[tokio::test]
async fn test_invoice_create_requires_existing_customer() {
    let store = MockStore::new();

    let err = InvoiceStore::create(
        &store,
        new_invoice("missing", 100, InvoiceStatus::Paid, "2024-01-01"),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, StorageError::CustomerNotFound(id) if id == "missing"));
    assert_eq!(store.invoice_count().await, 0);
}

#[tokio::test]
async fn test_customer_delete_cascades_to_invoices() {
    let store = MockStore::new();
    let keep = CustomerStore::create(&store, new_customer("Keep", "keep@x.com", "Acme"))
        .await
        .unwrap();
    let gone = CustomerStore::create(&store, new_customer("Gone", "gone@x.com", "Acme"))
        .await
        .unwrap();
    for customer in [&keep, &gone, &gone] {
        InvoiceStore::create(
            &store,
            new_invoice(&customer.id, 500, InvoiceStatus::Pending, "2024-02-01"),
        )
        .await
        .unwrap();
    }

    let removed = store.delete_with_invoices(&gone.id).await.unwrap();

    assert_eq!(removed, 2);
    assert!(store.invoices_for(&gone.id).await.is_empty());
    assert_eq!(store.invoices_for(&keep.id).await.len(), 1);
    assert_eq!(store.customer_count().await, 1);
}

#[tokio::test]
async fn test_customer_delete_missing_is_not_found() {
    let store = MockStore::new();
    let err = store.delete_with_invoices("nope").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_filtered_table_is_case_insensitive() {
    let store = MockStore::new();
    CustomerStore::create(&store, new_customer("Delba de Oliveira", "delba@x.com", "Vercel"))
        .await
        .unwrap();
    CustomerStore::create(&store, new_customer("Lee Robinson", "lee@x.com", "Acme"))
        .await
        .unwrap();

    let by_name = store.filtered_table("DELBA").await.unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].name, "Delba de Oliveira");

    let by_company = store.filtered_table("acme").await.unwrap();
    assert_eq!(by_company.len(), 1);
    assert_eq!(by_company[0].name, "Lee Robinson");

    assert_eq!(store.filtered_table("").await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_card_totals_match_invoice_rows() {
    let store = MockStore::new();
    let c = CustomerStore::create(&store, new_customer("A", "a@x.com", "Acme"))
        .await
        .unwrap();
    InvoiceStore::create(&store, new_invoice(&c.id, 1000, InvoiceStatus::Paid, "2024-01-01"))
        .await
        .unwrap();
    InvoiceStore::create(&store, new_invoice(&c.id, 250, InvoiceStatus::Pending, "2024-01-02"))
        .await
        .unwrap();
    InvoiceStore::create(&store, new_invoice(&c.id, 50, InvoiceStatus::Paid, "2024-01-03"))
        .await
        .unwrap();

    let totals = store.card_totals().await.unwrap();

    assert_eq!(totals.invoice_count, 3);
    assert_eq!(totals.customer_count, 1);
    assert_eq!(totals.paid_cents, 1050);
    assert_eq!(totals.pending_cents, 250);
}

#[tokio::test]
async fn test_invoice_paging_and_cursor() {
    let store = MockStore::new();
    let c = CustomerStore::create(&store, new_customer("A", "a@x.com", "Acme"))
        .await
        .unwrap();
    for day in 1..=13 {
        InvoiceStore::create(
            &store,
            new_invoice(&c.id, day * 100, InvoiceStatus::Paid, &format!("2024-03-{:02}", day)),
        )
        .await
        .unwrap();
    }

    assert_eq!(store.total_pages("").await.unwrap(), 3);

    let first = store.filtered("", 1).await.unwrap();
    assert_eq!(first.len(), 6);
    assert_eq!(first[0].date, "2024-03-13");

    let last = store.filtered("", 3).await.unwrap();
    assert_eq!(last.len(), 1);
    assert_eq!(last[0].date, "2024-03-01");

    let slice = store.page_after("", 10, 10).await.unwrap();
    assert_eq!(slice.data.len(), 3);
    assert_eq!(slice.next_cursor, None);

    let slice = store.page_after("", 0, 10).await.unwrap();
    assert_eq!(slice.next_cursor, Some(10));
}

#[tokio::test]
async fn test_duplicate_email_is_conflict() {
    let store = MockStore::new();
    let user = NewUser {
        name: "User".into(),
        email: "user@nextmail.com".into(),
        password_hash: "hash".into(),
        role: Role::User,
    };
    UserStore::create(&store, user.clone()).await.unwrap();

    let err = UserStore::create(&store, user).await.unwrap_err();
    assert!(matches!(err, StorageError::Conflict(_)));
}

#[tokio::test]
async fn test_injected_write_failure() {
    let store = MockStore::new();
    store.set_fail_on_write(true).await;

    let err = CustomerStore::create(&store, new_customer("A", "a@x.com", "Acme"))
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::Unavailable(_)));
    assert_eq!(store.customer_count().await, 0);
}

#[tokio::test]
async fn test_overflowing_totals_are_errors() {
    let store = MockStore::new();
    let customer = CustomerStore::create(&store, new_customer("A", "a@x.com", "Acme"))
        .await
        .unwrap();
    for _ in 0..2 {
        InvoiceStore::create(
            &store,
            new_invoice(&customer.id, i64::MAX, InvoiceStatus::Paid, "2024-01-01"),
        )
        .await
        .unwrap();
    }

    let err = DashboardStore::card_totals(&store).await.unwrap_err();
    assert!(matches!(err, StorageError::InvalidRow(_)));
    let err = CustomerStore::filtered_table(&store, "").await.unwrap_err();
    assert!(matches!(err, StorageError::InvalidRow(_)));
}
