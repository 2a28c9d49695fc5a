//! ProductStore contract tests.

use invoice_dashboard::models::{ProductInput, ProductStatus};
use invoice_dashboard::storage::Storage;

fn product(name: &str, category: &str, price: i64) -> ProductInput {
    ProductInput {
        name: name.to_string(),
        description: Some(format!("{} description", name)),
        price,
        category: category.to_string(),
        image_url: None,
        status: ProductStatus::Active,
    }
}

pub async fn test_create_and_list_by_category(storage: &Storage) {
    let laptop = storage
        .products
        .create(product("Laptop", "Electronics", 129999))
        .await
        .expect("create product");
    storage
        .products
        .create(product("Desk", "Furniture", 34900))
        .await
        .expect("create product");

    assert_eq!(storage.products.list(None).await.expect("list").len(), 2);

    let electronics = storage
        .products
        .list(Some("Electronics"))
        .await
        .expect("list");
    assert_eq!(electronics.len(), 1);
    assert_eq!(electronics[0].id, laptop.id);
    assert_eq!(electronics[0].price, 129999);
    assert!(!electronics[0].created_at.is_empty());
}

pub async fn test_update_and_delete(storage: &Storage) {
    let created = storage
        .products
        .create(product("Chair", "Furniture", 8900))
        .await
        .expect("create product");

    let updated = storage
        .products
        .update(
            &created.id,
            ProductInput {
                price: 9900,
                status: ProductStatus::Inactive,
                ..product("Office Chair", "Furniture", 0)
            },
        )
        .await
        .expect("update product");
    assert_eq!(updated.name, "Office Chair");
    assert_eq!(updated.price, 9900);
    assert_eq!(updated.status, ProductStatus::Inactive);
    assert_eq!(updated.created_at, created.created_at);

    storage.products.delete(&created.id).await.expect("delete");
    assert!(storage.products.get(&created.id).await.expect("get").is_none());

    let err = storage
        .products
        .delete(&created.id)
        .await
        .expect_err("second delete");
    assert!(err.is_not_found());

    let err = storage
        .products
        .update("no-such-product", product("Ghost", "None", 1))
        .await
        .expect_err("missing product");
    assert!(err.is_not_found());
}

#[macro_export]
macro_rules! run_product_store_tests {
    ($storage:expr) => {{
        use $crate::storage::product_store_tests::*;

        test_create_and_list_by_category(&$storage).await;
        println!("  test_create_and_list_by_category: PASSED");

        test_update_and_delete(&$storage).await;
        println!("  test_update_and_delete: PASSED");
    }};
}
