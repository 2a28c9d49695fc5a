//! Fixture rows.

use crate::models::{
    Customer, CustomerStatus, Invoice, InvoiceStatus, ProductInput, ProductStatus, Revenue,
};

const EVIL_RABBIT: &str = "d6e15727-9fe1-4961-8c5b-ea44a9bd81aa";
const DELBA: &str = "3958dc9e-712f-4377-85e9-fec4b6a6442a";
const LEE: &str = "3958dc9e-742f-4377-85e9-fec4b6a6442a";
const MICHAEL: &str = "76d65c26-f784-44a2-ac19-586678f7c2f2";
const AMY: &str = "cc27c14a-0acf-4f4a-a6c9-d45682c144b9";
const BALAZS: &str = "13d07535-c59e-4157-a011-f8d2ef4e0cbb";

pub fn customers() -> Vec<Customer> {
    let customer = |id: &str,
                    name: &str,
                    email: &str,
                    image: &str,
                    status: CustomerStatus,
                    phone: &str,
                    company: &str,
                    location: &str| Customer {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        image_url: format!("/customers/{}", image),
        status,
        phone: phone.to_string(),
        company: company.to_string(),
        location: location.to_string(),
    };

    vec![
        customer(
            EVIL_RABBIT,
            "Evil Rabbit",
            "evil@rabbit.com",
            "evil-rabbit.png",
            CustomerStatus::Active,
            "+1 555 010 0001",
            "Rabbit Holdings",
            "San Francisco, CA",
        ),
        customer(
            DELBA,
            "Delba de Oliveira",
            "delba@oliveira.com",
            "delba-de-oliveira.png",
            CustomerStatus::Active,
            "+351 555 010 002",
            "Oliveira Design",
            "Lisbon, Portugal",
        ),
        customer(
            LEE,
            "Lee Robinson",
            "lee@robinson.com",
            "lee-robinson.png",
            CustomerStatus::Active,
            "+1 555 010 0003",
            "Robinson Labs",
            "Des Moines, IA",
        ),
        customer(
            MICHAEL,
            "Michael Novotny",
            "michael@novotny.com",
            "michael-novotny.png",
            CustomerStatus::Inactive,
            "+1 555 010 0004",
            "Novotny Media",
            "Chicago, IL",
        ),
        customer(
            AMY,
            "Amy Burns",
            "amy@burns.com",
            "amy-burns.png",
            CustomerStatus::Active,
            "+1 555 010 0005",
            "Burns & Co",
            "Austin, TX",
        ),
        customer(
            BALAZS,
            "Balazs Orban",
            "balazs@orban.com",
            "balazs-orban.png",
            CustomerStatus::Inactive,
            "+36 555 010 006",
            "Orban Studio",
            "Budapest, Hungary",
        ),
    ]
}

pub fn invoices() -> Vec<Invoice> {
    let rows: [(&str, &str, i64, InvoiceStatus, &str); 13] = [
        ("b4f4c2d4-0b8e-4f0e-9c6a-000000000001", EVIL_RABBIT, 15795, InvoiceStatus::Pending, "2022-12-06"),
        ("b4f4c2d4-0b8e-4f0e-9c6a-000000000002", DELBA, 20348, InvoiceStatus::Pending, "2022-11-14"),
        ("b4f4c2d4-0b8e-4f0e-9c6a-000000000003", AMY, 3040, InvoiceStatus::Paid, "2022-10-29"),
        ("b4f4c2d4-0b8e-4f0e-9c6a-000000000004", MICHAEL, 44800, InvoiceStatus::Paid, "2023-09-10"),
        ("b4f4c2d4-0b8e-4f0e-9c6a-000000000005", BALAZS, 34577, InvoiceStatus::Pending, "2023-08-05"),
        ("b4f4c2d4-0b8e-4f0e-9c6a-000000000006", LEE, 54246, InvoiceStatus::Pending, "2023-07-16"),
        ("b4f4c2d4-0b8e-4f0e-9c6a-000000000007", EVIL_RABBIT, 666, InvoiceStatus::Pending, "2023-06-27"),
        ("b4f4c2d4-0b8e-4f0e-9c6a-000000000008", MICHAEL, 32545, InvoiceStatus::Paid, "2023-06-09"),
        ("b4f4c2d4-0b8e-4f0e-9c6a-000000000009", AMY, 1250, InvoiceStatus::Paid, "2023-06-17"),
        ("b4f4c2d4-0b8e-4f0e-9c6a-000000000010", BALAZS, 8546, InvoiceStatus::Paid, "2023-06-07"),
        ("b4f4c2d4-0b8e-4f0e-9c6a-000000000011", DELBA, 500, InvoiceStatus::Paid, "2023-08-19"),
        ("b4f4c2d4-0b8e-4f0e-9c6a-000000000012", BALAZS, 8945, InvoiceStatus::Paid, "2023-06-03"),
        ("b4f4c2d4-0b8e-4f0e-9c6a-000000000013", LEE, 1000, InvoiceStatus::Paid, "2022-06-05"),
    ];

    rows.into_iter()
        .map(|(id, customer_id, amount, status, date)| Invoice {
            id: id.to_string(),
            customer_id: customer_id.to_string(),
            amount,
            status,
            date: date.to_string(),
        })
        .collect()
}

pub fn revenue() -> Vec<Revenue> {
    [
        ("Jan", 2000),
        ("Feb", 1800),
        ("Mar", 2200),
        ("Apr", 2500),
        ("May", 2300),
        ("Jun", 3200),
        ("Jul", 3500),
        ("Aug", 3700),
        ("Sep", 2500),
        ("Oct", 2800),
        ("Nov", 3000),
        ("Dec", 4800),
    ]
    .into_iter()
    .map(|(month, revenue)| Revenue {
        month: month.to_string(),
        revenue,
    })
    .collect()
}

pub fn products() -> Vec<ProductInput> {
    let product = |name: &str, description: &str, price: i64, category: &str| ProductInput {
        name: name.to_string(),
        description: Some(description.to_string()),
        price,
        category: category.to_string(),
        image_url: None,
        status: ProductStatus::Active,
    };

    vec![
        product("Starter Plan", "Invoicing for up to 10 customers", 900, "subscriptions"),
        product("Team Plan", "Unlimited customers and five seats", 4900, "subscriptions"),
        product("Onboarding Session", "One hour guided setup", 15000, "services"),
        product("Data Import", "Migration from spreadsheets", 25000, "services"),
    ]
}
