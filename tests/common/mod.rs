#![allow(dead_code)]

use std::sync::Arc;
use verdure::application::Shop;
use verdure::domain::order::{Order, PaymentMethod, Recipient};
use verdure::domain::ports::{NewOrder, OrderStoreRef, PaymentGatewayRef};
use verdure::domain::product::Product;
use verdure::domain::user::{Role, User};
use verdure::infrastructure::gateways::sandbox::SandboxGateway;
use verdure::infrastructure::in_memory::{
    InMemoryCartStore, InMemoryCatalog, InMemoryInquiryStore, InMemoryOrderStore,
    InMemoryUserDirectory,
};

pub const MONSTERA: u32 = 1;
pub const FICUS: u32 = 2;
pub const HOYA: u32 = 3;

pub struct Harness {
    pub shop: Shop,
    pub catalog: Arc<InMemoryCatalog>,
    pub users: Arc<InMemoryUserDirectory>,
    pub customer: User,
    pub other_customer: User,
    pub admin: User,
}

/// Shop with approving sandbox gateways for both methods.
pub async fn harness() -> Harness {
    harness_with_gateways(vec![
        Arc::new(SandboxGateway::approving(PaymentMethod::Redirect)),
        Arc::new(SandboxGateway::approving(PaymentMethod::Widget)),
    ])
    .await
}

pub async fn harness_with_gateways(gateways: Vec<PaymentGatewayRef>) -> Harness {
    harness_with_order_store(gateways, Arc::new(InMemoryOrderStore::new())).await
}

pub async fn harness_with_order_store(
    gateways: Vec<PaymentGatewayRef>,
    order_store: OrderStoreRef,
) -> Harness {
    let catalog = Arc::new(InMemoryCatalog::new());
    catalog
        .insert(Product::new(MONSTERA, "Monstera", 12_000, 10).with_category("plants"))
        .await;
    catalog
        .insert(
            Product::new(FICUS, "Ficus", 35_000, 5)
                .with_sale_price(29_000)
                .with_category("plants"),
        )
        .await;
    catalog
        .insert(Product::new(HOYA, "Hoya", 25_000, 2).with_category("hanging"))
        .await;

    let users = Arc::new(InMemoryUserDirectory::new());
    let customer = User::new(1, "kim@shop.test", "Kim", Role::Customer);
    let other_customer = User::new(2, "lee@shop.test", "Lee", Role::Customer);
    let admin = User::new(9, "admin@shop.test", "Admin", Role::Admin);
    users.insert(customer.clone()).await;
    users.insert(other_customer.clone()).await;
    users.insert(admin.clone()).await;

    let shop = Shop::new(
        Arc::new(InMemoryCartStore::new()),
        order_store,
        catalog.clone(),
        users.clone(),
        Arc::new(InMemoryInquiryStore::new()),
        gateways,
    );

    Harness {
        shop,
        catalog,
        users,
        customer,
        other_customer,
        admin,
    }
}

pub fn recipient() -> Recipient {
    Recipient {
        name: "Kim".to_string(),
        phone: "010-1234-5678".to_string(),
        zipcode: "04524".to_string(),
        address: "12 Sejong-daero, Seoul".to_string(),
        address_detail: Some("Apt 301".to_string()),
    }
}

pub fn checkout_request(payment_method: PaymentMethod) -> NewOrder {
    NewOrder {
        recipient: recipient(),
        payment_method,
        memo: None,
    }
}

/// One Monstera in the cart, checked out: subtotal 12,000 + 3,000 shipping.
pub async fn place_monstera_order(h: &Harness, user: &User, method: PaymentMethod) -> Order {
    h.shop.carts.add(user, MONSTERA, 1).await.unwrap();
    h.shop
        .orders
        .create_order(user, checkout_request(method))
        .await
        .unwrap()
}
