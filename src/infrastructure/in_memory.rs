use crate::domain::cart::CartItem;
use crate::domain::order::{Order, OrderItem};
use crate::domain::ports::{
    CartStore, InquiryStore, OrderStore, ProductCatalog, RentalInquiry, UserDirectory,
};
use crate::domain::product::Product;
use crate::domain::user::{Role, User};
use crate::error::{Result, ShopError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Thread-safe in-memory cart store. Lines keep their insertion order per
/// user.
#[derive(Default, Clone)]
pub struct InMemoryCartStore {
    carts: Arc<RwLock<HashMap<u32, Vec<CartItem>>>>,
    next_id: Arc<AtomicU64>,
}

impl InMemoryCartStore {
    pub fn new() -> Self {
        Self {
            carts: Arc::default(),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn upsert(&self, mut item: CartItem) -> Result<CartItem> {
        let mut carts = self.carts.write().await;
        let lines = carts.entry(item.user_id).or_default();
        if item.id == 0 {
            item.id = self.next_id.fetch_add(1, Ordering::Relaxed);
            lines.push(item.clone());
        } else if let Some(existing) = lines.iter_mut().find(|l| l.id == item.id) {
            *existing = item.clone();
        } else {
            lines.push(item.clone());
        }
        Ok(item)
    }

    async fn get(&self, user_id: u32, item_id: u64) -> Result<Option<CartItem>> {
        let carts = self.carts.read().await;
        Ok(carts
            .get(&user_id)
            .and_then(|lines| lines.iter().find(|l| l.id == item_id).cloned()))
    }

    async fn find_by_product(&self, user_id: u32, product_id: u32) -> Result<Option<CartItem>> {
        let carts = self.carts.read().await;
        Ok(carts
            .get(&user_id)
            .and_then(|lines| lines.iter().find(|l| l.product_id == product_id).cloned()))
    }

    async fn items(&self, user_id: u32) -> Result<Vec<CartItem>> {
        let carts = self.carts.read().await;
        Ok(carts.get(&user_id).cloned().unwrap_or_default())
    }

    async fn remove(&self, user_id: u32, item_id: u64) -> Result<()> {
        let mut carts = self.carts.write().await;
        let lines = carts.get_mut(&user_id).ok_or(ShopError::NotFound)?;
        let before = lines.len();
        lines.retain(|l| l.id != item_id);
        if lines.len() == before {
            return Err(ShopError::NotFound);
        }
        Ok(())
    }

    async fn clear(&self, user_id: u32) -> Result<()> {
        let mut carts = self.carts.write().await;
        carts.remove(&user_id);
        Ok(())
    }
}

/// Thread-safe in-memory order ledger. Order and item writes for one order
/// happen under a single write lock, so no partial order is ever visible.
#[derive(Default, Clone)]
pub struct InMemoryOrderStore {
    inner: Arc<RwLock<OrderTables>>,
    next_order_id: Arc<AtomicU32>,
    next_item_id: Arc<AtomicU64>,
}

#[derive(Default)]
struct OrderTables {
    orders: HashMap<u32, Order>,
    items: HashMap<u32, Vec<OrderItem>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::default(),
            next_order_id: Arc::new(AtomicU32::new(1)),
            next_item_id: Arc::new(AtomicU64::new(1)),
        }
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: Order, mut items: Vec<OrderItem>) -> Result<()> {
        let mut tables = self.inner.write().await;
        for item in &mut items {
            item.id = self.next_item_id.fetch_add(1, Ordering::Relaxed);
            item.order_id = order.id;
        }
        tables.items.insert(order.id, items);
        tables.orders.insert(order.id, order);
        Ok(())
    }

    async fn get(&self, order_id: u32) -> Result<Option<Order>> {
        let tables = self.inner.read().await;
        Ok(tables.orders.get(&order_id).cloned())
    }

    async fn items(&self, order_id: u32) -> Result<Vec<OrderItem>> {
        let tables = self.inner.read().await;
        Ok(tables.items.get(&order_id).cloned().unwrap_or_default())
    }

    async fn update(&self, order: Order) -> Result<()> {
        let mut tables = self.inner.write().await;
        if !tables.orders.contains_key(&order.id) {
            return Err(ShopError::NotFound);
        }
        tables.orders.insert(order.id, order);
        Ok(())
    }

    async fn for_user(&self, user_id: u32) -> Result<Vec<Order>> {
        let tables = self.inner.read().await;
        let mut orders: Vec<Order> = tables
            .orders
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }

    async fn all(&self) -> Result<Vec<Order>> {
        let tables = self.inner.read().await;
        let mut orders: Vec<Order> = tables.orders.values().cloned().collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }

    async fn next_id(&self) -> Result<u32> {
        Ok(self.next_order_id.fetch_add(1, Ordering::Relaxed))
    }
}

/// In-memory stand-in for the catalog collaborator.
#[derive(Default, Clone)]
pub struct InMemoryCatalog {
    products: Arc<RwLock<HashMap<u32, Product>>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, product: Product) {
        let mut products = self.products.write().await;
        products.insert(product.id, product);
    }
}

#[async_trait]
impl ProductCatalog for InMemoryCatalog {
    async fn get(&self, product_id: u32) -> Result<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.get(&product_id).cloned())
    }

    async fn all(&self) -> Result<Vec<Product>> {
        let products = self.products.read().await;
        let mut all: Vec<Product> = products.values().cloned().collect();
        all.sort_by_key(|p| p.id);
        Ok(all)
    }

    async fn adjust_stock(&self, product_id: u32, delta: i64) -> Result<()> {
        let mut products = self.products.write().await;
        let product = products.get_mut(&product_id).ok_or(ShopError::NotFound)?;
        let new_stock = i64::from(product.stock) + delta;
        if new_stock < 0 {
            return Err(ShopError::OutOfStock {
                product_id,
                requested: delta.unsigned_abs() as u32,
                available: product.stock,
            });
        }
        product.stock = new_stock as u32;
        Ok(())
    }
}

/// In-memory stand-in for the identity collaborator.
#[derive(Default, Clone)]
pub struct InMemoryUserDirectory {
    users: Arc<RwLock<HashMap<u32, User>>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, user: User) {
        let mut users = self.users.write().await;
        users.insert(user.id, user);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn get(&self, user_id: u32) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&user_id).cloned())
    }

    async fn all(&self) -> Result<Vec<User>> {
        let users = self.users.read().await;
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by_key(|u| u.id);
        Ok(all)
    }

    async fn set_role(&self, user_id: u32, role: Role) -> Result<()> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&user_id).ok_or(ShopError::NotFound)?;
        user.role = role;
        Ok(())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryInquiryStore {
    inquiries: Arc<RwLock<HashMap<u32, RentalInquiry>>>,
    next_id: Arc<AtomicU32>,
}

impl InMemoryInquiryStore {
    pub fn new() -> Self {
        Self {
            inquiries: Arc::default(),
            next_id: Arc::new(AtomicU32::new(1)),
        }
    }
}

#[async_trait]
impl InquiryStore for InMemoryInquiryStore {
    async fn insert(&self, mut inquiry: RentalInquiry) -> Result<RentalInquiry> {
        let mut inquiries = self.inquiries.write().await;
        if inquiry.id == 0 {
            inquiry.id = self.next_id.fetch_add(1, Ordering::Relaxed);
        }
        inquiries.insert(inquiry.id, inquiry.clone());
        Ok(inquiry)
    }

    async fn get(&self, inquiry_id: u32) -> Result<Option<RentalInquiry>> {
        let inquiries = self.inquiries.read().await;
        Ok(inquiries.get(&inquiry_id).cloned())
    }

    async fn all(&self) -> Result<Vec<RentalInquiry>> {
        let inquiries = self.inquiries.read().await;
        let mut all: Vec<RentalInquiry> = inquiries.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(all)
    }

    async fn update(&self, inquiry: RentalInquiry) -> Result<()> {
        let mut inquiries = self.inquiries.write().await;
        if !inquiries.contains_key(&inquiry.id) {
            return Err(ShopError::NotFound);
        }
        inquiries.insert(inquiry.id, inquiry);
        Ok(())
    }
}
