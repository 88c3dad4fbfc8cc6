use crate::application::locks::LockMap;
use crate::domain::cart::{CartItem, CartLine, CartSnapshot};
use crate::domain::ports::{CartStoreRef, ProductCatalogRef};
use crate::domain::pricing;
use crate::domain::user::User;
use crate::error::{Result, ShopError};
use std::sync::Arc;

/// Server-owned cart state, keyed by user id. Clients hold no authoritative
/// cart data; everything goes through here.
#[derive(Clone)]
pub struct CartService {
    carts: CartStoreRef,
    catalog: ProductCatalogRef,
    /// Shared with checkout; an edit never lands between a checkout's
    /// snapshot and its cart clear.
    user_locks: Arc<LockMap<u32>>,
}

impl CartService {
    pub fn new(
        carts: CartStoreRef,
        catalog: ProductCatalogRef,
        user_locks: Arc<LockMap<u32>>,
    ) -> Self {
        Self {
            carts,
            catalog,
            user_locks,
        }
    }

    /// Adds a product, merging into an existing line for the same product.
    pub async fn add(&self, user: &User, product_id: u32, quantity: u32) -> Result<CartItem> {
        if quantity < 1 {
            return Err(ShopError::InvalidQuantity(i64::from(quantity)));
        }
        let _guard = self.user_locks.acquire(user.id).await;

        let product = self
            .catalog
            .get(product_id)
            .await?
            .filter(|p| p.is_active)
            .ok_or(ShopError::NotFound)?;

        let item = match self.carts.find_by_product(user.id, product.id).await? {
            Some(mut existing) => {
                existing.quantity += quantity;
                existing
            }
            None => CartItem {
                id: 0, // assigned by the store
                user_id: user.id,
                product_id: product.id,
                quantity,
            },
        };

        self.carts.upsert(item).await
    }

    pub async fn set_quantity(&self, user: &User, item_id: u64, quantity: u32) -> Result<CartItem> {
        if quantity < 1 {
            return Err(ShopError::InvalidQuantity(i64::from(quantity)));
        }
        let _guard = self.user_locks.acquire(user.id).await;

        let mut item = self
            .carts
            .get(user.id, item_id)
            .await?
            .ok_or(ShopError::NotFound)?;
        item.quantity = quantity;
        self.carts.upsert(item).await
    }

    pub async fn remove(&self, user: &User, item_id: u64) -> Result<()> {
        let _guard = self.user_locks.acquire(user.id).await;
        self.carts.remove(user.id, item_id).await
    }

    pub async fn clear(&self, user: &User) -> Result<()> {
        let _guard = self.user_locks.acquire(user.id).await;
        self.carts.clear(user.id).await
    }

    /// Ordered lines with current catalog prices joined in, plus the pricing
    /// quote. Lines whose product has vanished or been deactivated are
    /// dropped from the view. Reading never reserves stock.
    pub async fn snapshot(&self, user: &User) -> Result<CartSnapshot> {
        let mut lines = Vec::new();
        for item in self.carts.items(user.id).await? {
            let Some(product) = self.catalog.get(item.product_id).await?.filter(|p| p.is_active)
            else {
                continue;
            };
            lines.push(CartLine {
                unit_price: product.effective_price(),
                product_name: product.name,
                stock: product.stock,
                item,
            });
        }

        let quote = pricing::quote(lines.iter().map(|l| (l.unit_price, l.item.quantity)));
        Ok(CartSnapshot { lines, quote })
    }
}
