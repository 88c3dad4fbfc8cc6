use crate::domain::order::{Order, OrderItem};
use crate::domain::ports::OrderStore;
use crate::error::{Result, ShopError};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, Options, WriteBatch, DB};
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Column Family for order records.
pub const CF_ORDERS: &str = "orders";
/// Column Family for frozen line items, keyed by order id.
pub const CF_ORDER_ITEMS: &str = "order_items";

/// Durable order ledger backed by RocksDB. Values are JSON; an order and
/// its items go in through one `WriteBatch`, so a partial order is never
/// visible after a crash.
///
/// `Clone` shares the underlying `Arc<DB>`.
#[derive(Clone)]
pub struct RocksDbLedger {
    db: Arc<DB>,
    next_order_id: Arc<AtomicU32>,
}

impl RocksDbLedger {
    /// Opens or creates the database at `path`, ensuring both column
    /// families exist, and resumes the order id sequence from what is
    /// already stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_orders = ColumnFamilyDescriptor::new(CF_ORDERS, Options::default());
        let cf_items = ColumnFamilyDescriptor::new(CF_ORDER_ITEMS, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_orders, cf_items])
            .map_err(|e| ShopError::Internal(Box::new(e)))?;

        let ledger = Self {
            db: Arc::new(db),
            next_order_id: Arc::new(AtomicU32::new(1)),
        };
        let max_id = ledger
            .scan_orders()?
            .iter()
            .map(|o| o.id)
            .max()
            .unwrap_or(0);
        ledger.next_order_id.store(max_id + 1, Ordering::Relaxed);
        Ok(ledger)
    }

    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            ShopError::Internal(format!("column family {name} not found").into())
        })
    }

    fn scan_orders(&self) -> Result<Vec<Order>> {
        let cf = self.cf(CF_ORDERS)?;
        let mut orders = Vec::new();
        for entry in self.db.iterator_cf(cf, rocksdb::IteratorMode::Start) {
            let (_key, value) = entry.map_err(|e| ShopError::Internal(Box::new(e)))?;
            let order: Order =
                serde_json::from_slice(&value).map_err(|e| ShopError::Internal(Box::new(e)))?;
            orders.push(order);
        }
        Ok(orders)
    }
}

#[async_trait]
impl OrderStore for RocksDbLedger {
    async fn insert(&self, order: Order, mut items: Vec<OrderItem>) -> Result<()> {
        for (i, item) in items.iter_mut().enumerate() {
            if item.id == 0 {
                item.id = (u64::from(order.id) << 8) | i as u64;
            }
            item.order_id = order.id;
        }

        let key = order.id.to_be_bytes();
        let order_bytes =
            serde_json::to_vec(&order).map_err(|e| ShopError::Internal(Box::new(e)))?;
        let item_bytes =
            serde_json::to_vec(&items).map_err(|e| ShopError::Internal(Box::new(e)))?;

        let mut batch = WriteBatch::default();
        batch.put_cf(self.cf(CF_ORDERS)?, key, order_bytes);
        batch.put_cf(self.cf(CF_ORDER_ITEMS)?, key, item_bytes);
        self.db
            .write(batch)
            .map_err(|e| ShopError::Internal(Box::new(e)))?;
        Ok(())
    }

    async fn get(&self, order_id: u32) -> Result<Option<Order>> {
        let cf = self.cf(CF_ORDERS)?;
        let result = self
            .db
            .get_cf(cf, order_id.to_be_bytes())
            .map_err(|e| ShopError::Internal(Box::new(e)))?;
        match result {
            Some(bytes) => {
                let order =
                    serde_json::from_slice(&bytes).map_err(|e| ShopError::Internal(Box::new(e)))?;
                Ok(Some(order))
            }
            None => Ok(None),
        }
    }

    async fn items(&self, order_id: u32) -> Result<Vec<OrderItem>> {
        let cf = self.cf(CF_ORDER_ITEMS)?;
        let result = self
            .db
            .get_cf(cf, order_id.to_be_bytes())
            .map_err(|e| ShopError::Internal(Box::new(e)))?;
        match result {
            Some(bytes) => {
                serde_json::from_slice(&bytes).map_err(|e| ShopError::Internal(Box::new(e)))
            }
            None => Ok(Vec::new()),
        }
    }

    async fn update(&self, order: Order) -> Result<()> {
        if self.get(order.id).await?.is_none() {
            return Err(ShopError::NotFound);
        }
        let bytes = serde_json::to_vec(&order).map_err(|e| ShopError::Internal(Box::new(e)))?;
        self.db
            .put_cf(self.cf(CF_ORDERS)?, order.id.to_be_bytes(), bytes)
            .map_err(|e| ShopError::Internal(Box::new(e)))?;
        Ok(())
    }

    async fn for_user(&self, user_id: u32) -> Result<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .scan_orders()?
            .into_iter()
            .filter(|o| o.user_id == user_id)
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }

    async fn all(&self) -> Result<Vec<Order>> {
        let mut orders = self.scan_orders()?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }

    async fn next_id(&self) -> Result<u32> {
        Ok(self.next_order_id.fetch_add(1, Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{OrderStatus, PaymentMethod, Recipient};
    use chrono::Utc;
    use tempfile::tempdir;

    fn sample_order(id: u32) -> Order {
        let now = Utc::now();
        Order {
            id,
            user_id: 1,
            order_number: format!("SO250101ABCD{id:02}"),
            status: OrderStatus::Pending,
            total_amount: 15_000,
            shipping_fee: 3_000,
            recipient: Recipient {
                name: "Kim".to_string(),
                phone: "010-0000-0000".to_string(),
                zipcode: "04524".to_string(),
                address: "Seoul".to_string(),
                address_detail: None,
            },
            memo: None,
            payment_method: PaymentMethod::Widget,
            payment_key: None,
            payment_test_mode: false,
            paid_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_open_creates_column_families() {
        let dir = tempdir().unwrap();
        let ledger = RocksDbLedger::open(dir.path()).expect("failed to open ledger");

        assert!(ledger.db.cf_handle(CF_ORDERS).is_some());
        assert!(ledger.db.cf_handle(CF_ORDER_ITEMS).is_some());
    }

    #[tokio::test]
    async fn test_order_round_trip_with_items() {
        let dir = tempdir().unwrap();
        let ledger = RocksDbLedger::open(dir.path()).unwrap();

        let order = sample_order(1);
        let items = vec![OrderItem {
            id: 0,
            order_id: 0,
            product_id: 9,
            product_name: "Monstera".to_string(),
            unit_price: 12_000,
            quantity: 1,
        }];
        ledger.insert(order.clone(), items).await.unwrap();

        let read = ledger.get(1).await.unwrap().unwrap();
        assert_eq!(read, order);

        let items = ledger.items(1).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].order_id, 1);
        assert_ne!(items[0].id, 0);

        assert!(ledger.get(2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_id_sequence_resumes_after_reopen() {
        let dir = tempdir().unwrap();
        {
            let ledger = RocksDbLedger::open(dir.path()).unwrap();
            let id = ledger.next_id().await.unwrap();
            ledger.insert(sample_order(id), Vec::new()).await.unwrap();
        }

        let reopened = RocksDbLedger::open(dir.path()).unwrap();
        assert_eq!(reopened.next_id().await.unwrap(), 2);
        assert_eq!(reopened.all().await.unwrap().len(), 1);
    }
}
