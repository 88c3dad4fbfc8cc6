use crate::application::locks::LockMap;
use crate::domain::order::{Actor, Order, OrderItem, OrderStatus};
use crate::domain::ports::{
    InquiryStatus, InquiryStoreRef, OrderStoreRef, ProductCatalogRef, RentalInquiry,
    UserDirectoryRef,
};
use crate::domain::product::Product;
use crate::domain::user::{require_admin, Role, User};
use crate::error::{Result, ShopError};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

const DEFAULT_PAGE_LIMIT: u32 = 20;
const MAX_PAGE_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_PAGE_LIMIT),
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
}

#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

fn paginate<T>(items: Vec<T>, req: PageRequest) -> Page<T> {
    let total = items.len() as u64;
    let total_pages = total.div_ceil(u64::from(req.limit)) as u32;
    // The fields are public, so a request built without `new` may carry
    // page 0; treat it as the first page instead of underflowing.
    let offset = req.page.saturating_sub(1).saturating_mul(req.limit) as usize;
    let items = items
        .into_iter()
        .skip(offset)
        .take(req.limit as usize)
        .collect();
    Page {
        items,
        pagination: Pagination {
            page: req.page,
            limit: req.limit,
            total,
            total_pages,
        },
    }
}

/// An order row as the back office lists it.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct OrderSummary {
    pub order: Order,
    pub item_count: usize,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct Dashboard {
    pub total_orders: u64,
    pub pending_orders: u64,
    pub total_users: u64,
    pub active_products: u64,
    pub total_revenue: i64,
    pub recent_orders: Vec<Order>,
}

/// Back-office surface: a thin consumer of the ledger and the state machine.
/// Every call passes the centralized admin predicate first.
#[derive(Clone)]
pub struct AdminService {
    orders: OrderStoreRef,
    catalog: ProductCatalogRef,
    users: UserDirectoryRef,
    inquiries: InquiryStoreRef,
    order_locks: Arc<LockMap<u32>>,
}

impl AdminService {
    pub fn new(
        orders: OrderStoreRef,
        catalog: ProductCatalogRef,
        users: UserDirectoryRef,
        inquiries: InquiryStoreRef,
        order_locks: Arc<LockMap<u32>>,
    ) -> Self {
        Self {
            orders,
            catalog,
            users,
            inquiries,
            order_locks,
        }
    }

    pub async fn dashboard(&self, caller: &User) -> Result<Dashboard> {
        require_admin(caller)?;

        let orders = self.orders.all().await?;
        let total_revenue = orders
            .iter()
            .filter(|o| o.paid_at.is_some() && o.status != OrderStatus::Cancelled)
            .map(|o| o.total_amount)
            .sum();
        let pending_orders = orders
            .iter()
            .filter(|o| o.status == OrderStatus::Pending)
            .count() as u64;
        let recent_orders = orders.iter().take(5).cloned().collect();

        let active_products = self
            .catalog
            .all()
            .await?
            .iter()
            .filter(|p| p.is_active)
            .count() as u64;

        Ok(Dashboard {
            total_orders: orders.len() as u64,
            pending_orders,
            total_users: self.users.all().await?.len() as u64,
            active_products,
            total_revenue,
            recent_orders,
        })
    }

    pub async fn list_orders(
        &self,
        caller: &User,
        req: PageRequest,
        status: Option<OrderStatus>,
    ) -> Result<Page<OrderSummary>> {
        require_admin(caller)?;

        let orders: Vec<Order> = self
            .orders
            .all()
            .await?
            .into_iter()
            .filter(|o| status.is_none_or(|s| o.status == s))
            .collect();

        let page = paginate(orders, req);
        let mut items = Vec::with_capacity(page.items.len());
        for order in page.items {
            let item_count = self.orders.items(order.id).await?.len();
            let customer = self.users.get(order.user_id).await?;
            items.push(OrderSummary {
                item_count,
                customer_name: customer.as_ref().map(|u| u.name.clone()),
                customer_email: customer.map(|u| u.email),
                order,
            });
        }
        Ok(Page {
            items,
            pagination: page.pagination,
        })
    }

    pub async fn order_detail(
        &self,
        caller: &User,
        order_id: u32,
    ) -> Result<(Order, Vec<OrderItem>)> {
        require_admin(caller)?;
        let order = self.orders.get(order_id).await?.ok_or(ShopError::NotFound)?;
        let items = self.orders.items(order_id).await?;
        Ok((order, items))
    }

    /// Status changes route through the state machine; this surface never
    /// writes `status` directly. Entering `cancelled` restores stock.
    pub async fn update_order_status(
        &self,
        caller: &User,
        order_id: u32,
        to: OrderStatus,
    ) -> Result<Order> {
        require_admin(caller)?;

        let _guard = self.order_locks.acquire(order_id).await;

        let mut order = self.orders.get(order_id).await?.ok_or(ShopError::NotFound)?;
        order.transition(to, Actor::Admin)?;

        // The ledger write is the commit point; stock is returned only once
        // the cancellation is durable.
        self.orders.update(order.clone()).await?;
        if to == OrderStatus::Cancelled {
            for item in self.orders.items(order_id).await? {
                if let Err(e) = self
                    .catalog
                    .adjust_stock(item.product_id, i64::from(item.quantity))
                    .await
                {
                    warn!(
                        order_id,
                        product_id = item.product_id,
                        error = %e,
                        "failed to restore stock for cancelled order"
                    );
                }
            }
        }

        info!(order_id, status = %to, "admin updated order status");
        Ok(order)
    }

    pub async fn list_users(
        &self,
        caller: &User,
        req: PageRequest,
        search: Option<&str>,
    ) -> Result<Page<User>> {
        require_admin(caller)?;

        let users = self
            .users
            .all()
            .await?
            .into_iter()
            .filter(|u| {
                search.is_none_or(|s| {
                    let s = s.to_lowercase();
                    u.name.to_lowercase().contains(&s) || u.email.to_lowercase().contains(&s)
                })
            })
            .collect();
        Ok(paginate(users, req))
    }

    pub async fn set_user_role(&self, caller: &User, user_id: u32, role: Role) -> Result<()> {
        require_admin(caller)?;
        self.users.set_role(user_id, role).await?;
        info!(user_id, ?role, "user role changed");
        Ok(())
    }

    pub async fn list_products(
        &self,
        caller: &User,
        req: PageRequest,
        category: Option<&str>,
        search: Option<&str>,
    ) -> Result<Page<Product>> {
        require_admin(caller)?;

        let products = self
            .catalog
            .all()
            .await?
            .into_iter()
            .filter(|p| category.is_none_or(|c| p.category.as_deref() == Some(c)))
            .filter(|p| {
                search.is_none_or(|s| p.name.to_lowercase().contains(&s.to_lowercase()))
            })
            .collect();
        Ok(paginate(products, req))
    }

    pub async fn list_inquiries(
        &self,
        caller: &User,
        req: PageRequest,
        status: Option<InquiryStatus>,
    ) -> Result<Page<RentalInquiry>> {
        require_admin(caller)?;

        let inquiries = self
            .inquiries
            .all()
            .await?
            .into_iter()
            .filter(|i| status.is_none_or(|s| i.status == s))
            .collect();
        Ok(paginate(inquiries, req))
    }

    pub async fn update_inquiry_status(
        &self,
        caller: &User,
        inquiry_id: u32,
        status: InquiryStatus,
    ) -> Result<RentalInquiry> {
        require_admin(caller)?;

        let mut inquiry = self
            .inquiries
            .get(inquiry_id)
            .await?
            .ok_or(ShopError::NotFound)?;
        inquiry.status = status;
        self.inquiries.update(inquiry.clone()).await?;
        Ok(inquiry)
    }
}
