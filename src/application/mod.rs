//! Application layer orchestrating the domain ports: cart edits, checkout,
//! payment reconciliation and the admin back office. Each order has a single
//! logical owner; mutations to one order serialize through a shared
//! [`locks::LockMap`].

pub mod admin;
pub mod cart;
pub mod inquiries;
pub mod locks;
pub mod orders;
pub mod payments;

use crate::domain::ports::{
    CartStoreRef, InquiryStoreRef, OrderStoreRef, PaymentGatewayRef, ProductCatalogRef,
    UserDirectoryRef,
};
use std::sync::Arc;

/// Everything wired together. The CLI and tests build one of these from
/// whatever store and gateway implementations they want to inject.
#[derive(Clone)]
pub struct Shop {
    pub carts: cart::CartService,
    pub orders: orders::OrderService,
    pub payments: payments::PaymentService,
    pub admin: admin::AdminService,
    pub inquiries: inquiries::InquiryService,
}

impl Shop {
    pub fn new(
        cart_store: CartStoreRef,
        order_store: OrderStoreRef,
        catalog: ProductCatalogRef,
        users: UserDirectoryRef,
        inquiry_store: InquiryStoreRef,
        gateways: Vec<PaymentGatewayRef>,
    ) -> Self {
        let order_locks = Arc::new(locks::LockMap::new());
        // Cart edits and checkout for the same user share one lock, so a
        // checkout snapshots, persists and clears without edits interleaving.
        let user_locks = Arc::new(locks::LockMap::new());

        let carts =
            cart::CartService::new(cart_store.clone(), catalog.clone(), user_locks.clone());
        let orders = orders::OrderService::new(
            carts.clone(),
            cart_store,
            catalog.clone(),
            order_store.clone(),
            order_locks.clone(),
            user_locks,
        );
        let payments =
            payments::PaymentService::new(order_store.clone(), gateways, order_locks.clone());
        let admin = admin::AdminService::new(
            order_store,
            catalog,
            users,
            inquiry_store.clone(),
            order_locks,
        );
        let inquiries = inquiries::InquiryService::new(inquiry_store);

        Self {
            carts,
            orders,
            payments,
            admin,
            inquiries,
        }
    }
}
