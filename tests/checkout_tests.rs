mod common;

use common::*;
use verdure::domain::order::{OrderStatus, PaymentMethod};
use verdure::domain::ports::ProductCatalog;
use verdure::error::ShopError;

#[tokio::test]
async fn test_add_merges_lines_for_the_same_product() {
    let h = harness().await;

    h.shop.carts.add(&h.customer, MONSTERA, 1).await.unwrap();
    h.shop.carts.add(&h.customer, MONSTERA, 1).await.unwrap();

    let snapshot = h.shop.carts.snapshot(&h.customer).await.unwrap();
    assert_eq!(snapshot.lines.len(), 1);
    assert_eq!(snapshot.lines[0].item.quantity, 2);
    assert_eq!(snapshot.quote.subtotal, 24_000);
    assert_eq!(snapshot.quote.shipping_fee, 3_000);
    assert_eq!(snapshot.quote.total, 27_000);
}

#[tokio::test]
async fn test_quantity_below_one_is_rejected() {
    let h = harness().await;

    let err = h.shop.carts.add(&h.customer, MONSTERA, 0).await.unwrap_err();
    assert!(matches!(err, ShopError::InvalidQuantity(0)));

    h.shop.carts.add(&h.customer, MONSTERA, 1).await.unwrap();
    let snapshot = h.shop.carts.snapshot(&h.customer).await.unwrap();
    let item_id = snapshot.lines[0].item.id;
    let err = h
        .shop
        .carts
        .set_quantity(&h.customer, item_id, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, ShopError::InvalidQuantity(0)));
}

#[tokio::test]
async fn test_sale_price_wins_over_list_price() {
    let h = harness().await;

    h.shop.carts.add(&h.customer, FICUS, 1).await.unwrap();

    let snapshot = h.shop.carts.snapshot(&h.customer).await.unwrap();
    assert_eq!(snapshot.lines[0].unit_price, 29_000);
    assert_eq!(snapshot.quote.subtotal, 29_000);
}

#[tokio::test]
async fn test_shipping_fee_applies_below_threshold() {
    let h = harness().await;

    let order = place_monstera_order(&h, &h.customer, PaymentMethod::Widget).await;

    assert_eq!(order.total_amount, 15_000);
    assert_eq!(order.shipping_fee, 3_000);
    assert_eq!(order.status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_free_shipping_exactly_at_threshold() {
    let h = harness().await;

    // 2 x 25,000 lands exactly on the free-shipping threshold.
    h.shop.carts.add(&h.customer, HOYA, 2).await.unwrap();
    let order = h
        .shop
        .orders
        .create_order(&h.customer, checkout_request(PaymentMethod::Redirect))
        .await
        .unwrap();

    assert_eq!(order.total_amount, 50_000);
    assert_eq!(order.shipping_fee, 0);
}

#[tokio::test]
async fn test_checkout_with_empty_cart_fails() {
    let h = harness().await;

    let err = h
        .shop
        .orders
        .create_order(&h.customer, checkout_request(PaymentMethod::Widget))
        .await
        .unwrap_err();
    assert!(matches!(err, ShopError::EmptyCart));
}

#[tokio::test]
async fn test_checkout_clears_cart_and_reserves_stock() {
    let h = harness().await;

    place_monstera_order(&h, &h.customer, PaymentMethod::Widget).await;

    let snapshot = h.shop.carts.snapshot(&h.customer).await.unwrap();
    assert!(snapshot.is_empty());

    let monstera = h.catalog.get(MONSTERA).await.unwrap().unwrap();
    assert_eq!(monstera.stock, 9);
}

#[tokio::test]
async fn test_checkout_beyond_stock_fails_and_takes_nothing() {
    let h = harness().await;

    // Hoya has 2 in stock.
    h.shop.carts.add(&h.customer, HOYA, 3).await.unwrap();
    let err = h
        .shop
        .orders
        .create_order(&h.customer, checkout_request(PaymentMethod::Widget))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ShopError::OutOfStock {
            product_id: HOYA,
            requested: 3,
            available: 2,
        }
    ));
    let hoya = h.catalog.get(HOYA).await.unwrap().unwrap();
    assert_eq!(hoya.stock, 2);
}

#[tokio::test]
async fn test_order_items_capture_prices_at_checkout() {
    let h = harness().await;

    h.shop.carts.add(&h.customer, MONSTERA, 2).await.unwrap();
    h.shop.carts.add(&h.customer, FICUS, 1).await.unwrap();
    let order = h
        .shop
        .orders
        .create_order(&h.customer, checkout_request(PaymentMethod::Widget))
        .await
        .unwrap();

    let (_, items) = h.shop.orders.get_order(&h.customer, order.id).await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].product_name, "Monstera");
    assert_eq!(items[0].unit_price, 12_000);
    assert_eq!(items[0].line_total(), 24_000);
    assert_eq!(items[1].unit_price, 29_000);
    // 24,000 + 29,000 = 53,000, over the free-shipping threshold.
    assert_eq!(order.total_amount, 53_000);
    assert_eq!(order.shipping_fee, 0);
}

#[tokio::test]
async fn test_foreign_orders_read_as_not_found() {
    let h = harness().await;

    let order = place_monstera_order(&h, &h.customer, PaymentMethod::Widget).await;

    let err = h
        .shop
        .orders
        .get_order(&h.other_customer, order.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ShopError::NotFound));

    // Admins see every order.
    assert!(h.shop.orders.get_order(&h.admin, order.id).await.is_ok());
}

#[tokio::test]
async fn test_order_listing_is_newest_first() {
    let h = harness().await;

    let first = place_monstera_order(&h, &h.customer, PaymentMethod::Widget).await;
    let second = place_monstera_order(&h, &h.customer, PaymentMethod::Redirect).await;
    place_monstera_order(&h, &h.other_customer, PaymentMethod::Widget).await;

    let orders = h.shop.orders.list_orders(&h.customer).await.unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].0.id, second.id);
    assert_eq!(orders[1].0.id, first.id);
    assert_eq!(orders[0].1, 1);
}

#[tokio::test]
async fn test_recipient_is_validated_before_checkout() {
    let h = harness().await;

    h.shop.carts.add(&h.customer, MONSTERA, 1).await.unwrap();
    let mut request = checkout_request(PaymentMethod::Widget);
    request.recipient.phone = String::new();

    let err = h
        .shop
        .orders
        .create_order(&h.customer, request)
        .await
        .unwrap_err();
    assert!(matches!(err, ShopError::Validation(_)));
}
