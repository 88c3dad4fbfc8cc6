use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use verdure::application::Shop;
use verdure::domain::order::{OrderStatus, PaymentMethod, Recipient};
use verdure::domain::ports::{NewOrder, OrderStoreRef, PaymentGatewayRef, UserDirectory};
use verdure::domain::user::{Role, User};
use verdure::error::ShopError;
use verdure::infrastructure::gateways::redirect::{RedirectConfig, RedirectGateway};
use verdure::infrastructure::gateways::sandbox::SandboxGateway;
use verdure::infrastructure::gateways::widget::{WidgetConfig, WidgetGateway};
use verdure::infrastructure::in_memory::{
    InMemoryCartStore, InMemoryCatalog, InMemoryInquiryStore, InMemoryOrderStore,
    InMemoryUserDirectory,
};
use verdure::interfaces::csv::catalog_reader::CatalogReader;
use verdure::interfaces::csv::order_writer::OrderReportWriter;
use verdure::interfaces::csv::scenario_reader::{ScenarioAction, ScenarioEvent, ScenarioReader};

/// Replays a storefront scenario (cart edits, checkouts, payments, admin
/// actions) against the order engine and prints the final order report.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Scenario events CSV file
    events: PathBuf,

    /// Catalog seed CSV file (id,name,price,sale_price,stock,category)
    #[arg(long)]
    catalog: PathBuf,

    /// Path to a persistent order ledger (requires the storage-rocksdb
    /// feature). In-memory otherwise.
    #[arg(long)]
    db_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let order_store: OrderStoreRef = match cli.db_path {
        Some(db_path) => open_ledger(db_path)?,
        None => Arc::new(InMemoryOrderStore::new()),
    };

    let catalog = Arc::new(InMemoryCatalog::new());
    let catalog_file = File::open(&cli.catalog).into_diagnostic()?;
    for product in CatalogReader::new(catalog_file).products() {
        let product = product.into_diagnostic()?;
        catalog.insert(product).await;
    }

    let users = Arc::new(InMemoryUserDirectory::new());
    let shop = Shop::new(
        Arc::new(InMemoryCartStore::new()),
        order_store.clone(),
        catalog,
        users.clone(),
        Arc::new(InMemoryInquiryStore::new()),
        build_gateways(),
    );

    let events_file = File::open(&cli.events).into_diagnostic()?;
    for event in ScenarioReader::new(events_file).events() {
        match event {
            Ok(event) => {
                if let Err(e) = apply_event(&shop, &users, &event).await {
                    eprintln!("Error processing event: {}", e);
                }
            }
            Err(e) => {
                eprintln!("Error reading event: {}", e);
            }
        }
    }

    let mut orders = order_store.all().await.into_diagnostic()?;
    orders.sort_by_key(|o| o.id);
    let mut report = Vec::with_capacity(orders.len());
    for order in orders {
        let item_count = order_store.items(order.id).await.into_diagnostic()?.len();
        report.push((order, item_count));
    }

    let stdout = io::stdout();
    let mut writer = OrderReportWriter::new(stdout.lock());
    writer.write_orders(report).into_diagnostic()?;

    Ok(())
}

#[cfg(feature = "storage-rocksdb")]
fn open_ledger(db_path: PathBuf) -> Result<OrderStoreRef> {
    let ledger = verdure::infrastructure::rocksdb::RocksDbLedger::open(db_path).into_diagnostic()?;
    Ok(Arc::new(ledger))
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_ledger(_db_path: PathBuf) -> Result<OrderStoreRef> {
    Err(miette::miette!(
        "--db-path requires building with the storage-rocksdb feature"
    ))
}

/// Live gateways when credentials are configured, sandbox otherwise.
fn build_gateways() -> Vec<PaymentGatewayRef> {
    let redirect: PaymentGatewayRef = match RedirectConfig::from_env() {
        Some(config) => match RedirectGateway::new(config) {
            Ok(gateway) => Arc::new(gateway),
            Err(e) => {
                eprintln!("Error building redirect gateway, using sandbox: {}", e);
                Arc::new(SandboxGateway::approving(PaymentMethod::Redirect))
            }
        },
        None => Arc::new(SandboxGateway::approving(PaymentMethod::Redirect)),
    };
    let widget: PaymentGatewayRef = match WidgetConfig::from_env() {
        Some(config) => match WidgetGateway::new(config) {
            Ok(gateway) => Arc::new(gateway),
            Err(e) => {
                eprintln!("Error building widget gateway, using sandbox: {}", e);
                Arc::new(SandboxGateway::approving(PaymentMethod::Widget))
            }
        },
        None => Arc::new(SandboxGateway::approving(PaymentMethod::Widget)),
    };
    vec![redirect, widget]
}

/// Users exist outside the engine; the replay harness materializes them on
/// first sight, promoting to admin for `advance` rows.
async fn ensure_user(
    users: &InMemoryUserDirectory,
    user_id: u32,
    admin: bool,
) -> verdure::error::Result<User> {
    match users.get(user_id).await? {
        Some(user) if !admin || user.is_admin() => Ok(user),
        Some(mut user) => {
            users.set_role(user_id, Role::Admin).await?;
            user.role = Role::Admin;
            Ok(user)
        }
        None => {
            let role = if admin { Role::Admin } else { Role::Customer };
            let user = User::new(
                user_id,
                format!("user{user_id}@example.com"),
                format!("user{user_id}"),
                role,
            );
            users.insert(user.clone()).await;
            Ok(user)
        }
    }
}

async fn apply_event(
    shop: &Shop,
    users: &InMemoryUserDirectory,
    event: &ScenarioEvent,
) -> verdure::error::Result<()> {
    let admin_action = event.action == ScenarioAction::Advance;
    let user = ensure_user(users, event.user, admin_action).await?;

    let missing = |field: &str| ShopError::Validation(format!("{field} column is required"));

    match event.action {
        ScenarioAction::Add => {
            let product = event.product.ok_or_else(|| missing("product"))?;
            shop.carts
                .add(&user, product, event.qty.unwrap_or(1))
                .await?;
        }
        ScenarioAction::Quantity => {
            let item = event.item.ok_or_else(|| missing("item"))?;
            let qty = event.qty.ok_or_else(|| missing("qty"))?;
            shop.carts.set_quantity(&user, item, qty).await?;
        }
        ScenarioAction::Remove => {
            let item = event.item.ok_or_else(|| missing("item"))?;
            shop.carts.remove(&user, item).await?;
        }
        ScenarioAction::Checkout => {
            let payment_method = match event.method.as_deref() {
                Some(m) => PaymentMethod::parse(m)?,
                None => PaymentMethod::Widget,
            };
            shop.orders
                .create_order(
                    &user,
                    NewOrder {
                        recipient: replay_recipient(&user),
                        payment_method,
                        memo: None,
                    },
                )
                .await?;
        }
        ScenarioAction::Prepare => {
            let order = event.order.ok_or_else(|| missing("order"))?;
            shop.payments.prepare(&user, order).await?;
        }
        ScenarioAction::Pay => {
            let order = event.order.ok_or_else(|| missing("order"))?;
            let payment_ref = event.payment_ref.as_deref().unwrap_or("");
            match event.amount {
                Some(amount) => {
                    shop.payments
                        .confirm_widget(&user, order, payment_ref, amount)
                        .await?;
                }
                None => {
                    shop.payments
                        .approve_redirect(&user, order, payment_ref)
                        .await?;
                }
            }
        }
        ScenarioAction::Cancel => {
            let order = event.order.ok_or_else(|| missing("order"))?;
            shop.orders.cancel(&user, order).await?;
        }
        ScenarioAction::Advance => {
            let order = event.order.ok_or_else(|| missing("order"))?;
            let status = event.status.as_deref().ok_or_else(|| missing("status"))?;
            shop.admin
                .update_order_status(&user, order, OrderStatus::parse(status)?)
                .await?;
        }
    }
    Ok(())
}

fn replay_recipient(user: &User) -> Recipient {
    Recipient {
        name: user.name.clone(),
        phone: "010-0000-0000".to_string(),
        zipcode: "00000".to_string(),
        address: "1 Replay Street".to_string(),
        address_detail: None,
    }
}
