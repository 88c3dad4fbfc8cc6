//! Domain layer: entities, value objects, the order state machine and the
//! ports the application services are wired through.

pub mod cart;
pub mod order;
pub mod payment;
pub mod ports;
pub mod pricing;
pub mod product;
pub mod user;
