//! Adapters for the domain ports: in-memory stores, the optional RocksDB
//! order ledger and the payment gateway implementations.

pub mod gateways;
pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
