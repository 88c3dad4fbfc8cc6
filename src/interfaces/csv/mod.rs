//! CSV interfaces for the replay CLI: a catalog seed reader, a scenario
//! event reader and the final order report writer.

pub mod catalog_reader;
pub mod order_writer;
pub mod scenario_reader;
