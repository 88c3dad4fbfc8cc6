use crate::error::{Result, ShopError};
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioAction {
    /// Add a product to the user's cart.
    Add,
    /// Set the quantity of a cart line.
    Quantity,
    /// Remove a cart line.
    Remove,
    /// Create an order from the user's cart.
    Checkout,
    /// Derive the payment session for an order.
    Prepare,
    /// Confirm/approve payment for an order.
    Pay,
    /// Cancel an order.
    Cancel,
    /// Admin-driven status change.
    Advance,
}

/// One row of a scenario file. Which columns are required depends on the
/// action; the services report the gaps.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct ScenarioEvent {
    pub action: ScenarioAction,
    pub user: u32,
    pub product: Option<u32>,
    pub item: Option<u64>,
    pub qty: Option<u32>,
    pub order: Option<u32>,
    pub method: Option<String>,
    pub amount: Option<i64>,
    #[serde(rename = "ref")]
    pub payment_ref: Option<String>,
    pub status: Option<String>,
}

pub struct ScenarioReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> ScenarioReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Malformed rows come through as errors without stopping the stream.
    pub fn events(self) -> impl Iterator<Item = Result<ScenarioEvent>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(ShopError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "action,user,product,item,qty,order,method,amount,ref,status";

    #[test]
    fn test_reads_valid_rows() {
        let data = format!("{HEADER}\nadd,1,10,,2,,,,,\ncheckout,1,,,,,widget,,,");
        let events: Vec<_> = ScenarioReader::new(data.as_bytes()).events().collect();

        assert_eq!(events.len(), 2);
        let add = events[0].as_ref().unwrap();
        assert_eq!(add.action, ScenarioAction::Add);
        assert_eq!(add.product, Some(10));
        assert_eq!(add.qty, Some(2));

        let checkout = events[1].as_ref().unwrap();
        assert_eq!(checkout.action, ScenarioAction::Checkout);
        assert_eq!(checkout.method.as_deref(), Some("widget"));
        assert_eq!(checkout.amount, None);
    }

    #[test]
    fn test_malformed_row_is_an_error_not_a_stop() {
        let data = format!("{HEADER}\nteleport,1,,,,,,,,\nadd,1,10,,1,,,,,");
        let events: Vec<_> = ScenarioReader::new(data.as_bytes()).events().collect();

        assert_eq!(events.len(), 2);
        assert!(events[0].is_err());
        assert!(events[1].is_ok());
    }
}
