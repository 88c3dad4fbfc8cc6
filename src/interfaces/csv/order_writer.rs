use crate::domain::order::Order;
use crate::error::Result;
use std::io::Write;

/// Writes the final order report:
/// `order,user,status,total,shipping,items`.
pub struct OrderReportWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> OrderReportWriter<W> {
    pub fn new(destination: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(destination),
        }
    }

    pub fn write_orders(&mut self, orders: Vec<(Order, usize)>) -> Result<()> {
        self.writer
            .write_record(["order", "user", "status", "total", "shipping", "items"])?;
        for (order, item_count) in orders {
            self.writer.write_record(&[
                order.order_number,
                order.user_id.to_string(),
                order.status.to_string(),
                order.total_amount.to_string(),
                order.shipping_fee.to_string(),
                item_count.to_string(),
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
