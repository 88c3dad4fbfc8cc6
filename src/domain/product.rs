use serde::{Deserialize, Serialize};

/// Catalog entry. The engine only reads price/stock; catalog management
/// beyond stock adjustments lives with the collaborating catalog service.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Product {
    pub id: u32,
    pub name: String,
    pub category: Option<String>,
    pub price: i64,
    pub sale_price: Option<i64>,
    pub stock: u32,
    pub is_active: bool,
}

impl Product {
    pub fn new(id: u32, name: impl Into<String>, price: i64, stock: u32) -> Self {
        Self {
            id,
            name: name.into(),
            category: None,
            price,
            sale_price: None,
            stock,
            is_active: true,
        }
    }

    pub fn with_sale_price(mut self, sale_price: i64) -> Self {
        self.sale_price = Some(sale_price);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// The price a customer actually pays right now.
    pub fn effective_price(&self) -> i64 {
        self.sale_price.unwrap_or(self.price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_price_prefers_sale_price() {
        let regular = Product::new(1, "Monstera", 28_000, 10);
        assert_eq!(regular.effective_price(), 28_000);

        let on_sale = Product::new(2, "Ficus", 35_000, 5).with_sale_price(29_000);
        assert_eq!(on_sale.effective_price(), 29_000);
    }
}
