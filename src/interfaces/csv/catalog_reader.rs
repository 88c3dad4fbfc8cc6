use crate::domain::product::Product;
use crate::error::{Result, ShopError};
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct CatalogRow {
    id: u32,
    name: String,
    price: i64,
    sale_price: Option<i64>,
    stock: u32,
    category: Option<String>,
}

impl From<CatalogRow> for Product {
    fn from(row: CatalogRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            category: row.category,
            price: row.price,
            sale_price: row.sale_price,
            stock: row.stock,
            is_active: true,
        }
    }
}

/// Seeds the in-memory catalog from a CSV file
/// (`id,name,price,sale_price,stock,category`).
pub struct CatalogReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CatalogReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn products(self) -> impl Iterator<Item = Result<Product>> {
        self.reader
            .into_deserialize::<CatalogRow>()
            .map(|result| result.map(Product::from).map_err(ShopError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_catalog_rows() {
        let data = "id,name,price,sale_price,stock,category\n\
                    1,Monstera,28000,,10,plants\n\
                    2,Ficus,35000,29000,5,";
        let products: Vec<Product> = CatalogReader::new(data.as_bytes())
            .products()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(products.len(), 2);
        assert_eq!(products[0].effective_price(), 28_000);
        assert_eq!(products[0].category.as_deref(), Some("plants"));
        assert_eq!(products[1].effective_price(), 29_000);
        assert!(products[1].is_active);
    }
}
