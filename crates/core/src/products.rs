//! Products

use rusty_money::{Money, iso::Currency};
use slotmap::new_key_type;

new_key_type! {
    /// Product Key
    pub struct ProductKey;
}

/// Product
#[derive(Debug, Clone)]
pub struct Product<'a> {
    /// Product name
    pub name: String,

    /// List price shown to shoppers
    pub price: Money<'a, Currency>,

    /// Discounted price, when the product is on sale
    pub sale_price: Option<Money<'a, Currency>>,

    /// Units currently available
    pub stock_quantity: u32,

    /// Whether the product can still be purchased
    pub active: bool,
}

impl<'a> Product<'a> {
    /// Returns the price a shopper actually pays: the sale price when one is
    /// set, the list price otherwise.
    #[must_use]
    pub fn effective_price(&self) -> &Money<'a, Currency> {
        self.sale_price.as_ref().unwrap_or(&self.price)
    }

    /// Whether the product is currently sold below its list price.
    #[must_use]
    pub fn is_on_sale(&self) -> bool {
        self.sale_price.is_some()
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::XOF;

    use super::*;

    fn product(sale_price: Option<Money<'static, Currency>>) -> Product<'static> {
        Product {
            name: "Casque Bluetooth Sony WH-1000XM4".to_string(),
            price: Money::from_minor(85_000, XOF),
            sale_price,
            stock_quantity: 5,
            active: true,
        }
    }

    #[test]
    fn effective_price_prefers_sale_price() {
        let on_sale = product(Some(Money::from_minor(79_000, XOF)));

        assert_eq!(on_sale.effective_price(), &Money::from_minor(79_000, XOF));
        assert!(on_sale.is_on_sale());
    }

    #[test]
    fn effective_price_falls_back_to_list_price() {
        let full_price = product(None);

        assert_eq!(
            full_price.effective_price(),
            &Money::from_minor(85_000, XOF)
        );
        assert!(!full_price.is_on_sale());
    }
}
