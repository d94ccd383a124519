use super::{same_identity, Entity, Product};

/// A company and the products it owns.
///
/// The product collection and each product's back-reference change together,
/// only through [`Company::add_product`] and [`Company::remove_product`].
#[derive(Debug, Clone)]
pub struct Company {
    id: Option<i64>,
    pub name: String,
    products: Vec<Product>,
}

impl Company {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            products: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.set_id(id);
        self
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn add_product(&mut self, mut product: Product) {
        product.set_company_id(self.id);
        self.products.push(product);
    }

    /// Detaches the product with the given identifier, clearing its
    /// back-reference.
    pub fn remove_product(&mut self, product_id: i64) -> Option<Product> {
        let index = self
            .products
            .iter()
            .position(|product| product.id() == Some(product_id))?;
        let mut product = self.products.remove(index);
        product.set_company_id(None);
        Some(product)
    }
}

impl Entity for Company {
    const NAME: &'static str = "company";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
        for product in &mut self.products {
            product.set_company_id(Some(id));
        }
    }
}

impl PartialEq for Company {
    fn eq(&self, other: &Self) -> bool {
        same_identity(self.id, other.id)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn product(name: &str) -> Product {
        Product::new(name, NaiveDate::from_ymd_opt(2020, 1, 11).unwrap())
    }

    #[test]
    fn add_product_sets_back_reference() {
        let mut company = Company::new("The Coca-Cola Company").with_id(1);
        company.add_product(product("Sprite").with_id(10));

        assert_eq!(company.products().len(), 1);
        assert_eq!(company.products()[0].company_id(), Some(1));
    }

    #[test]
    fn remove_product_clears_both_sides() {
        let mut company = Company::new("Mars Inc.").with_id(2);
        company.add_product(product("Snickers").with_id(20));
        company.add_product(product("Twix").with_id(21));

        let removed = company.remove_product(20).unwrap();

        assert_eq!(removed.company_id(), None);
        assert_eq!(company.products().len(), 1);
        assert!(company.remove_product(20).is_none());
    }

    #[test]
    fn assigning_company_id_reaches_attached_products() {
        let mut company = Company::new("Mars Inc.");
        company.add_product(product("Snickers"));
        assert_eq!(company.products()[0].company_id(), None);

        company.set_id(5);

        assert_eq!(company.products()[0].company_id(), Some(5));
    }
}
