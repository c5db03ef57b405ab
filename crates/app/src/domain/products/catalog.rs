//! Product Catalog
//!
//! Read-only product lookup, keyed externally by UUID and internally by the
//! engine's slotmap keys. The in-memory implementation stands in for the
//! storefront backend.

use async_trait::async_trait;
use mockall::automock;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use uuid::Uuid;

use comptoir::{
    fixtures::{FixtureError, products::ProductsFixture},
    products::{Product, ProductKey},
};

use crate::domain::products::errors::CatalogError;

/// A catalog hit: the engine key for the product plus a snapshot of its data.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    /// Engine key for the product.
    pub key: ProductKey,

    /// Snapshot of the product data.
    pub product: Product<'static>,
}

/// Read-only product lookup used when adding to carts and validating them.
#[automock]
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Look up a product by its external id.
    async fn find(&self, product: Uuid) -> Result<CatalogEntry, CatalogError>;
}

/// In-memory catalog backing the demo and tests.
#[derive(Debug, Default)]
pub struct InMemoryProductCatalog {
    products: SlotMap<ProductKey, Product<'static>>,
    by_uuid: FxHashMap<Uuid, ProductKey>,
}

impl InMemoryProductCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product under an external id, returning its engine key.
    pub fn insert(&mut self, uuid: Uuid, product: Product<'static>) -> ProductKey {
        let key = self.products.insert(product);

        self.by_uuid.insert(uuid, key);

        key
    }

    /// Build a catalog from a products fixture, assigning a fresh UUID per
    /// product. Returns the catalog and the fixture-key → UUID mapping so
    /// callers can address products by their fixture names.
    ///
    /// # Errors
    ///
    /// Returns an error when a product fixture does not convert.
    pub fn from_fixture(
        fixture: ProductsFixture,
    ) -> Result<(Self, FxHashMap<String, Uuid>), FixtureError> {
        let mut catalog = Self::new();
        let mut uuids_by_fixture_key = FxHashMap::default();

        for (fixture_key, product_fixture) in fixture.products {
            let product = Product::try_from(product_fixture)?;
            let uuid = Uuid::now_v7();

            catalog.insert(uuid, product);
            uuids_by_fixture_key.insert(fixture_key, uuid);
        }

        Ok((catalog, uuids_by_fixture_key))
    }

    /// Look up a product synchronously.
    #[must_use]
    pub fn get(&self, uuid: Uuid) -> Option<CatalogEntry> {
        let key = self.by_uuid.get(&uuid).copied()?;
        let product = self.products.get(key)?.clone();

        Some(CatalogEntry { key, product })
    }

    /// Iterate over the catalog's products with their external ids.
    pub fn entries(&self) -> impl Iterator<Item = (Uuid, &Product<'static>)> {
        self.by_uuid
            .iter()
            .filter_map(|(uuid, key)| self.products.get(*key).map(|product| (*uuid, product)))
    }

    /// Number of products in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_uuid.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_uuid.is_empty()
    }
}

#[async_trait]
impl ProductCatalog for InMemoryProductCatalog {
    async fn find(&self, product: Uuid) -> Result<CatalogEntry, CatalogError> {
        self.get(product).ok_or(CatalogError::NotFound)
    }
}
