//! Carts service.
//!
//! Coordinates the pure cart engine with the repository and catalog
//! collaborators: every mutation fetches the stored lines, replays them
//! through the engine, applies the change, and writes the result back. A
//! failed fetch or persist leaves the stored cart untouched; the service
//! never retries internally.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use rusty_money::Money;
use uuid::Uuid;

use comptoir::{
    cart::{Cart, LineKey, LineUpdate},
    coupons::{CouponBook, CouponCode},
    lines::{NewLine, Variant},
    pricing::PricingPolicy,
    summary::CartSummary,
};

use crate::domain::{
    carts::{
        errors::CartsServiceError,
        records::{LineRecord, UserUuid},
        repository::CartRepository,
    },
    products::{CatalogEntry, ProductCatalog, errors::CatalogError},
};

/// How a coupon code given to [`CartService::summary`] was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CouponOutcome {
    /// No code was entered.
    NotRequested,

    /// The code resolved to a coupon and its discount was applied.
    Applied(CouponCode),

    /// The code is not in the coupon book; no discount was applied. This is
    /// deliberate permissive behaviour, surfaced so a UI can say so.
    Unrecognised(String),
}

/// A priced cart plus how the entered coupon code was handled.
#[derive(Debug, Clone)]
pub struct PricedCart {
    /// The derived totals.
    pub summary: CartSummary<'static>,

    /// What became of the entered coupon code.
    pub coupon: CouponOutcome,
}

/// A problem found when checking a cart against the current catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartIssue {
    /// The product behind a line no longer exists.
    ProductMissing {
        /// Display name captured on the line.
        name: String,
    },

    /// The product can no longer be purchased.
    ProductInactive {
        /// Display name captured on the line.
        name: String,
    },

    /// The line's quantity exceeds the stock currently available.
    InsufficientStock {
        /// Display name captured on the line.
        name: String,

        /// Units on the line.
        requested: u32,

        /// Units currently in stock.
        available: u32,
    },
}

struct Assembled {
    cart: Cart<'static>,
    ids: FxHashMap<LineKey, LineIds>,
}

#[derive(Copy, Clone)]
struct LineIds {
    line: Uuid,
    product: Uuid,
}

/// Cart coordination service.
#[derive(Clone)]
pub struct CartService {
    repository: Arc<dyn CartRepository>,
    catalog: Arc<dyn ProductCatalog>,
    coupons: CouponBook<'static>,
    policy: PricingPolicy<'static>,
}

impl CartService {
    /// Create a new carts service over its collaborators.
    #[must_use]
    pub fn new(
        repository: Arc<dyn CartRepository>,
        catalog: Arc<dyn ProductCatalog>,
        coupons: CouponBook<'static>,
        policy: PricingPolicy<'static>,
    ) -> Self {
        Self {
            repository,
            catalog,
            coupons,
            policy,
        }
    }

    /// The pricing policy this service prices carts under.
    #[must_use]
    pub fn policy(&self) -> &PricingPolicy<'static> {
        &self.policy
    }

    /// Add a product to the user's cart, merging into an existing line for
    /// the same product and variant. Clamping to stock is reported on the
    /// returned [`LineUpdate`], not raised as an error.
    ///
    /// # Errors
    ///
    /// Returns an error when the product is unknown, a cart invariant is
    /// violated, or a collaborator fails.
    pub async fn add_item(
        &self,
        user: UserUuid,
        product_uuid: Uuid,
        variant: Option<Variant>,
        quantity: u32,
    ) -> Result<LineUpdate, CartsServiceError> {
        let records = self.repository.fetch(user).await?;
        let entry = self.find_product(product_uuid).await?;

        let Assembled { mut cart, mut ids } = self.assemble(&records).await?;

        let mut new_line = NewLine::for_product(entry.key, &entry.product, quantity);

        if let Some(variant) = variant {
            new_line = new_line.with_variant(variant);
        }

        let update = cart.add(new_line)?;

        ids.entry(update.key).or_insert_with(|| LineIds {
            line: Uuid::now_v7(),
            product: product_uuid,
        });

        self.repository
            .persist(user, to_records(&cart, &ids)?)
            .await?;

        tracing::debug!(
            user = %user.as_uuid(),
            product = %product_uuid,
            quantity = update.quantity,
            clamped = update.was_clamped(),
            "added item to cart"
        );

        Ok(update)
    }

    /// Change the quantity on a cart line. Requests below one are rejected as
    /// a no-op; requests above stock are clamped, idempotently.
    ///
    /// # Errors
    ///
    /// Returns [`CartsServiceError::LineNotFound`] when no line has the given
    /// id, or an error when a collaborator fails.
    pub async fn update_quantity(
        &self,
        user: UserUuid,
        line_uuid: Uuid,
        quantity: u32,
    ) -> Result<LineUpdate, CartsServiceError> {
        let records = self.repository.fetch(user).await?;

        let Assembled { mut cart, ids } = self.assemble(&records).await?;

        let key = ids
            .iter()
            .find(|(_, line_ids)| line_ids.line == line_uuid)
            .map(|(key, _)| *key)
            .ok_or(CartsServiceError::LineNotFound)?;

        let update = cart.update_quantity(key, quantity)?;

        self.repository
            .persist(user, to_records(&cart, &ids)?)
            .await?;

        Ok(update)
    }

    /// Remove a line from the user's cart. Removing an absent line is a
    /// no-op; the return value says whether anything was deleted.
    ///
    /// # Errors
    ///
    /// Returns an error when the repository fails.
    pub async fn remove_item(
        &self,
        user: UserUuid,
        line_uuid: Uuid,
    ) -> Result<bool, CartsServiceError> {
        let mut records = self.repository.fetch(user).await?;
        let before = records.len();

        records.retain(|record| record.uuid != line_uuid);

        if records.len() == before {
            return Ok(false);
        }

        self.repository.persist(user, records).await?;

        Ok(true)
    }

    /// Empty the user's cart.
    ///
    /// # Errors
    ///
    /// Returns an error when the repository fails.
    pub async fn clear(&self, user: UserUuid) -> Result<(), CartsServiceError> {
        self.repository.clear(user).await?;

        Ok(())
    }

    /// The user's stored cart lines, as persisted.
    ///
    /// # Errors
    ///
    /// Returns an error when the repository fails.
    pub async fn lines(&self, user: UserUuid) -> Result<Vec<LineRecord>, CartsServiceError> {
        Ok(self.repository.fetch(user).await?)
    }

    /// The user's cart replayed through the engine, for callers that need
    /// the value itself (rendering, ad-hoc pricing).
    ///
    /// # Errors
    ///
    /// Returns an error when a referenced product is unknown or a
    /// collaborator fails.
    pub async fn cart(&self, user: UserUuid) -> Result<Cart<'static>, CartsServiceError> {
        let records = self.repository.fetch(user).await?;

        Ok(self.assemble(&records).await?.cart)
    }

    /// Price the user's cart, optionally applying a coupon code. An unknown
    /// code yields a zero discount and an [`CouponOutcome::Unrecognised`]
    /// marker rather than an error.
    ///
    /// # Errors
    ///
    /// Returns an error when a collaborator fails or pricing overflows.
    pub async fn summary(
        &self,
        user: UserUuid,
        coupon_code: Option<&str>,
    ) -> Result<PricedCart, CartsServiceError> {
        let records = self.repository.fetch(user).await?;
        let assembled = self.assemble(&records).await?;

        let (coupon, outcome) = match coupon_code {
            None => (None, CouponOutcome::NotRequested),
            Some(raw) => match self.coupons.resolve(raw) {
                Some(coupon) => (
                    Some(coupon),
                    CouponOutcome::Applied(coupon.code().clone()),
                ),
                None => {
                    tracing::debug!(code = raw, "unrecognised coupon code, no discount applied");

                    (None, CouponOutcome::Unrecognised(raw.to_string()))
                }
            },
        };

        let summary = CartSummary::price(&assembled.cart, coupon, &self.policy)?;

        Ok(PricedCart {
            summary,
            coupon: outcome,
        })
    }

    /// Check the user's cart against the current catalog: missing or inactive
    /// products and lines that now exceed available stock. The cart itself is
    /// not mutated.
    ///
    /// # Errors
    ///
    /// Returns an error when a collaborator fails (a missing product is an
    /// issue, not an error).
    pub async fn validate(&self, user: UserUuid) -> Result<Vec<CartIssue>, CartsServiceError> {
        let records = self.repository.fetch(user).await?;
        let mut issues = Vec::new();

        for record in &records {
            match self.catalog.find(record.product_uuid).await {
                Err(CatalogError::NotFound) => issues.push(CartIssue::ProductMissing {
                    name: record.name.clone(),
                }),
                Err(error) => return Err(error.into()),
                Ok(entry) => {
                    if !entry.product.active {
                        issues.push(CartIssue::ProductInactive {
                            name: record.name.clone(),
                        });
                    }

                    if record.quantity > entry.product.stock_quantity {
                        issues.push(CartIssue::InsufficientStock {
                            name: record.name.clone(),
                            requested: record.quantity,
                            available: entry.product.stock_quantity,
                        });
                    }
                }
            }
        }

        Ok(issues)
    }

    /// Reconcile a client-held cart with the stored one: lines already in the
    /// store take the local quantity (clamped to stock), unseen lines are
    /// added with prices re-captured from the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error when a referenced product is unknown or a
    /// collaborator fails.
    pub async fn sync(
        &self,
        user: UserUuid,
        local: Vec<LineRecord>,
    ) -> Result<(), CartsServiceError> {
        let mut records = self.repository.fetch(user).await?;

        for local_line in local {
            if let Some(existing) = records.iter_mut().find(|record| {
                record.product_uuid == local_line.product_uuid
                    && record.variant == local_line.variant
            }) {
                if existing.quantity != local_line.quantity {
                    existing.quantity = local_line
                        .quantity
                        .clamp(1, existing.stock_quantity.max(1));
                }

                continue;
            }

            let entry = self.find_product(local_line.product_uuid).await?;

            if entry.product.stock_quantity == 0 {
                tracing::debug!(
                    product = %local_line.product_uuid,
                    "skipping out-of-stock product during cart sync"
                );

                continue;
            }

            records.push(LineRecord {
                uuid: local_line.uuid,
                product_uuid: local_line.product_uuid,
                name: entry.product.name.clone(),
                variant: local_line.variant,
                unit_price_minor: entry.product.effective_price().to_minor_units(),
                list_price_minor: entry.product.price.to_minor_units(),
                quantity: local_line.quantity.clamp(1, entry.product.stock_quantity),
                stock_quantity: entry.product.stock_quantity,
            });
        }

        self.repository.persist(user, records).await?;

        Ok(())
    }

    /// Re-capture effective and list prices from the catalog for every line
    /// whose product still exists. Returns the number of lines that changed.
    ///
    /// # Errors
    ///
    /// Returns an error when a collaborator fails.
    pub async fn refresh_prices(&self, user: UserUuid) -> Result<usize, CartsServiceError> {
        let mut records = self.repository.fetch(user).await?;
        let mut changed = 0_usize;

        for record in &mut records {
            let entry = match self.catalog.find(record.product_uuid).await {
                Ok(entry) => entry,
                // A vanished product is validate()'s concern, not a reason to
                // fail the whole refresh.
                Err(CatalogError::NotFound) => continue,
                Err(error) => return Err(error.into()),
            };

            let unit = entry.product.effective_price().to_minor_units();
            let list = entry.product.price.to_minor_units();

            if record.unit_price_minor != unit || record.list_price_minor != list {
                record.unit_price_minor = unit;
                record.list_price_minor = list;
                changed += 1;
            }
        }

        if changed > 0 {
            self.repository.persist(user, records).await?;

            tracing::debug!(user = %user.as_uuid(), changed, "refreshed cart prices");
        }

        Ok(changed)
    }

    async fn find_product(&self, product_uuid: Uuid) -> Result<CatalogEntry, CartsServiceError> {
        self.catalog
            .find(product_uuid)
            .await
            .map_err(|error| match error {
                CatalogError::NotFound => CartsServiceError::UnknownProduct,
                other => CartsServiceError::Catalog(other),
            })
    }

    async fn assemble(&self, records: &[LineRecord]) -> Result<Assembled, CartsServiceError> {
        let currency = self.policy.currency();
        let mut cart = Cart::new(currency);
        let mut ids = FxHashMap::default();

        for record in records {
            let entry = self.find_product(record.product_uuid).await?;

            let update = cart.add(NewLine {
                product: entry.key,
                name: record.name.clone(),
                variant: record.variant.clone(),
                quantity: record.quantity,
                unit_price: Money::from_minor(record.unit_price_minor, currency),
                list_price: Money::from_minor(record.list_price_minor, currency),
                stock_quantity: record.stock_quantity,
            })?;

            ids.insert(
                update.key,
                LineIds {
                    line: record.uuid,
                    product: record.product_uuid,
                },
            );
        }

        Ok(Assembled { cart, ids })
    }
}

fn to_records(
    cart: &Cart<'static>,
    ids: &FxHashMap<LineKey, LineIds>,
) -> Result<Vec<LineRecord>, CartsServiceError> {
    cart.iter()
        .map(|(key, line)| {
            let line_ids = ids.get(&key).ok_or(CartsServiceError::LineNotFound)?;

            Ok(LineRecord {
                uuid: line_ids.line,
                product_uuid: line_ids.product,
                name: line.name().to_string(),
                variant: line.variant().cloned(),
                unit_price_minor: line.unit_price().to_minor_units(),
                list_price_minor: line.list_price().to_minor_units(),
                quantity: line.quantity(),
                stock_quantity: line.stock_quantity(),
            })
        })
        .collect()
}
