//! Comptoir Demo
//!
//! A scripted storefront session in the terminal: fill a cart from the demo
//! catalog, apply a coupon, then walk the checkout steps and place the order
//! against the in-memory backend.

use std::{fs, path::PathBuf, process};

use clap::Parser;
use rustc_hash::FxHashMap;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use comptoir::{
    checkout::address::ShippingAddress,
    coupons::CouponBook,
    fixtures::{
        checkout::CheckoutFixture, coupons::CouponsFixture, pricing::PricingPolicyFixture,
        products::ProductsFixture,
    },
    pricing::{self, PricingPolicy},
};
use comptoir_app::{
    context::AppContext,
    domain::{
        carts::{
            records::UserUuid,
            service::{CouponOutcome, PricedCart},
        },
        products::InMemoryProductCatalog,
    },
};

const PRODUCTS_FIXTURE_YAML: &str = include_str!("../../../fixtures/products/demo.yml");
const COUPONS_FIXTURE_YAML: &str = include_str!("../../../fixtures/coupons/demo.yml");
const PRICING_FIXTURE_YAML: &str = include_str!("../../../fixtures/pricing/demo.yml");
const CHECKOUT_FIXTURE_YAML: &str = include_str!("../../../fixtures/checkout/demo.yml");

#[derive(Debug, Parser)]
#[command(name = "comptoir-demo", about = "Comptoir storefront demo", long_about = None)]
struct Cli {
    /// Coupon code to apply at the cart step
    #[arg(long, default_value = "PROMO10")]
    coupon: String,

    /// Directory holding fixture YAML files; bundled fixtures when omitted
    #[arg(long, env = "COMPTOIR_FIXTURES")]
    fixtures: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(error) = run(cli).await {
        eprintln!("{error}");
        process::exit(1);
    }
}

struct Fixtures {
    products: String,
    coupons: String,
    pricing: String,
    checkout: String,
}

fn load_fixtures(dir: Option<&PathBuf>) -> Result<Fixtures, String> {
    let Some(dir) = dir else {
        return Ok(Fixtures {
            products: PRODUCTS_FIXTURE_YAML.to_string(),
            coupons: COUPONS_FIXTURE_YAML.to_string(),
            pricing: PRICING_FIXTURE_YAML.to_string(),
            checkout: CHECKOUT_FIXTURE_YAML.to_string(),
        });
    };

    let read = |name: &str| {
        fs::read_to_string(dir.join(name))
            .map_err(|error| format!("failed to read fixture {name}: {error}"))
    };

    Ok(Fixtures {
        products: read("products/demo.yml")?,
        coupons: read("coupons/demo.yml")?,
        pricing: read("pricing/demo.yml")?,
        checkout: read("checkout/demo.yml")?,
    })
}

struct DemoData {
    ctx: AppContext,
    product_uuids: FxHashMap<String, Uuid>,
}

fn build_context(fixtures: &Fixtures) -> Result<DemoData, String> {
    let products = ProductsFixture::from_yaml(&fixtures.products)
        .map_err(|error| format!("failed to parse products fixture: {error}"))?;

    let (catalog, product_uuids) = InMemoryProductCatalog::from_fixture(products)
        .map_err(|error| format!("failed to build product catalog: {error}"))?;

    let coupons = CouponsFixture::from_yaml(&fixtures.coupons)
        .and_then(CouponBook::try_from)
        .map_err(|error| format!("failed to build coupon book: {error}"))?;

    let policy = PricingPolicyFixture::from_yaml(&fixtures.pricing)
        .and_then(PricingPolicy::try_from)
        .map_err(|error| format!("failed to build pricing policy: {error}"))?;

    let (delivery, payment) = CheckoutFixture::from_yaml(&fixtures.checkout)
        .and_then(CheckoutFixture::into_catalogs)
        .map_err(|error| format!("failed to build checkout catalogs: {error}"))?;

    Ok(DemoData {
        ctx: AppContext::in_memory(catalog, coupons, policy, delivery, payment),
        product_uuids,
    })
}

async fn run(cli: Cli) -> Result<(), String> {
    let fixtures = load_fixtures(cli.fixtures.as_ref())?;
    let DemoData { ctx, product_uuids } = build_context(&fixtures)?;

    let user = UserUuid::new(Uuid::now_v7());

    let product = |fixture_key: &str| {
        product_uuids
            .get(fixture_key)
            .copied()
            .ok_or_else(|| format!("fixture key not found: {fixture_key}"))
    };

    // A small basket first, below the free-shipping threshold.
    ctx.carts
        .add_item(user, product("usb-c-cable")?, None, 1)
        .await
        .map_err(|error| format!("failed to add item: {error}"))?;

    let priced = ctx
        .carts
        .summary(user, None)
        .await
        .map_err(|error| format!("failed to price cart: {error}"))?;

    println!("Small basket:");
    print_cart(&ctx, user, &priced).await?;

    if let Some(remaining) =
        pricing::remaining_for_free_shipping(priced.summary.subtotal(), ctx.carts.policy())
            .map_err(|error| format!("failed to compute free-shipping gap: {error}"))?
    {
        println!("Spend {remaining} more for free shipping.\n");
    }

    // The cart-page scenario: phone plus two headsets, with a coupon.
    ctx.carts
        .add_item(user, product("samsung-galaxy-s23")?, None, 1)
        .await
        .map_err(|error| format!("failed to add item: {error}"))?;

    let headsets = ctx
        .carts
        .add_item(user, product("sony-wh-1000xm4")?, None, 2)
        .await
        .map_err(|error| format!("failed to add item: {error}"))?;

    if headsets.was_clamped() {
        println!("Note: headset quantity was reduced to available stock.");
    }

    let priced = ctx
        .carts
        .summary(user, Some(&cli.coupon))
        .await
        .map_err(|error| format!("failed to price cart: {error}"))?;

    match &priced.coupon {
        CouponOutcome::Applied(code) => println!("Coupon {code} applied."),
        CouponOutcome::Unrecognised(code) => {
            println!("Coupon code {code} was not recognised; no discount applied.");
        }
        CouponOutcome::NotRequested => {}
    }

    println!("Full basket:");
    print_cart(&ctx, user, &priced).await?;

    let issues = ctx
        .carts
        .validate(user)
        .await
        .map_err(|error| format!("failed to validate cart: {error}"))?;

    for issue in &issues {
        println!("Cart issue: {issue:?}");
    }

    // Checkout: address, delivery, payment, place the order.
    let mut session = ctx.checkout.begin(priced.summary.clone());

    let address = ShippingAddress {
        full_name: "Aïcha Soglo".to_string(),
        phone: "+229 0123456789".to_string(),
        address: "Rue 12.080, Quartier Gbegamey".to_string(),
        city: "Cotonou".to_string(),
        ..ShippingAddress::default()
    };

    session
        .set_address(address)
        .map_err(|error| format!("failed to set address: {error}"))?;

    session
        .advance()
        .map_err(|error| format!("failed to leave the address step: {error}"))?;

    println!("\nDelivery options:");

    for option in ctx.checkout.delivery_catalog().iter() {
        println!(
            "  {} - {} ({}, {})",
            option.id, option.name, option.price, option.estimated_days
        );
    }

    ctx.checkout
        .select_delivery(&mut session, "express")
        .map_err(|error| format!("failed to select delivery: {error}"))?;

    session
        .advance()
        .map_err(|error| format!("failed to leave the delivery step: {error}"))?;

    println!("\nPayment methods:");

    for method in ctx.checkout.payment_catalog().iter() {
        println!("  {} - {} ({})", method.id, method.name, method.description);
    }

    ctx.checkout
        .select_payment(&mut session, "mobile-money")
        .map_err(|error| format!("failed to select payment: {error}"))?;

    let total_due = session
        .total_due(ctx.checkout.delivery_catalog())
        .map_err(|error| format!("failed to compute the amount due: {error}"))?;

    println!("\nAmount due with express delivery: {total_due}");

    let reference = ctx
        .checkout
        .place_order(user, &mut session)
        .await
        .map_err(|error| format!("failed to place order: {error}"))?;

    println!("Order confirmed: {reference}");

    let remaining_lines = ctx
        .carts
        .lines(user)
        .await
        .map_err(|error| format!("failed to fetch cart: {error}"))?;

    println!(
        "Cart now holds {} line(s); thank you for shopping.",
        remaining_lines.len()
    );

    Ok(())
}

async fn print_cart(ctx: &AppContext, user: UserUuid, priced: &PricedCart) -> Result<(), String> {
    let cart = ctx
        .carts
        .cart(user)
        .await
        .map_err(|error| format!("failed to load cart: {error}"))?;

    let table = priced
        .summary
        .render_table(&cart)
        .map_err(|error| format!("failed to render cart: {error}"))?;

    println!("{table}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn bundled_fixtures_build_a_context() -> TestResult {
        let fixtures = load_fixtures(None)?;
        let data = build_context(&fixtures)?;

        assert_eq!(data.ctx.catalog.len(), data.product_uuids.len());

        Ok(())
    }

    #[tokio::test]
    async fn scripted_session_runs_to_confirmation() -> TestResult {
        let cli = Cli {
            coupon: "PROMO10".to_string(),
            fixtures: None,
        };

        run(cli).await?;

        Ok(())
    }
}
