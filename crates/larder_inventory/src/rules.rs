//! The inventory rule set.
//!
//! Sixteen rules over stock, demand, supplier, order, and category facts.
//! Two of them retract the stock fact they matched: negative stock is
//! discarded as invalid, and depleted stock is removed once sales are
//! blocked. Every other rule only emits a notification.

use std::sync::Arc;

use larder_engine::{ActionContext, Notification, Rule, RuleRegistry, Template};
use larder_foundation::{DemandLevel, FactKind, Result, fields};

/// Rule names, in registration order.
pub mod names {
    /// Negative stock is invalid and is retracted.
    pub const INVALID_STOCK: &str = "invalid-stock";
    /// Stock of zero blocks sales and is retracted.
    pub const STOCK_DEPLETED: &str = "stock-depleted";
    /// Stock below 5.
    pub const URGENT_RESTOCK: &str = "urgent-restock";
    /// High demand with stock below 20.
    pub const HIGH_DEMAND_LOW_STOCK: &str = "high-demand-low-stock";
    /// An order larger than the stock on hand.
    pub const ORDER_EXCEEDS_STOCK: &str = "order-exceeds-stock";
    /// A critical product with stock below 10.
    pub const CRITICAL_PRODUCT: &str = "critical-product";
    /// Stock in `5..10`.
    pub const SCHEDULED_RESTOCK: &str = "scheduled-restock";
    /// The known unreliable supplier with stock below 10.
    pub const UNRELIABLE_SUPPLIER_LOW_STOCK: &str = "unreliable-supplier-low-stock";
    /// A supplier scored below the reliability threshold, with stock below 10.
    pub const UNRELIABLE_SUPPLIER_SCORE: &str = "unreliable-supplier-score";
    /// Low demand with stock above 30.
    pub const LOW_DEMAND_OVERSTOCK: &str = "low-demand-overstock";
    /// Medium demand with stock below 10.
    pub const MEDIUM_DEMAND_LOW_STOCK: &str = "medium-demand-low-stock";
    /// Stock of 50 or more.
    pub const OVERSTOCK: &str = "overstock";
    /// Stock below 5 from anyone but the main supplier.
    pub const ALTERNATIVE_SUPPLIER: &str = "alternative-supplier";
    /// Perishable product with stock above 30.
    pub const PERISHABLE_OVERSTOCK: &str = "perishable-overstock";
    /// An order the stock on hand can cover.
    pub const ORDER_COVERED: &str = "order-covered";
    /// Non-perishable product with stock below 5.
    pub const NON_PERISHABLE_CRITICAL: &str = "non-perishable-critical";
}

/// Supplier flagged as unreliable by name.
pub const UNRELIABLE_SUPPLIER: &str = "ProveedorX";
/// Supplier to fall back on when stock runs out.
pub const MAIN_SUPPLIER: &str = "ProveedorPrincipal";
/// Category of perishable products.
pub const PERISHABLE: &str = "Perecedero";
/// Category of non-perishable products.
pub const NON_PERISHABLE: &str = "NoPerecedero";
/// Category of critical products.
pub const CRITICAL: &str = "Crítico";
/// Reliability scores below this mark a supplier as unreliable.
pub const RELIABILITY_THRESHOLD: f64 = 4.0;

// Variables shared by the templates below.
const P: &str = "p";
const C: &str = "c";
const Q: &str = "q";
const S: &str = "s";
const N: &str = "n";
const R: &str = "r";

/// Builds the full inventory rule set.
#[must_use]
pub fn inventory_rules() -> Vec<Rule> {
    vec![
        Rule::new(names::INVALID_STOCK)
            .salience(100)
            .when(stock().alias("fact"))
            .guard(|b| Ok(b.int(C)? < 0))
            .then(|ctx| {
                stock_notice(ctx, "invalid-stock")?;
                ctx.retract_alias("fact")
            }),
        Rule::new(names::STOCK_DEPLETED)
            .salience(50)
            .when(stock().alias("fact"))
            .guard(|b| Ok(b.int(C)? == 0))
            .then(|ctx| {
                stock_notice(ctx, "block-sales")?;
                ctx.retract_alias("fact")
            }),
        Rule::new(names::URGENT_RESTOCK)
            .salience(40)
            .when(stock())
            .guard(|b| Ok(b.int(C)? < 5))
            .then(|ctx| stock_notice(ctx, "restock-urgent")),
        Rule::new(names::HIGH_DEMAND_LOW_STOCK)
            .salience(35)
            .when(demand(DemandLevel::High))
            .when(stock())
            .guard(|b| Ok(b.int(C)? < 20))
            .then(|ctx| stock_notice(ctx, "increase-order")),
        Rule::new(names::ORDER_EXCEEDS_STOCK)
            .salience(35)
            .when(order())
            .when(order_stock())
            .guard(|b| Ok(b.int(Q)? > b.int(S)?))
            .then(|ctx| order_notice(ctx, "generate-restock")),
        Rule::new(names::CRITICAL_PRODUCT)
            .salience(35)
            .when(category(CRITICAL))
            .when(stock())
            .guard(|b| Ok(b.int(C)? < 10))
            .then(|ctx| stock_notice(ctx, "restock-immediately")),
        Rule::new(names::SCHEDULED_RESTOCK)
            .salience(30)
            .when(stock())
            .guard(|b| Ok((5..10).contains(&b.int(C)?)))
            .then(|ctx| stock_notice(ctx, "schedule-restock")),
        Rule::new(names::UNRELIABLE_SUPPLIER_LOW_STOCK)
            .salience(30)
            .when(
                Template::new(FactKind::Supplier)
                    .bind(fields::PRODUCT, P)
                    .field(fields::NAME, UNRELIABLE_SUPPLIER),
            )
            .when(stock())
            .guard(|b| Ok(b.int(C)? < 10))
            .then(|ctx| {
                let note = stock_notification(ctx, "consider-other-supplier")?
                    .with_detail("supplier", UNRELIABLE_SUPPLIER);
                ctx.notify(note);
                Ok(())
            }),
        Rule::new(names::UNRELIABLE_SUPPLIER_SCORE)
            .salience(30)
            .when(supplier())
            .when(
                Template::new(FactKind::SupplierReliability)
                    .bind(fields::NAME, N)
                    .bind(fields::SCORE, R),
            )
            .when(stock())
            .guard(|b| Ok(b.number(R)? < RELIABILITY_THRESHOLD && b.int(C)? < 10))
            .then(|ctx| {
                let supplier = ctx.bindings().text(N)?.to_string();
                let score = ctx.bindings().number(R)?;
                let note = stock_notification(ctx, "replace-supplier")?
                    .with_detail("supplier", supplier)
                    .with_detail("reliability", score);
                ctx.notify(note);
                Ok(())
            }),
        Rule::new(names::LOW_DEMAND_OVERSTOCK)
            .salience(25)
            .when(demand(DemandLevel::Low))
            .when(stock())
            .guard(|b| Ok(b.int(C)? > 30))
            .then(|ctx| stock_notice(ctx, "reduce-purchases")),
        Rule::new(names::MEDIUM_DEMAND_LOW_STOCK)
            .salience(25)
            .when(demand(DemandLevel::Medium))
            .when(stock())
            .guard(|b| Ok(b.int(C)? < 10))
            .then(|ctx| stock_notice(ctx, "restock-moderately")),
        Rule::new(names::OVERSTOCK)
            .salience(20)
            .when(stock())
            .guard(|b| Ok(b.int(C)? >= 50))
            .then(|ctx| stock_notice(ctx, "promote")),
        Rule::new(names::ALTERNATIVE_SUPPLIER)
            .salience(20)
            .when(supplier())
            .when(stock())
            .guard(|b| Ok(b.int(C)? < 5 && b.text(N)? != MAIN_SUPPLIER))
            .then(|ctx| {
                let supplier = ctx.bindings().text(N)?.to_string();
                let note = stock_notification(ctx, "consult-main-supplier")?
                    .with_detail("supplier", supplier);
                ctx.notify(note);
                Ok(())
            }),
        Rule::new(names::PERISHABLE_OVERSTOCK)
            .salience(20)
            .when(category(PERISHABLE))
            .when(stock())
            .guard(|b| Ok(b.int(C)? > 30))
            .then(|ctx| stock_notice(ctx, "promote-perishable")),
        Rule::new(names::ORDER_COVERED)
            .salience(15)
            .when(order())
            .when(order_stock())
            .guard(|b| Ok(b.int(Q)? <= b.int(S)?))
            .then(|ctx| order_notice(ctx, "order-covered")),
        Rule::new(names::NON_PERISHABLE_CRITICAL)
            .salience(15)
            .when(category(NON_PERISHABLE))
            .when(stock())
            .guard(|b| Ok(b.int(C)? < 5))
            .then(|ctx| stock_notice(ctx, "restock-without-urgency")),
    ]
}

/// Builds a shareable registry holding [`inventory_rules`].
///
/// # Errors
/// Returns `InvalidRule` if the rule set fails validation.
pub fn inventory_registry() -> Result<Arc<RuleRegistry>> {
    let registry = RuleRegistry::builder()
        .register_all(inventory_rules())?
        .build();
    Ok(Arc::new(registry))
}

// =============================================================================
// Templates
// =============================================================================

fn stock() -> Template {
    Template::new(FactKind::Stock)
        .bind(fields::PRODUCT, P)
        .bind(fields::QUANTITY, C)
}

fn order_stock() -> Template {
    Template::new(FactKind::Stock)
        .bind(fields::PRODUCT, P)
        .bind(fields::QUANTITY, S)
}

fn order() -> Template {
    Template::new(FactKind::Order)
        .bind(fields::PRODUCT, P)
        .bind(fields::QUANTITY, Q)
}

fn demand(level: DemandLevel) -> Template {
    Template::new(FactKind::Demand)
        .bind(fields::PRODUCT, P)
        .field(fields::LEVEL, level)
}

fn supplier() -> Template {
    Template::new(FactKind::Supplier)
        .bind(fields::PRODUCT, P)
        .bind(fields::NAME, N)
}

fn category(name: &str) -> Template {
    Template::new(FactKind::Category)
        .bind(fields::PRODUCT, P)
        .field(fields::NAME, name)
}

// =============================================================================
// Notifications
// =============================================================================

fn stock_notification(ctx: &ActionContext<'_>, code: &str) -> Result<Notification> {
    let bindings = ctx.bindings();
    Ok(ctx
        .notification(code)
        .with_product(bindings.text(P)?)
        .with_quantity(bindings.int(C)?))
}

fn stock_notice(ctx: &mut ActionContext<'_>, code: &str) -> Result<()> {
    let note = stock_notification(ctx, code)?;
    ctx.notify(note);
    Ok(())
}

fn order_notice(ctx: &mut ActionContext<'_>, code: &str) -> Result<()> {
    let bindings = ctx.bindings();
    let note = ctx
        .notification(code)
        .with_product(bindings.text(P)?)
        .with_quantity(bindings.int(Q)?)
        .with_detail("stock", bindings.int(S)?);
    ctx.notify(note);
    Ok(())
}
