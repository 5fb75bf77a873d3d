//! Structured notifications emitted by rule actions.
//!
//! The engine never formats user-facing text. Actions build a
//! [`Notification`] and the execution loop hands it to whatever
//! [`NotificationSink`] the caller supplied.

use std::fmt;
use std::sync::Arc;

use larder_foundation::Value;
use tracing::info;

/// A structured event emitted by a firing rule.
#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    /// Name of the rule that emitted it.
    pub rule: Arc<str>,
    /// Short machine-readable event code.
    pub code: Arc<str>,
    /// Product the event concerns, if any.
    pub product: Option<Arc<str>>,
    /// Quantity context, if any.
    pub quantity: Option<i64>,
    /// Additional named values.
    pub details: Vec<(Arc<str>, Value)>,
}

impl Notification {
    /// Creates a notification with no product or quantity context.
    #[must_use]
    pub fn new(rule: impl Into<Arc<str>>, code: impl Into<Arc<str>>) -> Self {
        Self {
            rule: rule.into(),
            code: code.into(),
            product: None,
            quantity: None,
            details: Vec::new(),
        }
    }

    /// Sets the product.
    #[must_use]
    pub fn with_product(mut self, product: impl Into<Arc<str>>) -> Self {
        self.product = Some(product.into());
        self
    }

    /// Sets the quantity.
    #[must_use]
    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// Adds a named detail value.
    #[must_use]
    pub fn with_detail(mut self, name: impl Into<Arc<str>>, value: impl Into<Value>) -> Self {
        self.details.push((name.into(), value.into()));
        self
    }

    /// Returns a detail value by name.
    #[must_use]
    pub fn detail(&self, name: &str) -> Option<&Value> {
        self.details
            .iter()
            .find(|(n, _)| n.as_ref() == name)
            .map(|(_, v)| v)
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.rule, self.code)?;
        if let Some(product) = &self.product {
            write!(f, " product={product}")?;
        }
        if let Some(quantity) = self.quantity {
            write!(f, " quantity={quantity}")?;
        }
        for (name, value) in &self.details {
            write!(f, " {name}={value}")?;
        }
        Ok(())
    }
}

// =============================================================================
// Sinks
// =============================================================================

/// Receives notifications as rules fire.
pub trait NotificationSink {
    /// Handles one notification.
    fn notify(&mut self, notification: &Notification);
}

impl<F> NotificationSink for F
where
    F: FnMut(&Notification),
{
    fn notify(&mut self, notification: &Notification) {
        self(notification);
    }
}

/// Discards every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn notify(&mut self, _notification: &Notification) {}
}

/// Keeps notifications in memory, in emission order.
#[derive(Clone, Debug, Default)]
pub struct CollectingSink {
    notifications: Vec<Notification>,
}

impl CollectingSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the collected notifications.
    #[must_use]
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Returns the notifications emitted by one rule.
    pub fn from_rule<'a>(&'a self, rule: &'a str) -> impl Iterator<Item = &'a Notification> {
        self.notifications
            .iter()
            .filter(move |n| n.rule.as_ref() == rule)
    }

    /// Consumes the sink, returning the notifications.
    #[must_use]
    pub fn into_inner(self) -> Vec<Notification> {
        self.notifications
    }
}

impl NotificationSink for CollectingSink {
    fn notify(&mut self, notification: &Notification) {
        self.notifications.push(notification.clone());
    }
}

/// Emits each notification as a `tracing` event.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&mut self, notification: &Notification) {
        info!(
            target: "larder::notify",
            rule = %notification.rule,
            code = %notification.code,
            product = notification.product.as_deref(),
            quantity = notification.quantity,
            "{notification}"
        );
    }
}
