//! Checkout line-item construction.
//!
//! Maps a validated selection to the (price-identifier, quantity) pairs the
//! payment processor's hosted checkout expects. Price identifiers are
//! deployment configuration - the signup service loads them from the
//! environment and hands them in as a [`PriceTable`].

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use crate::types::{Frequency, SelectionState, ServiceType};

/// Mapping from (service, frequency) to a payment-processor price id, plus
/// the base-fee price id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceTable {
    base: String,
    prices: HashMap<(ServiceType, Frequency), String>,
}

impl PriceTable {
    /// Create a table with only the base-fee price id.
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            prices: HashMap::new(),
        }
    }

    /// Register the price id for a (service, frequency) pair.
    pub fn insert(
        &mut self,
        service: ServiceType,
        frequency: Frequency,
        price_id: impl Into<String>,
    ) {
        self.prices.insert((service, frequency), price_id.into());
    }

    /// The base-fee price id.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Look up the price id for a (service, frequency) pair.
    #[must_use]
    pub fn get(&self, service: ServiceType, frequency: Frequency) -> Option<&str> {
        self.prices
            .get(&(service, frequency))
            .map(String::as_str)
    }
}

/// One hosted-checkout line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineItem {
    /// Payment-processor price identifier.
    pub price_id: String,
    /// Quantity (can count; 1 for the base fee).
    pub quantity: u32,
}

/// Errors building line items.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LineItemError {
    /// The price table has no entry for an enabled (service, frequency)
    /// pair. A misconfigured deploy must not reach checkout with a partial
    /// cart.
    #[error("no price configured for {service} {frequency}")]
    UnmappedPrice {
        /// The service missing a price id.
        service: ServiceType,
        /// The frequency missing a price id.
        frequency: Frequency,
    },
}

/// Build the hosted-checkout line items for a selection.
///
/// The base-fee item is always emitted first with quantity 1. Each enabled
/// service with a set frequency and a quantity of at least 1 adds one item;
/// disabled and zero-quantity services emit nothing.
///
/// # Errors
///
/// Returns [`LineItemError::UnmappedPrice`] when an enabled (service,
/// frequency) pair has no price id in the table.
pub fn build_line_items(
    state: &SelectionState,
    table: &PriceTable,
) -> Result<Vec<LineItem>, LineItemError> {
    let mut items = vec![LineItem {
        price_id: table.base().to_owned(),
        quantity: 1,
    }];

    for service in state.enabled_services() {
        let config = state.get(service);
        if config.quantity == 0 {
            continue;
        }
        let Some(frequency) = config.frequency else {
            continue;
        };
        let price_id = table
            .get(service, frequency)
            .ok_or(LineItemError::UnmappedPrice { service, frequency })?;
        items.push(LineItem {
            price_id: price_id.to_owned(),
            quantity: config.quantity,
        });
    }

    Ok(items)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Weekday;

    fn full_table() -> PriceTable {
        let mut table = PriceTable::new("price_base");
        for service in ServiceType::ALL {
            for frequency in Frequency::ALL {
                table.insert(service, frequency, format!("price_{service}_{frequency}"));
            }
        }
        table
    }

    #[test]
    fn test_empty_selection_emits_only_base_fee() {
        let items = build_line_items(&SelectionState::new(), &full_table()).unwrap();
        assert_eq!(
            items,
            vec![LineItem {
                price_id: "price_base".to_owned(),
                quantity: 1
            }]
        );
    }

    #[test]
    fn test_enabled_services_emit_items() {
        let mut state = SelectionState::new();
        state.enable(ServiceType::Trash);
        state.set_day(ServiceType::Trash, Weekday::Monday);
        state.set_frequency(ServiceType::Trash, Frequency::Weekly);
        state.set_quantity(ServiceType::Trash, 2);
        state.enable(ServiceType::Compost);
        state.set_day(ServiceType::Compost, Weekday::Friday);
        state.set_frequency(ServiceType::Compost, Frequency::Monthly);

        let items = build_line_items(&state, &full_table()).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items.first().unwrap().price_id, "price_base");
        assert!(items.iter().any(|item| item.price_id == "price_trash_weekly"
            && item.quantity == 2));
        assert!(items
            .iter()
            .any(|item| item.price_id == "price_compost_monthly" && item.quantity == 1));
    }

    #[test]
    fn test_unset_frequency_emits_nothing() {
        let mut state = SelectionState::new();
        state.enable(ServiceType::Recycling);
        state.set_day(ServiceType::Recycling, Weekday::Tuesday);

        let items = build_line_items(&state, &full_table()).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_unmapped_pair_fails() {
        let mut state = SelectionState::new();
        state.enable(ServiceType::Recycling);
        state.set_day(ServiceType::Recycling, Weekday::Tuesday);
        state.set_frequency(ServiceType::Recycling, Frequency::Biweekly);

        let table = PriceTable::new("price_base");
        assert_eq!(
            build_line_items(&state, &table),
            Err(LineItemError::UnmappedPrice {
                service: ServiceType::Recycling,
                frequency: Frequency::Biweekly,
            })
        );
    }
}
