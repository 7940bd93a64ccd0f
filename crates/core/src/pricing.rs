//! Monthly pricing for a service selection.
//!
//! One engine serves both the live form quote and the server-side totals at
//! checkout time, so the number the customer sees is the number they are
//! charged for.
//!
//! # Pricing policy
//!
//! Every subscription pays a flat monthly base fee. Each enabled service
//! adds `rate[frequency] * quantity`, where the per-can monthly rates are
//! Weekly 10, Biweekly 5, Monthly 2.50. The per-can rate is **doubled** for
//! a service that does not share its pickup day with another enabled
//! service ("solo-day" pickup); services sharing a day bill at the base rate
//! because the truck is already on the street.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Frequency, SelectionState, ServiceType};

/// Monthly per-can rate for a pickup frequency, in dollars.
#[must_use]
pub fn monthly_rate(frequency: Frequency) -> Decimal {
    match frequency {
        Frequency::Weekly => Decimal::new(10, 0),
        Frequency::Biweekly => Decimal::new(5, 0),
        Frequency::Monthly => Decimal::new(250, 2),
    }
}

/// Tunable pricing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Flat monthly base fee charged on every subscription.
    pub base_fee: Decimal,
}

impl PricingConfig {
    /// Create a config with the given base fee.
    #[must_use]
    pub const fn new(base_fee: Decimal) -> Self {
        Self { base_fee }
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            base_fee: Decimal::new(39, 0),
        }
    }
}

/// Monthly price for a single enabled service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceQuote {
    /// The service being priced.
    pub service: ServiceType,
    /// Monthly price in dollars.
    pub monthly_price: Decimal,
}

/// A full monthly quote for a selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// The flat base fee.
    pub base_fee: Decimal,
    /// One entry per enabled service.
    pub services: Vec<ServiceQuote>,
    /// Base fee plus all service prices.
    pub total: Decimal,
}

/// Pure pricing engine over a [`SelectionState`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PricingEngine {
    config: PricingConfig,
}

impl PricingEngine {
    /// Create an engine with the given config.
    #[must_use]
    pub const fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    /// The configured base fee.
    #[must_use]
    pub const fn base_fee(&self) -> Decimal {
        self.config.base_fee
    }

    /// Monthly price for one service within the selection.
    ///
    /// Disabled services, zero quantities, and unset frequencies all price
    /// to zero. The solo-day doubling consults the whole selection through
    /// [`SelectionState::shares_day`].
    #[must_use]
    pub fn price_for(&self, state: &SelectionState, service: ServiceType) -> Decimal {
        let config = state.get(service);
        if !config.enabled || config.quantity == 0 {
            return Decimal::ZERO;
        }
        let Some(frequency) = config.frequency else {
            return Decimal::ZERO;
        };

        let mut price = monthly_rate(frequency) * Decimal::from(config.quantity);
        if !state.shares_day(service) {
            price *= Decimal::TWO;
        }
        price
    }

    /// Full monthly quote for the selection.
    ///
    /// The quote always includes the base fee, so an all-disabled selection
    /// totals exactly the base fee.
    #[must_use]
    pub fn quote(&self, state: &SelectionState) -> Quote {
        let services: Vec<ServiceQuote> = state
            .enabled_services()
            .map(|service| ServiceQuote {
                service,
                monthly_price: self.price_for(state, service),
            })
            .collect();

        let total = self.config.base_fee
            + services
                .iter()
                .map(|quote| quote.monthly_price)
                .sum::<Decimal>();

        Quote {
            base_fee: self.config.base_fee,
            services,
            total,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Weekday;

    fn engine() -> PricingEngine {
        PricingEngine::new(PricingConfig::default())
    }

    #[test]
    fn test_all_disabled_totals_base_fee() {
        let quote = engine().quote(&SelectionState::new());
        assert_eq!(quote.total, Decimal::new(39, 0));
        assert!(quote.services.is_empty());
    }

    #[test]
    fn test_solo_day_doubles_rate() {
        // Trash, Weekly, 2 cans, no other service on that day:
        // 10 * 2 * 2 = 40.
        let mut state = SelectionState::new();
        state.enable(ServiceType::Trash);
        state.set_day(ServiceType::Trash, Weekday::Monday);
        state.set_frequency(ServiceType::Trash, Frequency::Weekly);
        state.set_quantity(ServiceType::Trash, 2);

        assert_eq!(
            engine().price_for(&state, ServiceType::Trash),
            Decimal::new(40, 0)
        );
    }

    #[test]
    fn test_shared_day_bills_base_rate() {
        let mut state = SelectionState::new();
        state.enable(ServiceType::Trash);
        state.set_day(ServiceType::Trash, Weekday::Monday);
        state.set_frequency(ServiceType::Trash, Frequency::Weekly);
        state.set_quantity(ServiceType::Trash, 2);
        state.enable(ServiceType::Recycling);
        state.set_day(ServiceType::Recycling, Weekday::Monday);
        state.set_frequency(ServiceType::Recycling, Frequency::Biweekly);
        state.set_quantity(ServiceType::Recycling, 1);

        let engine = engine();
        // Trash shares Monday with recycling: 10 * 2 = 20.
        assert_eq!(
            engine.price_for(&state, ServiceType::Trash),
            Decimal::new(20, 0)
        );
        // Recycling shares too: 5 * 1 = 5.
        assert_eq!(
            engine.price_for(&state, ServiceType::Recycling),
            Decimal::new(5, 0)
        );
        // Total: 39 + 20 + 5.
        assert_eq!(engine.quote(&state).total, Decimal::new(64, 0));
    }

    #[test]
    fn test_monthly_rate_is_fractional() {
        let mut state = SelectionState::new();
        state.enable(ServiceType::Compost);
        state.set_day(ServiceType::Compost, Weekday::Thursday);
        state.set_frequency(ServiceType::Compost, Frequency::Monthly);
        state.set_quantity(ServiceType::Compost, 1);

        // Solo day: 2.50 * 1 * 2 = 5.00.
        assert_eq!(
            engine().price_for(&state, ServiceType::Compost),
            Decimal::new(500, 2)
        );
    }

    #[test]
    fn test_unset_frequency_prices_zero() {
        let mut state = SelectionState::new();
        state.enable(ServiceType::Trash);
        state.set_day(ServiceType::Trash, Weekday::Monday);
        state.set_quantity(ServiceType::Trash, 3);

        assert_eq!(engine().price_for(&state, ServiceType::Trash), Decimal::ZERO);
    }

    #[test]
    fn test_disabled_prices_zero_regardless_of_frequency() {
        let state = SelectionState::new();
        for service in ServiceType::ALL {
            assert_eq!(engine().price_for(&state, service), Decimal::ZERO);
        }
    }

    #[test]
    fn test_quote_respects_custom_base_fee() {
        let engine = PricingEngine::new(PricingConfig::new(Decimal::new(29, 0)));
        let quote = engine.quote(&SelectionState::new());
        assert_eq!(quote.total, Decimal::new(29, 0));
    }

    #[test]
    fn test_three_services_mixed_days() {
        let mut state = SelectionState::new();
        for service in ServiceType::ALL {
            state.enable(service);
            state.set_frequency(service, Frequency::Weekly);
            state.set_quantity(service, 1);
        }
        state.set_day(ServiceType::Trash, Weekday::Monday);
        state.set_day(ServiceType::Recycling, Weekday::Monday);
        state.set_day(ServiceType::Compost, Weekday::Friday);

        let quote = engine().quote(&state);
        // Trash and recycling share Monday (10 each); compost is solo (20).
        assert_eq!(quote.total, Decimal::new(39 + 10 + 10 + 20, 0));
    }
}
