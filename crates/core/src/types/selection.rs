//! Service selection state.
//!
//! The selection is the customer's answer to "which services, which day, how
//! often, how many cans". The signup UI keeps a serialized snapshot of this
//! state across pages and submits it at checkout time; the webhook later
//! reads the same shape back out of the payment processor's metadata.
//!
//! State is updated through transition methods that re-establish the
//! invariant before returning: a disabled service always has quantity 0, no
//! frequency, and no pickup day.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::service::{Frequency, ServiceType, Weekday};

/// Per-service configuration within a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ServiceConfig {
    /// Whether the customer wants this service at all.
    #[serde(default)]
    pub enabled: bool,
    /// Pickup day. `None` until the customer picks one.
    #[serde(default)]
    pub day: Option<Weekday>,
    /// Pickup cadence. `None` until the customer picks one.
    #[serde(default)]
    pub frequency: Option<Frequency>,
    /// Number of cans. At least 1 while enabled, 0 while disabled.
    #[serde(default)]
    pub quantity: u32,
}

/// Validation errors for a deserialized selection.
///
/// The selection arrives over the wire from the signup pages and is not
/// trusted; [`SelectionState::validate`] checks it before any money math.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SelectionError {
    /// An enabled service has no pickup day.
    #[error("{service} has no pickup day selected")]
    MissingDay {
        /// The offending service.
        service: ServiceType,
    },
    /// An enabled service has no pickup frequency.
    #[error("{service} has no pickup frequency selected")]
    MissingFrequency {
        /// The offending service.
        service: ServiceType,
    },
    /// An enabled service has zero cans.
    #[error("{service} is enabled with zero cans")]
    ZeroQuantity {
        /// The offending service.
        service: ServiceType,
    },
    /// A disabled service still carries a quantity or frequency.
    #[error("{service} is disabled but still configured")]
    DisabledResidue {
        /// The offending service.
        service: ServiceType,
    },
}

/// The customer's full service selection: one [`ServiceConfig`] per
/// [`ServiceType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SelectionState {
    #[serde(default)]
    pub trash: ServiceConfig,
    #[serde(default)]
    pub recycling: ServiceConfig,
    #[serde(default)]
    pub compost: ServiceConfig,
}

impl SelectionState {
    /// A selection with all services disabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the configuration for a service.
    #[must_use]
    pub const fn get(&self, service: ServiceType) -> &ServiceConfig {
        match service {
            ServiceType::Trash => &self.trash,
            ServiceType::Recycling => &self.recycling,
            ServiceType::Compost => &self.compost,
        }
    }

    const fn get_mut(&mut self, service: ServiceType) -> &mut ServiceConfig {
        match service {
            ServiceType::Trash => &mut self.trash,
            ServiceType::Recycling => &mut self.recycling,
            ServiceType::Compost => &mut self.compost,
        }
    }

    /// Enable a service, seeding quantity 1 if it was at zero.
    ///
    /// Day and frequency stay unset until the customer picks them.
    pub fn enable(&mut self, service: ServiceType) {
        let config = self.get_mut(service);
        config.enabled = true;
        if config.quantity == 0 {
            config.quantity = 1;
        }
    }

    /// Disable a service, clearing its day, frequency, and quantity.
    pub fn disable(&mut self, service: ServiceType) {
        *self.get_mut(service) = ServiceConfig::default();
    }

    /// Set the pickup day for an enabled service. No-op while disabled.
    pub fn set_day(&mut self, service: ServiceType, day: Weekday) {
        let config = self.get_mut(service);
        if config.enabled {
            config.day = Some(day);
        }
    }

    /// Set the pickup frequency for an enabled service. No-op while disabled.
    pub fn set_frequency(&mut self, service: ServiceType, frequency: Frequency) {
        let config = self.get_mut(service);
        if config.enabled {
            config.frequency = Some(frequency);
        }
    }

    /// Set the can count for an enabled service. Setting 0 disables the
    /// service. No-op while disabled.
    pub fn set_quantity(&mut self, service: ServiceType, quantity: u32) {
        if !self.get(service).enabled {
            return;
        }
        if quantity == 0 {
            self.disable(service);
        } else {
            self.get_mut(service).quantity = quantity;
        }
    }

    /// Iterate over the enabled services.
    pub fn enabled_services(&self) -> impl Iterator<Item = ServiceType> + '_ {
        ServiceType::ALL
            .into_iter()
            .filter(|service| self.get(*service).enabled)
    }

    /// `true` when no service is enabled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.enabled_services().next().is_none()
    }

    /// `true` when another *enabled* service has the same (set) pickup day.
    ///
    /// This is the single same-day predicate used by pricing: a service
    /// sharing its day with another one is picked up by a truck that is
    /// already on the street.
    #[must_use]
    pub fn shares_day(&self, service: ServiceType) -> bool {
        let Some(day) = self.get(service).day else {
            return false;
        };
        self.enabled_services()
            .filter(|other| *other != service)
            .any(|other| self.get(other).day == Some(day))
    }

    /// Validate an untrusted selection (e.g. one deserialized from a form
    /// snapshot or payment-processor metadata).
    ///
    /// # Errors
    ///
    /// Returns the first [`SelectionError`] found, naming the offending
    /// service.
    pub fn validate(&self) -> Result<(), SelectionError> {
        for service in ServiceType::ALL {
            let config = self.get(service);
            if config.enabled {
                if config.day.is_none() {
                    return Err(SelectionError::MissingDay { service });
                }
                if config.frequency.is_none() {
                    return Err(SelectionError::MissingFrequency { service });
                }
                if config.quantity == 0 {
                    return Err(SelectionError::ZeroQuantity { service });
                }
            } else if config.quantity != 0 || config.frequency.is_some() {
                return Err(SelectionError::DisabledResidue { service });
            }
        }
        Ok(())
    }
}
