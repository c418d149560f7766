// Cost groups convert net prices into sell prices for a hotel

use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::date_range::DateRange;

// A pricing tier. The markup algorithm is opaque to offers.
pub trait CostGroup: Send + Sync + 'static {
    fn name(&self) -> &str;

    fn calculate_sell(&self, net_price: Decimal) -> Decimal;
}

// Long-lived lookup of the default tiers.
pub trait CostGroupRegistry: Send + Sync + 'static {
    fn hotel_cost_group(&self) -> Arc<dyn CostGroup>;
}

// Percentage markup on top of the net price, rounded to cents
#[derive(Debug, Clone)]
pub struct MarkupCostGroup {
    name: String,
    markup_percent: Decimal,
}

impl MarkupCostGroup {
    pub fn new(name: impl Into<String>, markup_percent: Decimal) -> Self {
        Self {
            name: name.into(),
            markup_percent,
        }
    }

    pub fn markup_percent(&self) -> Decimal {
        self.markup_percent
    }
}

impl CostGroup for MarkupCostGroup {
    fn name(&self) -> &str {
        &self.name
    }

    fn calculate_sell(&self, net_price: Decimal) -> Decimal {
        let factor = Decimal::ONE + self.markup_percent / Decimal::ONE_HUNDRED;
        match net_price.checked_mul(factor) {
            Some(sell) => sell.round_dp(2),
            // Saturate instead of panicking on prices beyond the decimal range
            None if net_price.is_sign_negative() != factor.is_sign_negative() => Decimal::MIN,
            None => Decimal::MAX,
        }
    }
}

pub struct StaticCostGroupRegistry {
    hotel_default: Arc<dyn CostGroup>,
}

impl StaticCostGroupRegistry {
    pub fn new(hotel_default: Arc<dyn CostGroup>) -> Self {
        Self { hotel_default }
    }
}

impl CostGroupRegistry for StaticCostGroupRegistry {
    fn hotel_cost_group(&self) -> Arc<dyn CostGroup> {
        Arc::clone(&self.hotel_default)
    }
}

#[derive(Clone)]
pub struct Hotel {
    pub id: u64,
    pub name: String,
    // Hotels shown in promotional listings
    pub promo: bool,
    pub country_id: Option<u64>,
    pub type_cost_group: Option<Arc<dyn CostGroup>>,
}

impl Hotel {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            promo: false,
            country_id: None,
            type_cost_group: None,
        }
    }

    pub fn with_promo(mut self, promo: bool) -> Self {
        self.promo = promo;
        self
    }

    pub fn with_country(mut self, country_id: u64) -> Self {
        self.country_id = Some(country_id);
        self
    }

    pub fn with_cost_group(mut self, cost_group: Arc<dyn CostGroup>) -> Self {
        self.type_cost_group = Some(cost_group);
        self
    }
}

impl fmt::Debug for Hotel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hotel")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("promo", &self.promo)
            .field("country_id", &self.country_id)
            .field(
                "type_cost_group",
                &self.type_cost_group.as_ref().map(|group| group.name()),
            )
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotelSeason {
    pub id: u64,
    pub hotel_id: u64,
    pub period: DateRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotelRoom {
    pub id: u64,
    pub hotel_id: u64,
    pub name: String,
}

// The hotel's own cost group, else the registry default. Never fails.
pub fn resolve_cost_group(
    hotel: Option<&Hotel>,
    registry: &dyn CostGroupRegistry,
) -> Arc<dyn CostGroup> {
    match hotel.and_then(|hotel| hotel.type_cost_group.as_ref()) {
        Some(cost_group) => Arc::clone(cost_group),
        None => {
            debug!(
                hotel_id = hotel.map(|hotel| hotel.id),
                "hotel has no cost group, using registry default"
            );
            registry.hotel_cost_group()
        }
    }
}
