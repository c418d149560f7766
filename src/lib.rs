// Hotel promotional offers: availability, required nights, pricing and JSON presentation

pub mod api;
pub mod clock;
pub mod config;
pub mod cost_group;
pub mod date_range;
pub mod details;
pub mod error;
pub mod offer;
pub mod presenter;
pub mod service;

// Re-export key types for convenience
pub use api::OffersApi;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{OffersConfig, PresenterConfig};
pub use cost_group::{
    resolve_cost_group, CostGroup, CostGroupRegistry, Hotel, HotelRoom, HotelSeason,
    MarkupCostGroup, StaticCostGroupRegistry,
};
pub use date_range::{days_between, BookingWindow, DateRange};
pub use details::{BonusNightsInfo, EarlyBookingInfo, OfferDetails, OfferType, SpecialSeasonInfo};
pub use error::OfferError;
pub use offer::{Offer, OfferPayload, OfferRow, UNKNOWN_TYPE};
pub use presenter::{DetailsRecord, OfferPresenter, OfferRecord};
pub use service::{InMemoryOffersService, OffersService};
