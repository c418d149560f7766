// Type-specific offer payloads

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::date_range::{serde_datetime, BookingWindow};
use crate::error::OfferError;

// Offer kind, stored as a string tag in rows and JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OfferType {
    BonusNights,
    EarlyBooking,
    SpecialSeason,
}

impl OfferType {
    pub const fn all() -> [OfferType; 3] {
        [
            OfferType::BonusNights,
            OfferType::EarlyBooking,
            OfferType::SpecialSeason,
        ]
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            OfferType::BonusNights => "BONUS_NIGHTS",
            OfferType::EarlyBooking => "EARLY_BOOKING",
            OfferType::SpecialSeason => "SPECIAL_SEASON",
        }
    }

    // Human-readable title of the offer kind.
    pub const fn label(&self) -> &'static str {
        match self {
            OfferType::BonusNights => "Bonus nights",
            OfferType::EarlyBooking => "Early booking",
            OfferType::SpecialSeason => "Special season",
        }
    }
}

impl fmt::Display for OfferType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OfferType {
    type Err = OfferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OfferType::all()
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| OfferError::Validation(format!("unknown offer type: {:?}", s)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusNightsInfo {
    pub id: u64,
    #[serde(flatten)]
    pub window: BookingWindow,
    pub required_nights_count: u32,
    pub free_nights_count: u32,
    // Counts agreed with the partner, shown on the net view
    pub required_nights_count_nett: u32,
    pub free_nights_count_nett: u32,
    pub can_multiple: bool,
    #[serde(default)]
    pub info: Option<String>,
    #[serde(with = "serde_datetime")]
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarlyBookingInfo {
    pub id: u64,
    #[serde(flatten)]
    pub window: BookingWindow,
    pub required_nights_count: u32,
    // Percent
    pub discount: u32,
    pub discount_nett: u32,
    pub can_multiple: bool,
    #[serde(default)]
    pub info: Option<String>,
    #[serde(with = "serde_datetime")]
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialSeasonInfo {
    pub id: u64,
    #[serde(flatten)]
    pub window: BookingWindow,
    pub required_nights_count: u32,
    pub price_nett: Decimal,
    pub price_partner_nett: Decimal,
    // ISO 4217
    pub currency: String,
    pub can_multiple: bool,
    #[serde(default)]
    pub info: Option<String>,
    #[serde(with = "serde_datetime")]
    pub created_at: NaiveDateTime,
}

// The payload attached to an offer, one case per offer kind.
#[derive(Debug, Clone, PartialEq)]
pub enum OfferDetails {
    BonusNights(BonusNightsInfo),
    EarlyBooking(EarlyBookingInfo),
    SpecialSeason(SpecialSeasonInfo),
}

impl OfferDetails {
    pub fn offer_type(&self) -> OfferType {
        match self {
            OfferDetails::BonusNights(_) => OfferType::BonusNights,
            OfferDetails::EarlyBooking(_) => OfferType::EarlyBooking,
            OfferDetails::SpecialSeason(_) => OfferType::SpecialSeason,
        }
    }

    pub fn id(&self) -> u64 {
        match self {
            OfferDetails::BonusNights(d) => d.id,
            OfferDetails::EarlyBooking(d) => d.id,
            OfferDetails::SpecialSeason(d) => d.id,
        }
    }

    pub fn window(&self) -> &BookingWindow {
        match self {
            OfferDetails::BonusNights(d) => &d.window,
            OfferDetails::EarlyBooking(d) => &d.window,
            OfferDetails::SpecialSeason(d) => &d.window,
        }
    }

    pub fn info(&self) -> Option<&str> {
        let info = match self {
            OfferDetails::BonusNights(d) => d.info.as_deref(),
            OfferDetails::EarlyBooking(d) => d.info.as_deref(),
            OfferDetails::SpecialSeason(d) => d.info.as_deref(),
        };
        info.map(str::trim).filter(|text| !text.is_empty())
    }

    pub fn created_at(&self) -> NaiveDateTime {
        match self {
            OfferDetails::BonusNights(d) => d.created_at,
            OfferDetails::EarlyBooking(d) => d.created_at,
            OfferDetails::SpecialSeason(d) => d.created_at,
        }
    }

    pub fn title(&self) -> &'static str {
        self.offer_type().label()
    }

    pub fn can_multiple(&self) -> bool {
        match self {
            OfferDetails::BonusNights(d) => d.can_multiple,
            OfferDetails::EarlyBooking(d) => d.can_multiple,
            OfferDetails::SpecialSeason(d) => d.can_multiple,
        }
    }

    // Minimum stay needed to qualify. Bonus nights count the free ones too.
    // Widened so that the sum of two stored counts cannot overflow.
    pub fn required_nights(&self) -> u64 {
        match self {
            OfferDetails::BonusNights(d) => {
                u64::from(d.required_nights_count) + u64::from(d.free_nights_count)
            }
            OfferDetails::EarlyBooking(d) => u64::from(d.required_nights_count),
            OfferDetails::SpecialSeason(d) => u64::from(d.required_nights_count),
        }
    }
}

impl From<BonusNightsInfo> for OfferDetails {
    fn from(info: BonusNightsInfo) -> Self {
        OfferDetails::BonusNights(info)
    }
}

impl From<EarlyBookingInfo> for OfferDetails {
    fn from(info: EarlyBookingInfo) -> Self {
        OfferDetails::EarlyBooking(info)
    }
}

impl From<SpecialSeasonInfo> for OfferDetails {
    fn from(info: SpecialSeasonInfo) -> Self {
        OfferDetails::SpecialSeason(info)
    }
}
