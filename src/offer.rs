// Offer aggregate: availability, required nights, pricing and descriptions

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::warn;

use crate::cost_group::{CostGroup, HotelRoom, HotelSeason};
use crate::date_range::{days_between, serde_date, serde_datetime, DateRange};
use crate::details::{
    BonusNightsInfo, EarlyBookingInfo, OfferDetails, OfferType, SpecialSeasonInfo,
};
use crate::error::OfferError;

pub const UNKNOWN_TYPE: &str = "Unknown type";

// What an offer carries besides its header.
#[derive(Debug, Clone, PartialEq)]
pub enum OfferPayload {
    Loaded(OfferDetails),
    // Known type, details relation not fetched
    NotLoaded(OfferType),
    // Type tag outside the known set; only produced when decoding rows
    Unrecognized(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Offer {
    id: u64,
    hotel_id: u64,
    partner_id: Option<u64>,
    period: DateRange,
    created_at: NaiveDateTime,
    // Empty means every room of the hotel
    room_ids: BTreeSet<u64>,
    payload: OfferPayload,
}

impl Offer {
    pub fn new(
        id: u64,
        hotel_id: u64,
        period: DateRange,
        created_at: NaiveDateTime,
        details: impl Into<OfferDetails>,
    ) -> Self {
        Self {
            id,
            hotel_id,
            partner_id: None,
            period,
            created_at,
            room_ids: BTreeSet::new(),
            payload: OfferPayload::Loaded(details.into()),
        }
    }

    // An offer whose details have not been fetched yet.
    pub fn unloaded(
        id: u64,
        hotel_id: u64,
        period: DateRange,
        created_at: NaiveDateTime,
        offer_type: OfferType,
    ) -> Self {
        Self {
            id,
            hotel_id,
            partner_id: None,
            period,
            created_at,
            room_ids: BTreeSet::new(),
            payload: OfferPayload::NotLoaded(offer_type),
        }
    }

    pub fn with_partner(mut self, partner_id: u64) -> Self {
        self.partner_id = Some(partner_id);
        self
    }

    pub fn with_rooms(mut self, room_ids: impl IntoIterator<Item = u64>) -> Self {
        self.room_ids = room_ids.into_iter().collect();
        self
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn hotel_id(&self) -> u64 {
        self.hotel_id
    }

    pub fn partner_id(&self) -> Option<u64> {
        self.partner_id
    }

    pub fn period(&self) -> DateRange {
        self.period
    }

    pub fn from_date(&self) -> NaiveDate {
        self.period.start()
    }

    pub fn to_date(&self) -> NaiveDate {
        self.period.end()
    }

    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    pub fn room_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.room_ids.iter().copied()
    }

    pub fn payload(&self) -> &OfferPayload {
        &self.payload
    }

    // The type tag as stored, including unrecognized ones.
    pub fn type_tag(&self) -> &str {
        match &self.payload {
            OfferPayload::Loaded(details) => details.offer_type().as_str(),
            OfferPayload::NotLoaded(offer_type) => offer_type.as_str(),
            OfferPayload::Unrecognized(raw) => raw,
        }
    }

    pub fn offer_type(&self) -> Option<OfferType> {
        match &self.payload {
            OfferPayload::Loaded(details) => Some(details.offer_type()),
            OfferPayload::NotLoaded(offer_type) => Some(*offer_type),
            OfferPayload::Unrecognized(_) => None,
        }
    }

    pub fn details(&self) -> Option<&OfferDetails> {
        match &self.payload {
            OfferPayload::Loaded(details) => Some(details),
            _ => None,
        }
    }

    pub fn loaded_details(&self) -> Result<&OfferDetails, OfferError> {
        self.details().ok_or_else(|| {
            OfferError::DataIntegrity(format!(
                "offer {} of type {} has no details loaded",
                self.id,
                self.type_tag()
            ))
        })
    }

    // Fill in details for an offer loaded without them.
    pub fn attach_details(&mut self, details: impl Into<OfferDetails>) -> Result<(), OfferError> {
        let details = details.into();
        if self.offer_type() != Some(details.offer_type()) {
            return Err(OfferError::DataIntegrity(format!(
                "offer {} of type {} cannot take {} details",
                self.id,
                self.type_tag(),
                details.offer_type()
            )));
        }
        self.payload = OfferPayload::Loaded(details);
        Ok(())
    }

    // Change the offer kind. The type follows the new details.
    pub fn replace_details(&mut self, details: impl Into<OfferDetails>) -> Option<OfferDetails> {
        match std::mem::replace(&mut self.payload, OfferPayload::Loaded(details.into())) {
            OfferPayload::Loaded(previous) => Some(previous),
            _ => None,
        }
    }

    // Minimum stay needed to qualify for the offer.
    pub fn required_nights(&self) -> Result<u64, OfferError> {
        match &self.payload {
            OfferPayload::Loaded(details) => Ok(details.required_nights()),
            OfferPayload::Unrecognized(_) => Ok(1),
            OfferPayload::NotLoaded(_) => self.loaded_details().map(|d| d.required_nights()),
        }
    }

    // Whether the stay window has not ended yet.
    pub fn is_actual(&self, today: NaiveDate) -> bool {
        self.to_date() > today
    }

    pub fn is_available_now(&self, today: NaiveDate) -> Result<bool, OfferError> {
        let details = self.loaded_details()?;
        Ok(details.window().is_open(today, self.to_date()))
    }

    // Whether enough nights of the season remain inside the offer window.
    pub fn is_available_for_season(
        &self,
        season: &HotelSeason,
        today: NaiveDate,
    ) -> Result<bool, OfferError> {
        let required = self.required_nights()?;

        let offer_from = today.max(self.from_date());
        let window_start = offer_from.max(season.period.start());
        let window_end = self.to_date().min(season.period.end());

        // An inverted window has a negative count and never qualifies
        let nights = days_between(window_start, window_end);
        Ok(u64::try_from(nights).map_or(false, |nights| nights >= required))
    }

    pub fn is_available_for_room(&self, room: &HotelRoom) -> bool {
        self.room_ids.is_empty() || self.room_ids.contains(&room.id)
    }

    pub fn sell_price(&self, cost_group: &dyn CostGroup) -> Result<Decimal, OfferError> {
        match self.loaded_details()? {
            OfferDetails::SpecialSeason(details) => Ok(cost_group.calculate_sell(details.price_nett)),
            other => Err(OfferError::DataIntegrity(format!(
                "offer {} of type {} has no net price",
                self.id,
                other.offer_type()
            ))),
        }
    }

    pub fn type_label(&self) -> Result<&'static str, OfferError> {
        Ok(self.loaded_details()?.title())
    }

    pub fn description(&self) -> Result<String, OfferError> {
        let details = self.loaded_details()?;
        let mut text = format!("Special offer «{}».\n", details.title());
        if let Some(info) = details.info() {
            text.push_str(info);
            text.push_str(". ");
        }
        Ok(text)
    }

    // Short summary for the sell-side view.
    pub fn details_description(&self, cost_group: &dyn CostGroup) -> Option<String> {
        self.summarize(cost_group, |details| match details {
            OfferDetails::BonusNights(d) => Summary::Nights(d.required_nights_count, d.free_nights_count),
            OfferDetails::EarlyBooking(d) => Summary::Discount(d.discount),
            OfferDetails::SpecialSeason(d) => Summary::Price(d.price_nett, &d.currency),
        })
    }

    // Short summary for the partner net view.
    pub fn details_nett_description(&self, cost_group: &dyn CostGroup) -> Option<String> {
        self.summarize(cost_group, |details| match details {
            OfferDetails::BonusNights(d) => {
                Summary::Nights(d.required_nights_count_nett, d.free_nights_count_nett)
            }
            OfferDetails::EarlyBooking(d) => Summary::Discount(d.discount_nett),
            OfferDetails::SpecialSeason(d) => Summary::Price(d.price_partner_nett, &d.currency),
        })
    }

    fn summarize<'a>(
        &'a self,
        cost_group: &dyn CostGroup,
        pick: impl FnOnce(&'a OfferDetails) -> Summary<'a>,
    ) -> Option<String> {
        match &self.payload {
            OfferPayload::Loaded(details) => Some(match pick(details) {
                Summary::Nights(required, free) => format!("{} + {}", required, free),
                Summary::Discount(percent) => format!("{}%", percent),
                Summary::Price(net, currency) => format!(
                    "{} {} → {} {}",
                    net.normalize(),
                    currency,
                    cost_group.calculate_sell(net).normalize(),
                    currency
                ),
            }),
            OfferPayload::NotLoaded(_) => None,
            OfferPayload::Unrecognized(_) => Some(UNKNOWN_TYPE.to_string()),
        }
    }
}

enum Summary<'a> {
    Nights(u32, u32),
    Discount(u32),
    Price(Decimal, &'a str),
}

// Offer as stored: type tag plus one optional relation per offer kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferRow {
    pub id: u64,
    pub hotel_id: u64,
    #[serde(default)]
    pub partner_id: Option<u64>,
    #[serde(rename = "type")]
    pub offer_type: String,
    #[serde(with = "serde_date")]
    pub from_date: NaiveDate,
    #[serde(with = "serde_date")]
    pub to_date: NaiveDate,
    #[serde(with = "serde_datetime")]
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub room_ids: Vec<u64>,
    #[serde(default)]
    pub bonus_nights_info: Option<BonusNightsInfo>,
    #[serde(default)]
    pub early_booking_info: Option<EarlyBookingInfo>,
    #[serde(default)]
    pub special_season_info: Option<SpecialSeasonInfo>,
}

impl TryFrom<OfferRow> for Offer {
    type Error = OfferError;

    fn try_from(row: OfferRow) -> Result<Self, Self::Error> {
        let period = DateRange::new(row.from_date, row.to_date)?;

        // Only the relation matching the tag counts; the others are ignored
        let payload = match row.offer_type.parse::<OfferType>() {
            Ok(offer_type) => {
                let details = match offer_type {
                    OfferType::BonusNights => row.bonus_nights_info.map(OfferDetails::from),
                    OfferType::EarlyBooking => row.early_booking_info.map(OfferDetails::from),
                    OfferType::SpecialSeason => row.special_season_info.map(OfferDetails::from),
                };
                match details {
                    Some(details) => OfferPayload::Loaded(details),
                    None => {
                        warn!(offer_id = row.id, %offer_type, "offer row without matching details");
                        OfferPayload::NotLoaded(offer_type)
                    }
                }
            }
            Err(_) => {
                warn!(offer_id = row.id, offer_type = %row.offer_type, "unrecognized offer type");
                OfferPayload::Unrecognized(row.offer_type)
            }
        };

        Ok(Offer {
            id: row.id,
            hotel_id: row.hotel_id,
            partner_id: row.partner_id,
            period,
            created_at: row.created_at,
            room_ids: row.room_ids.into_iter().collect(),
            payload,
        })
    }
}
