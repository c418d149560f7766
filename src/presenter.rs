// Maps offers into the external JSON shape

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::PresenterConfig;
use crate::cost_group::CostGroup;
use crate::date_range::{serde_date, serde_datetime, BookingWindow};
use crate::details::{BonusNightsInfo, EarlyBookingInfo, OfferDetails, SpecialSeasonInfo};
use crate::error::OfferError;
use crate::offer::{Offer, OfferPayload};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferRecord {
    pub id: u64,
    #[serde(with = "serde_date")]
    pub date_start: NaiveDate,
    #[serde(with = "serde_date")]
    pub date_end: NaiveDate,
    #[serde(with = "serde_datetime")]
    pub created_at: NaiveDateTime,
    #[serde(rename = "type")]
    pub offer_type: String,
    pub details: Option<DetailsRecord>,
    pub hotel_id: u64,
    pub rooms: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DetailsRecord {
    BonusNights(BonusNightsRecord),
    EarlyBooking(EarlyBookingRecord),
    SpecialSeason(SpecialSeasonRecord),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusNightsRecord {
    pub id: String,
    #[serde(flatten)]
    pub window: BookingWindow,
    pub required_nights_count: u32,
    pub free_nights_count: u32,
    pub can_multiple: bool,
    #[serde(with = "serde_datetime")]
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarlyBookingRecord {
    pub id: String,
    #[serde(flatten)]
    pub window: BookingWindow,
    pub required_nights_count: u32,
    pub discount: u32,
    pub can_multiple: bool,
    #[serde(with = "serde_datetime")]
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialSeasonRecord {
    pub id: String,
    #[serde(flatten)]
    pub window: BookingWindow,
    pub required_nights_count: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price_nett: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub price_sell: Decimal,
    pub currency: String,
    pub can_multiple: bool,
    #[serde(with = "serde_datetime")]
    pub created_at: NaiveDateTime,
}

// Min-days of zero render as null
fn window_record(window: &BookingWindow) -> BookingWindow {
    BookingWindow {
        booking_min_days: window.effective_min_days(),
        ..window.clone()
    }
}

impl From<&BonusNightsInfo> for BonusNightsRecord {
    fn from(details: &BonusNightsInfo) -> Self {
        Self {
            id: format!("bonus-nights-{}", details.id),
            window: window_record(&details.window),
            required_nights_count: details.required_nights_count,
            free_nights_count: details.free_nights_count,
            can_multiple: details.can_multiple,
            created_at: details.created_at,
        }
    }
}

impl From<&EarlyBookingInfo> for EarlyBookingRecord {
    fn from(details: &EarlyBookingInfo) -> Self {
        Self {
            id: format!("early-booking-{}", details.id),
            window: window_record(&details.window),
            required_nights_count: details.required_nights_count,
            discount: details.discount,
            can_multiple: details.can_multiple,
            created_at: details.created_at,
        }
    }
}

impl SpecialSeasonRecord {
    fn new(details: &SpecialSeasonInfo, cost_group: &dyn CostGroup) -> Self {
        Self {
            id: format!("special-season-{}", details.id),
            window: window_record(&details.window),
            required_nights_count: details.required_nights_count,
            price_nett: details.price_nett,
            price_sell: cost_group.calculate_sell(details.price_nett),
            currency: details.currency.clone(),
            can_multiple: details.can_multiple,
            created_at: details.created_at,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct OfferPresenter {
    config: PresenterConfig,
}

impl OfferPresenter {
    pub fn new(config: PresenterConfig) -> Self {
        Self { config }
    }

    pub fn present(
        &self,
        offer: &Offer,
        cost_group: &dyn CostGroup,
    ) -> Result<OfferRecord, OfferError> {
        let details = match offer.payload() {
            OfferPayload::Loaded(details) => Some(match details {
                OfferDetails::BonusNights(d) => DetailsRecord::BonusNights(d.into()),
                OfferDetails::EarlyBooking(d) => DetailsRecord::EarlyBooking(d.into()),
                OfferDetails::SpecialSeason(d) => {
                    DetailsRecord::SpecialSeason(SpecialSeasonRecord::new(d, cost_group))
                }
            }),
            OfferPayload::Unrecognized(_) if self.config.omit_unknown_details => None,
            _ => {
                offer.loaded_details()?;
                None
            }
        };

        Ok(OfferRecord {
            id: offer.id(),
            date_start: offer.from_date(),
            date_end: offer.to_date(),
            created_at: offer.created_at(),
            offer_type: offer.type_tag().to_string(),
            details,
            hotel_id: offer.hotel_id(),
            rooms: offer.room_ids().collect(),
        })
    }

    // Present a list, looking up the cost group of each offer's hotel.
    pub fn present_all<F>(
        &self,
        offers: &[Offer],
        mut cost_group_for: F,
    ) -> Result<Vec<OfferRecord>, OfferError>
    where
        F: FnMut(u64) -> Arc<dyn CostGroup>,
    {
        offers
            .iter()
            .map(|offer| {
                let cost_group = cost_group_for(offer.hotel_id());
                self.present(offer, cost_group.as_ref())
            })
            .collect()
    }

    pub fn to_json(&self, records: &[OfferRecord]) -> Result<String, OfferError> {
        Ok(serde_json::to_string(records)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost_group::MarkupCostGroup;
    use crate::date_range::BookingWindow;
    use crate::details::OfferType;
    use crate::offer::fixtures::*;
    use crate::offer::OfferRow;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn markup() -> MarkupCostGroup {
        MarkupCostGroup::new("default", dec!(20))
    }

    fn unknown_offer() -> Offer {
        Offer::try_from(OfferRow {
            id: 9,
            hotel_id: 10,
            partner_id: None,
            offer_type: "LAST_MINUTE".to_string(),
            from_date: date("2024-06-01"),
            to_date: date("2024-06-30"),
            created_at: created(),
            room_ids: vec![],
            bonus_nights_info: None,
            early_booking_info: None,
            special_season_info: None,
        })
        .unwrap()
    }

    #[test]
    fn test_early_booking_exact_json() {
        let mut details = early_booking(3, 15);
        details.window = BookingWindow::between(date("2024-01-01"), date("2024-03-31"));
        details.required_nights_count = 7;
        let offer = Offer::new(
            42,
            10,
            period("2024-06-01", "2024-08-31"),
            created(),
            details,
        )
        .with_rooms([102, 101]);

        let record = OfferPresenter::default().present(&offer, &markup()).unwrap();
        let rendered = serde_json::to_string(&record).unwrap();

        assert_eq!(
            rendered,
            concat!(
                r#"{"id":42,"date_start":"2024-06-01","date_end":"2024-08-31","#,
                r#""created_at":"2024-01-15 10:30:00","type":"EARLY_BOOKING","#,
                r#""details":{"id":"early-booking-3","booking_date_start":"2024-01-01","#,
                r#""booking_date_end":"2024-03-31","booking_min_days":null,"#,
                r#""required_nights_count":7,"discount":15,"can_multiple":false,"#,
                r#""created_at":"2024-01-15 10:30:00"},"hotel_id":10,"rooms":[101,102]}"#
            )
        );
    }

    #[test]
    fn test_bonus_nights_record() {
        let mut details = bonus_nights(7, 3, 1);
        details.window = BookingWindow::min_days(0);
        let offer = Offer::new(1, 10, period("2024-06-01", "2024-06-30"), created(), details);

        let record = OfferPresenter::default().present(&offer, &markup()).unwrap();
        let value = serde_json::to_value(&record.details).unwrap();

        assert_eq!(
            value,
            json!({
                "id": "bonus-nights-7",
                "booking_date_start": null,
                "booking_date_end": null,
                "booking_min_days": null,
                "required_nights_count": 3,
                "free_nights_count": 1,
                "can_multiple": true,
                "created_at": "2024-01-15 10:30:00"
            })
        );
    }

    #[test]
    fn test_special_season_sell_price() {
        let offer = Offer::new(
            5,
            10,
            period("2024-06-01", "2024-06-30"),
            created(),
            special_season(11, dec!(100)),
        );

        let record = OfferPresenter::default().present(&offer, &markup()).unwrap();
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["details"]["id"], json!("special-season-11"));
        assert_eq!(value["details"]["price_nett"], json!(100.0));
        assert_eq!(value["details"]["price_sell"], json!(120.0));
        assert_eq!(value["details"]["currency"], json!("EUR"));
        assert_eq!(value["details"]["booking_date_start"], json!("2024-03-01"));
        assert_eq!(value["details"]["booking_min_days"], json!(null));
    }

    #[test]
    fn test_min_days_rendered_when_positive() {
        let offer = Offer::new(
            1,
            10,
            period("2024-06-01", "2024-06-30"),
            created(),
            early_booking(1, 15),
        );
        let value = serde_json::to_value(
            OfferPresenter::default().present(&offer, &markup()).unwrap(),
        )
        .unwrap();
        assert_eq!(value["details"]["booking_min_days"], json!(30));
    }

    #[test]
    fn test_unknown_type_omits_details() {
        let record = OfferPresenter::default()
            .present(&unknown_offer(), &markup())
            .unwrap();
        assert_eq!(record.offer_type, "LAST_MINUTE");
        assert_eq!(record.details, None);

        let strict = OfferPresenter::new(PresenterConfig {
            omit_unknown_details: false,
        });
        assert!(matches!(
            strict.present(&unknown_offer(), &markup()),
            Err(OfferError::DataIntegrity(_))
        ));
    }

    #[test]
    fn test_unloaded_details_fail() {
        let offer = Offer::unloaded(
            1,
            10,
            period("2024-06-01", "2024-06-30"),
            created(),
            OfferType::BonusNights,
        );
        assert!(matches!(
            OfferPresenter::default().present(&offer, &markup()),
            Err(OfferError::DataIntegrity(_))
        ));
    }

    #[test]
    fn test_present_all_uses_hotel_cost_group() {
        let offers = vec![
            Offer::new(1, 10, period("2024-06-01", "2024-06-30"), created(), special_season(1, dec!(100))),
            Offer::new(2, 20, period("2024-06-01", "2024-06-30"), created(), special_season(2, dec!(100))),
        ];
        let premium: Arc<dyn CostGroup> = Arc::new(MarkupCostGroup::new("premium", dec!(50)));
        let default: Arc<dyn CostGroup> = Arc::new(markup());

        let records = OfferPresenter::default()
            .present_all(&offers, |hotel_id| {
                if hotel_id == 20 {
                    Arc::clone(&premium)
                } else {
                    Arc::clone(&default)
                }
            })
            .unwrap();

        let sells: Vec<Decimal> = records
            .iter()
            .filter_map(|record| match &record.details {
                Some(DetailsRecord::SpecialSeason(d)) => Some(d.price_sell),
                _ => None,
            })
            .collect();
        assert_eq!(sells, vec![dec!(120), dec!(150)]);
    }

    #[test]
    fn test_json_array_decodes_back() {
        let presenter = OfferPresenter::default();
        let offers = vec![
            Offer::new(1, 10, period("2024-06-01", "2024-06-30"), created(), bonus_nights(1, 3, 1)),
            Offer::new(2, 10, period("2024-06-01", "2024-06-30"), created(), early_booking(2, 15)),
            unknown_offer(),
        ];
        let records = presenter
            .present_all(&offers, |_| -> Arc<dyn CostGroup> { Arc::new(markup()) })
            .unwrap();

        let json = presenter.to_json(&records).unwrap();
        let decoded: Vec<OfferRecord> = serde_json::from_str(&json).unwrap();

        assert_eq!(decoded.len(), 3);
        assert!(matches!(decoded[0].details, Some(DetailsRecord::BonusNights(_))));
        assert!(matches!(decoded[1].details, Some(DetailsRecord::EarlyBooking(_))));
        assert_eq!(decoded[2].details, None);
    }
}
