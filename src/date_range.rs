// Calendar date intervals and the booking-window contract shared by all offer details

use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::OfferError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// Input formats accepted at the boundary, tried in order
const DATE_INPUT_FORMATS: [&str; 2] = [DATE_FORMAT, "%d.%m.%Y"];

// Inclusive interval of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(with = "serde_date")]
    start: NaiveDate,
    #[serde(with = "serde_date")]
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, OfferError> {
        if start > end {
            return Err(OfferError::Validation(format!(
                "date range starts after it ends: {} > {}",
                format_date(start),
                format_date(end)
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    pub fn intersection(&self, other: &DateRange) -> Option<DateRange> {
        if !self.overlaps(other) {
            return None;
        }
        Some(DateRange {
            start: self.start.max(other.start),
            end: self.end.min(other.end),
        })
    }

    // Number of nights between the first and last day.
    pub fn nights(&self) -> i64 {
        days_between(self.start, self.end)
    }
}

// Signed day count from `from` to `to`; negative when `to` precedes `from`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

// When a guest may book an offer, independent of the stay window.
//
// Either a minimum lead time or an explicit booking period is expected to be
// set. With neither, the offer is always bookable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingWindow {
    #[serde(default, with = "serde_opt_date")]
    pub booking_date_start: Option<NaiveDate>,
    #[serde(default, with = "serde_opt_date")]
    pub booking_date_end: Option<NaiveDate>,
    #[serde(default)]
    pub booking_min_days: Option<u32>,
}

impl BookingWindow {
    pub fn min_days(days: u32) -> Self {
        Self {
            booking_min_days: Some(days),
            ..Self::default()
        }
    }

    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            booking_date_start: Some(start),
            booking_date_end: Some(end),
            booking_min_days: None,
        }
    }

    // Lead time in days, if one is configured. Zero counts as unset.
    pub fn effective_min_days(&self) -> Option<u32> {
        self.booking_min_days.filter(|days| *days > 0)
    }

    // Compares calendar dates: an offer ending on `today + min_days` is still
    // open for the whole of `today`, not only until midnight.
    pub fn is_open(&self, today: NaiveDate, offer_to: NaiveDate) -> bool {
        if let Some(days) = self.effective_min_days() {
            return today
                .checked_add_days(Days::new(u64::from(days)))
                .map_or(false, |earliest_stay| earliest_stay <= offer_to);
        }

        if let (Some(start), Some(end)) = (self.booking_date_start, self.booking_date_end) {
            return start <= today && today <= end;
        }

        true
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_datetime(datetime: NaiveDateTime) -> String {
    datetime.format(DATETIME_FORMAT).to_string()
}

// Parse a calendar date, accepting a trailing time component.
pub fn parse_date(input: &str) -> Result<NaiveDate, OfferError> {
    let input = input.trim();

    if let Ok(datetime) = NaiveDateTime::parse_from_str(input, DATETIME_FORMAT) {
        return Ok(datetime.date());
    }

    DATE_INPUT_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(input, format).ok())
        .ok_or_else(|| OfferError::Validation(format!("malformed date: {:?}", input)))
}

pub fn parse_datetime(input: &str) -> Result<NaiveDateTime, OfferError> {
    let input = input.trim();

    NaiveDateTime::parse_from_str(input, DATETIME_FORMAT)
        .or_else(|_| parse_date(input).map(|date| date.and_time(chrono::NaiveTime::MIN)))
        .map_err(|_| OfferError::Validation(format!("malformed timestamp: {:?}", input)))
}

pub mod serde_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_date(&raw).map_err(serde::de::Error::custom)
    }
}

pub mod serde_opt_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => serializer.serialize_str(&super::format_date(*date)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) if !raw.trim().is_empty() => super::parse_date(&raw)
                .map(Some)
                .map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}

pub mod serde_datetime {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        datetime: &NaiveDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_datetime(*datetime))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_datetime(&raw).map_err(serde::de::Error::custom)
    }
}
