// Offer lookup: the collaborator that supplies pre-loaded offers for a date window

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use tracing::{debug, instrument};

use crate::clock::{Clock, SystemClock};
use crate::config::OffersConfig;
use crate::cost_group::Hotel;
use crate::date_range::DateRange;
use crate::error::OfferError;
use crate::offer::Offer;

#[async_trait]
pub trait OffersService: Send + Sync + 'static {
    // Offers of the given hotels touching [date_from, date_to], details loaded,
    // ordered by stay window
    async fn get_offers(
        &self,
        hotel_ids: &[u64],
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> Result<Vec<Offer>, OfferError>;

    async fn hotel(&self, hotel_id: u64) -> Option<Hotel>;

    async fn find_all_by_hotel(&self, hotel_id: u64, only_actual: bool) -> Vec<Offer>;

    async fn count_by_hotel(&self, hotel_id: u64) -> usize;

    // Offers of every hotel located in the country, ordered by stay window
    async fn find_all_by_country(&self, country_id: u64) -> Vec<Offer>;

    async fn count_by_country(&self, country_id: u64) -> usize;
}

pub struct InMemoryOffersService<C: Clock = SystemClock> {
    config: OffersConfig,
    clock: C,
    hotels: DashMap<u64, Hotel>,
    // Keyed by hotel id
    offers: DashMap<u64, Vec<Offer>>,
}

impl InMemoryOffersService<SystemClock> {
    pub fn new(config: OffersConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> InMemoryOffersService<C> {
    pub fn with_clock(config: OffersConfig, clock: C) -> Self {
        Self {
            config,
            clock,
            hotels: DashMap::new(),
            offers: DashMap::new(),
        }
    }

    pub fn insert_hotel(&self, hotel: Hotel) -> Option<Hotel> {
        self.hotels.insert(hotel.id, hotel)
    }

    // Store an offer, replacing one with the same id.
    pub fn insert_offer(&self, offer: Offer) -> Option<Offer> {
        let previous = self.remove_offer(offer.id());
        self.offers.entry(offer.hotel_id()).or_default().push(offer);
        previous
    }

    // Drop an offer together with its details and room assignments.
    pub fn remove_offer(&self, offer_id: u64) -> Option<Offer> {
        for mut entry in self.offers.iter_mut() {
            if let Some(position) = entry.iter().position(|offer| offer.id() == offer_id) {
                return Some(entry.remove(position));
            }
        }
        None
    }

    fn hotel_is_listed(&self, hotel_id: u64) -> bool {
        if !self.config.only_promo_hotels {
            return true;
        }
        self.hotels
            .get(&hotel_id)
            .map_or(false, |hotel| hotel.promo)
    }

    fn hotels_in_country(&self, country_id: u64) -> Vec<u64> {
        self.hotels
            .iter()
            .filter(|hotel| hotel.country_id == Some(country_id))
            .map(|hotel| hotel.id)
            .collect()
    }

    fn sorted(mut offers: Vec<Offer>) -> Vec<Offer> {
        offers.sort_by_key(|offer| (offer.from_date(), offer.to_date(), offer.id()));
        offers
    }
}

#[async_trait]
impl<C: Clock> OffersService for InMemoryOffersService<C> {
    #[instrument(skip(self))]
    async fn get_offers(
        &self,
        hotel_ids: &[u64],
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> Result<Vec<Offer>, OfferError> {
        let requested = DateRange::new(date_from, date_to)?;
        let today = self.clock.today();

        let mut result = Vec::new();
        for hotel_id in hotel_ids {
            if !self.hotel_is_listed(*hotel_id) {
                continue;
            }
            let Some(offers) = self.offers.get(hotel_id) else {
                continue;
            };
            result.extend(
                offers
                    .iter()
                    .filter(|offer| !self.config.only_actual || offer.is_actual(today))
                    .filter(|offer| offer.period().overlaps(&requested))
                    .cloned(),
            );
        }

        debug!(count = result.len(), "offers selected");
        Ok(Self::sorted(result))
    }

    async fn hotel(&self, hotel_id: u64) -> Option<Hotel> {
        self.hotels.get(&hotel_id).map(|hotel| hotel.value().clone())
    }

    async fn find_all_by_hotel(&self, hotel_id: u64, only_actual: bool) -> Vec<Offer> {
        let today = self.clock.today();
        let offers = self
            .offers
            .get(&hotel_id)
            .map(|offers| {
                offers
                    .iter()
                    .filter(|offer| !only_actual || offer.is_actual(today))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Self::sorted(offers)
    }

    async fn count_by_hotel(&self, hotel_id: u64) -> usize {
        self.offers.get(&hotel_id).map_or(0, |offers| offers.len())
    }

    #[instrument(skip(self))]
    async fn find_all_by_country(&self, country_id: u64) -> Vec<Offer> {
        let mut result = Vec::new();
        for hotel_id in self.hotels_in_country(country_id) {
            if let Some(offers) = self.offers.get(&hotel_id) {
                result.extend(offers.iter().cloned());
            }
        }

        debug!(count = result.len(), "country offers selected");
        Self::sorted(result)
    }

    async fn count_by_country(&self, country_id: u64) -> usize {
        self.hotels_in_country(country_id)
            .into_iter()
            .map(|hotel_id| self.offers.get(&hotel_id).map_or(0, |offers| offers.len()))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::offer::fixtures::*;

    fn service(config: OffersConfig) -> InMemoryOffersService<FixedClock> {
        let service =
            InMemoryOffersService::with_clock(config, FixedClock::at_midnight(date("2024-06-15")));

        service.insert_hotel(Hotel::new(10, "Seaside").with_promo(true).with_country(1));
        service.insert_hotel(Hotel::new(20, "Downtown").with_country(2));

        // Ended before today
        service.insert_offer(Offer::new(1, 10, period("2024-05-01", "2024-06-10"), created(), early_booking(1, 10)));
        service.insert_offer(Offer::new(2, 10, period("2024-07-01", "2024-07-31"), created(), bonus_nights(2, 3, 1)));
        service.insert_offer(Offer::new(3, 10, period("2024-06-01", "2024-06-30"), created(), early_booking(3, 15)));
        service.insert_offer(Offer::new(4, 20, period("2024-06-20", "2024-09-30"), created(), bonus_nights(4, 6, 1)));
        service.insert_offer(Offer::new(5, 10, period("2024-10-01", "2024-10-31"), created(), bonus_nights(5, 2, 1)));
        service
    }

    fn ids(offers: &[Offer]) -> Vec<u64> {
        offers.iter().map(Offer::id).collect()
    }

    #[tokio::test]
    async fn test_get_offers_filters_and_orders() {
        let service = service(OffersConfig::default());

        let offers = service
            .get_offers(&[10, 20], date("2024-06-01"), date("2024-08-31"))
            .await
            .unwrap();
        assert_eq!(ids(&offers), vec![3, 4, 2]);
    }

    #[tokio::test]
    async fn test_get_offers_keeps_ended_when_not_only_actual() {
        let service = service(OffersConfig {
            only_actual: false,
            ..OffersConfig::default()
        });

        let offers = service
            .get_offers(&[10], date("2024-05-01"), date("2024-06-30"))
            .await
            .unwrap();
        assert_eq!(ids(&offers), vec![1, 3]);
    }

    #[tokio::test]
    async fn test_get_offers_only_promo_hotels() {
        let service = service(OffersConfig {
            only_promo_hotels: true,
            ..OffersConfig::default()
        });

        let offers = service
            .get_offers(&[10, 20, 30], date("2024-06-01"), date("2024-12-31"))
            .await
            .unwrap();
        assert_eq!(ids(&offers), vec![3, 2, 5]);
    }

    #[tokio::test]
    async fn test_offer_ending_today_is_not_actual() {
        let service = service(OffersConfig::default());
        service.insert_offer(Offer::new(6, 10, period("2024-06-01", "2024-06-15"), created(), early_booking(6, 5)));

        let offers = service
            .get_offers(&[10], date("2024-06-01"), date("2024-06-30"))
            .await
            .unwrap();
        assert_eq!(ids(&offers), vec![3]);
        assert!(!ids(&service.find_all_by_hotel(10, true).await).contains(&6));
        assert!(ids(&service.find_all_by_hotel(10, false).await).contains(&6));
    }

    #[tokio::test]
    async fn test_get_offers_rejects_inverted_window() {
        let service = service(OffersConfig::default());
        let result = service
            .get_offers(&[10], date("2024-08-01"), date("2024-06-01"))
            .await;
        assert!(matches!(result, Err(OfferError::Validation(_))));
    }

    #[tokio::test]
    async fn test_find_and_count_by_hotel() {
        let service = service(OffersConfig::default());

        assert_eq!(service.count_by_hotel(10).await, 4);
        assert_eq!(service.count_by_hotel(99).await, 0);
        assert_eq!(ids(&service.find_all_by_hotel(10, false).await), vec![1, 3, 2, 5]);
        assert_eq!(ids(&service.find_all_by_hotel(10, true).await), vec![3, 2, 5]);
    }

    #[tokio::test]
    async fn test_find_and_count_by_country() {
        let service = service(OffersConfig::default());
        service.insert_hotel(Hotel::new(30, "Harbour").with_country(2));
        service.insert_offer(Offer::new(7, 30, period("2024-06-25", "2024-07-05"), created(), bonus_nights(7, 2, 1)));

        assert_eq!(service.count_by_country(1).await, 4);
        assert_eq!(service.count_by_country(2).await, 2);
        assert_eq!(service.count_by_country(99).await, 0);
        assert_eq!(ids(&service.find_all_by_country(2).await), vec![4, 7]);
        assert!(service.find_all_by_country(99).await.is_empty());
    }

    #[tokio::test]
    async fn test_insert_replaces_and_remove_cascades() {
        let service = service(OffersConfig::default());

        // Same id, moved to another hotel
        let previous = service.insert_offer(Offer::new(
            3,
            20,
            period("2024-06-01", "2024-06-30"),
            created(),
            early_booking(3, 20),
        ));
        assert_eq!(previous.map(|offer| offer.hotel_id()), Some(10));
        assert_eq!(service.count_by_hotel(10).await, 3);
        assert_eq!(service.count_by_hotel(20).await, 2);

        let removed = service.remove_offer(3).unwrap();
        assert!(removed.details().is_some());
        assert!(service.remove_offer(3).is_none());
        assert_eq!(service.count_by_hotel(20).await, 1);
    }

    #[tokio::test]
    async fn test_hotel_lookup() {
        let service = service(OffersConfig::default());
        assert_eq!(service.hotel(10).await.map(|h| h.name), Some("Seaside".to_string()));
        assert!(service.hotel(99).await.is_none());
    }
}
