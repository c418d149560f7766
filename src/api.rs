// Offer listing: coerces request parameters, loads offers and renders them as JSON

use futures::future::join_all;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::cost_group::{resolve_cost_group, CostGroup, CostGroupRegistry};
use crate::date_range::parse_date;
use crate::error::OfferError;
use crate::offer::Offer;
use crate::presenter::{OfferPresenter, OfferRecord};
use crate::service::OffersService;

pub struct OffersApi<S: OffersService, R: CostGroupRegistry> {
    service: Arc<S>,
    registry: Arc<R>,
    presenter: OfferPresenter,
}

impl<S: OffersService, R: CostGroupRegistry> OffersApi<S, R> {
    pub fn new(service: Arc<S>, registry: Arc<R>, presenter: OfferPresenter) -> Self {
        Self {
            service,
            registry,
            presenter,
        }
    }

    // JSON array of offers for the hotels within the date window.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        hotel_ids: &[&str],
        date_from: &str,
        date_to: &str,
    ) -> Result<String, OfferError> {
        let records = self.list_records(hotel_ids, date_from, date_to).await?;
        self.presenter.to_json(&records)
    }

    pub async fn list_records(
        &self,
        hotel_ids: &[&str],
        date_from: &str,
        date_to: &str,
    ) -> Result<Vec<OfferRecord>, OfferError> {
        let hotel_ids = parse_hotel_ids(hotel_ids)?;
        let date_from = parse_date(date_from)?;
        let date_to = parse_date(date_to)?;

        let offers = self
            .service
            .get_offers(&hotel_ids, date_from, date_to)
            .await?;
        let cost_groups = self.cost_groups_for(&offers).await;

        debug!(
            offers = offers.len(),
            hotels = cost_groups.len(),
            "presenting offers"
        );

        self.presenter.present_all(&offers, |hotel_id| {
            cost_groups
                .get(&hotel_id)
                .cloned()
                .unwrap_or_else(|| self.registry.hotel_cost_group())
        })
    }

    async fn cost_groups_for(&self, offers: &[Offer]) -> HashMap<u64, Arc<dyn CostGroup>> {
        let hotel_ids: BTreeSet<u64> = offers.iter().map(Offer::hotel_id).collect();
        let hotels = join_all(hotel_ids.iter().map(|id| self.service.hotel(*id))).await;

        hotel_ids
            .iter()
            .zip(hotels)
            .map(|(id, hotel)| (*id, resolve_cost_group(hotel.as_ref(), self.registry.as_ref())))
            .collect()
    }
}

// Coerce raw hotel ids to integers, skipping blanks.
pub fn parse_hotel_ids(raw: &[&str]) -> Result<Vec<u64>, OfferError> {
    raw.iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .map(|id| {
            id.parse::<u64>()
                .map_err(|_| OfferError::Validation(format!("malformed hotel id: {:?}", id)))
        })
        .collect()
}
