use serde::{Deserialize, Serialize};

use crate::domain::deal::Deal;
use crate::domain::offer::Offer;

#[derive(Debug, Default, Deserialize)]
pub struct OffersQuery {
    pub client_id: Option<i32>,
}

/// Accepted offer and the deal opened for it.
#[derive(Debug, Serialize)]
pub struct AcceptedOffer {
    pub offer: Offer,
    pub deal: Deal,
}
