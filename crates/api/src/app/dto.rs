use serde::Deserialize;

use innkeep_core::{DomainResult, RoomId};
use innkeep_rooms::NewRoom;
use innkeep_sales::{NewSale, parse_sale_date};

// -------------------------
// Request DTOs
// -------------------------

/// Fields are optional here so a missing one is reported as a validation error
/// rather than a deserialization failure.
#[derive(Debug, Deserialize)]
pub struct CreateRoomRequest {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
}

impl CreateRoomRequest {
    pub fn validate(self) -> DomainResult<NewRoom> {
        NewRoom::new(self.name, self.price, self.description)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSaleRequest {
    /// RFC3339 timestamp or `YYYY-MM-DD`.
    pub date: Option<String>,
    pub value: Option<f64>,
    #[serde(alias = "cuartoId")]
    pub room_id: Option<String>,
}

impl CreateSaleRequest {
    pub fn validate(self) -> DomainResult<NewSale> {
        let date = self.date.as_deref().map(parse_sale_date).transpose()?;
        let room_id = self
            .room_id
            .as_deref()
            .map(str::parse::<RoomId>)
            .transpose()?;
        NewSale::new(date, self.value, room_id)
    }
}
