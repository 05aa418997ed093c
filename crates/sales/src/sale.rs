use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use innkeep_core::{DomainError, DomainResult, Entity, RoomId, SaleId};

/// Sale status, mirroring the last room transition completed on the sale's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SaleStatus {
    Reserved,
    Paid,
}

impl SaleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Reserved => "Reserved",
            SaleStatus::Paid => "Paid",
        }
    }

    pub fn parse(s: &str) -> DomainResult<Self> {
        match s {
            "Reserved" => Ok(SaleStatus::Reserved),
            "Paid" => Ok(SaleStatus::Paid),
            other => Err(DomainError::validation(format!("unknown sale status '{other}'"))),
        }
    }
}

/// Validated input for recording a sale.
///
/// Every field is required; once a `NewSale` exists nothing about it can be missing.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSale {
    pub date: DateTime<Utc>,
    pub value: f64,
    pub room_id: RoomId,
}

impl NewSale {
    pub fn new(
        date: Option<DateTime<Utc>>,
        value: Option<f64>,
        room_id: Option<RoomId>,
    ) -> DomainResult<Self> {
        let (Some(date), Some(value), Some(room_id)) = (date, value, room_id) else {
            return Err(DomainError::validation(
                "fields \"date\", \"value\", and \"roomId\" are required",
            ));
        };
        if !value.is_finite() || value < 0.0 {
            return Err(DomainError::validation("value must be a non-negative number"));
        }

        Ok(Self {
            date,
            value,
            room_id,
        })
    }
}

/// A financial record tied to exactly one room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: SaleId,
    pub date: DateTime<Utc>,
    pub value: f64,
    pub room_id: RoomId,
    pub status: SaleStatus,
}

impl Sale {
    /// A freshly booked sale: the room has just been reserved for it.
    pub fn reserved(id: SaleId, input: NewSale) -> Self {
        Self {
            id,
            date: input.date,
            value: input.value,
            room_id: input.room_id,
            status: SaleStatus::Reserved,
        }
    }
}

impl Entity for Sale {
    type Id = SaleId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Parse a sale date: RFC3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_sale_date(raw: &str) -> DomainResult<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| DomainError::validation(format!("invalid date '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn all_fields_are_required() {
        let date = Some(Utc::now());
        let room = Some(RoomId::new());

        assert!(NewSale::new(date, Some(10.0), room).is_ok());
        assert!(matches!(
            NewSale::new(None, Some(10.0), room),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            NewSale::new(date, None, room),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            NewSale::new(date, Some(10.0), None),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn rejects_negative_or_non_finite_values() {
        let date = Some(Utc::now());
        let room = Some(RoomId::new());
        assert!(NewSale::new(date, Some(-1.0), room).is_err());
        assert!(NewSale::new(date, Some(f64::INFINITY), room).is_err());
    }

    #[test]
    fn new_sales_are_reserved() {
        let input = NewSale::new(Some(Utc::now()), Some(100.0), Some(RoomId::new())).unwrap();
        let sale = Sale::reserved(SaleId::new(), input);
        assert_eq!(sale.status, SaleStatus::Reserved);
    }

    #[test]
    fn parses_plain_dates_as_utc_midnight() {
        let parsed = parse_sale_date("2024-05-01").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        let parsed = parse_sale_date("2024-05-01T02:00:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn rejects_unparseable_dates() {
        assert!(matches!(
            parse_sale_date("yesterday"),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn serializes_room_id_in_camel_case() {
        let input = NewSale::new(Some(Utc::now()), Some(5.0), Some(RoomId::new())).unwrap();
        let sale = Sale::reserved(SaleId::new(), input);
        let json = serde_json::to_value(&sale).unwrap();
        assert_eq!(json["roomId"], sale.room_id.to_string());
        assert_eq!(json["status"], "Reserved");
    }
}
