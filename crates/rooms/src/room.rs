use serde::{Deserialize, Serialize};
use thiserror::Error;

use innkeep_core::{DomainError, DomainResult, Entity, RoomId};

/// Room status lifecycle: `Available -> Reserved -> Paid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomStatus {
    Available,
    Reserved,
    Paid,
}

impl RoomStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Available => "Available",
            RoomStatus::Reserved => "Reserved",
            RoomStatus::Paid => "Paid",
        }
    }

    pub fn parse(s: &str) -> DomainResult<Self> {
        match s {
            "Available" => Ok(RoomStatus::Available),
            "Reserved" => Ok(RoomStatus::Reserved),
            "Paid" => Ok(RoomStatus::Paid),
            other => Err(DomainError::validation(format!("unknown room status '{other}'"))),
        }
    }
}

impl core::fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status transition a caller can request on a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Reserve,
    Pay,
}

impl Transition {
    /// Status the room ends up in when the transition is applied.
    pub fn target(&self) -> RoomStatus {
        match self {
            Transition::Reserve => RoomStatus::Reserved,
            Transition::Pay => RoomStatus::Paid,
        }
    }
}

/// How strictly the state machine is enforced.
///
/// `Permissive` keeps the long-standing behavior: `reserve` only refuses a room that is
/// already `Reserved`, and `pay` only refuses a room that is already `Paid` (so a room can
/// go straight from `Available` to `Paid`). `Strict` additionally refuses any transition
/// that would move the status backwards or skip `Reserved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
    #[default]
    Permissive,
    Strict,
}

/// Why a guard refused a transition.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TransitionRejected {
    /// The room is already at (or, under the strict policy, past) the target status.
    #[error("room is already {current}")]
    Duplicate { current: RoomStatus },

    /// Strict policy only: the transition would skip a required step.
    #[error("cannot {transition:?} a room that is {current}")]
    NotAllowed {
        transition: Transition,
        current: RoomStatus,
    },
}

/// Validated input for creating a room.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRoom {
    name: String,
    price: f64,
    description: Option<String>,
}

impl NewRoom {
    /// Validate raw (possibly absent) fields.
    pub fn new(
        name: Option<String>,
        price: Option<f64>,
        description: Option<String>,
    ) -> DomainResult<Self> {
        let name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        let (Some(name), Some(price)) = (name, price) else {
            return Err(DomainError::validation(
                "both \"name\" and \"price\" are required",
            ));
        };
        if !price.is_finite() || price < 0.0 {
            return Err(DomainError::validation("price must be a non-negative number"));
        }

        Ok(Self {
            name,
            price,
            description: description.filter(|d| !d.trim().is_empty()),
        })
    }
}

/// A bookable room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: RoomStatus,
    /// Bumped on every persisted status change; drives the conditional update.
    #[serde(default)]
    pub version: u64,
}

impl Room {
    pub fn create(id: RoomId, input: NewRoom) -> Self {
        Self {
            id,
            name: input.name,
            price: input.price,
            description: input.description,
            status: RoomStatus::Available,
            version: 0,
        }
    }

    /// Evaluate the guard for `transition` against the current status.
    pub fn check(
        &self,
        transition: Transition,
        policy: TransitionPolicy,
    ) -> Result<(), TransitionRejected> {
        let current = self.status;
        match (transition, current) {
            (Transition::Reserve, RoomStatus::Reserved) | (Transition::Pay, RoomStatus::Paid) => {
                Err(TransitionRejected::Duplicate { current })
            }
            (Transition::Reserve, RoomStatus::Paid) if policy == TransitionPolicy::Strict => {
                Err(TransitionRejected::Duplicate { current })
            }
            (Transition::Pay, RoomStatus::Available) if policy == TransitionPolicy::Strict => {
                Err(TransitionRejected::NotAllowed {
                    transition,
                    current,
                })
            }
            _ => Ok(()),
        }
    }

    /// Apply `transition` after a successful `check`, returning the next state.
    ///
    /// The version is left untouched; stores bump it when the write commits.
    pub fn transitioned(&self, transition: Transition) -> Self {
        Self {
            status: transition.target(),
            ..self.clone()
        }
    }
}

impl Entity for Room {
    type Id = RoomId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room_in(status: RoomStatus) -> Room {
        let input = NewRoom::new(Some("101".to_string()), Some(100.0), None).unwrap();
        Room {
            status,
            ..Room::create(RoomId::new(), input)
        }
    }

    #[test]
    fn new_rooms_start_available() {
        let input = NewRoom::new(Some("101".into()), Some(100.0), Some("sea view".into())).unwrap();
        let room = Room::create(RoomId::new(), input);
        assert_eq!(room.status, RoomStatus::Available);
        assert_eq!(room.version, 0);
        assert_eq!(room.description.as_deref(), Some("sea view"));
    }

    #[test]
    fn name_and_price_are_required() {
        assert!(matches!(
            NewRoom::new(None, Some(10.0), None),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            NewRoom::new(Some("   ".into()), Some(10.0), None),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            NewRoom::new(Some("101".into()), None, None),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            NewRoom::new(Some("101".into()), Some(f64::NAN), None),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn reserve_rejects_reserved_room_as_duplicate() {
        let room = room_in(RoomStatus::Reserved);
        assert_eq!(
            room.check(Transition::Reserve, TransitionPolicy::Permissive),
            Err(TransitionRejected::Duplicate {
                current: RoomStatus::Reserved
            })
        );
    }

    #[test]
    fn pay_rejects_paid_room_as_duplicate() {
        let room = room_in(RoomStatus::Paid);
        assert_eq!(
            room.check(Transition::Pay, TransitionPolicy::Permissive),
            Err(TransitionRejected::Duplicate {
                current: RoomStatus::Paid
            })
        );
    }

    #[test]
    fn permissive_policy_allows_skipping_and_rewinding() {
        let available = room_in(RoomStatus::Available);
        assert!(available.check(Transition::Pay, TransitionPolicy::Permissive).is_ok());

        let paid = room_in(RoomStatus::Paid);
        assert!(paid.check(Transition::Reserve, TransitionPolicy::Permissive).is_ok());
    }

    #[test]
    fn strict_policy_enforces_forward_only_path() {
        let available = room_in(RoomStatus::Available);
        assert!(matches!(
            available.check(Transition::Pay, TransitionPolicy::Strict),
            Err(TransitionRejected::NotAllowed { .. })
        ));
        assert!(available.check(Transition::Reserve, TransitionPolicy::Strict).is_ok());

        let paid = room_in(RoomStatus::Paid);
        assert!(matches!(
            paid.check(Transition::Reserve, TransitionPolicy::Strict),
            Err(TransitionRejected::Duplicate { .. })
        ));

        let reserved = room_in(RoomStatus::Reserved);
        assert!(reserved.check(Transition::Pay, TransitionPolicy::Strict).is_ok());
    }

    #[test]
    fn transitioned_keeps_identity_and_version() {
        let room = room_in(RoomStatus::Available);
        let next = room.transitioned(Transition::Reserve);
        assert_eq!(next.id, room.id);
        assert_eq!(next.version, room.version);
        assert_eq!(next.status, RoomStatus::Reserved);
    }

    #[test]
    fn serializes_status_by_name() {
        let room = room_in(RoomStatus::Reserved);
        let json = serde_json::to_value(&room).unwrap();
        assert_eq!(json["status"], "Reserved");
        assert!(json.get("description").is_none());
    }
}
