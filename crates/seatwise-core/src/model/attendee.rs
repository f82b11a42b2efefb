use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::{AttendeeId, ParseEnumError};

/// Which half of the couple an attendee is associated with.
///
/// Declaration order is the forest ordering: bride-side sorts before
/// groom-side, which sorts before common.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Bride,
    Groom,
    Common,
}

impl Side {
    pub const ALL: [Self; 3] = [Self::Bride, Self::Groom, Self::Common];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bride => "bride",
            Self::Groom => "groom",
            Self::Common => "common",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bride" => Ok(Self::Bride),
            "groom" => Ok(Self::Groom),
            "common" | "both" | "shared" => Ok(Self::Common),
            _ => Err(ParseEnumError {
                expected: "side",
                got: s.to_string(),
            }),
        }
    }
}

/// Closed set of guest categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Witness,
    HonorAttendant,
    CloseFamily,
    ExtendedFamily,
    CloseFriend,
    Colleague,
    CeremonyOnly,
    ReceptionOnly,
    Child,
    Other,
}

impl Category {
    pub const ALL: [Self; 10] = [
        Self::Witness,
        Self::HonorAttendant,
        Self::CloseFamily,
        Self::ExtendedFamily,
        Self::CloseFriend,
        Self::Colleague,
        Self::CeremonyOnly,
        Self::ReceptionOnly,
        Self::Child,
        Self::Other,
    ];

    /// Stable snake-case label, identical to the serialized form.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Witness => "witness",
            Self::HonorAttendant => "honor_attendant",
            Self::CloseFamily => "close_family",
            Self::ExtendedFamily => "extended_family",
            Self::CloseFriend => "close_friend",
            Self::Colleague => "colleague",
            Self::CeremonyOnly => "ceremony_only",
            Self::ReceptionOnly => "reception_only",
            Self::Child => "child",
            Self::Other => "other",
        }
    }

    #[must_use]
    pub const fn is_family(self) -> bool {
        matches!(self, Self::CloseFamily | Self::ExtendedFamily)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|c| c.label() == normalized)
            .ok_or_else(|| ParseEnumError {
                expected: "category",
                got: s.to_string(),
            })
    }
}

/// RSVP bookkeeping for one attendee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rsvp {
    #[serde(default)]
    pub confirmed: bool,
    #[serde(default)]
    pub invitation_sent: bool,
    #[serde(default)]
    pub rsvp_date: Option<NaiveDate>,
}

/// Companion allowance. The companion is not a separate attendee record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlusOne {
    pub allowed: bool,
    #[serde(default)]
    pub name: Option<String>,
}

/// A guest record supplied by the profile store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    pub id: AttendeeId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub category: Category,
    pub side: Side,
    #[serde(default)]
    pub rsvp: Rsvp,
    #[serde(default)]
    pub plus_one: Option<PlusOne>,
    /// Seating hint entered by the couple; advisory, never enforced.
    #[serde(default, rename = "table_number")]
    pub table_hint: Option<u32>,
    /// Free-form kinship label, e.g. "mother of the bride".
    #[serde(default)]
    pub relationship_type: Option<String>,
    /// Weak reference to another attendee in the same collection.
    #[serde(default)]
    pub parent_id: Option<AttendeeId>,
}

impl Attendee {
    pub fn new(
        id: AttendeeId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        side: Side,
        category: Category,
    ) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: None,
            phone: None,
            category,
            side,
            rsvp: Rsvp::default(),
            plus_one: None,
            table_hint: None,
            relationship_type: None,
            parent_id: None,
        }
    }

    #[must_use]
    pub fn with_parent(mut self, parent: AttendeeId) -> Self {
        self.parent_id = Some(parent);
        self
    }

    #[must_use]
    pub fn with_relationship(mut self, label: impl Into<String>) -> Self {
        self.relationship_type = Some(label.into());
        self
    }

    #[must_use]
    pub fn confirmed(mut self, confirmed: bool) -> Self {
        self.rsvp.confirmed = confirmed;
        self
    }

    #[must_use]
    pub fn with_plus_one(mut self, name: Option<String>) -> Self {
        self.plus_one = Some(PlusOne {
            allowed: true,
            name,
        });
        self
    }

    #[must_use]
    pub const fn is_confirmed(&self) -> bool {
        self.rsvp.confirmed
    }

    #[must_use]
    pub fn has_plus_one(&self) -> bool {
        self.plus_one.as_ref().is_some_and(|p| p.allowed)
    }

    /// "First Last", falling back to the id when both names are blank.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.id.to_string()
        } else {
            full.to_string()
        }
    }

    /// People this record brings to the reception once confirmed.
    #[must_use]
    pub fn expected_headcount(&self) -> u32 {
        if !self.is_confirmed() {
            return 0;
        }
        1 + u32::from(self.has_plus_one())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guest(id: &str) -> Attendee {
        Attendee::new(
            AttendeeId::new_unchecked(id),
            "Ada",
            "Lovelace",
            Side::Bride,
            Category::CloseFriend,
        )
    }

    #[test]
    fn side_order_is_bride_groom_common() {
        let mut sides = vec![Side::Common, Side::Groom, Side::Bride];
        sides.sort();
        assert_eq!(sides, Side::ALL.to_vec());
    }

    #[test]
    fn category_labels_round_trip_through_from_str() {
        for category in Category::ALL {
            assert_eq!(category.label().parse::<Category>(), Ok(category));
        }
        assert_eq!(
            "Honor Attendant".parse::<Category>(),
            Ok(Category::HonorAttendant)
        );
        assert!("cousin".parse::<Category>().is_err());
    }

    #[test]
    fn category_serializes_as_label() {
        let json = serde_json::to_string(&Category::ReceptionOnly).expect("serialize");
        assert_eq!(json, "\"reception_only\"");
    }

    #[test]
    fn display_name_falls_back_to_id() {
        let mut g = guest("g-7");
        assert_eq!(g.display_name(), "Ada Lovelace");
        g.first_name = " ".into();
        g.last_name = String::new();
        assert_eq!(g.display_name(), "g-7");
    }

    #[test]
    fn headcount_counts_plus_one_only_when_confirmed() {
        let g = guest("g1").with_plus_one(Some("Charles".into()));
        assert_eq!(g.expected_headcount(), 0);
        let g = g.confirmed(true);
        assert_eq!(g.expected_headcount(), 2);
        assert_eq!(guest("g2").confirmed(true).expected_headcount(), 1);
    }

    #[test]
    fn table_hint_uses_table_number_key() {
        let mut g = guest("g1");
        g.table_hint = Some(4);
        let json = serde_json::to_value(&g).expect("serialize");
        assert_eq!(json["table_number"], 4);
    }
}
