// ── Hierarchical identifiers ──
//
// A document's `_id` is the only record of where it sits in the hierarchy:
// `BLDG` is a building, `BLDG-101` a room in it, `BLDG-101-CP1` a device in
// that room. `IdSchema` owns the delimiter and the segment rules; the typed
// IDs it produces remember where their parent prefix ends.

use std::fmt;

use thiserror::Error;

use crate::error::CoreError;
use crate::model::EntityKind;

/// Shortest allowed building or room segment.
const MIN_SEGMENT_LEN: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("ID delimiter {0:?} must be a single ASCII punctuation character")]
    InvalidDelimiter(char),

    #[error("{entity} ID {id:?} is malformed: {reason}")]
    Malformed {
        entity: EntityKind,
        id: String,
        reason: String,
    },
}

impl From<IdError> for CoreError {
    fn from(err: IdError) -> Self {
        match err {
            IdError::InvalidDelimiter(_) => CoreError::Config {
                message: err.to_string(),
            },
            IdError::Malformed { entity, .. } => CoreError::ValidationFailed {
                entity,
                message: err.to_string(),
            },
        }
    }
}

// ── Typed IDs ───────────────────────────────────────────────────────

/// A validated building ID (one segment).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BuildingId(String);

/// A validated room ID (`<building><delim><room>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId {
    id: String,
    building_end: usize,
}

/// A validated device ID (`<building><delim><room><delim><device>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId {
    id: String,
    building_end: usize,
    room_end: usize,
}

impl BuildingId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl RoomId {
    pub fn as_str(&self) -> &str {
        &self.id
    }

    pub fn building_id(&self) -> BuildingId {
        BuildingId(self.id[..self.building_end].to_owned())
    }

    /// The part after the building prefix (`101` in `BLDG-101`).
    pub fn suffix(&self) -> &str {
        // building_end points at the delimiter, which is one ASCII byte
        &self.id[self.building_end + 1..]
    }
}

impl DeviceId {
    pub fn as_str(&self) -> &str {
        &self.id
    }

    pub fn building_id(&self) -> BuildingId {
        BuildingId(self.id[..self.building_end].to_owned())
    }

    pub fn room_id(&self) -> RoomId {
        RoomId {
            id: self.id[..self.room_end].to_owned(),
            building_end: self.building_end,
        }
    }

    /// The part after the room prefix (`CP1` in `BLDG-101-CP1`).
    pub fn suffix(&self) -> &str {
        &self.id[self.room_end + 1..]
    }
}

macro_rules! impl_id_display {
    ($($ty:ty => $field:tt),* $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }

            impl From<$ty> for String {
                fn from(id: $ty) -> Self {
                    id.$field
                }
            }
        )*
    };
}

impl_id_display!(BuildingId => 0, RoomId => id, DeviceId => id);

// ── Schema ──────────────────────────────────────────────────────────

/// Segment rules and delimiter for hierarchical IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdSchema {
    delimiter: char,
}

impl Default for IdSchema {
    fn default() -> Self {
        Self { delimiter: '-' }
    }
}

impl IdSchema {
    pub fn new(delimiter: char) -> Result<Self, IdError> {
        if !delimiter.is_ascii_punctuation() {
            return Err(IdError::InvalidDelimiter(delimiter));
        }
        Ok(Self { delimiter })
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    // ── Parsing ──────────────────────────────────────────────────────

    pub fn parse_building(&self, id: &str) -> Result<BuildingId, IdError> {
        let segments = self.segments(EntityKind::Building, id, 1)?;
        check_name_segment(EntityKind::Building, id, segments[0])?;
        Ok(BuildingId(id.to_owned()))
    }

    pub fn parse_room(&self, id: &str) -> Result<RoomId, IdError> {
        let segments = self.segments(EntityKind::Room, id, 2)?;
        for segment in &segments {
            check_name_segment(EntityKind::Room, id, segment)?;
        }
        Ok(RoomId {
            id: id.to_owned(),
            building_end: segments[0].len(),
        })
    }

    pub fn parse_device(&self, id: &str) -> Result<DeviceId, IdError> {
        let segments = self.segments(EntityKind::Device, id, 3)?;
        check_name_segment(EntityKind::Device, id, segments[0])?;
        check_name_segment(EntityKind::Device, id, segments[1])?;
        check_device_suffix(id, segments[2])?;
        let building_end = segments[0].len();
        Ok(DeviceId {
            id: id.to_owned(),
            building_end,
            room_end: building_end + 1 + segments[1].len(),
        })
    }

    fn segments<'a>(
        &self,
        entity: EntityKind,
        id: &'a str,
        expected: usize,
    ) -> Result<Vec<&'a str>, IdError> {
        let segments: Vec<&str> = id.split(self.delimiter).collect();
        if segments.len() != expected {
            return Err(malformed(
                entity,
                id,
                format!(
                    "expected {expected} segment(s) separated by '{}', found {}",
                    self.delimiter,
                    segments.len()
                ),
            ));
        }
        Ok(segments)
    }

    // ── Parent derivation ────────────────────────────────────────────

    /// The room a device ID lives in: its first two segments.
    ///
    /// Only the segment count is checked, so this also works for IDs that
    /// predate the stricter device rules.
    pub fn room_id_of(&self, device_id: &str) -> Result<String, IdError> {
        let mut parts = device_id.splitn(3, self.delimiter);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(building), Some(room), Some(_)) if !building.is_empty() && !room.is_empty() => {
                Ok(format!("{building}{}{room}", self.delimiter))
            }
            _ => Err(malformed(
                EntityKind::Device,
                device_id,
                "a device ID needs building, room and device segments".to_owned(),
            )),
        }
    }

    /// The building a room (or device) ID lives in: its first segment.
    pub fn building_id_of(&self, room_id: &str) -> Result<String, IdError> {
        match room_id.split_once(self.delimiter) {
            Some((building, rest)) if !building.is_empty() && !rest.is_empty() => {
                Ok(building.to_owned())
            }
            _ => Err(malformed(
                EntityKind::Room,
                room_id,
                "a room ID needs building and room segments".to_owned(),
            )),
        }
    }

    // ── Range bounds and re-parenting ────────────────────────────────

    /// Exclusive `(gt, lt)` bounds covering every direct or nested child of
    /// `prefix`: `prefix + delim` up to `prefix + succ(delim)`.
    pub fn child_bounds(&self, prefix: &str) -> (String, String) {
        let next = char::from_u32(u32::from(self.delimiter) + 1).unwrap_or(char::MAX);
        (
            format!("{prefix}{}", self.delimiter),
            format!("{prefix}{next}"),
        )
    }

    /// Move `id` from under `old_parent` to under `new_parent`, keeping
    /// everything after the parent prefix.
    pub fn reparent(
        &self,
        entity: EntityKind,
        id: &str,
        old_parent: &str,
        new_parent: &str,
    ) -> Result<String, IdError> {
        id.strip_prefix(old_parent)
            .and_then(|rest| rest.strip_prefix(self.delimiter))
            .filter(|rest| !rest.is_empty())
            .map(|rest| format!("{new_parent}{}{rest}", self.delimiter))
            .ok_or_else(|| malformed(entity, id, format!("not a child of {old_parent}")))
    }
}

// ── Segment rules ───────────────────────────────────────────────────

fn malformed(entity: EntityKind, id: &str, reason: String) -> IdError {
    IdError::Malformed {
        entity,
        id: id.to_owned(),
        reason,
    }
}

fn check_name_segment(entity: EntityKind, id: &str, segment: &str) -> Result<(), IdError> {
    if segment.len() < MIN_SEGMENT_LEN {
        return Err(malformed(
            entity,
            id,
            format!("segment {segment:?} is shorter than {MIN_SEGMENT_LEN} characters"),
        ));
    }
    if !segment.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(malformed(
            entity,
            id,
            format!("segment {segment:?} must be letters and digits only"),
        ));
    }
    Ok(())
}

/// Letters followed by digits, e.g. `CP1` or `DEV12`.
fn check_device_suffix(id: &str, segment: &str) -> Result<(), IdError> {
    let digits_at = segment
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(segment.len());
    let (letters, digits) = segment.split_at(digits_at);
    if letters.is_empty() || digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(malformed(
            EntityKind::Device,
            id,
            format!("device segment {segment:?} must be letters followed by digits"),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn derives_parents_from_device_id() {
        let schema = IdSchema::default();
        let room = schema.room_id_of("BLDG-101-CP1").unwrap();
        assert_eq!(room, "BLDG-101");
        assert_eq!(schema.building_id_of(&room).unwrap(), "BLDG");
    }

    #[test]
    fn room_id_of_needs_three_segments() {
        let schema = IdSchema::default();
        assert!(schema.room_id_of("BLDG-101").is_err());
        assert!(schema.room_id_of("BLDG--CP1").is_err());
        assert!(schema.building_id_of("BLDG").is_err());
    }

    #[test]
    fn typed_device_id_splits_segments() {
        let schema = IdSchema::default();
        let id = schema.parse_device("ITB-1101-DEV12").unwrap();
        assert_eq!(id.building_id().as_str(), "ITB");
        assert_eq!(id.room_id().as_str(), "ITB-1101");
        assert_eq!(id.room_id().suffix(), "1101");
        assert_eq!(id.suffix(), "DEV12");
    }

    #[test]
    fn rejects_malformed_ids() {
        let schema = IdSchema::default();
        // Extra embedded delimiter
        assert!(schema.parse_device("ITB-1101-CP-1").is_err());
        // Suffix must be letters then digits
        assert!(schema.parse_device("ITB-1101-12").is_err());
        assert!(schema.parse_device("ITB-1101-CP").is_err());
        assert!(schema.parse_device("ITB-1101-CP1A").is_err());
        // Segments of at least two characters
        assert!(schema.parse_room("I-1101").is_err());
        assert!(schema.parse_building("X").is_err());
        assert!(schema.parse_building("ITB-1101").is_err());
        assert!(schema.parse_room("ITB-11 01").is_err());
    }

    #[test]
    fn child_bounds_use_delimiter_successor() {
        let schema = IdSchema::default();
        assert_eq!(
            schema.child_bounds("BLDG-101"),
            ("BLDG-101-".to_owned(), "BLDG-101.".to_owned())
        );

        let underscore = IdSchema::new('_').unwrap();
        assert_eq!(
            underscore.child_bounds("B1"),
            ("B1_".to_owned(), "B1`".to_owned())
        );
    }

    #[test]
    fn delimiter_must_be_punctuation() {
        assert_eq!(IdSchema::new('a'), Err(IdError::InvalidDelimiter('a')));
        assert!(IdSchema::new('.').is_ok());
    }

    #[test]
    fn reparenting_keeps_suffix() {
        let schema = IdSchema::default();
        let room = EntityKind::Room;
        assert_eq!(schema.reparent(room, "OLD-101", "OLD", "NEW").unwrap(), "NEW-101");
        assert_eq!(
            schema
                .reparent(EntityKind::Device, "OLD-101-CP1", "OLD-101", "NEW-101")
                .unwrap(),
            "NEW-101-CP1"
        );
        // Prefix match must end on a delimiter
        assert!(schema.reparent(room, "OLDER-101", "OLD", "NEW").is_err());
        assert!(schema.reparent(room, "OLD-", "OLD", "NEW").is_err());
    }
}
