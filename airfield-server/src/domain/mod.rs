//! Domain types for the airfield lookup service.
//!
//! This module contains the validated values the rest of the crate works
//! with. Constructors check their invariants, so code that receives these
//! types can trust them without re-validating.

mod airport;
mod code;
mod error;
mod timezone;

pub use airport::{Airport, AirportId, AirportType, Coordinates, TimezoneLink};
pub use code::{CodeKind, LookupCode};
pub use error::DomainError;
pub use timezone::{OffsetSeconds, TimezoneId, TimezoneRecord, TimezoneRecordId};
