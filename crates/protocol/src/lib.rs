//! Wire types for the coletor inventory service.
//!
//! The asset service stores records with Portuguese column names; the
//! structs here carry the exact JSON field names the service expects.

pub mod snapshot;

pub use snapshot::{
    ASSET_TYPE_COMPUTER, AUTO_SERIAL_PREFIX, STATUS_IN_USE, SystemSnapshot, UNKNOWN,
};
