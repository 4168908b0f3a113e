//! Outbound HTTP clients for the admin console

pub mod nominatim_client;
pub mod overpass_client;

pub use nominatim_client::{GeocodeStatus, NominatimClient, NominatimError, NOMINATIM_BASE_URL};
pub use overpass_client::{OverpassClient, OverpassError, OVERPASS_URL};
