pub mod categories;
pub mod geolocation;
pub mod map_layer;
pub mod pipeline;
pub mod places;
pub mod scoring;
pub mod traits;
pub mod types;
pub mod verification;

pub use geolocation::{IpApiLocator, NoDeviceLocation, OriginResolver};
pub use map_layer::MapLayer;
pub use pipeline::{BusinessSearch, SearchOutcome};
pub use places::GooglePlacesClient;
pub use traits::{DeviceLocator, IpLocator, PlacesProvider};
pub use types::{SearchOrigin, SearchRequest, SearchStatus};
pub use verification::{BusinessVerifier, PlacesVerifier};
