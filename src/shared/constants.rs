/// Default number of scans returned by the list endpoint
pub const DEFAULT_SCAN_LIMIT: i64 = 100;

/// Client identifier sent to the geocoding provider (Nominatim usage policy
/// requires an identifying User-Agent)
pub const GEOCODER_CLIENT_ID: &str = "artiqo-scan/1.0";
