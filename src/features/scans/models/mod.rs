mod scan;

pub use scan::{GeoMeta, GeoTarget, NewScan, ScanRecord};
