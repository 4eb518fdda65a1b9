pub mod scan_handler;

pub use scan_handler::{
    __path_delete_scan, __path_list_scans, __path_sync_scans, delete_scan, list_scans, sync_scans,
    ScanState,
};
