pub mod scan_dto;

pub use scan_dto::{
    DeleteScanResponseDto, ListScansQuery, ScanItemDto, ScanResponseDto,
    SyncRequestDto, SyncResponseDto,
};
