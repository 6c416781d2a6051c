pub mod download_service;
pub mod fetch;
pub mod handle;

pub use download_service::DownloadService;
pub use handle::DownloadHandle;
