pub mod csv_loader;
pub mod downloader;

pub use csv_loader::{OrderRecords, OrderSource};
pub use downloader::download_orders_csv;
