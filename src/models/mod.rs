pub mod loaders;
pub mod order;
pub mod part_numbers;
pub mod receipt;

pub use loaders::{download_orders_csv, OrderRecords, OrderSource};
pub use order::{OrderRecord, ResolvedOrder};
pub use part_numbers::PartNumberMap;
pub use receipt::Receipt;
