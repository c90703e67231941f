pub mod field_extractor;
pub mod station_reader;
pub mod table_reader;

pub use field_extractor::{month_from_date, FieldExtractor};
pub use station_reader::StationReader;
pub use table_reader::TableReader;
