pub mod field;
pub mod station;
pub mod table;
pub mod weather;

pub use field::{field_column_kind, CropType, FieldRecord};
pub use station::StationMapping;
pub use table::{Cell, CellKind, ColumnCheck, Table};
pub use weather::{StationMean, WeatherField, WeatherReading};
