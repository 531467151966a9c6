//! Data module - CSV loading, summary formatting and grid pivoting

pub mod grid;
pub mod loader;
pub mod summary;

pub use grid::{GridError, GridMatrices, GridPivot};
pub use loader::{DataLoader, LoaderError};
pub use summary::{ScenarioLabels, SummaryError, SummaryFormatter, SummaryRow, TABLE_HEADERS};
