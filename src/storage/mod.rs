pub mod csv_store;

use serde::{Deserialize, Serialize};

pub use csv_store::FlatStore;

/// Which rows feed the correlative counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterScope {
    /// Every row in the store, whatever year it was issued in.
    #[default]
    Store,
    /// Only rows whose case id carries the requested year.
    Year,
}
