//! Domain types: bars, columnar series, and trading actions.

pub mod action;
pub mod bar;
pub mod series;

pub use action::{Action, ActionParseError};
pub use bar::Bar;
pub use series::{Field, Series, SeriesError, SeriesView};

/// Ticker type alias
pub type Ticker = String;
