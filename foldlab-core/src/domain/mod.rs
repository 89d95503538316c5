//! Domain types — bars, signals, trades.
//!
//! Every entity here is a fixed-field tagged record: created once by the
//! component that owns its lifecycle, immutable thereafter.

pub mod bar;
pub mod signal;
pub mod trade;

pub use bar::Bar;
pub use signal::{Direction, Signal, VolRegime};
pub use trade::{ExitReason, Trade};
