//! Solar catamaran sizing and battery backtesting.
//!
//! The member crates are re-exported here so the binaries and integration tests share one
//! entry point: size a hull with [`design`], replay irradiance with [`backtest`], and move data
//! in and out with [`importer`] and [`export`].

pub use catamaran_backtest as backtest;
pub use catamaran_config as config;
pub use catamaran_core as consts;
pub use catamaran_design as design;
pub use catamaran_export as export;
pub use catamaran_hull as hull;
pub use catamaran_importer as importer;
pub use catamaran_nlp as nlp;

/// Returns the version of the library for smoke tests.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
