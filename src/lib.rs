//! Rebuilds mutual fund holdings from CAMS transaction statements and
//! reports what they cost or what went into them over a window of dates.

pub mod currency;
pub mod error;
pub mod holdings;
pub mod ledger;
pub mod range;
pub mod report;
pub mod schemes;
pub mod transactions;
