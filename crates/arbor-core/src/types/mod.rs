//! Domain value types.

mod currency;
mod date;
mod frequency;
mod period;

pub use currency::Currency;
pub use date::{days_in_month, Date};
pub use frequency::{Compounding, Frequency};
pub use period::{parse_period, Period, Tenor, TimeUnit};
