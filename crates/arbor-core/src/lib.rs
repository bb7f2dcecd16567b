//! # Arbor Core
//!
//! Market conventions shared by every Arbor crate.
//!
//! - **Types**: [`Date`](types::Date), [`Period`](types::Period), [`Currency`](types::Currency),
//!   [`Frequency`](types::Frequency) and [`Compounding`](types::Compounding)
//! - **Calendars**: the [`Calendar`](calendars::Calendar) capability, weekend/holiday/joint
//!   calendars and business-day adjustment
//! - **Day counts**: [`DayCountConvention`](daycounts::DayCountConvention)
//!
//! ## Example
//!
//! ```rust
//! use arbor_core::prelude::*;
//!
//! let trade = Date::from_ymd(2024, 3, 14).unwrap();
//! let tenor: Period = "3M".parse().unwrap();
//! let maturity = trade.add_period(tenor).unwrap();
//! assert_eq!(maturity, Date::from_ymd(2024, 6, 14).unwrap());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::similar_names)]
#![allow(clippy::trivially_copy_pass_by_ref)]

pub mod calendars;
pub mod daycounts;
pub mod error;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::calendars::{
        BusinessDayConvention, Calendar, HolidayCalendar, JointCalendar, WeekendCalendar,
    };
    pub use crate::daycounts::DayCountConvention;
    pub use crate::error::{CoreError, CoreResult};
    pub use crate::types::{Compounding, Currency, Date, Frequency, Period, Tenor, TimeUnit};
}

pub use error::{CoreError, CoreResult};
pub use types::Date;
