use chrono::{Days, NaiveDate};

pub const MIN_CUSTOM_DAYS: u32 = 1;
pub const MAX_CUSTOM_DAYS: u32 = 365;
pub const DEFAULT_CUSTOM_DAYS: u32 = 30;

/// Custom-plan date range being edited. The end date is always derived
/// (`start + days - 1`, inclusive) and cannot be set directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomDuration {
    days: u32,
    start_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("duration must be between {MIN_CUSTOM_DAYS} and {MAX_CUSTOM_DAYS} days, got {0}")]
pub struct DurationOutOfRange(pub i64);

impl CustomDuration {
    pub fn new(days: u32, start_date: NaiveDate) -> Result<Self, DurationOutOfRange> {
        Self::check(days as i64)?;
        Ok(Self { days, start_date })
    }

    pub fn starting(start_date: NaiveDate) -> Self {
        Self {
            days: DEFAULT_CUSTOM_DAYS,
            start_date,
        }
    }

    fn check(days: i64) -> Result<u32, DurationOutOfRange> {
        if (MIN_CUSTOM_DAYS as i64..=MAX_CUSTOM_DAYS as i64).contains(&days) {
            Ok(days as u32)
        } else {
            Err(DurationOutOfRange(days))
        }
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        // days >= 1 and start + 364 cannot overflow NaiveDate's range in practice
        self.start_date
            .checked_add_days(Days::new(u64::from(self.days - 1)))
            .unwrap_or(NaiveDate::MAX)
    }

    /// Out-of-range input is rejected and the previous value kept.
    pub fn set_days(&mut self, days: i64) -> Result<(), DurationOutOfRange> {
        self.days = Self::check(days)?;
        Ok(())
    }

    pub fn set_start_date(&mut self, start_date: NaiveDate) {
        self.start_date = start_date;
    }
}
