//! Calendar-year accounting
//!
//! Leases end on January 1st (UTC). The calendar precomputes the Jan 1 epoch
//! of every year in its range plus the one after, so the last table entry
//! closes the final year. Timestamps outside the table fail `InvalidTime`;
//! extending the horizon means building a new calendar.

use crate::error::{NameError, NameResult};
use chrono::NaiveDate;
use idreg_core::math::mul_div_down;
use idreg_core::{Timestamp, Wei};
use serde::{Deserialize, Serialize};

/// Jan 1 table with a cursor that only moves forward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearCalendar {
    first_year: i32,
    starts: Vec<Timestamp>,
    cursor: usize,
}

fn jan_first(year: i32) -> Option<Timestamp> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1)?.and_hms_opt(0, 0, 0)?;
    Timestamp::try_from(start.and_utc().timestamp()).ok()
}

impl YearCalendar {
    /// Table covering `first_year..=last_year`
    pub fn new(first_year: i32, last_year: i32) -> NameResult<Self> {
        let invalid = NameError::InvalidCalendar {
            first_year,
            last_year,
        };
        if last_year < first_year {
            return Err(invalid);
        }
        let end = last_year.checked_add(1).ok_or(invalid.clone())?;
        let starts = (first_year..=end)
            .map(jan_first)
            .collect::<Option<Vec<_>>>()
            .ok_or(invalid)?;
        Ok(Self {
            first_year,
            starts,
            cursor: 0,
        })
    }

    /// Index of the year containing `now`, scanning forward from the cursor
    fn locate(&self, now: Timestamp) -> NameResult<usize> {
        let invalid = NameError::InvalidTime { timestamp: now };
        let mut index = match self.starts.get(self.cursor) {
            Some(&start) if start <= now => self.cursor,
            _ => 0,
        };
        if self.starts.first().map_or(true, |&start| now < start) {
            return Err(invalid);
        }
        while self.starts.get(index + 1).is_some_and(|&next| next <= now) {
            index += 1;
        }
        if index + 1 >= self.starts.len() {
            return Err(invalid);
        }
        Ok(index)
    }

    /// Move the cursor to the year containing `now` and return that year
    pub fn current_year(&mut self, now: Timestamp) -> NameResult<i32> {
        let index = self.locate(now)?;
        if index > self.cursor {
            tracing::trace!(from = self.cursor, to = index, "calendar cursor advanced");
            self.cursor = index;
        }
        self.year_at(index, now)
    }

    /// Year containing `now` without moving the cursor
    pub fn year_of(&self, now: Timestamp) -> NameResult<i32> {
        let index = self.locate(now)?;
        self.year_at(index, now)
    }

    /// Jan 1 after `now`
    pub fn next_year_start(&self, now: Timestamp) -> NameResult<Timestamp> {
        let (_, next) = self.bounds(now)?;
        Ok(next)
    }

    /// `fee` scaled by the share of the current year still remaining
    pub fn prorated_fee(&self, fee: Wei, now: Timestamp) -> NameResult<Wei> {
        let (start, next) = self.bounds(now)?;
        Ok(mul_div_down(
            fee,
            u128::from(next - now),
            u128::from(next - start),
            "prorated_fee",
        )?)
    }

    /// First and last year covered
    pub fn range(&self) -> (i32, i32) {
        let years = i32::try_from(self.starts.len()).unwrap_or(i32::MAX);
        (self.first_year, self.first_year.saturating_add(years - 2))
    }

    fn bounds(&self, now: Timestamp) -> NameResult<(Timestamp, Timestamp)> {
        let index = self.locate(now)?;
        match (self.starts.get(index), self.starts.get(index + 1)) {
            (Some(&start), Some(&next)) => Ok((start, next)),
            _ => Err(NameError::InvalidTime { timestamp: now }),
        }
    }

    fn year_at(&self, index: usize, now: Timestamp) -> NameResult<i32> {
        i32::try_from(index)
            .ok()
            .and_then(|offset| self.first_year.checked_add(offset))
            .ok_or(NameError::InvalidTime { timestamp: now })
    }
}
