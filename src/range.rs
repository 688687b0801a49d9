use std::fmt::Display;

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::transactions::{parse_date, DATE_FORMAT};

const RANGE_SEPARATOR: char = ':';
const ORIGIN: &str = "command line";

/// Inclusive window of dates selected with `-i=<start>:<end>`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

const DEFAULT_START: NaiveDate = match NaiveDate::from_ymd_opt(2000, 1, 1) {
    Some(date) => date,
    None => NaiveDate::MIN,
};

impl DateRange {
    /**
     * Parses `<start>:<end>`. Either side may be empty: an open start means
     * 1 Jan 2000 and an open end means `today`.
     */
    pub fn parse(value: &str, today: NaiveDate) -> Result<Self> {
        let parts: Vec<&str> = value.split(RANGE_SEPARATOR).collect();
        if parts.len() != 2 {
            return Err(Error::Range {
                value: value.to_string(),
                reason: "expected exactly one ':' between start and end",
            });
        }

        let start = match parts[0] {
            "" => DEFAULT_START,
            start => parse_date(start, ORIGIN)?,
        };
        let end = match parts[1] {
            "" => today,
            end => parse_date(end, ORIGIN)?,
        };

        if start > end {
            return Err(Error::Range {
                value: value.to_string(),
                reason: "start date is after end date",
            });
        }
        Ok(DateRange { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} to {}",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }
}
