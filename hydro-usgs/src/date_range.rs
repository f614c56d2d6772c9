use chrono::NaiveDate;

/// A date range iterator that yields each date from the start date
/// through the end date (inclusive).
#[derive(Clone, Eq, PartialEq, Copy, Debug)]
pub struct DateRange {
    next: Option<NaiveDate>,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange {
            next: Some(start),
            end,
        }
    }
}

impl Iterator for DateRange {
    type Item = NaiveDate;
    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.filter(|date| *date <= self.end)?;
        // succ_opt is None past the last representable date
        self.next = current.succ_opt();
        Some(current)
    }
}
