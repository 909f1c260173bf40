use chrono::NaiveDate;

use super::user_type::UserType;

/// Per-day signup rollup. Counters only grow within a day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyStats {
    pub date: NaiveDate,
    pub total_signups: i64,
    pub business_signups: i64,
    pub influencer_signups: i64,
    /// Size of the whole waitlist at the last update, recounted every time.
    pub cumulative_total: i64,
}

impl DailyStats {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            total_signups: 0,
            business_signups: 0,
            influencer_signups: 0,
            cumulative_total: 0,
        }
    }

    /// Applies one signup of `user_type`. `cumulative_total` is left to the caller.
    pub fn record(&mut self, user_type: UserType) {
        self.total_signups += 1;
        match user_type {
            UserType::Business => self.business_signups += 1,
            UserType::Influencer => self.influencer_signups += 1,
        }
    }
}
