use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Consecutive calendar days with at least one completed quiz.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Streak {
    pub count: u32,
    pub last_date: Option<NaiveDate>,
}

impl Streak {
    /// Streak after a completion on `today`. At most one increment per day.
    pub fn record(self, today: NaiveDate) -> Streak {
        match self.last_date {
            Some(last) if last == today => self,
            Some(last) if today.pred_opt() == Some(last) => Streak {
                count: self.count + 1,
                last_date: Some(today),
            },
            _ => Streak {
                count: 1,
                last_date: Some(today),
            },
        }
    }
}
