use crate::models::Season;

/// Whether `month` falls inside the season, both ends inclusive.
///
/// A season whose start month is after its end month wraps past December,
/// e.g. November through February.
pub fn in_season(month: u32, start_month: u32, end_month: u32) -> bool {
    if start_month <= end_month {
        (start_month..=end_month).contains(&month)
    } else {
        month >= start_month || month <= end_month
    }
}

impl Season {
    pub fn contains(&self, month: u32) -> bool {
        in_season(month, self.start_month, self.end_month)
    }
}
