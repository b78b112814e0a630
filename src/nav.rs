use std::fmt;
use std::str::FromStr;

/// Listing sort modes supported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Hot,
    New,
    Top,
    Rising,
    Controversial,
}

impl SortMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Hot => "hot",
            SortMode::New => "new",
            SortMode::Top => "top",
            SortMode::Rising => "rising",
            SortMode::Controversial => "controversial",
        }
    }

    /// Whether the time filter applies to this sort.
    pub fn is_time_filtered(&self) -> bool {
        matches!(self, SortMode::Top | SortMode::Controversial)
    }
}

impl FromStr for SortMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hot" => Ok(SortMode::Hot),
            "new" => Ok(SortMode::New),
            "top" => Ok(SortMode::Top),
            "rising" => Ok(SortMode::Rising),
            "controversial" => Ok(SortMode::Controversial),
            _ => Err(()),
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time window for time-filtered sorts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeFilter {
    Day,
    Week,
    Month,
    Year,
    #[default]
    All,
}

impl TimeFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFilter::Day => "day",
            TimeFilter::Week => "week",
            TimeFilter::Month => "month",
            TimeFilter::Year => "year",
            TimeFilter::All => "all",
        }
    }
}

impl FromStr for TimeFilter {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(TimeFilter::Day),
            "week" => Ok(TimeFilter::Week),
            "month" => Ok(TimeFilter::Month),
            "year" => Ok(TimeFilter::Year),
            "all" => Ok(TimeFilter::All),
            _ => Err(()),
        }
    }
}

impl fmt::Display for TimeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the user currently is: selected subreddit plus active listing
/// filters. Mutated only by a successful `cd` or by the flags of a
/// successful `ls`.
#[derive(Debug, Default)]
pub struct NavigationState {
    pub collection: Option<String>,
    pub sort: SortMode,
    pub time: TimeFilter,
}

impl NavigationState {
    /// The prompt shown before the input line.
    pub fn prompt_label(&self) -> String {
        match &self.collection {
            Some(name) => format!("/r/{}", name),
            None => "$".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_mode_parsing() {
        assert_eq!("hot".parse(), Ok(SortMode::Hot));
        assert_eq!("controversial".parse(), Ok(SortMode::Controversial));
        assert!("hottest".parse::<SortMode>().is_err());
    }

    #[test]
    fn test_defaults() {
        let nav = NavigationState::default();
        assert_eq!(nav.sort, SortMode::Hot);
        assert_eq!(nav.time, TimeFilter::All);
        assert!(nav.collection.is_none());
    }

    #[test]
    fn test_time_filter_applies_only_to_top_and_controversial() {
        assert!(SortMode::Top.is_time_filtered());
        assert!(SortMode::Controversial.is_time_filtered());
        assert!(!SortMode::Hot.is_time_filtered());
        assert!(!SortMode::New.is_time_filtered());
        assert!(!SortMode::Rising.is_time_filtered());
    }

    #[test]
    fn test_prompt_label() {
        let mut nav = NavigationState::default();
        assert_eq!(nav.prompt_label(), "$");
        nav.collection = Some("programming".to_string());
        assert_eq!(nav.prompt_label(), "/r/programming");
    }
}
