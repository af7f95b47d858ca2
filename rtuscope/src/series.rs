//! Numeric series extracted from data events, for charting.
//!
//! Each data event is one line of space-separated decimals. Lines whose
//! token count does not match the configured register quantity are ignored
//! wholesale; within an accepted line, tokens that fail to parse are
//! dropped from the series (the raw line stays visible in the text log, so
//! nothing is lost silently).

/// Rolling series of charted values with a fixed visible window.
#[derive(Debug)]
pub struct ChartSeries {
    points: Vec<f64>,
    expected: usize,
    window: usize,
}

/// Points kept in view, matching one full register block per screen.
const DEFAULT_WINDOW: usize = 100;

impl ChartSeries {
    /// Create a series expecting `expected` values per line.
    pub fn new(expected: usize) -> Self {
        Self::with_window(expected, DEFAULT_WINDOW)
    }

    /// Create a series with an explicit visible window.
    pub fn with_window(expected: usize, window: usize) -> Self {
        Self {
            points: Vec::new(),
            expected,
            window,
        }
    }

    /// Append one data line. Returns how many points were added.
    pub fn append_line(&mut self, line: &str) -> usize {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != self.expected {
            return 0;
        }

        let before = self.points.len();
        for token in tokens {
            if let Ok(value) = token.parse::<f64>() {
                self.points.push(value);
            }
        }
        self.points.len() - before
    }

    /// All points, x = index in append order.
    pub fn points(&self) -> &[f64] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The x range currently in view: the last `window` points.
    pub fn visible_range(&self) -> (usize, usize) {
        let len = self.points.len();
        if len > self.window {
            (len - self.window, len)
        } else {
            (0, len)
        }
    }

    /// Min and max over the visible points, for the y axis.
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        let (start, end) = self.visible_range();
        let visible = &self.points[start..end];
        if visible.is_empty() {
            return None;
        }

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &value in visible {
            min = min.min(value);
            max = max.max(value);
        }
        Some((min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_full_line() {
        let mut series = ChartSeries::new(3);
        assert_eq!(series.append_line("10 20 30"), 3);
        assert_eq!(series.points(), &[10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_wrong_token_count_ignored() {
        let mut series = ChartSeries::new(100);
        assert_eq!(series.append_line("1 2 3"), 0);
        assert!(series.is_empty());
    }

    #[test]
    fn test_malformed_tokens_dropped_not_fatal() {
        let mut series = ChartSeries::new(3);
        assert_eq!(series.append_line("1 bogus 3"), 2);
        assert_eq!(series.points(), &[1.0, 3.0]);
    }

    #[test]
    fn test_visible_range_tracks_tail() {
        let mut series = ChartSeries::with_window(1, 100);
        for i in 0..150 {
            series.append_line(&i.to_string());
        }

        assert_eq!(series.len(), 150);
        assert_eq!(series.visible_range(), (50, 150));
    }

    #[test]
    fn test_visible_range_short_series() {
        let mut series = ChartSeries::with_window(2, 100);
        series.append_line("5 6");
        assert_eq!(series.visible_range(), (0, 2));
    }

    #[test]
    fn test_value_bounds_over_visible_window() {
        let mut series = ChartSeries::with_window(1, 2);
        series.append_line("100");
        series.append_line("1");
        series.append_line("7");

        // the 100 has scrolled out of view
        assert_eq!(series.value_bounds(), Some((1.0, 7.0)));
    }

    #[test]
    fn test_value_bounds_empty() {
        let series = ChartSeries::new(1);
        assert_eq!(series.value_bounds(), None);
    }
}
