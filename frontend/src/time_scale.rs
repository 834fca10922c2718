//! View transform between trace time and screen pixels
//!
//! Complete mapping used by the timeline: TimeSpan, TimeScale

/// A closed time interval in seconds. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSpan {
    pub start: f64,
    pub end: f64,
}

impl TimeSpan {
    /// Builds a span, swapping the bounds if they arrive inverted.
    pub fn new(start: f64, end: f64) -> Self {
        TimeSpan {
            start: start.min(end),
            end: start.max(end),
        }
    }

    pub fn duration(self) -> f64 {
        self.end - self.start
    }
}

impl Default for TimeSpan {
    fn default() -> Self {
        TimeSpan::new(0.0, 0.0)
    }
}

/// Linear map from a time span onto a horizontal pixel range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    time_span: TimeSpan,
    start_px: f64,
    end_px: f64,
}

impl TimeScale {
    pub fn new(time_span: TimeSpan, start_px: f64, end_px: f64) -> Self {
        TimeScale {
            time_span,
            start_px: start_px.min(end_px),
            end_px: start_px.max(end_px),
        }
    }

    pub fn time_span(&self) -> TimeSpan {
        self.time_span
    }

    pub fn set_time_span(&mut self, time_span: TimeSpan) {
        self.time_span = time_span;
    }

    pub fn set_px_bounds(&mut self, start_px: f64, end_px: f64) {
        self.start_px = start_px.min(end_px);
        self.end_px = start_px.max(end_px);
    }

    pub fn width_px(&self) -> f64 {
        self.end_px - self.start_px
    }

    /// Seconds per pixel; zero while either side of the map is degenerate.
    fn seconds_per_px(&self) -> f64 {
        let width = self.width_px();
        if width <= 0.0 {
            return 0.0;
        }
        self.time_span.duration() / width
    }

    pub fn time_to_px(&self, time: f64) -> f64 {
        let duration = self.time_span.duration();
        if duration <= 0.0 {
            return self.start_px;
        }
        self.start_px + (time - self.time_span.start) / duration * self.width_px()
    }

    pub fn px_to_time(&self, px: f64) -> f64 {
        self.time_span.start + (px - self.start_px) * self.seconds_per_px()
    }

    pub fn delta_time_to_px(&self, time: f64) -> f64 {
        let duration = self.time_span.duration();
        if duration <= 0.0 {
            return 0.0;
        }
        time / duration * self.width_px()
    }

    pub fn delta_px_to_duration(&self, px: f64) -> f64 {
        px * self.seconds_per_px()
    }

    /// Duration of one pixel truncated to a power of two, so the value only
    /// changes every few zoom steps. `None` while the map is degenerate.
    pub fn power_of_two_resolution(&self) -> Option<f64> {
        let resolution = self.delta_px_to_duration(1.0);
        if !(resolution.is_finite() && resolution > 0.0) {
            return None;
        }
        Some(2f64.powi(resolution.log2().floor() as i32))
    }
}

impl Default for TimeScale {
    fn default() -> Self {
        TimeScale::new(TimeSpan::default(), 0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scale() -> TimeScale {
        TimeScale::new(TimeSpan::new(0.0, 10.0), 100.0, 1100.0)
    }

    #[test]
    fn maps_time_and_pixels_both_ways() {
        let scale = scale();
        assert_eq!(scale.time_to_px(0.0), 100.0);
        assert_eq!(scale.time_to_px(5.0), 600.0);
        assert_eq!(scale.px_to_time(1100.0), 10.0);
        assert_eq!(scale.delta_time_to_px(1.0), 100.0);
        assert_eq!(scale.delta_px_to_duration(50.0), 0.5);
    }

    #[test]
    fn inverted_span_is_normalized() {
        let span = TimeSpan::new(8.0, 2.0);
        assert_eq!(span.start, 2.0);
        assert_eq!(span.end, 8.0);
        assert_eq!(span.duration(), 6.0);
    }

    #[test]
    fn resolution_truncates_to_power_of_two() {
        // 10s over 1000px = 0.01 s/px -> 2^-7
        assert_eq!(scale().power_of_two_resolution(), Some(2f64.powi(-7)));
    }

    #[test]
    fn degenerate_scale_has_no_resolution() {
        assert_eq!(TimeScale::default().power_of_two_resolution(), None);
        assert_eq!(TimeScale::default().time_to_px(3.0), 0.0);
    }
}
