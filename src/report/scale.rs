//! Scales for the SVG charts
//!
//! - [`TimeScale`]: maps timestamps to x positions, with a padded domain
//!   rounded outward to calendar boundaries and matching tick marks.
//! - [`LinearScale`]: zero-based value axis with "nice" 1/2/5 ticks.
//! - [`BandScale`]: evenly spaced bands with padding, for rows and bars.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime};

/// Roughly one tick per this many pixels
const PX_PER_TICK: f64 = 110.0;
const MAX_TICKS: usize = 12;
/// Fraction of the data span added on each side of the time domain
const BUFFER_RATIO: f64 = 0.05;

// ============================================================================
// Time scale
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickInterval {
    Days(u32),
    Months(u32),
    Years(u32),
}

const INTERVALS: &[TickInterval] = &[
    TickInterval::Days(1),
    TickInterval::Days(2),
    TickInterval::Days(7),
    TickInterval::Days(14),
    TickInterval::Months(1),
    TickInterval::Months(3),
    TickInterval::Months(6),
    TickInterval::Years(1),
    TickInterval::Years(2),
    TickInterval::Years(5),
    TickInterval::Years(10),
];

impl TickInterval {
    fn approx_days(self) -> f64 {
        match self {
            TickInterval::Days(n) => n as f64,
            TickInterval::Months(n) => n as f64 * 30.44,
            TickInterval::Years(n) => n as f64 * 365.25,
        }
    }

    /// Largest boundary of this interval at or before `t`
    pub fn floor(self, t: NaiveDateTime) -> NaiveDateTime {
        let date = t.date();
        let floored = match self {
            TickInterval::Days(_) => date,
            TickInterval::Months(n) => {
                let month0 = date.month0() - date.month0() % n;
                NaiveDate::from_ymd_opt(date.year(), month0 + 1, 1).unwrap_or(date)
            }
            TickInterval::Years(n) => {
                let year = date.year() - date.year().rem_euclid(n as i32);
                NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(date)
            }
        };
        floored.and_time(chrono::NaiveTime::MIN)
    }

    /// Smallest boundary of this interval at or after `t`
    pub fn ceil(self, t: NaiveDateTime) -> NaiveDateTime {
        let floored = self.floor(t);
        if floored == t {
            t
        } else {
            self.step(floored)
        }
    }

    pub fn step(self, t: NaiveDateTime) -> NaiveDateTime {
        let next = match self {
            TickInterval::Days(n) => t.checked_add_signed(Duration::days(n as i64)),
            TickInterval::Months(n) => t.checked_add_months(Months::new(n)),
            TickInterval::Years(n) => t.checked_add_months(Months::new(n * 12)),
        };
        // Out of chrono's range; nothing sensible to draw past it
        next.unwrap_or(NaiveDateTime::MAX)
    }

    pub fn label_format(self) -> &'static str {
        match self {
            TickInterval::Days(_) => "%Y/%m/%d",
            TickInterval::Months(_) => "%Y/%m",
            TickInterval::Years(_) => "%Y",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TimeScale {
    start: NaiveDateTime,
    end: NaiveDateTime,
    width: f64,
    interval: TickInterval,
}

impl TimeScale {
    /// Scale covering `[min, max]` over `width` pixels.
    ///
    /// The domain is widened by 5% of the span on each side (at least one
    /// day) and then rounded outward to the chosen tick interval.
    pub fn new(min: NaiveDateTime, max: NaiveDateTime, width: f64) -> Self {
        let (min, max) = if max < min { (max, min) } else { (min, max) };

        let span_secs = (max - min).num_seconds() as f64;
        let buffer_secs = (span_secs * BUFFER_RATIO).max(86_400.0) as i64;
        let buffer = Duration::seconds(buffer_secs);
        let padded_start = min.checked_sub_signed(buffer).unwrap_or(min);
        let padded_end = max.checked_add_signed(buffer).unwrap_or(max);

        let target_ticks = ((width / PX_PER_TICK).floor() as usize).clamp(2, MAX_TICKS);
        let span_days = (padded_end - padded_start).num_seconds() as f64 / 86_400.0;
        let interval = INTERVALS
            .iter()
            .copied()
            .find(|i| span_days / i.approx_days() <= target_ticks as f64)
            .unwrap_or(TickInterval::Years(10));

        Self {
            start: interval.floor(padded_start),
            end: interval.ceil(padded_end),
            width,
            interval,
        }
    }

    pub fn domain(&self) -> (NaiveDateTime, NaiveDateTime) {
        (self.start, self.end)
    }

    pub fn interval(&self) -> TickInterval {
        self.interval
    }

    pub fn map(&self, t: NaiveDateTime) -> f64 {
        let total = (self.end - self.start).num_seconds() as f64;
        if total <= 0.0 {
            return 0.0;
        }
        (t - self.start).num_seconds() as f64 / total * self.width
    }

    pub fn ticks(&self) -> Vec<NaiveDateTime> {
        let mut ticks = Vec::new();
        let mut t = self.interval.ceil(self.start);
        while t <= self.end && ticks.len() <= MAX_TICKS * 2 {
            ticks.push(t);
            t = self.interval.step(t);
        }
        ticks
    }

    pub fn tick_label(&self, t: NaiveDateTime) -> String {
        t.format(self.interval.label_format()).to_string()
    }
}

// ============================================================================
// Linear scale
// ============================================================================

#[derive(Debug, Clone)]
pub struct LinearScale {
    max: f64,
    height: f64,
    step: f64,
}

impl LinearScale {
    /// Zero-based scale whose top is `max` rounded up to a tick step.
    ///
    /// With `integer_ticks`, steps below 1 are bumped to 1 (for counts).
    pub fn new(max: f64, height: f64, ticks: usize, integer_ticks: bool) -> Self {
        let max = if max.is_finite() && max > 0.0 { max } else { 1.0 };
        let mut step = tick_step(max, ticks.max(1));
        if integer_ticks {
            step = step.max(1.0).round();
        }
        let top = (max / step).ceil() * step;
        Self { max: top, height, step }
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Pixel y for `value`: 0 at the bottom edge (`height`), `max` at 0
    pub fn map(&self, value: f64) -> f64 {
        self.height - (value.max(0.0) / self.max) * self.height
    }

    pub fn ticks(&self) -> Vec<f64> {
        let n = (self.max / self.step).round() as usize;
        (0..=n).map(|i| i as f64 * self.step).collect()
    }
}

/// Tick step of 1, 2 or 5 times a power of ten giving about `count` ticks
pub fn tick_step(span: f64, count: usize) -> f64 {
    let raw = span / count as f64;
    let power = 10f64.powf(raw.log10().floor());
    let error = raw / power;
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    factor * power
}

// ============================================================================
// Band scale
// ============================================================================

#[derive(Debug, Clone)]
pub struct BandScale {
    step: f64,
    offset: f64,
    bandwidth: f64,
}

impl BandScale {
    /// `count` bands over `extent` pixels, with `padding` (0..1) as a
    /// fraction of the step both between bands and at the outer edges.
    pub fn new(count: usize, extent: f64, padding: f64) -> Self {
        let padding = padding.clamp(0.0, 0.99);
        let step = extent / (count as f64 + padding).max(1.0);
        Self {
            step,
            offset: step * padding,
            bandwidth: step * (1.0 - padding),
        }
    }

    /// Leading edge of band `index`
    pub fn position(&self, index: usize) -> f64 {
        self.offset + index as f64 * self.step
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Start of the slot (band plus its share of padding) for `index`
    pub fn slot(&self, index: usize) -> f64 {
        self.position(index) - self.offset / 2.0
    }
}
