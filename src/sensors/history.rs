//! Rolling sample storage and derived statistics.
//!
//! [`SampleWindow`] is a fixed-capacity ring buffer with internal wrap
//! logic and a valid-entry count; [`History`] layers the derived
//! current/previous readings and trend flags on top. Placeholder slots
//! (value 0) never participate in averages or the trend fit, so a
//! cold or partially filled buffer cannot report artificially low
//! turbidity.

/// Number of raw samples retained per measured quantity.
pub const HISTORY_CAPACITY: usize = 30;

/// Fit slopes with magnitude below this are treated as flat. Absorbs
/// f32 accumulation noise when the window holds identical samples.
const TREND_EPSILON: f32 = 1e-4;

/// A derived pair for one measured quantity. Immutable once produced;
/// superseded by the next sample.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Reading {
    pub value: f32,
    pub average: f32,
}

// ───────────────────────────────────────────────────────────────
// SampleWindow
// ───────────────────────────────────────────────────────────────

/// Fixed-capacity ring buffer of raw samples.
///
/// The wrap index is internal; callers only `push` and query. Slots
/// not yet written hold 0.0 and are treated as placeholders.
#[derive(Debug, Clone)]
pub struct SampleWindow<const N: usize = HISTORY_CAPACITY> {
    slots: [f32; N],
    head: usize,
    count: usize,
}

impl<const N: usize> SampleWindow<N> {
    pub fn new() -> Self {
        Self {
            slots: [0.0; N],
            head: 0,
            count: 0,
        }
    }

    /// Store a sample in the current slot and advance the index mod N.
    pub fn push(&mut self, value: f32) {
        self.slots[self.head] = value;
        self.head = (self.head + 1) % N;
        if self.count < N {
            self.count += 1;
        }
    }

    /// Number of slots written at least once.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Mean over valid slots only: those whose value, rounded to two
    /// decimals, lies in `(0, vref]`. `None` when no slot qualifies.
    /// Accumulates in f64 so a window of identical samples averages to
    /// exactly that sample; f32 accumulation drifts in the last bit and
    /// fakes a change where there is none.
    pub fn average_in_range(&self, vref: f32) -> Option<f32> {
        let mut sum = 0.0f64;
        let mut n = 0u32;
        for &v in &self.slots {
            if Self::in_valid_range(v, vref) {
                sum += f64::from(v);
                n += 1;
            }
        }
        if n == 0 {
            None
        } else {
            Some((sum / f64::from(n)) as f32)
        }
    }

    /// Least-squares slope of value vs slot index over all non-zero
    /// slots. `None` when fewer than 2 slots contribute (a line needs
    /// two points).
    pub fn slope(&self) -> Option<f32> {
        let mut n = 0u32;
        let mut sum_x = 0.0f32;
        let mut sum_y = 0.0f32;
        let mut sum_xy = 0.0f32;
        let mut sum_xx = 0.0f32;

        for (i, &v) in self.slots.iter().enumerate() {
            if v == 0.0 {
                continue;
            }
            let x = i as f32;
            n += 1;
            sum_x += x;
            sum_y += v;
            sum_xy += x * v;
            sum_xx += x * x;
        }

        if n < 2 {
            return None;
        }
        let n = n as f32;
        let denom = n * sum_xx - sum_x * sum_x;
        if denom == 0.0 {
            return None;
        }
        Some((n * sum_xy - sum_x * sum_y) / denom)
    }

    fn in_valid_range(value: f32, vref: f32) -> bool {
        let rounded = (value * 100.0).round() / 100.0;
        rounded > 0.0 && rounded <= vref
    }
}

impl<const N: usize> Default for SampleWindow<N> {
    fn default() -> Self {
        Self::new()
    }
}

// ───────────────────────────────────────────────────────────────
// History
// ───────────────────────────────────────────────────────────────

/// Rolling window plus derived current/previous readings and trend.
#[derive(Debug, Clone, Default)]
pub struct History {
    pub window: SampleWindow,
    pub current: Reading,
    pub previous: Reading,
    pub is_rising: bool,
    pub is_falling: bool,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new raw sample as the current value.
    pub fn record(&mut self, value: f32) {
        self.window.push(value);
        self.current.value = value;
    }

    pub fn set_average(&mut self, average: f32) {
        self.current.average = average;
    }

    /// Recompute the trend flags from the window fit. With fewer than
    /// 2 contributing samples the previous flags are retained; a zero
    /// slope clears both.
    pub fn update_trend(&mut self) {
        if let Some(slope) = self.window.slope() {
            if slope.abs() < TREND_EPSILON {
                self.is_rising = false;
                self.is_falling = false;
            } else {
                self.is_rising = slope > 0.0;
                self.is_falling = slope < 0.0;
            }
        }
    }

    /// Commit the current reading as the new baseline.
    pub fn commit(&mut self) {
        self.previous = self.current;
    }
}
