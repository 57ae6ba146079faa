/// Two-sided 95% standard normal quantile.
pub const Z_95: f64 = 1.959_963_984_540_054;

/// A single time-to-event observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    /// Time until the event or until censoring.
    pub duration: f64,
    /// `true` if the event was observed, `false` if the observation was censored.
    pub event: bool,
}

impl Observation {
    #[must_use]
    pub fn new(duration: f64, event: bool) -> Self {
        Self { duration, event }
    }
}

/// Kaplan-Meier survival curve for survival analysis.
///
/// The Kaplan-Meier estimator is a non-parametric statistic used to estimate the survival
/// function from lifetime data. It accounts for censored data (observations where the event
/// of interest has not occurred by the end of the study period).
///
/// # Fields
///
/// The curve stores parallel vectors representing the survival function at discrete time points:
/// - Time points where events occurred
/// - Survival probability at each time point
/// - Confidence band at each time point
/// - Number of subjects at risk at each time point
/// - Number of events (non-censored observations) at each time point
///
/// The confidence band uses Greenwood's variance on the log(-log) scale, which keeps
/// both bounds inside `[0, 1]`.
#[derive(Debug, Clone)]
pub struct KaplanMeierCurve {
    /// Time points where events (non-censored observations) occurred.
    pub times: Vec<f64>,
    /// Survival probability at each corresponding time point.
    /// Values range from 0.0 (no survival) to 1.0 (complete survival).
    pub survival_prob: Vec<f64>,
    /// Lower bound of the confidence band at each time point.
    pub lower: Vec<f64>,
    /// Upper bound of the confidence band at each time point.
    pub upper: Vec<f64>,
    /// Number of subjects at risk (not yet experienced the event or censored) at each time point.
    pub at_risk: Vec<usize>,
    /// Number of events (non-censored observations) that occurred at each time point.
    pub events: Vec<usize>,
    /// Total number of observations the curve was fitted on.
    pub subjects: usize,
    /// Largest observed duration, event or censored.
    pub max_time: Option<f64>,
}

impl KaplanMeierCurve {
    /// Computes the Kaplan-Meier survival curve with a 95% confidence band.
    ///
    /// # Examples
    ///
    /// ```
    /// # use oncolens_stats::survival::{KaplanMeierCurve, Observation};
    /// let data = vec![
    ///     Observation::new(10.0, true),  // Event at time 10
    ///     Observation::new(20.0, false), // Censored at time 20
    ///     Observation::new(30.0, true),  // Event at time 30
    /// ];
    /// let curve = KaplanMeierCurve::from_observations(data);
    /// assert_eq!(curve.times, vec![10.0, 30.0]);
    /// assert_eq!(curve.survival_prob[1], 0.0);
    /// ```
    #[must_use]
    pub fn from_observations(data: Vec<Observation>) -> Self {
        Self::from_observations_with_z(data, Z_95)
    }

    /// Computes the Kaplan-Meier survival curve using `z` as the normal quantile of the band.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_observations_with_z(mut data: Vec<Observation>, z: f64) -> Self {
        let subjects = data.len();
        let mut curve = Self {
            times: vec![],
            survival_prob: vec![],
            lower: vec![],
            upper: vec![],
            at_risk: vec![],
            events: vec![],
            subjects,
            max_time: None,
        };
        if data.is_empty() {
            return curve;
        }

        // Sort by time
        data.sort_by(|a, b| a.duration.total_cmp(&b.duration));
        curve.max_time = data.last().map(|obs| obs.duration);

        let mut current_survival = 1.0;
        let mut greenwood_sum = 0.0;

        let mut i = 0;
        while i < data.len() {
            let current_time = data[i].duration;
            let at_risk = subjects - i;

            // Count events (non-censored) at this time point
            let mut event_count = 0;
            let mut j = i;
            while j < data.len() && data[j].duration.total_cmp(&current_time).is_eq() {
                if data[j].event {
                    event_count += 1;
                }
                j += 1;
            }

            if event_count > 0 {
                let survival_rate = 1.0 - (event_count as f64 / at_risk as f64);
                current_survival *= survival_rate;
                if at_risk > event_count {
                    greenwood_sum +=
                        event_count as f64 / (at_risk as f64 * (at_risk - event_count) as f64);
                }
                let (lower, upper) = log_log_band(current_survival, greenwood_sum, z);

                curve.times.push(current_time);
                curve.survival_prob.push(current_survival);
                curve.lower.push(lower);
                curve.upper.push(upper);
                curve.at_risk.push(at_risk);
                curve.events.push(event_count);
            }

            i = j;
        }

        curve
    }

    /// Total number of observed events.
    #[must_use]
    pub fn total_events(&self) -> usize {
        self.events.iter().sum()
    }

    /// Returns the median survival time.
    ///
    /// The median survival time is the first event time at which the survival probability
    /// drops to or below 50%. If the survival probability never reaches 50%,
    /// this method returns `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use oncolens_stats::survival::{KaplanMeierCurve, Observation};
    /// let data = [10.0, 20.0, 30.0].map(|t| Observation::new(t, true)).to_vec();
    /// let curve = KaplanMeierCurve::from_observations(data);
    /// assert_eq!(curve.median_survival(), Some(20.0));
    /// ```
    #[must_use]
    pub fn median_survival(&self) -> Option<f64> {
        self.survival_prob
            .iter()
            .position(|&s| s <= 0.5)
            .map(|i| self.times[i])
    }

    /// Returns the survival probability at a specific time.
    ///
    /// This method uses a step function: the survival probability remains constant
    /// between event times and decreases only when an event occurs.
    ///
    /// Returns `1.0` if the time is before the first event, or the last known survival
    /// probability if the time is after the last event.
    #[must_use]
    pub fn survival_at(&self, time: f64) -> f64 {
        // Find the last time point <= target time
        self.times
            .iter()
            .rposition(|&t| t <= time)
            .map_or(1.0, |i| self.survival_prob[i])
    }

    /// Step-function vertices `(time, survival, lower, upper)` starting at time zero
    /// (or the earliest observation, if negative) and extending to the last observation.
    #[must_use]
    pub fn step_points(&self) -> Vec<(f64, f64, f64, f64)> {
        let start = self.times.first().map_or(0.0, |&t| t.min(0.0));
        let mut points = vec![(start, 1.0, 1.0, 1.0)];
        let mut previous = (1.0, 1.0, 1.0);
        for i in 0..self.times.len() {
            let t = self.times[i];
            points.push((t, previous.0, previous.1, previous.2));
            previous = (self.survival_prob[i], self.lower[i], self.upper[i]);
            points.push((t, previous.0, previous.1, previous.2));
        }
        if let Some(max_time) = self.max_time
            && self.times.last().is_none_or(|&t| t < max_time)
        {
            points.push((max_time, previous.0, previous.1, previous.2));
        }
        points
    }
}

/// Confidence bounds for survival `s` with cumulative Greenwood term `variance_sum`.
fn log_log_band(s: f64, variance_sum: f64, z: f64) -> (f64, f64) {
    if s <= 0.0 {
        return (0.0, 0.0);
    }
    if s >= 1.0 {
        return (1.0, 1.0);
    }
    let log_s = s.ln();
    let spread = z * variance_sum.sqrt() / log_s.abs();
    let a = s.powf(spread.exp());
    let b = s.powf((-spread).exp());
    (a.min(b), a.max(b))
}
