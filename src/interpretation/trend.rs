use crate::models::enums::TrendDirection;
use crate::models::LabTrendPoint;

use super::helpers::percent_change;
use super::types::{LabError, LabTrend, TrendStep};

pub const DEFAULT_SIGNIFICANCE_THRESHOLD_PERCENT: f64 = 10.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Slack for float error when comparing a percent change to the threshold,
/// so a change of exactly the threshold (e.g. 3.0 to 3.3 at 10%) counts.
const THRESHOLD_EPSILON: f64 = 1e-9;

/// Analyze one test's history. `points` must be ascending by timestamp;
/// out-of-order input is rejected rather than sorted.
///
/// Direction uses the net change between first and last point. Significance
/// uses every consecutive pair independently of direction.
pub fn analyze_trend(
    test_id: &str,
    points: &[LabTrendPoint],
    threshold_percent: f64,
) -> Result<LabTrend, LabError> {
    if !threshold_percent.is_finite() || threshold_percent <= 0.0 {
        return Err(LabError::InvalidThreshold(threshold_percent));
    }
    if let Some(bad) = points.iter().find(|p| !p.value.is_finite()) {
        return Err(LabError::InvalidValue {
            test_id: test_id.to_string(),
            value: bad.value,
        });
    }
    if let Some(index) = points
        .windows(2)
        .position(|w| w[1].timestamp < w[0].timestamp)
    {
        return Err(LabError::UnsortedInput { index: index + 1 });
    }

    let mut steps = Vec::with_capacity(points.len());
    let mut is_significant = false;
    for (i, point) in points.iter().enumerate() {
        let (delta, pct) = match i.checked_sub(1).map(|prev| &points[prev]) {
            Some(prev) => {
                let delta = point.value - prev.value;
                let pct = percent_change(prev.value, point.value);
                if exceeds(delta, pct, threshold_percent) {
                    is_significant = true;
                }
                (delta, pct)
            }
            None => (0.0, None),
        };
        steps.push(TrendStep {
            timestamp: point.timestamp,
            value: point.value,
            delta,
            percent_change: pct,
        });
    }

    let (net_change, net_percent_change, rate_per_day) = match (points.first(), points.last()) {
        (Some(first), Some(last)) if points.len() > 1 => {
            let net = last.value - first.value;
            let elapsed_days =
                (last.timestamp - first.timestamp).num_seconds() as f64 / SECONDS_PER_DAY;
            let rate = (elapsed_days > 0.0).then(|| net / elapsed_days);
            (net, percent_change(first.value, last.value), rate)
        }
        _ => (0.0, None, None),
    };

    let direction = direction_for(net_change, net_percent_change, threshold_percent);

    tracing::debug!(
        test_id = %test_id,
        points = points.len(),
        direction = %direction,
        significant = is_significant,
        "Trend analyzed"
    );

    Ok(LabTrend {
        test_id: test_id.to_string(),
        steps,
        direction,
        is_significant,
        net_change,
        net_percent_change,
        rate_per_day,
        threshold_percent,
    })
}

/// A change meets the threshold when its percent does, or when it moves
/// away from a zero baseline at all.
fn exceeds(delta: f64, pct: Option<f64>, threshold: f64) -> bool {
    match pct {
        Some(p) => p.abs() >= threshold - THRESHOLD_EPSILON,
        None => delta != 0.0,
    }
}

fn direction_for(net_change: f64, net_pct: Option<f64>, threshold: f64) -> TrendDirection {
    let signed = match net_pct {
        Some(p) if p >= threshold - THRESHOLD_EPSILON => 1,
        Some(p) if p <= -(threshold - THRESHOLD_EPSILON) => -1,
        Some(_) => 0,
        None if net_change > 0.0 => 1,
        None if net_change < 0.0 => -1,
        None => 0,
    };
    match signed {
        1 => TrendDirection::Rising,
        -1 => TrendDirection::Falling,
        _ => TrendDirection::Stable,
    }
}
