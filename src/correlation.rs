//! Energy/productivity correlation
//!
//! Pearson correlation over hourly energy metrics, optimal energy zone detection and
//! qualitative strength labels.

use crate::types::{CorrelationStrength, EnergyCorrelation, EnergyMetric, EnergyZone};

/// Productivity above which a bucket counts toward the optimal energy zone
const HIGH_PRODUCTIVITY: f64 = 75.0;

/// Zone reported when no bucket is highly productive
pub const DEFAULT_OPTIMAL_ZONE: EnergyZone = EnergyZone {
    min: 60.0,
    max: 100.0,
};

/// Pearson correlation coefficient of paired samples.
///
/// Formula: `(nΣxy − ΣxΣy) / sqrt((nΣx² − (Σx)²)(nΣy² − (Σy)²))`
///
/// Returns 0 for fewer than two pairs or a zero denominator. The result is clamped to
/// `[-1, 1]`. Extra elements of the longer slice are ignored.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return 0.0;
    }

    let (sum_x, sum_y, sum_xy, sum_x2, sum_y2) = xs.iter().zip(ys).take(n).fold(
        (0.0, 0.0, 0.0, 0.0, 0.0),
        |(sx, sy, sxy, sx2, sy2), (x, y)| (sx + x, sy + y, sxy + x * y, sx2 + x * x, sy2 + y * y),
    );

    let n = n as f64;
    let numerator = n * sum_xy - sum_x * sum_y;
    let denominator = ((n * sum_x2 - sum_x * sum_x) * (n * sum_y2 - sum_y * sum_y)).sqrt();

    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }

    let r = numerator / denominator;
    if r.is_nan() {
        0.0
    } else {
        r.clamp(-1.0, 1.0)
    }
}

/// Label the magnitude of a correlation coefficient
pub fn correlation_strength(r: f64) -> CorrelationStrength {
    let magnitude = r.abs();
    if magnitude > 0.8 {
        CorrelationStrength::VeryStrong
    } else if magnitude > 0.6 {
        CorrelationStrength::Strong
    } else if magnitude > 0.4 {
        CorrelationStrength::Moderate
    } else if magnitude > 0.2 {
        CorrelationStrength::Weak
    } else {
        CorrelationStrength::VeryWeak
    }
}

/// Range of energy levels among buckets with productivity above 75, or
/// [`DEFAULT_OPTIMAL_ZONE`] when there are none
pub fn optimal_energy_zone(metrics: &[EnergyMetric]) -> EnergyZone {
    metrics
        .iter()
        .filter(|m| m.productivity > HIGH_PRODUCTIVITY)
        .map(|m| m.energy_level)
        .fold(None, |zone: Option<EnergyZone>, energy| {
            Some(match zone {
                None => EnergyZone {
                    min: energy,
                    max: energy,
                },
                Some(z) => EnergyZone {
                    min: z.min.min(energy),
                    max: z.max.max(energy),
                },
            })
        })
        .unwrap_or(DEFAULT_OPTIMAL_ZONE)
}

/// Correlation, strength, optimal zone, peak bucket and mean energy
pub fn energy_correlation(metrics: &[EnergyMetric]) -> EnergyCorrelation {
    let energy: Vec<f64> = metrics.iter().map(|m| m.energy_level).collect();
    let productivity: Vec<f64> = metrics.iter().map(|m| m.productivity).collect();
    let correlation = pearson(&energy, &productivity);

    let mut peak: Option<&EnergyMetric> = None;
    for metric in metrics {
        if peak.map_or(true, |p| metric.productivity > p.productivity) {
            peak = Some(metric);
        }
    }

    let average_energy = if energy.is_empty() {
        0.0
    } else {
        energy.iter().sum::<f64>() / energy.len() as f64
    };

    EnergyCorrelation {
        correlation,
        strength: correlation_strength(correlation),
        optimal_zone: optimal_energy_zone(metrics),
        peak: peak.cloned(),
        average_energy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn metric(hour: i64, energy: f64, productivity: f64) -> EnergyMetric {
        EnergyMetric {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap() + Duration::hours(hour),
            energy_level: energy,
            productivity,
            context_switches: 0,
            flow_state: 0.5,
        }
    }

    #[test]
    fn test_perfect_correlation() {
        let r = pearson(&[1.0, 2.0, 3.0, 4.0], &[2.0, 4.0, 6.0, 8.0]);
        assert!((r - 1.0).abs() < 1e-9);
        let r = pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]);
        assert!((r + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_inputs_give_zero() {
        assert_eq!(pearson(&[], &[]), 0.0);
        assert_eq!(pearson(&[5.0], &[1.0]), 0.0);
        assert_eq!(pearson(&[3.0, 3.0, 3.0], &[1.0, 2.0, 3.0]), 0.0);
    }

    #[test]
    fn test_strength_labels() {
        assert_eq!(correlation_strength(0.9), CorrelationStrength::VeryStrong);
        assert_eq!(correlation_strength(-0.7), CorrelationStrength::Strong);
        assert_eq!(correlation_strength(0.5), CorrelationStrength::Moderate);
        assert_eq!(correlation_strength(0.3), CorrelationStrength::Weak);
        assert_eq!(correlation_strength(0.2), CorrelationStrength::VeryWeak);
    }

    #[test]
    fn test_optimal_zone() {
        let metrics = vec![
            metric(0, 97.0, 77.6),
            metric(1, 40.0, 32.0),
            metric(2, 99.0, 79.2),
        ];
        assert_eq!(
            optimal_energy_zone(&metrics),
            EnergyZone {
                min: 97.0,
                max: 99.0
            }
        );
        assert_eq!(optimal_energy_zone(&metrics[1..2]), DEFAULT_OPTIMAL_ZONE);
    }

    #[test]
    fn test_energy_correlation_peak_prefers_earliest() {
        let metrics = vec![metric(0, 50.0, 40.0), metric(1, 80.0, 64.0), metric(2, 80.0, 64.0)];
        let result = energy_correlation(&metrics);
        assert!((result.correlation - 1.0).abs() < 1e-9);
        assert_eq!(result.strength, CorrelationStrength::VeryStrong);
        assert_eq!(result.peak.map(|p| p.timestamp), Some(metrics[1].timestamp));
        assert!((result.average_energy - 70.0).abs() < 0.001);
    }

    #[test]
    fn test_energy_correlation_empty() {
        let result = energy_correlation(&[]);
        assert_eq!(result.correlation, 0.0);
        assert_eq!(result.peak, None);
        assert_eq!(result.average_energy, 0.0);
        assert_eq!(result.optimal_zone, DEFAULT_OPTIMAL_ZONE);
    }
}
