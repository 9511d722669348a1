//! Conversion between gradients and per-channel lifetime curves.
//!
//! # Gradient → curves
//! Each stop becomes an anchor at `(position, value / 255)`. Handles sit one
//! third of the way toward the neighbouring stop at the anchor's own height,
//! so every stop gets a flat tangent. Flat tangents cannot overshoot the
//! stop colors; the trade-off is that color eases in and out of every stop
//! instead of passing smoothly through it.
//!
//! # Curves → gradient
//! Each channel curve is sampled at `sample_count` evenly spaced positions
//! and rescaled to 0..255. This is a lossy reconstruction: it reproduces the
//! original stops only where they coincide with sample positions.

use crate::curve::evaluate::CurveEvaluator;
use crate::curve::lifetime::LifetimeCurve;
use crate::curve::model::{Curve, CurvePoint};

use super::model::{CHANNEL_MAX, Channel, GradientError, GradientModel, GradientStop, StopColor};

/// Default number of reconstruction samples.
pub const DEFAULT_SAMPLE_COUNT: usize = 5;

/// The four channel curves derived from a gradient.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelCurves {
    pub r: LifetimeCurve,
    pub g: LifetimeCurve,
    pub b: LifetimeCurve,
    pub a: LifetimeCurve,
}

impl ChannelCurves {
    pub fn get(&self, channel: Channel) -> &LifetimeCurve {
        match channel {
            Channel::R => &self.r,
            Channel::G => &self.g,
            Channel::B => &self.b,
            Channel::A => &self.a,
        }
    }
}

/// Build the lifetime curve for one channel of a stop list.
///
/// The stops are normalized the way [`GradientModel::new`] does it, so the
/// outer stops land on 0 and 1 whatever their stored positions.
pub fn gradient_to_channel_curve(
    stops: &[GradientStop],
    channel: Channel,
) -> Result<LifetimeCurve, GradientError> {
    let gradient = GradientModel::new(stops.to_vec())?;
    let sorted = gradient.stops();

    let last = sorted.len() - 1;
    let mut points = Vec::with_capacity(sorted.len() * 3);
    for (i, stop) in sorted.iter().enumerate() {
        let x = stop.position;
        let y = stop.color.channel(channel) / CHANNEL_MAX;

        if i > 0 {
            let prev = sorted[i - 1].position;
            points.push(CurvePoint::handle(x - (x - prev) / 3.0, y));
        }

        let percentage = if i == 0 {
            0.0
        } else if i == last {
            1.0
        } else {
            x
        };
        points.push(CurvePoint {
            x,
            y,
            percentage: Some(percentage),
        });

        if i < last {
            let next = sorted[i + 1].position;
            points.push(CurvePoint::handle(x + (next - x) / 3.0, y));
        }
    }

    Ok(LifetimeCurve::unit(Curve::from_points(points)?))
}

/// Build all four channel curves for a stop list.
pub fn gradient_to_bezier_curves(stops: &[GradientStop]) -> Result<ChannelCurves, GradientError> {
    Ok(ChannelCurves {
        r: gradient_to_channel_curve(stops, Channel::R)?,
        g: gradient_to_channel_curve(stops, Channel::G)?,
        b: gradient_to_channel_curve(stops, Channel::B)?,
        a: gradient_to_channel_curve(stops, Channel::A)?,
    })
}

/// Reconstruct gradient stops by sampling the four channel curves.
///
/// `sample_count` is raised to 2 if smaller, since a gradient needs both
/// ends.
pub fn bezier_curves_to_gradient(curves: &ChannelCurves, sample_count: usize) -> Vec<GradientStop> {
    let count = sample_count.max(2);
    let sample = |channel: Channel, position: f32| {
        let curve = &curves.get(channel).bezier_points;
        let unit = CurveEvaluator { curve }.evaluate(position);
        (unit * CHANNEL_MAX).round()
    };

    (0..count)
        .map(|i| {
            let position = i as f32 / (count - 1) as f32;
            GradientStop::new(
                position,
                StopColor::new(
                    sample(Channel::R, position),
                    sample(Channel::G, position),
                    sample(Channel::B, position),
                    sample(Channel::A, position),
                ),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn stops() -> Vec<GradientStop> {
        vec![
            GradientStop::new(0.0, StopColor::new(255.0, 0.0, 0.0, 255.0)),
            GradientStop::new(0.5, StopColor::new(0.0, 128.0, 0.0, 200.0)),
            GradientStop::new(1.0, StopColor::new(0.0, 0.0, 255.0, 0.0)),
        ]
    }

    #[test]
    fn test_single_stop_is_rejected() {
        let result = gradient_to_channel_curve(&stops()[..1], Channel::R);
        assert_eq!(result, Err(GradientError::TooFewStops { count: 1 }));
        assert!(gradient_to_bezier_curves(&[]).is_err());
    }

    #[test]
    fn test_channel_curve_layout() {
        let curve = gradient_to_channel_curve(&stops(), Channel::G).expect("valid");
        assert_eq!(curve.scale, Some(1.0));
        let points = curve.bezier_points.points();
        assert_eq!(points.len(), 7);

        // First anchor and its right handle.
        assert_eq!(points[0].percentage, Some(0.0));
        assert!((points[1].x - 0.5 / 3.0).abs() < EPSILON);
        assert_eq!(points[1].y, points[0].y);

        // Interior anchor with flat handles.
        let mid_y = 128.0 / 255.0;
        assert!((points[3].y - mid_y).abs() < EPSILON);
        assert_eq!(points[3].percentage, Some(0.5));
        assert!((points[2].x - (0.5 - 0.5 / 3.0)).abs() < EPSILON);
        assert!((points[4].x - (0.5 + 0.5 / 3.0)).abs() < EPSILON);
        assert_eq!(points[2].y, points[3].y);
        assert_eq!(points[4].y, points[3].y);

        // Last anchor.
        assert_eq!(points[6].percentage, Some(1.0));
    }

    #[test]
    fn test_unsorted_stops_are_sorted() {
        let mut reversed = stops();
        reversed.reverse();
        assert_eq!(
            gradient_to_bezier_curves(&reversed),
            gradient_to_bezier_curves(&stops())
        );
    }

    #[test]
    fn test_inset_outer_stops_are_pinned() {
        let inset = vec![
            GradientStop::new(0.2, StopColor::new(255.0, 0.0, 0.0, 255.0)),
            GradientStop::new(0.8, StopColor::new(0.0, 0.0, 255.0, 0.0)),
        ];
        let curves = gradient_to_bezier_curves(&inset).expect("two stops are enough");
        let points = curves.r.bezier_points.points();
        assert_eq!((points[0].x, points[0].percentage), (0.0, Some(0.0)));
        let last = points.len() - 1;
        assert_eq!((points[last].x, points[last].percentage), (1.0, Some(1.0)));
        assert!((points[1].x - 1.0 / 3.0).abs() < EPSILON);
        assert!((evaluate_unit(&curves.b, 1.0) - 1.0).abs() < EPSILON);
    }

    fn evaluate_unit(curve: &LifetimeCurve, x: f32) -> f32 {
        CurveEvaluator {
            curve: &curve.bezier_points,
        }
        .evaluate(x)
    }

    #[test]
    fn test_round_trip_at_stop_positions() {
        let original = stops();
        let curves = gradient_to_bezier_curves(&original).expect("valid");
        let rebuilt = bezier_curves_to_gradient(&curves, original.len());
        assert_eq!(rebuilt.len(), original.len());
        for (a, b) in original.iter().zip(&rebuilt) {
            assert!((a.position - b.position).abs() < EPSILON);
            for channel in Channel::ALL {
                assert!(
                    (a.color.channel(channel) - b.color.channel(channel)).abs() <= 1.0,
                    "{} at {}: {} vs {}",
                    channel.label(),
                    a.position,
                    a.color.channel(channel),
                    b.color.channel(channel)
                );
            }
        }
    }

    #[test]
    fn test_reconstruction_values_are_whole_numbers() {
        let curves = gradient_to_bezier_curves(&stops()).expect("valid");
        for stop in bezier_curves_to_gradient(&curves, DEFAULT_SAMPLE_COUNT) {
            for channel in Channel::ALL {
                let v = stop.color.channel(channel);
                assert_eq!(v, v.round());
                assert!((0.0..=255.0).contains(&v));
            }
        }
    }

    #[test]
    fn test_sample_count_floor_is_two() {
        let curves = gradient_to_bezier_curves(&stops()).expect("valid");
        let rebuilt = bezier_curves_to_gradient(&curves, 0);
        assert_eq!(rebuilt.len(), 2);
        assert_eq!(rebuilt[1].position, 1.0);
    }
}
