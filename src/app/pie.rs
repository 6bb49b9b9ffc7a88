//! Ring-chart geometry in unit coordinates: the origin is the centre, `y`
//! points up, and hour 0 sits at 12 o'clock with time running clockwise.

use std::f64::consts::TAU;

use crate::{clock::format_duration, constants::SCHEDULE_SETTINGS, domain::TimeBlock};

pub struct Ring {
    pub inner: f64,
    pub outer: f64,
    pub radial_steps: usize,
    pub angular_step_hours: f64,
}

/// Clockwise angle from 12 o'clock, in radians.
pub fn hour_to_angle(hour: f64) -> f64 {
    hour / SCHEDULE_SETTINGS.day_hours * TAU
}

pub fn point_at(hour: f64, radius: f64) -> (f64, f64) {
    let angle = hour_to_angle(hour);
    (radius * angle.sin(), radius * angle.cos())
}

/// Samples the annular sector between `start` and `end` hours.
pub fn slice_points(start: f64, end: f64, ring: &Ring) -> Vec<(f64, f64)> {
    if start.is_nan() || end.is_nan() || end <= start || ring.angular_step_hours <= 0.0 {
        return Vec::new();
    }

    let angular_steps = ((end - start) / ring.angular_step_hours).ceil().max(1.0) as usize;
    let radial_steps = ring.radial_steps.max(1);
    let mut points = Vec::with_capacity((angular_steps + 1) * (radial_steps + 1));

    for a in 0..=angular_steps {
        let hour = (start + a as f64 * ring.angular_step_hours).min(end);
        for r in 0..=radial_steps {
            let radius = ring.inner + (ring.outer - ring.inner) * r as f64 / radial_steps as f64;
            points.push(point_at(hour, radius));
        }
    }
    points
}

/// Midpoint of the slice, halfway through the ring's thickness.
pub fn label_anchor(block: &TimeBlock, ring: &Ring) -> (f64, f64) {
    point_at(
        block.start + block.duration() / 2.0,
        (ring.inner + ring.outer) / 2.0,
    )
}

/// `"name (x.xh)"`, or nothing for slices too thin to hold a label.
pub fn slice_label(block: &TimeBlock, min_fraction: f64) -> Option<String> {
    if block.duration() / SCHEDULE_SETTINGS.day_hours < min_fraction {
        return None;
    }
    Some(format!("{} ({})", block.name, format_duration(block.duration())))
}
