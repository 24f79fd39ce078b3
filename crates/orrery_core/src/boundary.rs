//! Edge reflection and speed limiting

use glam::DVec2;

use crate::config::Plane;

/// Point each velocity component back towards the plane when the position
/// has left it on that axis.
///
/// Only the sign changes; the position is left alone, so a body may sit
/// outside the plane until its velocity carries it back.
pub fn reflect(position: DVec2, velocity: DVec2, plane: Plane) -> DVec2 {
    DVec2::new(
        reflect_axis(position.x, velocity.x, plane.width),
        reflect_axis(position.y, velocity.y, plane.height),
    )
}

fn reflect_axis(position: f64, velocity: f64, extent: f64) -> f64 {
    if position < 0.0 {
        velocity.abs()
    } else if position > extent {
        -velocity.abs()
    } else {
        velocity
    }
}

/// Cap each component's magnitude at `max_speed`, keeping its sign.
pub fn clamp_speed(velocity: DVec2, max_speed: f64) -> DVec2 {
    DVec2::new(
        clamp_axis(velocity.x, max_speed),
        clamp_axis(velocity.y, max_speed),
    )
}

fn clamp_axis(velocity: f64, max_speed: f64) -> f64 {
    if velocity.abs() > max_speed {
        max_speed.copysign(velocity)
    } else {
        velocity
    }
}
