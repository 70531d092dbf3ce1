use tracing::trace;

use crate::config::AutoPanConfig;
use crate::geometry::{Point, Rect, point};
use crate::port::{DiagramState, FrameScheduler, FrameToken};

fn velocity(value: f32, min: f32, max: f32, ramp: f32) -> f32 {
    // NaN.max(1.0) is 1.0, so the clamp range is always ordered
    let ramp = ramp.max(1.0);
    if value < min {
        (min - value).clamp(1.0, ramp) / ramp
    } else if value > max {
        -(value - max).clamp(1.0, ramp) / ramp
    } else {
        0.0
    }
}

/// Pan delta for a container-relative pointer position.
///
/// Zero inside the dead-zone, growing linearly across the edge band and
/// saturating at `config.speed`. Axes are independent.
pub fn calc_auto_pan(position: Point, bounds: &Rect, config: &AutoPanConfig) -> Point {
    let edge = config.edge_distance;
    let x = velocity(position.x, edge, bounds.width - edge, config.ramp) * config.speed;
    let y = velocity(position.y, edge, bounds.height - edge, config.ramp) * config.speed;
    point(x, y)
}

/// Frame-driven auto-pan loop for one connection session.
#[derive(Debug, Default)]
pub struct AutoPan {
    started: bool,
    pending: Option<FrameToken>,
}

impl AutoPan {
    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn pending(&self) -> Option<FrameToken> {
        self.pending
    }

    /// Start the loop once per session. The first tick runs immediately.
    pub fn start(
        &mut self,
        enabled: bool,
        position: Point,
        bounds: &Rect,
        config: &AutoPanConfig,
        state: &mut dyn DiagramState,
        frames: &mut dyn FrameScheduler,
    ) {
        if self.started {
            return;
        }
        self.started = true;
        if enabled {
            self.step(position, bounds, config, state, frames);
        }
    }

    /// Run a scheduled tick. Tokens other than the pending one are stale and ignored.
    pub fn tick(
        &mut self,
        token: FrameToken,
        position: Point,
        bounds: &Rect,
        config: &AutoPanConfig,
        state: &mut dyn DiagramState,
        frames: &mut dyn FrameScheduler,
    ) -> bool {
        if self.pending != Some(token) {
            trace!(?token, "ignoring stale auto-pan frame");
            return false;
        }
        self.pending = None;
        self.step(position, bounds, config, state, frames);
        true
    }

    pub fn stop(&mut self, frames: &mut dyn FrameScheduler) {
        if let Some(token) = self.pending.take() {
            frames.cancel_frame(token);
        }
        self.started = false;
    }

    fn step(
        &mut self,
        position: Point,
        bounds: &Rect,
        config: &AutoPanConfig,
        state: &mut dyn DiagramState,
        frames: &mut dyn FrameScheduler,
    ) {
        let delta = calc_auto_pan(position, bounds, config);
        if !delta.is_zero() {
            trace!(dx = delta.x, dy = delta.y, "auto-pan");
            state.pan_by(delta);
        }
        self.pending = Some(frames.request_frame());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> Rect {
        Rect::new(0.0, 0.0, 800.0, 600.0)
    }

    #[test]
    fn center_of_container_does_not_pan() {
        let delta = calc_auto_pan(bounds().center(), &bounds(), &AutoPanConfig::default());
        assert_eq!(delta, point(0.0, 0.0));
    }

    #[test]
    fn dead_zone_ends_at_edge_band() {
        let config = AutoPanConfig::default();
        assert!(calc_auto_pan(point(35.0, 300.0), &bounds(), &config).is_zero());
        assert!(calc_auto_pan(point(765.0, 300.0), &bounds(), &config).is_zero());
        assert!(!calc_auto_pan(point(34.0, 300.0), &bounds(), &config).is_zero());
    }

    #[test]
    fn pans_toward_the_near_edge() {
        let config = AutoPanConfig::default();
        let left = calc_auto_pan(point(10.0, 300.0), &bounds(), &config);
        assert!(left.x > 0.0);
        assert_eq!(left.y, 0.0);

        let bottom_right = calc_auto_pan(point(790.0, 590.0), &bounds(), &config);
        assert!(bottom_right.x < 0.0);
        assert!(bottom_right.y < 0.0);
    }

    #[test]
    fn speed_grows_then_saturates() {
        let config = AutoPanConfig::default();
        let near = calc_auto_pan(point(30.0, 300.0), &bounds(), &config).x;
        let nearer = calc_auto_pan(point(5.0, 300.0), &bounds(), &config).x;
        let outside = calc_auto_pan(point(-100.0, 300.0), &bounds(), &config).x;
        let far_outside = calc_auto_pan(point(-1000.0, 300.0), &bounds(), &config).x;
        assert!(near < nearer);
        assert!(nearer < outside);
        assert_eq!(outside, config.speed);
        assert_eq!(far_outside, config.speed);
    }

    #[test]
    fn ramp_below_one_saturates_instead_of_panicking() {
        for ramp in [0.5, 0.0, -3.0, f32::NAN] {
            let config = AutoPanConfig {
                ramp,
                ..Default::default()
            };
            let delta = calc_auto_pan(point(10.0, 300.0), &bounds(), &config);
            assert_eq!(delta, point(config.speed, 0.0), "ramp {ramp}");
            assert!(calc_auto_pan(bounds().center(), &bounds(), &config).is_zero());
        }
    }
}
