//! Render-surface sizing and per-frame camera framing.
//!
//! The camera narrows its field of view while a roll is in progress and relaxes it
//! otherwise; its look target follows the height of the dice.

use crate::{
    constants::{DIE_SIZE, FOV_STEP_DEG, LOOK_TARGET_SMOOTHING, MAX_DISPLAY_WIDTH},
    error::RollError,
    types::Vec3,
};

/// Default camera position, above and in front of the tray.
pub const CAMERA_POSITION: [f32; 3] = [0.0, DIE_SIZE * 12.0, DIE_SIZE * 7.7];

/// Pixel size of the render surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    /// Size the surface for a window: never wider than [`MAX_DISPLAY_WIDTH`], same aspect.
    pub fn from_window(width: f32, height: f32) -> Result<Self, RollError> {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(RollError::Surface { width, height });
        }

        let w = width.min(MAX_DISPLAY_WIDTH);
        Ok(Self {
            width: w,
            height: height / width * w,
        })
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }
}

/// Field-of-view bounds (degrees) for an aspect ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FovRange {
    pub min: f32,
    pub max: f32,
}

/// Narrow screens get a wider view so the whole tray stays visible.
pub fn fov_range(aspect: f32) -> FovRange {
    let max = 20.0 / aspect + 60.0;
    FovRange {
        min: max - 15.0,
        max,
    }
}

/// Camera state the host applies every frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Framing {
    viewport: Viewport,
    fov_deg: f32,
    look_target: Option<Vec3>,
}

impl Framing {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            fov_deg: fov_range(viewport.aspect()).max,
            look_target: None,
        }
    }

    /// Adopt a new surface size. The FOV keeps easing from where it is.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Advance one frame.
    ///
    /// `narrowing` eases the FOV toward its minimum, otherwise toward its maximum. The
    /// look target moves part of the way toward the vertical centre of `dice`.
    pub fn update(&mut self, narrowing: bool, dice: impl IntoIterator<Item = Vec3>) {
        let range = fov_range(self.viewport.aspect());
        let goal = if narrowing { range.min } else { range.max };
        let gap = goal - self.fov_deg;
        self.fov_deg = if gap.abs() <= FOV_STEP_DEG {
            goal
        } else {
            self.fov_deg + FOV_STEP_DEG.copysign(gap)
        };

        let Some(centre) = vertical_centre(dice) else {
            return;
        };
        let target = Vec3::new(0.0, centre, 0.0);
        self.look_target = Some(match self.look_target {
            Some(current) => current.lerp(&target, LOOK_TARGET_SMOOTHING),
            None => target,
        });
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[inline]
    pub fn fov_deg(&self) -> f32 {
        self.fov_deg
    }

    /// Where the camera looks; the tray origin until dice were seen.
    #[inline]
    pub fn look_target(&self) -> Vec3 {
        self.look_target.unwrap_or_else(Vec3::zeros)
    }
}

fn vertical_centre(points: impl IntoIterator<Item = Vec3>) -> Option<f32> {
    points
        .into_iter()
        .map(|p| (p.y, p.y))
        .reduce(|(lo, hi), (a, b)| (lo.min(a), hi.max(b)))
        .map(|(lo, hi)| (lo + hi) * 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_caps_width_and_keeps_aspect() {
        let vp = Viewport::from_window(4096.0, 2304.0).unwrap();
        assert_eq!(vp.width, MAX_DISPLAY_WIDTH);
        assert!((vp.height - 1152.0).abs() < 1.0e-3);

        let small = Viewport::from_window(800.0, 600.0).unwrap();
        assert_eq!(small, Viewport { width: 800.0, height: 600.0 });
    }

    #[test]
    fn unusable_surfaces_are_rejected() {
        assert!(matches!(
            Viewport::from_window(0.0, 600.0),
            Err(RollError::Surface { .. })
        ));
        assert!(Viewport::from_window(800.0, f32::NAN).is_err());
        assert!(Viewport::from_window(-1.0, 10.0).is_err());
    }

    #[test]
    fn fov_range_widens_on_narrow_screens() {
        let wide = fov_range(2.0);
        assert_eq!(wide, FovRange { min: 55.0, max: 70.0 });
        assert!(fov_range(0.5).max > wide.max);
    }

    #[test]
    fn fov_eases_between_bounds_without_overshoot() {
        let vp = Viewport::from_window(1000.0, 500.0).unwrap();
        let mut framing = Framing::new(vp);
        assert_eq!(framing.fov_deg(), 70.0);

        framing.update(true, []);
        assert!((framing.fov_deg() - (70.0 - FOV_STEP_DEG)).abs() < 1.0e-4);

        for _ in 0..1000 {
            framing.update(true, []);
            assert!(framing.fov_deg() >= 55.0);
        }
        assert_eq!(framing.fov_deg(), 55.0);

        for _ in 0..1000 {
            framing.update(false, []);
        }
        assert_eq!(framing.fov_deg(), 70.0);
    }

    #[test]
    fn look_target_jumps_then_smooths() {
        let mut framing = Framing::new(Viewport::from_window(800.0, 600.0).unwrap());
        assert_eq!(framing.look_target(), Vec3::zeros());

        framing.update(false, [Vec3::new(-3.0, 1.0, 0.0), Vec3::new(3.0, 3.0, 1.0)]);
        assert_eq!(framing.look_target(), Vec3::new(0.0, 2.0, 0.0));

        framing.update(false, [Vec3::new(0.0, 12.0, 0.0)]);
        assert!((framing.look_target().y - 3.0).abs() < 1.0e-5);
    }
}
