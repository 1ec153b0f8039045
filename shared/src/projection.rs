//! Conic conformal projection compatible with d3-geo's `geoConicConformal`.
//!
//! Only the pieces the department map needs are implemented: standard
//! parallels, a geographic center, a scale and a pixel translation. There is
//! no rotation, clipping or adaptive resampling.

use std::f64::consts::FRAC_PI_2;

const EPSILON: f64 = 1e-6;

/// d3's default standard parallels, in degrees.
pub const DEFAULT_PARALLELS: (f64, f64) = (30.0, 30.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConicConformal {
    n: f64,
    f: f64,
    scale: f64,
    translate: (f64, f64),
    center_raw: (f64, f64),
}

fn tany(phi: f64) -> f64 {
    ((FRAC_PI_2 + phi) / 2.0).tan()
}

impl ConicConformal {
    /// `center` is `(longitude, latitude)` in degrees, `translate` in pixels.
    pub fn new(
        parallels: (f64, f64),
        center: (f64, f64),
        scale: f64,
        translate: (f64, f64),
    ) -> Self {
        let phi0 = parallels.0.to_radians();
        let phi1 = parallels.1.to_radians();
        let cy0 = phi0.cos();
        let n = if (phi0 - phi1).abs() < EPSILON {
            phi0.sin()
        } else {
            (cy0 / phi1.cos()).ln() / (tany(phi1) / tany(phi0)).ln()
        };
        let f = cy0 * tany(phi0).powf(n) / n;

        let mut projection = Self {
            n,
            f,
            scale,
            translate,
            center_raw: (0.0, 0.0),
        };
        projection.center_raw = projection.raw(center.0.to_radians(), center.1.to_radians());
        projection
    }

    fn raw(&self, lambda: f64, mut phi: f64) -> (f64, f64) {
        if self.f > 0.0 {
            if phi < -FRAC_PI_2 + EPSILON {
                phi = -FRAC_PI_2 + EPSILON;
            }
        } else if phi > FRAC_PI_2 - EPSILON {
            phi = FRAC_PI_2 - EPSILON;
        }
        let r = self.f / tany(phi).powf(self.n);
        (r * (self.n * lambda).sin(), self.f - r * (self.n * lambda).cos())
    }

    /// Projects `(longitude, latitude)` in degrees to pixel coordinates.
    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let (x, y) = self.raw(lon.to_radians(), lat.to_radians());
        (
            self.translate.0 + self.scale * (x - self.center_raw.0),
            self.translate.1 - self.scale * (y - self.center_raw.1),
        )
    }
}
