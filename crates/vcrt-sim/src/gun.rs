// ABOUTME: Electron gun state machine: beam position, target and power.
// ABOUTME: Advances the beam toward its target using the configured motion model.

use vcrt_core::{GunSettings, Motion, Point};

use crate::trace::PositionSample;

#[derive(Debug, Clone)]
pub struct ElectronGun {
    position: Point,
    target: Point,
    powered_on: bool,
    radius: f32,
    dim_factor: f32,
    motion: Motion,
}

impl ElectronGun {
    pub fn new(settings: &GunSettings) -> Self {
        Self {
            position: Point::ZERO,
            target: Point::ZERO,
            powered_on: false,
            radius: settings.radius,
            dim_factor: settings.dim_factor,
            motion: settings.motion,
        }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn target(&self) -> Point {
        self.target
    }

    pub fn is_powered_on(&self) -> bool {
        self.powered_on
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn dim_factor(&self) -> f32 {
        self.dim_factor
    }

    pub fn motion(&self) -> Motion {
        self.motion
    }

    /// True once the beam has reached its target
    pub fn is_settled(&self) -> bool {
        self.position == self.target
    }

    /// Set a new destination. The beam only moves on `update`.
    pub fn aim(&mut self, target: Point) {
        self.target = target;
    }

    pub fn power_on(&mut self) {
        self.powered_on = true;
    }

    pub fn power_off(&mut self) {
        self.powered_on = false;
    }

    /// Advance the beam by `delta` seconds.
    /// The distance to the target never grows across a call.
    pub fn update(&mut self, delta: f32) {
        match self.motion {
            Motion::Instant => self.position = self.target,
            Motion::RateLimited { speed } => self.advance(speed * delta.max(0.0)),
        }
    }

    fn advance(&mut self, step: f32) {
        let offset = self.target - self.position;
        let distance = offset.magnitude();
        let Some(direction) = offset.try_normalize() else {
            return;
        };
        if !(step > 0.0) {
            return;
        }

        let next = self.position + direction * step;
        // Overshoot guard: never end up further away than we started
        if step >= distance || next.distance(self.target) > distance {
            self.position = self.target;
        } else {
            self.position = next;
        }
    }

    pub fn sample(&self) -> PositionSample {
        PositionSample {
            position: self.position,
            powered_on: self.powered_on,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gun(motion: Motion) -> ElectronGun {
        ElectronGun::new(&GunSettings {
            radius: 1.0,
            dim_factor: 0.1,
            motion,
        })
    }

    #[test]
    fn starts_at_origin_powered_off() {
        let g = gun(Motion::Instant);
        assert_eq!(g.position(), Point::ZERO);
        assert!(!g.is_powered_on());
        assert!(g.is_settled());
    }

    #[test]
    fn aim_does_not_move() {
        let mut g = gun(Motion::Instant);
        g.aim(Point::new(10.0, 5.0));
        assert_eq!(g.position(), Point::ZERO);
        assert!(!g.is_settled());
    }

    #[test]
    fn power_does_not_move() {
        let mut g = gun(Motion::Instant);
        g.aim(Point::new(3.0, 3.0));
        g.power_on();
        assert!(g.is_powered_on());
        assert_eq!(g.position(), Point::ZERO);
        g.power_off();
        assert!(!g.is_powered_on());
    }

    #[test]
    fn instant_snaps_to_target() {
        let mut g = gun(Motion::Instant);
        g.aim(Point::new(100.0, -40.0));
        g.update(0.0);
        assert_eq!(g.position(), Point::new(100.0, -40.0));
    }

    #[test]
    fn rate_limited_moves_by_speed() {
        let mut g = gun(Motion::RateLimited { speed: 10.0 });
        g.aim(Point::new(100.0, 0.0));
        g.update(0.5);
        assert!((g.position().x - 5.0).abs() < 1e-4);
        assert!(g.position().y.abs() < 1e-6);
    }

    #[test]
    fn rate_limited_does_not_overshoot() {
        let mut g = gun(Motion::RateLimited { speed: 1000.0 });
        g.aim(Point::new(3.0, 4.0));
        g.update(1.0);
        assert_eq!(g.position(), Point::new(3.0, 4.0));
    }

    #[test]
    fn zero_length_direction_is_no_movement() {
        let mut g = gun(Motion::RateLimited { speed: 10.0 });
        g.update(1.0);
        assert_eq!(g.position(), Point::ZERO);
    }

    #[test]
    fn negative_delta_is_no_movement() {
        let mut g = gun(Motion::RateLimited { speed: 10.0 });
        g.aim(Point::new(50.0, 0.0));
        g.update(-1.0);
        assert_eq!(g.position(), Point::ZERO);
    }

    #[test]
    fn update_is_non_expansive() {
        let targets = [
            Point::new(10.0, 10.0),
            Point::new(-300.0, 7.5),
            Point::new(0.1, 0.0),
            Point::new(-0.1, -0.1),
            Point::new(32767.0, -32768.0),
        ];
        let deltas = [0.0, 0.001, 0.016, 0.5, 3.0];
        for motion in [
            Motion::Instant,
            Motion::RateLimited { speed: 1.0 },
            Motion::RateLimited { speed: 250.0 },
            Motion::RateLimited { speed: 1.0e6 },
        ] {
            let mut g = gun(motion);
            for target in targets {
                g.aim(target);
                for delta in deltas {
                    let before = g.position().distance(g.target());
                    g.update(delta);
                    let after = g.position().distance(g.target());
                    assert!(
                        after <= before + 1e-3,
                        "{motion:?}: {before} -> {after} toward {target:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn sample_reflects_state() {
        let mut g = gun(Motion::Instant);
        g.aim(Point::new(2.0, 3.0));
        g.power_on();
        g.update(0.0);
        assert_eq!(
            g.sample(),
            PositionSample {
                position: Point::new(2.0, 3.0),
                powered_on: true
            }
        );
    }
}
