// Particle animator - fixed-capacity fire and smoke pools
use crate::domain::color::{palette, Color};
use crate::domain::telemetry::is_valid_reading;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const DEFAULT_FIRE_CAPACITY: usize = 96;
pub const DEFAULT_SMOKE_CAPACITY: usize = 64;

/// Controller output below this is treated as an idle firepot.
pub const MIN_ACTIVE_OUTPUT: f64 = 0.05;
/// Pit temperature (F) below which nothing is burning yet.
pub const MIN_BURNING_TEMP: f64 = 80.0;
/// Spawns per second at full output.
const FIRE_RATE_AT_FULL: f64 = 60.0;
const SMOKE_RATE_AT_FULL: f64 = 14.0;
const SMOKE_RATE_FLOOR: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleClass {
    Fire,
    Smoke,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub active: bool,
    pub class: ParticleClass,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub age: f32,
    pub max_age: f32,
    pub size: f32,
    pub opacity: f32,
}

impl Particle {
    fn dormant(class: ParticleClass) -> Self {
        Self {
            active: false,
            class,
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            age: 0.0,
            max_age: 0.0,
            size: 0.0,
            opacity: 0.0,
        }
    }

    pub fn life_fraction(&self) -> f32 {
        if self.max_age <= 0.0 {
            1.0
        } else {
            (self.age / self.max_age).clamp(0.0, 1.0)
        }
    }
}

/// Where new particles originate, in layout coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmitterOrigin {
    pub fire: (f32, f32),
    pub smoke: (f32, f32),
}

#[derive(Debug)]
pub struct ParticlePool {
    fire: Vec<Particle>,
    smoke: Vec<Particle>,
    fire_budget: f64,
    smoke_budget: f64,
    fire_color: Color,
    rng: StdRng,
}

impl ParticlePool {
    pub fn new(fire_capacity: usize, smoke_capacity: usize) -> Self {
        Self::with_rng(fire_capacity, smoke_capacity, StdRng::from_os_rng())
    }

    #[cfg(test)]
    pub fn with_seed(fire_capacity: usize, smoke_capacity: usize, seed: u64) -> Self {
        Self::with_rng(fire_capacity, smoke_capacity, StdRng::seed_from_u64(seed))
    }

    fn with_rng(fire_capacity: usize, smoke_capacity: usize, rng: StdRng) -> Self {
        Self {
            fire: vec![Particle::dormant(ParticleClass::Fire); fire_capacity],
            smoke: vec![Particle::dormant(ParticleClass::Smoke); smoke_capacity],
            fire_budget: 0.0,
            smoke_budget: 0.0,
            fire_color: palette::FIRE_LOW,
            rng,
        }
    }

    #[cfg(test)]
    pub fn capacity(&self, class: ParticleClass) -> usize {
        self.pool(class).len()
    }

    pub fn active_count(&self, class: ParticleClass) -> usize {
        self.pool(class).iter().filter(|p| p.active).count()
    }

    pub fn active(&self) -> impl Iterator<Item = &Particle> {
        self.smoke.iter().chain(self.fire.iter()).filter(|p| p.active)
    }

    pub fn fire_color(&self) -> Color {
        self.fire_color
    }

    fn pool(&self, class: ParticleClass) -> &[Particle] {
        match class {
            ParticleClass::Fire => &self.fire,
            ParticleClass::Smoke => &self.smoke,
        }
    }

    /// Reuse the first inactive slot. Returns false when the pool is full.
    pub fn spawn(&mut self, class: ParticleClass, origin_x: f32, origin_y: f32) -> bool {
        let slots = match class {
            ParticleClass::Fire => &mut self.fire,
            ParticleClass::Smoke => &mut self.smoke,
        };
        let Some(slot) = slots.iter_mut().find(|p| !p.active) else {
            return false;
        };

        let rng = &mut self.rng;
        *slot = match class {
            ParticleClass::Fire => Particle {
                active: true,
                class,
                x: origin_x + rng.random_range(-9.0..9.0),
                y: origin_y,
                vx: rng.random_range(-6.0..6.0),
                vy: rng.random_range(-55.0..-30.0),
                age: 0.0,
                max_age: rng.random_range(0.35..0.8),
                size: rng.random_range(3.5..6.5),
                opacity: 1.0,
            },
            ParticleClass::Smoke => Particle {
                active: true,
                class,
                x: origin_x + rng.random_range(-3.0..3.0),
                y: origin_y,
                vx: rng.random_range(-4.0..8.0),
                vy: rng.random_range(-28.0..-16.0),
                age: 0.0,
                max_age: rng.random_range(1.8..3.2),
                size: rng.random_range(3.0..5.0),
                opacity: 0.45,
            },
        };
        true
    }

    /// Age, cull and integrate every active particle.
    pub fn advance(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        for p in self.fire.iter_mut().filter(|p| p.active) {
            p.age += dt;
            if p.age > p.max_age {
                p.active = false;
                continue;
            }
            p.x += p.vx * dt;
            p.y += p.vy * dt;
            // Flames lick upward quickly, then shrink and fade.
            p.vy *= 1.0 + 0.6 * dt;
            p.size = (p.size * (1.0 - 1.8 * dt)).max(0.3);
            p.opacity = 1.0 - p.life_fraction();
        }
        for p in self.smoke.iter_mut().filter(|p| p.active) {
            p.age += dt;
            if p.age > p.max_age {
                p.active = false;
                continue;
            }
            p.x += p.vx * dt;
            p.y += p.vy * dt;
            // Smoke slows, spreads sideways and billows out.
            p.vy *= 1.0 - 0.35 * dt;
            p.vx += 3.0 * dt;
            p.size += 7.0 * dt;
            p.opacity = 0.45 * (1.0 - p.life_fraction());
        }
    }

    /// Spawn for one frame from the controller output and pit temperature.
    pub fn emit(&mut self, dt: f32, output: f64, temp: f64, origin: EmitterOrigin) {
        let output = output.clamp(0.0, 1.0);
        self.fire_color = palette::FIRE_LOW.lerp(palette::FIRE_HIGH, output as f32);

        let burning = output >= MIN_ACTIVE_OUTPUT
            && is_valid_reading(temp)
            && temp >= MIN_BURNING_TEMP;
        if !burning || dt <= 0.0 {
            self.fire_budget = 0.0;
            self.smoke_budget = 0.0;
            return;
        }

        self.fire_budget += FIRE_RATE_AT_FULL * output * dt as f64;
        self.smoke_budget += (SMOKE_RATE_FLOOR + SMOKE_RATE_AT_FULL * output) * dt as f64;

        while self.fire_budget >= 1.0 {
            self.fire_budget -= 1.0;
            if !self.spawn(ParticleClass::Fire, origin.fire.0, origin.fire.1) {
                self.fire_budget = 0.0;
            }
        }
        while self.smoke_budget >= 1.0 {
            self.smoke_budget -= 1.0;
            if !self.spawn(ParticleClass::Smoke, origin.smoke.0, origin.smoke.1) {
                self.smoke_budget = 0.0;
            }
        }
    }
}

impl Default for ParticlePool {
    fn default() -> Self {
        Self::new(DEFAULT_FIRE_CAPACITY, DEFAULT_SMOKE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: EmitterOrigin = EmitterOrigin {
        fire: (100.0, 200.0),
        smoke: (300.0, 80.0),
    };

    #[test]
    fn test_spawn_drops_silently_when_full() {
        let mut pool = ParticlePool::with_seed(4, 2, 7);
        for _ in 0..4 {
            assert!(pool.spawn(ParticleClass::Fire, 0.0, 0.0));
        }
        assert!(!pool.spawn(ParticleClass::Fire, 0.0, 0.0));
        assert_eq!(pool.active_count(ParticleClass::Fire), 4);
        assert_eq!(pool.capacity(ParticleClass::Fire), 4);
        assert_eq!(pool.active_count(ParticleClass::Smoke), 0);
    }

    #[test]
    fn test_active_count_never_exceeds_capacity() {
        let mut pool = ParticlePool::with_seed(16, 8, 42);
        for frame in 0..600 {
            let output = (frame % 100) as f64 / 100.0;
            pool.emit(1.0 / 30.0, output, 225.0, ORIGIN);
            pool.advance(1.0 / 30.0);
            assert!(pool.active_count(ParticleClass::Fire) <= 16);
            assert!(pool.active_count(ParticleClass::Smoke) <= 8);
        }
        assert_eq!(pool.capacity(ParticleClass::Fire), 16);
        assert_eq!(pool.capacity(ParticleClass::Smoke), 8);
    }

    #[test]
    fn test_no_emission_below_threshold() {
        let mut pool = ParticlePool::with_seed(32, 32, 1);
        for _ in 0..300 {
            pool.emit(0.1, 0.04, 225.0, ORIGIN);
        }
        for _ in 0..300 {
            pool.emit(0.1, 0.9, 60.0, ORIGIN);
        }
        for _ in 0..300 {
            pool.emit(0.1, 0.9, 1500.0, ORIGIN);
        }
        assert_eq!(pool.active().count(), 0);
    }

    #[test]
    fn test_emission_scales_with_output() {
        let mut low = ParticlePool::with_seed(256, 256, 3);
        let mut high = ParticlePool::with_seed(256, 256, 3);
        for _ in 0..30 {
            low.emit(1.0 / 30.0, 0.2, 225.0, ORIGIN);
            high.emit(1.0 / 30.0, 1.0, 225.0, ORIGIN);
        }
        // 1s at 60/s full rate.
        assert_eq!(high.active_count(ParticleClass::Fire), 60);
        assert_eq!(low.active_count(ParticleClass::Fire), 12);
        assert!(high.fire_color().g > low.fire_color().g);
    }

    #[test]
    fn test_particles_expire_and_slots_are_reused() {
        let mut pool = ParticlePool::with_seed(2, 2, 9);
        pool.spawn(ParticleClass::Fire, 0.0, 0.0);
        pool.spawn(ParticleClass::Fire, 0.0, 0.0);
        pool.advance(1.0);
        assert_eq!(pool.active_count(ParticleClass::Fire), 0);
        assert!(pool.spawn(ParticleClass::Fire, 0.0, 0.0));
        assert_eq!(pool.capacity(ParticleClass::Fire), 2);
    }

    #[test]
    fn test_fire_shrinks_and_smoke_grows_while_rising() {
        let mut pool = ParticlePool::with_seed(1, 1, 11);
        pool.spawn(ParticleClass::Fire, 0.0, 100.0);
        pool.spawn(ParticleClass::Smoke, 0.0, 100.0);
        let before: Vec<Particle> = pool.active().copied().collect();

        pool.advance(0.1);
        let after: Vec<Particle> = pool.active().copied().collect();
        assert_eq!(after.len(), 2);

        for (b, a) in before.iter().zip(after.iter()) {
            assert!(a.y < b.y);
            match a.class {
                ParticleClass::Fire => {
                    assert!(a.size < b.size);
                    assert!(a.opacity < b.opacity);
                }
                ParticleClass::Smoke => assert!(a.size > b.size),
            }
        }
    }
}
