//! Aging, fading drawables kept in spawn order.
//!
//! A particle's lifetime is fixed at spawn time, so the oldest particle is
//! always the first to expire and retirement only ever pops the front of
//! the deque. Particles that change their phases after spawning would break
//! this ordering.

use alloc::collections::VecDeque;

use embassy_time::Instant;

use crate::{canvas::Canvas, context::secs_between};

/// Four consecutive life stages, in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadePhases {
    pub preignition: f32,
    pub ignition: f32,
    pub hold: f32,
    pub fade: f32,
}

impl Default for FadePhases {
    fn default() -> Self {
        Self::new(0.0, 0.5, 1.0, 1.5)
    }
}

impl FadePhases {
    pub const fn new(preignition: f32, ignition: f32, hold: f32, fade: f32) -> Self {
        Self {
            preignition,
            ignition,
            hold,
            fade,
        }
    }

    pub fn total(&self) -> f32 {
        self.preignition + self.ignition + self.hold + self.fade
    }

    /// How far the particle has dimmed at `age` seconds (0 = full, 1 = gone).
    ///
    /// Pre-ignition brightens from dark, ignition dims a flash, hold stays at
    /// full strength and fade dims linearly to black.
    pub fn fadeout_amount(&self, age: f32) -> f32 {
        let mut age = age.max(0.0);

        if age < self.preignition && self.preignition != 0.0 {
            return 1.0 - age / self.preignition;
        }
        age -= self.preignition;
        if age < self.ignition && self.ignition != 0.0 {
            return age / self.ignition;
        }
        age -= self.ignition;
        if age < self.hold {
            return 0.0;
        }
        if age > self.hold + self.fade || self.fade == 0.0 {
            return 1.0;
        }
        (age - self.hold) / self.fade
    }

    /// Whether `age` falls in the ignition stage
    pub fn is_igniting(&self, age: f32) -> bool {
        age >= self.preignition && age < self.preignition + self.ignition
    }
}

pub trait Particle {
    fn birth(&self) -> Instant;

    /// Must not change after the particle is spawned
    fn phases(&self) -> FadePhases;

    fn age(&self, now: Instant) -> f32 {
        secs_between(self.birth(), now)
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.age(now) >= self.phases().total()
    }

    fn fadeout_amount(&self, now: Instant) -> f32 {
        self.phases().fadeout_amount(self.age(now))
    }

    /// Advance motion by `dt` seconds
    fn update(&mut self, _dt: f32) {}

    fn render(&self, now: Instant, canvas: &mut Canvas<'_, '_>);
}

pub struct ParticleSystem<T> {
    particles: VecDeque<T>,
    max_particles: usize,
}

impl<T: Particle> ParticleSystem<T> {
    pub fn new(max_particles: usize) -> Self {
        Self {
            particles: VecDeque::new(),
            max_particles,
        }
    }

    pub fn max_particles(&self) -> usize {
        self.max_particles
    }

    pub fn set_max_particles(&mut self, max_particles: usize) {
        self.max_particles = max_particles;
    }

    pub fn spawn(&mut self, particle: T) {
        self.particles.push_back(particle);
    }

    /// Retire expired particles from the front, then drop the oldest until
    /// the count is within the cap. Returns how many were removed.
    pub fn tick(&mut self, now: Instant) -> usize {
        let before = self.particles.len();
        while self.particles.front().is_some_and(|p| p.is_expired(now)) {
            self.particles.pop_front();
        }
        while self.particles.len() > self.max_particles {
            self.particles.pop_front();
        }
        before - self.particles.len()
    }

    pub fn update(&mut self, dt: f32) {
        for particle in &mut self.particles {
            particle.update(dt);
        }
    }

    /// Retire, then draw every survivor oldest first
    pub fn render(&mut self, now: Instant, canvas: &mut Canvas<'_, '_>) {
        self.tick(now);
        for particle in &self.particles {
            particle.render(now, canvas);
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.particles.iter()
    }
}
