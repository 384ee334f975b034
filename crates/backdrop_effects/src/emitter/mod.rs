//! # Particle Emitter
//!
//! A bounded particle pool with continuous, phase-scheduled respawn.
//!
//! ## Frame pipeline
//!
//! ```text
//! update(dt)
//!   1. clock.advance(dt)           sweep [prev, now) through the cycle
//!   2. schedule                    spawn every free slot whose phase was swept
//!                                  (an occupant about to expire yields its slot)
//!   3. age + cull                  age += dt; drop age >= life
//!   4. integrate + appearance      v += a*dt, damping, p += v*dt, ramps at age/life
//! ```
//!
//! Slot `i` of `N` owns phase `i / N` of a cycle that is `lifetime.max`
//! seconds long, squeezed toward zero by `explosiveness`. Each slot holds
//! at most one live particle, so a long-lived particle makes its slot skip
//! a turn instead of growing the population.

mod clock;
mod config;

pub use clock::{ClockAdvance, EmitterClock};
pub use config::{EmitterConfig, LightConfig, SpawnArea, VelocityConfig};

use backdrop_core::{entropy_rng, seeded_rng, BlendMode, Container, NodeId, SpriteNode, Vec2};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::config::Validate;
use crate::error::EffectsResult;
use crate::tick::Tickable;

/// One live particle.
///
/// The emitter owns the physics state; the sprite nodes in the container
/// are a projection of it refreshed every frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    node: NodeId,
    light: Option<NodeId>,
    position: Vec2,
    velocity: Vec2,
    acceleration: Vec2,
    damping: f32,
    rotation: f32,
    rotation_speed: f32,
    age: f32,
    life: f32,
    slot: u32,
}

impl Particle {
    /// Position relative to the container.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Current velocity.
    #[inline]
    #[must_use]
    pub const fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Seconds since spawn.
    #[inline]
    #[must_use]
    pub const fn age(&self) -> f32 {
        self.age
    }

    /// Total lifetime in seconds.
    #[inline]
    #[must_use]
    pub const fn life(&self) -> f32 {
        self.life
    }

    /// Rotation in radians.
    #[inline]
    #[must_use]
    pub const fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Scheduling slot this particle occupies.
    #[inline]
    #[must_use]
    pub const fn slot(&self) -> u32 {
        self.slot
    }

    /// The particle's sprite in the container.
    #[inline]
    #[must_use]
    pub const fn node(&self) -> NodeId {
        self.node
    }

    /// The particle's light sprite, if lights are configured.
    #[inline]
    #[must_use]
    pub const fn light(&self) -> Option<NodeId> {
        self.light
    }

    /// Normalized age in [0, 1).
    #[inline]
    #[must_use]
    pub fn progress(&self) -> f32 {
        self.age / self.life
    }
}

/// Running totals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EmitterStats {
    /// Particles spawned since construction.
    pub total_spawned: u64,
    /// Particles retired since construction.
    pub total_expired: u64,
    /// Swept slot phases skipped because the slot was busy or the pool full.
    pub total_throttled: u64,
    /// Particles spawned by the most recent update or start.
    pub last_spawned: u32,
}

/// A particle emitter.
///
/// # Example
///
/// ```rust
/// use backdrop_core::FloatRange;
/// use backdrop_effects::{EmitterConfig, ParticleEmitter};
///
/// let config = EmitterConfig::default()
///     .with_max_particles(4)
///     .with_lifetime(FloatRange::constant(10.0));
/// let mut emitter = ParticleEmitter::with_seed(config, 7).unwrap();
///
/// emitter.start();
/// emitter.update(0.125);
/// assert_eq!(emitter.live_count(), 1);
/// assert_eq!(emitter.container().len(), 1);
/// ```
#[derive(Debug)]
pub struct ParticleEmitter {
    config: EmitterConfig,
    clock: EmitterClock,
    particles: Vec<Particle>,
    slot_taken: Vec<bool>,
    container: Container,
    rng: ChaCha8Rng,
    running: bool,
    stats: EmitterStats,
}

impl ParticleEmitter {
    /// Creates a stopped emitter with an entropy-seeded RNG.
    ///
    /// # Errors
    ///
    /// Returns the config's validation error.
    pub fn new(config: EmitterConfig) -> EffectsResult<Self> {
        Self::with_rng(config, entropy_rng())
    }

    /// Creates a stopped emitter with a deterministic RNG.
    ///
    /// # Errors
    ///
    /// Returns the config's validation error.
    pub fn with_seed(config: EmitterConfig, seed: u64) -> EffectsResult<Self> {
        Self::with_rng(config, seeded_rng(seed))
    }

    fn with_rng(config: EmitterConfig, rng: ChaCha8Rng) -> EffectsResult<Self> {
        config.validate()?;
        let capacity = config.max_particles as usize;
        let nodes = if config.light.is_some() { capacity * 2 } else { capacity };

        Ok(Self {
            clock: EmitterClock::new(),
            particles: Vec::with_capacity(capacity),
            slot_taken: vec![false; capacity],
            container: Container::with_capacity(nodes),
            rng,
            running: false,
            stats: EmitterStats::default(),
            config,
        })
    }

    /// Starts receiving updates and fires the initial burst.
    ///
    /// The burst is `round(max_particles * explosiveness)` particles placed
    /// in the lowest free slots, capped by free room. No-op when running.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;

        // Explosiveness is validated into [0, 1], so the product fits u32.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
        let burst = (self.config.max_particles as f32 * self.config.explosiveness).round() as u32;

        let mut spawned = 0;
        for slot in 0..self.config.max_particles {
            if spawned == burst || self.is_full() {
                break;
            }
            if !self.slot_taken[slot as usize] {
                self.spawn(slot);
                spawned += 1;
            }
        }
        self.stats.last_spawned = spawned;

        tracing::debug!(burst = spawned, live = self.particles.len(), "emitter started");
    }

    /// Stops receiving updates. Live particles stay where they are.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        tracing::debug!(live = self.particles.len(), "emitter stopped");
    }

    /// Destroys every particle and rewinds the clock.
    ///
    /// The running state is kept.
    pub fn reset(&mut self) {
        self.particles.clear();
        self.container.clear();
        self.slot_taken.fill(false);
        self.clock.reset();
        tracing::debug!(running = self.running, "emitter reset");
    }

    /// Replaces the config and resets.
    ///
    /// Does not fire a new burst. On error the emitter is left untouched.
    ///
    /// # Errors
    ///
    /// Returns the new config's validation error.
    pub fn set_config(&mut self, config: EmitterConfig) -> EffectsResult<()> {
        config.validate()?;

        let capacity = config.max_particles as usize;
        self.slot_taken = vec![false; capacity];
        self.particles.reserve(capacity);
        self.config = config;
        self.reset();

        tracing::debug!(max_particles = capacity, "emitter reconfigured");
        Ok(())
    }

    /// Applies overrides to a copy of the current config, then
    /// [`set_config`](Self::set_config)s it.
    ///
    /// # Errors
    ///
    /// Returns the modified config's validation error.
    pub fn reconfigure<F>(&mut self, apply: F) -> EffectsResult<()>
    where
        F: FnOnce(&mut EmitterConfig),
    {
        let mut config = self.config.clone();
        apply(&mut config);
        self.set_config(config)
    }

    /// Advances the simulation by `dt` seconds. No-op when stopped.
    ///
    /// A negative or non-finite `dt` is treated as zero.
    pub fn update(&mut self, dt: f32) {
        if !self.running {
            return;
        }
        let dt = if dt.is_finite() && dt > 0.0 {
            dt
        } else {
            if dt != 0.0 {
                tracing::warn!(dt, "ignoring invalid frame delta");
            }
            0.0
        };

        let advance = self.clock.advance(dt, self.config.lifetime.max);
        let spawned = self.schedule(&advance, dt);
        self.stats.last_spawned = spawned;
        if spawned > 0 {
            tracing::trace!(spawned, live = self.particles.len(), "particles spawned");
        }

        self.age_and_cull(dt);
        self.integrate(dt);
    }

    /// Spawns every free slot whose restart phase the clock swept past.
    fn schedule(&mut self, advance: &ClockAdvance, dt: f32) -> u32 {
        // Slot counts are far below f32's exact-integer limit.
        #[allow(clippy::cast_precision_loss)]
        let max = self.config.max_particles as f32;
        let window = (1.0 - self.config.explosiveness) * self.config.lifetime.max;
        let randomness = self.config.randomness;

        let mut spawned = 0;
        for slot in 0..self.config.max_particles {
            #[allow(clippy::cast_precision_loss)]
            let mut phase = slot as f32 / max;
            // Jitter is redrawn every frame.
            if randomness > 0.0 {
                phase += randomness * self.rng.gen::<f32>() / max;
            }
            let restart_time = phase * window;

            if !advance.crossed(restart_time) {
                continue;
            }
            if (self.slot_taken[slot as usize] && !self.retire_expiring(slot, dt)) || self.is_full() {
                self.stats.total_throttled += 1;
                continue;
            }
            self.spawn(slot);
            spawned += 1;
        }
        spawned
    }

    /// Retires `slot`'s particle if it dies within the next frame and a half.
    ///
    /// Age and clock are summed separately; a particle living exactly one
    /// cycle can sit an ulp short of `life` when its phase comes round again.
    fn retire_expiring(&mut self, slot: u32, dt: f32) -> bool {
        let Some(index) = self.particles.iter().position(|p| p.slot == slot) else {
            return false;
        };
        let particle = &self.particles[index];
        if particle.age + dt * 1.5 < particle.life {
            return false;
        }
        self.retire(index);
        true
    }

    fn retire(&mut self, index: usize) {
        let dead = self.particles.swap_remove(index);
        self.container.remove_child(dead.node);
        if let Some(light) = dead.light {
            self.container.remove_child(light);
        }
        self.slot_taken[dead.slot as usize] = false;
        self.stats.total_expired += 1;
    }

    fn spawn(&mut self, slot: u32) {
        let config = &self.config;
        let rng = &mut self.rng;

        let position = config.spawn_area.sample(rng);
        let velocity = config.initial_velocity.sample(rng);
        let life = config.lifetime.sample(rng);
        let rotation = config.spin.sample(rng);
        let rotation_speed = config.rotation_speed.sample(rng);

        let mut sprite = SpriteNode::new(config.texture)
            .at(position)
            .with_blend_mode(config.blend_mode);
        sprite.rotation = rotation;
        apply_appearance(&mut sprite, config, 0.0);
        let node = self.container.add_child(sprite);

        let light = config.light.as_ref().map(|light| {
            let mut glow = SpriteNode::new(light.texture)
                .at(position)
                .with_blend_mode(BlendMode::Add);
            apply_light(&mut glow, light, 0.0);
            self.container.add_child(glow)
        });

        self.particles.push(Particle {
            node,
            light,
            position,
            velocity,
            acceleration: config.acceleration,
            damping: config.damping,
            rotation,
            rotation_speed,
            age: 0.0,
            life,
            slot,
        });
        self.slot_taken[slot as usize] = true;
        self.stats.total_spawned += 1;
    }

    fn age_and_cull(&mut self, dt: f32) {
        let mut i = self.particles.len();
        while i > 0 {
            i -= 1;
            let particle = &mut self.particles[i];
            particle.age += dt;
            if particle.age < particle.life {
                continue;
            }

            self.retire(i);
        }
    }

    fn integrate(&mut self, dt: f32) {
        let config = &self.config;

        for particle in &mut self.particles {
            let t = particle.progress();

            particle.velocity += particle.acceleration * dt;
            particle.velocity *= (1.0 - particle.damping * dt).max(0.0);
            particle.position += particle.velocity * dt;
            particle.rotation += particle.rotation_speed * dt;

            if let Some(sprite) = self.container.child_mut(particle.node) {
                sprite.position = particle.position;
                sprite.rotation = particle.rotation;
                apply_appearance(sprite, config, t);
            }

            if let (Some(id), Some(light)) = (particle.light, config.light.as_ref()) {
                if let Some(glow) = self.container.child_mut(id) {
                    glow.position = particle.position;
                    apply_light(glow, light, t);
                }
            }
        }
    }

    fn is_full(&self) -> bool {
        self.particles.len() >= self.config.max_particles as usize
    }

    /// The drawable output.
    #[must_use]
    pub const fn container(&self) -> &Container {
        &self.container
    }

    /// Mutable access to the container's own transform and opacity.
    ///
    /// Child nodes are rewritten every update, so edits to them do not
    /// stick.
    pub fn container_mut(&mut self) -> &mut Container {
        &mut self.container
    }

    /// True between `start` and `stop`.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Live particles in no particular order.
    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Number of live particles.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.particles.len()
    }

    /// The active config.
    #[must_use]
    pub const fn config(&self) -> &EmitterConfig {
        &self.config
    }

    /// The emission clock.
    #[must_use]
    pub const fn clock(&self) -> &EmitterClock {
        &self.clock
    }

    /// Running totals.
    #[must_use]
    pub const fn stats(&self) -> EmitterStats {
        self.stats
    }
}

impl Tickable for ParticleEmitter {
    fn on_tick(&mut self, dt: f32) {
        self.update(dt);
    }
}

fn apply_appearance(sprite: &mut SpriteNode, config: &EmitterConfig, t: f32) {
    sprite.set_uniform_scale(config.scale.sample(t));
    sprite.alpha = config.alpha.sample(t);
    sprite.tint = config.color.sample(t);
}

fn apply_light(glow: &mut SpriteNode, light: &LightConfig, t: f32) {
    glow.set_uniform_scale(light.scale.sample(t));
    glow.alpha = light.energy.sample(t);
    glow.tint = light.hue.sample(t);
}
