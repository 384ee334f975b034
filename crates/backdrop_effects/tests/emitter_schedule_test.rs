//! # Emitter Schedule Integration Tests
//!
//! Drives emitters through whole cycles and checks the population rules:
//! cadence, bursts, throttling, damping and lifetime bounds.

use backdrop_core::{FloatRange, Vec2};
use backdrop_effects::{EmitterConfig, LightConfig, ParticleEmitter, ScalarRamp, SpawnArea};

fn fixed_life(max: u32, life: f32) -> EmitterConfig {
    EmitterConfig::default()
        .with_max_particles(max)
        .with_lifetime(FloatRange::constant(life))
        .with_spawn_area(SpawnArea::Point)
}

/// Test: four slots over a ten second cycle fire 2.5 s apart.
#[test]
fn test_cadence_over_one_cycle() {
    let mut emitter = ParticleEmitter::with_seed(fixed_life(4, 10.0), 42).unwrap();
    emitter.start();

    let mut spawn_times = Vec::new();
    for _ in 0..80 {
        let before = emitter.clock().system_time();
        emitter.update(0.125);
        for _ in 0..emitter.stats().last_spawned {
            spawn_times.push(before);
        }
    }

    assert_eq!(spawn_times, vec![0.0, 2.5, 5.0, 7.5]);
    assert_eq!(emitter.stats().total_spawned, 4);
}

/// Test: the schedule keeps going after the clock wraps.
#[test]
fn test_cadence_continues_across_cycles() {
    let mut emitter = ParticleEmitter::with_seed(fixed_life(4, 10.0), 42).unwrap();
    emitter.start();

    for _ in 0..(80 * 3) {
        emitter.update(0.125);
        assert!(emitter.live_count() <= 4);
    }

    assert_eq!(emitter.clock().cycle(), 2);
    assert_eq!(emitter.stats().total_spawned, 12);
}

/// Test: full explosiveness fills the pool on start, before any update.
#[test]
fn test_full_burst_on_start() {
    let config = fixed_life(32, 5.0).with_explosiveness(1.0);
    let mut emitter = ParticleEmitter::with_seed(config, 1).unwrap();
    emitter.start();

    assert_eq!(emitter.live_count(), 32);
    assert_eq!(emitter.container().len(), 32);
    assert!(emitter.particles().iter().all(|p| p.age() == 0.0));
}

/// Test: no burst without explosiveness.
#[test]
fn test_no_burst_without_explosiveness() {
    let mut emitter = ParticleEmitter::with_seed(fixed_life(32, 5.0), 1).unwrap();
    emitter.start();
    assert_eq!(emitter.live_count(), 0);
}

/// Test: a single-slot emitter never holds more than one particle.
#[test]
fn test_single_slot_throttles() {
    let config = fixed_life(1, 3.0).with_explosiveness(0.5);
    let mut emitter = ParticleEmitter::with_seed(config, 9).unwrap();
    emitter.start();
    assert_eq!(emitter.live_count(), 1);

    for _ in 0..1_000 {
        emitter.update(1.0 / 60.0);
        assert!(emitter.live_count() <= 1);
    }
}

/// Test: a jittered phase swept again mid-life is throttled, not spawned.
#[test]
fn test_jittered_slot_throttles_while_alive() {
    let config = fixed_life(1, 10.0).with_randomness(1.0);
    let mut emitter = ParticleEmitter::with_seed(config, 21).unwrap();
    emitter.start();

    let mut throttled_while_alive = 0;
    for _ in 0..(60 * 600) {
        let throttled = emitter.stats().total_throttled;
        let alive = emitter.live_count();
        emitter.update(1.0 / 60.0);

        assert!(emitter.live_count() <= 1);
        if emitter.stats().total_throttled > throttled {
            assert_eq!(alive, 1);
            assert_eq!(emitter.stats().last_spawned, 0);
            assert_eq!(emitter.live_count(), 1);
            throttled_while_alive += 1;
        }
    }

    assert!(throttled_while_alive > 0);
    assert!(emitter.stats().total_spawned > 1);
}

/// Test: at 60 fps, lives equal to the cycle refill every slot every cycle.
#[test]
fn test_full_cycles_at_frame_rate() {
    const DT: f32 = 1.0 / 60.0;

    for (max, life) in [(4_u32, 10.0_f32), (40, 20.0), (150, 14.0)] {
        let mut emitter = ParticleEmitter::with_seed(fixed_life(max, life), 3).unwrap();
        emitter.start();

        let mut per_cycle = vec![0_u32; 7];
        let mut min_live_after_warmup = usize::MAX;
        let frames = (6.0 * life / DT).round() as u32;
        for _ in 0..frames {
            emitter.update(DT);
            let cycle = emitter.clock().cycle() as usize;
            per_cycle[cycle.min(6)] += emitter.stats().last_spawned;
            if cycle >= 1 {
                min_live_after_warmup = min_live_after_warmup.min(emitter.live_count());
            }
        }

        for (cycle, spawned) in per_cycle.iter().enumerate().take(5).skip(1) {
            assert_eq!(*spawned, max, "max={max} life={life} cycle={cycle}");
        }
        assert!(
            min_live_after_warmup + 1 >= max as usize,
            "max={max} life={life} min_live={min_live_after_warmup}"
        );
    }
}

/// Test: damping alone slows every particle frame over frame.
#[test]
fn test_damping_strictly_slows() {
    let config = fixed_life(8, 100.0)
        .with_explosiveness(1.0)
        .with_velocity(FloatRange::new(50.0, 100.0), FloatRange::new(0.0, 6.28))
        .with_damping(0.8);
    let mut emitter = ParticleEmitter::with_seed(config, 3).unwrap();
    emitter.start();

    let speeds = |e: &ParticleEmitter| -> Vec<f32> {
        let mut by_slot: Vec<(u32, f32)> = e
            .particles()
            .iter()
            .map(|p| (p.slot(), p.velocity().length()))
            .collect();
        by_slot.sort_by_key(|(slot, _)| *slot);
        by_slot.into_iter().map(|(_, s)| s).collect()
    };

    let mut previous = speeds(&emitter);
    for _ in 0..120 {
        emitter.update(1.0 / 60.0);
        let current = speeds(&emitter);
        assert_eq!(current.len(), previous.len());
        for (now, before) in current.iter().zip(&previous) {
            assert!(now < before, "speed did not drop: {before} -> {now}");
        }
        previous = current;
    }
}

/// Test: population and age bounds hold under jittered, uneven frames.
#[test]
fn test_population_and_age_invariants() {
    let configs = [
        EmitterConfig::default()
            .with_max_particles(60)
            .with_lifetime(FloatRange::new(0.5, 3.0))
            .with_randomness(2.0),
        EmitterConfig::default()
            .with_max_particles(25)
            .with_lifetime(FloatRange::new(6.0, 12.0))
            .with_explosiveness(0.4)
            .with_spawn_area(SpawnArea::Circle { radius: 50.0 }),
        EmitterConfig::default()
            .with_max_particles(10)
            .with_lifetime(FloatRange::constant(10.0))
            .with_acceleration(Vec2::new(0.0, 60.0))
            .with_damping(0.1)
            .with_light(LightConfig::default()),
    ];

    for (seed, config) in configs.into_iter().enumerate() {
        let max = config.max_particles as usize;
        let has_light = config.light.is_some();
        let mut emitter = ParticleEmitter::with_seed(config, seed as u64).unwrap();
        emitter.start();

        for frame in 0..2_000_u32 {
            // Uneven frames, with an occasional stall longer than a cycle.
            let dt = match frame % 97 {
                0 => 25.0,
                n if n % 3 == 0 => 0.05,
                _ => 1.0 / 60.0,
            };
            emitter.update(dt);

            assert!(emitter.live_count() <= max);
            let nodes_per_particle = if has_light { 2 } else { 1 };
            assert_eq!(emitter.container().len(), emitter.live_count() * nodes_per_particle);

            let mut slots: Vec<u32> = emitter.particles().iter().map(|p| p.slot()).collect();
            slots.sort_unstable();
            slots.dedup();
            assert_eq!(slots.len(), emitter.live_count(), "two particles share a slot");

            for particle in emitter.particles() {
                assert!(particle.age() >= 0.0);
                assert!(particle.age() < particle.life());
            }
        }
    }
}

/// Test: appearance at spawn reflects the ramps at t = 0.
#[test]
fn test_burst_particles_start_at_ramp_origin() {
    let config = fixed_life(5, 4.0)
        .with_explosiveness(1.0)
        .with_scale(ScalarRamp::new([(0.0, 0.2), (0.5, 0.5), (1.0, 0.2)]).unwrap())
        .with_alpha(ScalarRamp::new([(0.0, 0.0), (0.5, 1.0), (1.0, 0.0)]).unwrap());
    let mut emitter = ParticleEmitter::with_seed(config, 2).unwrap();
    emitter.start();

    for (_, sprite) in emitter.container().children() {
        assert_eq!(sprite.scale, Vec2::splat(0.2));
        assert_eq!(sprite.alpha, 0.0);
    }
}

/// Test: same seed, same simulation.
#[test]
fn test_seeded_runs_are_reproducible() {
    let config = EmitterConfig::default()
        .with_max_particles(30)
        .with_lifetime(FloatRange::new(1.0, 4.0))
        .with_randomness(1.0)
        .with_velocity(FloatRange::new(5.0, 20.0), FloatRange::new(0.0, 6.28));

    let run = |seed: u64| {
        let mut emitter = ParticleEmitter::with_seed(config.clone(), seed).unwrap();
        emitter.start();
        for _ in 0..300 {
            emitter.update(1.0 / 60.0);
        }
        emitter
            .particles()
            .iter()
            .map(|p| (p.slot(), p.position()))
            .collect::<Vec<_>>()
    };

    assert_eq!(run(77), run(77));
}
