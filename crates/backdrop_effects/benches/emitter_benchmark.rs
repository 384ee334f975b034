//! # Emitter Benchmark
//!
//! Steady-state frame cost of particle and star emitters at scene sizes
//! and well beyond them.
//!
//! Run with: `cargo bench --package backdrop_effects`

#![allow(missing_docs)]

use backdrop_core::{FloatRange, Rgb};
use backdrop_effects::{
    ColorRamp, EmitterConfig, LightConfig, ParticleEmitter, ScalarRamp, SpawnArea, StarConfig,
    StarEmitter,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const FRAME: f32 = 1.0 / 60.0;

fn glow_field(max_particles: u32) -> EmitterConfig {
    EmitterConfig::default()
        .with_max_particles(max_particles)
        .with_lifetime(FloatRange::new(7.0, 14.0))
        .with_spawn_area(SpawnArea::Rect {
            width: 1920.0,
            height: 324.0,
        })
        .with_velocity(FloatRange::constant(100.0), FloatRange::new(0.0, 15.7))
        .with_damping(0.1)
        .with_scale(ScalarRamp::new([(0.0, 0.0), (0.2, 10.0), (0.8, 10.0), (1.0, 0.0)]).expect("valid ramp"))
        .with_color(
            ColorRamp::new([(0.45, Rgb::BLACK), (0.5, Rgb::new(0xFF_FF00)), (0.55, Rgb::BLACK)])
                .expect("valid ramp"),
        )
        .with_light(LightConfig::default())
}

/// Benchmark: one frame of a saturated particle emitter.
fn bench_particle_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("particle_update");

    for max in [150_u32, 1_000, 10_000] {
        let mut emitter = ParticleEmitter::with_seed(glow_field(max).with_explosiveness(1.0), 42)
            .expect("benchmark config is valid");
        emitter.start();
        // Warm up past the first cycle so spawns and culls are in play.
        for _ in 0..(60 * 15) {
            emitter.update(FRAME);
        }

        group.bench_with_input(BenchmarkId::from_parameter(max), &max, |b, _| {
            b.iter(|| {
                emitter.update(black_box(FRAME));
                black_box(emitter.live_count())
            });
        });
    }

    group.finish();
}

/// Benchmark: one frame of a twinkling star field.
fn bench_star_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("star_update");

    for count in [25_u32, 500, 5_000] {
        let mut config = StarConfig {
            star_count: count,
            ..StarConfig::default()
        };
        config.scale_animation.enabled = true;
        config.color_animation.enabled = true;

        let mut stars = StarEmitter::with_seed(config, 7).expect("benchmark config is valid");
        stars.start();

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| stars.update(black_box(FRAME)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_particle_update, bench_star_update);
criterion_main!(benches);
