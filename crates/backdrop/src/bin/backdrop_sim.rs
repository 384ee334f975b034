//! # BACKDROP Headless Simulator
//!
//! Runs a scene without a renderer at a fixed frame rate and reports what
//! each layer would draw.
//!
//! ```bash
//! backdrop_sim firefly_forest --seconds 30 --seed 7
//! backdrop_sim my_scene.toml --fps 144 --day-length 20
//! RUST_LOG=backdrop_effects=debug backdrop_sim ambient_orbs
//! ```

use std::cell::RefCell;
use std::error::Error;
use std::process::ExitCode;
use std::rc::Rc;

use backdrop::{presets, DayNightCycle, Scene, SceneConfig, TextureRegistry, Ticker};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: backdrop_sim <preset | scene.toml> [--seconds N] [--fps F] [--seed S] \
                     [--day-length D] [--size WxH]";

/// Parsed command line.
struct Args {
    scene: String,
    seconds: f32,
    fps: f32,
    seed: Option<u64>,
    day_length: f32,
    width: f32,
    height: f32,
}

impl Args {
    fn parse<I: Iterator<Item = String>>(mut args: I) -> Result<Self, String> {
        let scene = args.next().ok_or_else(|| USAGE.to_string())?;
        let mut parsed = Self {
            scene,
            seconds: 10.0,
            fps: 60.0,
            seed: None,
            day_length: 60.0,
            width: 1920.0,
            height: 1080.0,
        };

        while let Some(flag) = args.next() {
            let value = args.next().ok_or_else(|| format!("{flag} needs a value\n{USAGE}"))?;
            match flag.as_str() {
                "--seconds" => parsed.seconds = parse_number(&flag, &value)?,
                "--fps" => parsed.fps = parse_number(&flag, &value)?,
                "--seed" => parsed.seed = Some(parse_number(&flag, &value)?),
                "--day-length" => parsed.day_length = parse_number(&flag, &value)?,
                "--size" => {
                    let (w, h) = value
                        .split_once('x')
                        .ok_or_else(|| format!("--size expects WxH, got `{value}`"))?;
                    parsed.width = parse_number(&flag, w)?;
                    parsed.height = parse_number(&flag, h)?;
                }
                other => return Err(format!("unknown flag `{other}`\n{USAGE}")),
            }
        }

        if parsed.fps <= 0.0 || parsed.seconds < 0.0 {
            return Err("--fps must be positive and --seconds non-negative".to_string());
        }
        Ok(parsed)
    }
}

fn parse_number<T: std::str::FromStr>(flag: &str, value: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("{flag}: `{value}` is not a number"))
}

fn load_scene(args: &Args) -> Result<(SceneConfig, TextureRegistry), Box<dyn Error>> {
    if std::path::Path::new(&args.scene)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
    {
        let config = SceneConfig::from_toml_file(&args.scene)?;
        // Headless: hand out a handle for every texture the file names.
        let names = config
            .layers
            .iter()
            .flat_map(|layer| [layer.texture.clone(), layer.light_texture.clone()])
            .flatten();
        let textures = TextureRegistry::sequential(names);
        return Ok((config, textures));
    }

    let config = presets::preset(&args.scene, args.width, args.height)?;
    Ok((config, TextureRegistry::sequential(presets::TEXTURE_NAMES)))
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let (config, textures) = load_scene(args)?;
    let scene = Rc::new(RefCell::new(Scene::build(&config, &textures, args.seed)?));
    scene.borrow_mut().start();

    let mut ticker = Ticker::new();
    ticker.add(Box::new(Rc::clone(&scene)));
    let mut cycle = DayNightCycle::new(args.day_length);

    let dt = 1.0 / args.fps;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let frames = (args.seconds * args.fps).round() as u64;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let frames_per_report = (args.fps.round() as u64).max(1);

    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║                  BACKDROP HEADLESS SIMULATION                    ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();
    println!("┌─ CONFIGURATION ──────────────────────────────────────────────────┐");
    println!("│ Scene:              {}", config.name);
    println!("│ Layers:             {}", config.layers.len());
    println!("│ Viewport:           {}x{}", args.width, args.height);
    println!("│ Duration:           {} s @ {} fps ({frames} frames)", args.seconds, args.fps);
    println!("│ Day length:         {} s", args.day_length);
    match args.seed {
        Some(seed) => println!("│ Seed:               {seed}"),
        None => println!("│ Seed:               entropy"),
    }
    println!("└──────────────────────────────────────────────────────────────────┘");
    println!();

    for frame in 1..=frames {
        let progress = cycle.advance(dt);
        scene.borrow_mut().set_progress(progress);
        ticker.tick(dt);

        if frame % frames_per_report == 0 {
            let scene = scene.borrow();
            for layer in scene.layers() {
                tracing::info!(
                    frame,
                    layer = layer.name(),
                    population = layer.effect().population(),
                    alpha = layer.effect().container().alpha,
                    progress,
                    "layer"
                );
            }
        }
    }

    let scene = scene.borrow();
    let mut instances = Vec::new();
    let drawn = scene.write_instances(&mut instances);
    let stats = ticker.stats();

    println!("┌─ LAYERS ─────────────────────────────────────────────────────────┐");
    for layer in scene.layers() {
        let effect = layer.effect();
        println!(
            "│ {:<18} {:>5} / {:<5} alpha {:.2}  nodes {}",
            layer.name(),
            effect.population(),
            effect.capacity(),
            effect.container().alpha,
            effect.container().len(),
        );
    }
    println!("└──────────────────────────────────────────────────────────────────┘");
    println!();
    println!("┌─ FRAMES ─────────────────────────────────────────────────────────┐");
    println!("│ Frames:             {}", stats.frames);
    println!("│ Simulated time:     {:.2} s", stats.total_time);
    println!("│ Average fps:        {:.1}", stats.avg_fps());
    println!("│ Progress:           {:.3}", scene.progress());
    println!("│ Instances drawn:    {drawn} ({} bytes)", drawn * backdrop_core::SpriteInstance::SIZE);
    println!("└──────────────────────────────────────────────────────────────────┘");
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .init();

    let args = match Args::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::from(2);
        }
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("✗ {err}");
            ExitCode::FAILURE
        }
    }
}
