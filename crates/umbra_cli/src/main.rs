mod scenes;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use umbra_core::{ImageBuffer, ImageFormat};
use umbra_renderer::{
    render, AdaptiveConfig, OutputKind, RenderConfig, Sampler, SamplerConfig,
};

/// Render one of the built-in scenes with the Umbra path tracer.
#[derive(Parser, Debug)]
#[command(name = "umbra", version, about)]
struct Args {
    /// Scene number (1-12)
    #[arg(default_value_t = 1)]
    scene: u32,

    /// Write to <OUTPUT>.<ext> instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (ppm or png)
    #[arg(short, long, default_value = "ppm")]
    format: ImageFormat,

    /// Image width in pixels
    #[arg(short, long, default_value_t = 400)]
    width: u32,

    /// Aspect ratio (width / height)
    #[arg(short, long, default_value_t = 16.0 / 9.0)]
    ratio: f32,

    /// Samples per pixel (the budget when adaptive)
    #[arg(short, long, default_value_t = 100)]
    samples: u32,

    /// Stop sampling a pixel once its estimate has converged
    #[arg(short, long)]
    adaptive: bool,

    /// Samples drawn before the first convergence check
    #[arg(short, long, default_value_t = 64)]
    burn_in: u32,

    /// Samples between convergence checks
    #[arg(short, long, default_value_t = 64)]
    check_every: u32,

    /// Relative error tolerance for adaptive sampling
    #[arg(short, long, default_value_t = 0.05)]
    tolerance: f64,

    /// Also write a sampling density image to <OUTPUT>.density.<ext>
    #[arg(short, long, requires = "output")]
    density: bool,

    /// Worker threads (defaults to the available parallelism)
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Seed for the scene layout and the sampler
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum bounce depth (defaults to the scene's own)
    #[arg(long)]
    max_depth: Option<u32>,
}

impl Args {
    fn sampler_config(&self) -> SamplerConfig {
        if self.adaptive {
            SamplerConfig::adaptive(
                self.samples,
                AdaptiveConfig::default()
                    .with_burn_in(self.burn_in)
                    .with_check_every(self.check_every)
                    .with_tolerance(self.tolerance),
            )
        } else {
            SamplerConfig::fixed(self.samples)
        }
    }
}

fn output_path(base: &Path, suffix: Option<&str>, format: ImageFormat) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    if let Some(suffix) = suffix {
        name.push(".");
        name.push(suffix);
    }
    name.push(".");
    name.push(format.extension());
    PathBuf::from(name)
}

fn write_image(image: &ImageBuffer, path: Option<&Path>, format: ImageFormat) -> Result<()> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            image
                .write(&mut writer, format)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Wrote {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            image
                .write(&mut writer, format)
                .context("Failed to write image to stdout")?;
            writer.flush()?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let start = Instant::now();
    let scene = scenes::build(args.scene, args.width, args.ratio, &mut rng)?;
    log::info!(
        "Built scene {} ({}) in {:?}",
        args.scene,
        scenes::SCENE_NAMES[args.scene as usize - 1],
        start.elapsed()
    );

    let sampler = Sampler::from_camera(&scene.camera, args.sampler_config())
        .context("Invalid camera or sampler settings")?;

    let mut outputs = vec![OutputKind::Colour];
    if args.density {
        outputs.push(OutputKind::Density);
    }
    let mut config = RenderConfig::default()
        .with_max_depth(args.max_depth.unwrap_or(scene.max_depth))
        .with_outputs(outputs);
    if let Some(threads) = args.threads {
        config = config.with_threads(threads);
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let start = Instant::now();
    let mut output = render(&sampler, &scene.world, &config).context("Render failed")?;
    log::info!("Rendered in {:?}", start.elapsed());

    if let Some(colour) = output.take(OutputKind::Colour) {
        let path = args.output.as_deref().map(|base| output_path(base, None, args.format));
        write_image(&colour, path.as_deref(), args.format)?;
    }

    if let (Some(density), Some(base)) = (output.take(OutputKind::Density), args.output.as_deref()) {
        let path = output_path(base, Some("density"), args.format);
        write_image(&density, Some(path.as_path()), args.format)?;
    }

    Ok(())
}
