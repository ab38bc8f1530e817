//! Multi-threaded render driver.
//!
//! The image is split into contiguous bands of rows, one band per worker
//! thread. Each band owns disjoint slices of every output image and its own
//! random generator, so workers never share mutable state apart from the
//! progress counters.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use umbra_core::{Color, ImageBuffer};

use crate::error::{RenderError, RenderResult};
use crate::sampler::Sampler;
use crate::sink::{OutputKind, PixelSink};
use crate::world::World;

/// Default maximum number of bounces per path.
pub const DEFAULT_MAX_DEPTH: u32 = 50;

/// Render configuration.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Worker threads; `None` uses the available hardware parallelism
    pub threads: Option<usize>,
    /// Seed for reproducible renders; `None` seeds from entropy
    pub seed: Option<u64>,
    /// Images to produce
    pub outputs: Vec<OutputKind>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            threads: None,
            seed: None,
            outputs: vec![OutputKind::Colour],
        }
    }
}

impl RenderConfig {
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_outputs(mut self, outputs: Vec<OutputKind>) -> Self {
        self.outputs = outputs;
        self
    }

    pub fn validate(&self) -> RenderResult<()> {
        if self.threads == Some(0) {
            return Err(RenderError::ZeroThreads);
        }
        if self.outputs.is_empty() {
            return Err(RenderError::NoOutputs);
        }
        Ok(())
    }

    /// Requested thread count, or the hardware parallelism.
    pub fn thread_count(&self) -> usize {
        self.threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

/// Shared progress counters and cancellation flag.
///
/// Safe to poll from another thread while a render is running.
#[derive(Debug, Default)]
pub struct RenderProgress {
    completed_rows: AtomicUsize,
    total_rows: AtomicUsize,
    cancelled: AtomicBool,
}

impl RenderProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn completed_rows(&self) -> usize {
        self.completed_rows.load(Ordering::Relaxed)
    }

    pub fn total_rows(&self) -> usize {
        self.total_rows.load(Ordering::Relaxed)
    }

    /// Completed fraction in `[0, 1]`.
    pub fn fraction(&self) -> f32 {
        let total = self.total_rows();
        if total == 0 {
            return 0.0;
        }
        self.completed_rows() as f32 / total as f32
    }

    /// Ask running workers to stop after their current row.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    fn begin(&self, total_rows: usize) {
        self.completed_rows.store(0, Ordering::Relaxed);
        self.total_rows.store(total_rows, Ordering::Relaxed);
    }

    fn row_done(&self) {
        let done = self.completed_rows.fetch_add(1, Ordering::Relaxed) + 1;
        let total = self.total_rows();
        // Log on every 10% boundary
        if total > 0 && done * 10 / total != (done - 1) * 10 / total {
            log::info!("Rendered {}/{} rows ({}%)", done, total, done * 100 / total);
        }
    }
}

/// The images produced by a render, keyed by output kind.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    images: BTreeMap<OutputKind, ImageBuffer>,
}

impl RenderOutput {
    pub fn get(&self, kind: OutputKind) -> Option<&ImageBuffer> {
        self.images.get(&kind)
    }

    /// The averaged colour image, if it was requested.
    pub fn colour(&self) -> Option<&ImageBuffer> {
        self.get(OutputKind::Colour)
    }

    pub fn take(&mut self, kind: OutputKind) -> Option<ImageBuffer> {
        self.images.remove(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = (OutputKind, &ImageBuffer)> {
        self.images.iter().map(|(kind, image)| (*kind, image))
    }
}

/// Render the whole image.
pub fn render(sampler: &Sampler, world: &World, config: &RenderConfig) -> RenderResult<RenderOutput> {
    render_with_progress(sampler, world, config, &RenderProgress::new())
}

/// Render the whole image, reporting through (and obeying cancellation
/// from) `progress`.
pub fn render_with_progress(
    sampler: &Sampler,
    world: &World,
    config: &RenderConfig,
    progress: &RenderProgress,
) -> RenderResult<RenderOutput> {
    config.validate()?;

    let mut outputs = config.outputs.clone();
    outputs.sort();
    outputs.dedup();

    let width = sampler.image_width();
    let height = sampler.image_height();
    let threads = config.thread_count().clamp(1, height.max(1) as usize);
    let rows_per_chunk = (height as usize + threads - 1) / threads;
    let chunk_len = rows_per_chunk * width as usize;

    log::info!(
        "Rendering {}x{} with {} threads ({} sampler, up to {} spp, depth {})",
        width,
        height,
        threads,
        sampler.config().kind,
        sampler.config().samples_per_pixel,
        config.max_depth
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()?;

    let mut images: Vec<ImageBuffer> = outputs
        .iter()
        .map(|_| ImageBuffer::new(width, height))
        .collect();

    // One entry per row band, holding that band's slice of every output
    let mut chunks: Vec<Vec<&mut [Color]>> = Vec::new();
    for image in images.iter_mut() {
        for (index, slice) in image.pixels.chunks_mut(chunk_len.max(1)).enumerate() {
            if chunks.len() <= index {
                chunks.push(Vec::with_capacity(outputs.len()));
            }
            chunks[index].push(slice);
        }
    }

    let ctx = ChunkContext {
        sampler,
        world,
        max_depth: config.max_depth,
        seed: config.seed,
        outputs: &outputs,
        progress,
    };

    progress.begin(height as usize);
    let start = Instant::now();

    pool.install(|| {
        chunks
            .into_par_iter()
            .enumerate()
            .for_each(|(index, mut slices)| {
                let first_row = (index * rows_per_chunk) as u32;
                render_chunk(&ctx, index, first_row, &mut slices);
            });
    });

    if progress.is_cancelled() {
        log::warn!(
            "Render cancelled after {}/{} rows",
            progress.completed_rows(),
            height
        );
        return Err(RenderError::Cancelled);
    }

    log::info!("Render finished in {:.2?}", start.elapsed());

    Ok(RenderOutput {
        images: outputs.into_iter().zip(images).collect(),
    })
}

/// Everything a worker needs, shared read-only between bands.
struct ChunkContext<'a> {
    sampler: &'a Sampler,
    world: &'a World,
    max_depth: u32,
    seed: Option<u64>,
    outputs: &'a [OutputKind],
    progress: &'a RenderProgress,
}

/// Derive an independent per-band seed from the user seed.
fn chunk_seed(seed: u64, index: usize) -> u64 {
    seed ^ (index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Render one band of rows into its output slices.
fn render_chunk(ctx: &ChunkContext<'_>, index: usize, first_row: u32, slices: &mut [&mut [Color]]) {
    let mut rng = match ctx.seed {
        Some(seed) => StdRng::seed_from_u64(chunk_seed(seed, index)),
        None => StdRng::from_entropy(),
    };

    let mut sinks: Vec<Box<dyn PixelSink>> = ctx.outputs.iter().map(|kind| kind.create_sink()).collect();
    let mut finished = vec![Color::ZERO; sinks.len()];

    let width = ctx.sampler.image_width();
    let rows = slices
        .first()
        .map_or(0, |slice| slice.len() / width.max(1) as usize);

    for local_row in 0..rows {
        if ctx.progress.is_cancelled() {
            log::debug!("Band {} stopping at row {}", index, first_row as usize + local_row);
            return;
        }

        let j = first_row + local_row as u32;
        for i in 0..width {
            let traced = panic::catch_unwind(AssertUnwindSafe(|| {
                render_pixel(
                    ctx.sampler,
                    ctx.world,
                    ctx.max_depth,
                    i,
                    j,
                    &mut sinks,
                    &mut finished,
                    &mut rng,
                )
            }));

            if traced.is_err() {
                log::error!("Pixel ({}, {}) panicked; writing background instead", i, j);
                finished.fill(ctx.world.background());
            }

            let idx = local_row * width as usize + i as usize;
            for (slice, colour) in slices.iter_mut().zip(&finished) {
                slice[idx] = *colour;
            }
        }

        ctx.progress.row_done();
    }

    log::debug!("Band {} finished ({} rows)", index, rows);
}

/// Trace every sample of pixel (i, j) and write one value per sink into
/// `out`.
#[allow(clippy::too_many_arguments)]
pub fn render_pixel(
    sampler: &Sampler,
    world: &World,
    max_depth: u32,
    i: u32,
    j: u32,
    sinks: &mut [Box<dyn PixelSink>],
    out: &mut [Color],
    rng: &mut dyn RngCore,
) {
    let mut pixel = sampler.pixel_sampler(i, j);
    for sink in sinks.iter_mut() {
        sink.start_pixel(i, j);
    }

    while pixel.has_next_sample() {
        let ray = pixel.next_sample(rng);
        let colour = world.ray_colour(&ray, max_depth, rng);
        pixel.add_sample(colour);
        for sink in sinks.iter_mut() {
            sink.process_sample(&ray, colour);
        }
    }

    for (sink, slot) in sinks.iter_mut().zip(out.iter_mut()) {
        *slot = sink.finish_pixel(&pixel);
    }
}
