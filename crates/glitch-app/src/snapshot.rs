// ABOUTME: Headless rendering: runs the engine on virtual time and writes a PNG.
// ABOUTME: The canvas is flattened over black the way the window shows it.

use glitch_core::Bitmap;
use glitch_engine::{FrameScheduler, GlitchEngine, ManualScheduler};
use glitch_renderer::PixelSurface;
use image::RgbaImage;
use std::ops::ControlFlow;
use std::path::Path;

/// Virtual frame interval for snapshots (60 Hz)
pub const SNAPSHOT_STEP_MS: f64 = 1000.0 / 60.0;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Canvas is {0}x{1} but holds {2} bytes")]
    Buffer(u32, u32, usize),

    #[error("Failed to write image: {0}")]
    Image(#[from] image::ImageError),
}

/// Composite a straight-alpha canvas over opaque black.
pub fn flatten(canvas: &Bitmap) -> Result<RgbaImage, SnapshotError> {
    let (width, height) = (canvas.width(), canvas.height());
    let mut pixels = canvas.pixels().to_vec();
    for px in pixels.chunks_exact_mut(4) {
        let a = px[3] as u32;
        for c in &mut px[..3] {
            *c = ((*c as u32 * a + 127) / 255) as u8;
        }
        px[3] = 255;
    }
    let len = pixels.len();
    RgbaImage::from_raw(width, height, pixels).ok_or(SnapshotError::Buffer(width, height, len))
}

/// Advance the engine `frames` times at 60 Hz starting from t = 0.
pub fn run_frames(engine: &mut GlitchEngine<PixelSurface>, frames: usize) -> usize {
    let mut scheduler = ManualScheduler::fixed_rate(0.0, SNAPSHOT_STEP_MS, frames);
    let mut drawn = 0;
    scheduler.run_forever(&mut |now: f64| {
        if engine.frame(now).drew {
            drawn += 1;
        }
        ControlFlow::Continue(())
    });
    drawn
}

/// Run the engine and save the resulting canvas.
pub fn write_snapshot(
    engine: &mut GlitchEngine<PixelSurface>,
    frames: usize,
    path: &Path,
) -> Result<(), SnapshotError> {
    let drawn = run_frames(engine, frames);
    let image = flatten(engine.surface().bitmap())?;
    image.save(path)?;

    tracing::info!(
        "Snapshot {} written after {frames} frames ({drawn} drawn, {}x{})",
        path.display(),
        image.width(),
        image.height()
    );
    Ok(())
}
