// ABOUTME: Main application entry point.
// ABOUTME: Parses the CLI, then runs the glitch window or renders a headless snapshot.

mod input;
mod overlay;
mod snapshot;
mod texts;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use glitch_core::{Config, ProfileStyles, Surface};
use glitch_engine::{Command, GlitchEngine};
use glitch_renderer::{GlyphSource, OverlayParams, PixelSurface, Presenter};
use input::command_for_key;
use overlay::HudPainter;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "ascii-glitch", version, about = "Two-column ASCII art with glitch effects")]
struct Args {
    /// Text file for the left column
    #[arg(long)]
    left: Option<PathBuf>,

    /// Text file for the right column
    #[arg(long)]
    right: Option<PathBuf>,

    /// Configuration file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed; overrides the config file
    #[arg(long)]
    seed: Option<u64>,

    /// Render without a window and write the canvas to this PNG
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Frames simulated at 60 Hz before the snapshot is taken
    #[arg(long, default_value_t = 120)]
    frames: usize,

    /// Write the effective configuration to the default path and exit
    #[arg(long)]
    write_config: bool,
}

fn build_engine(config: &Config, glyphs: GlyphSource, seed: u64, texts: &(String, String)) -> GlitchEngine<PixelSurface> {
    let styles = ProfileStyles::new(config.profiles.clone());
    let mut engine = GlitchEngine::new(config, PixelSurface::new(glyphs), Box::new(styles), seed);
    engine.set_texts(&texts.0, &texts.1);
    engine
}

struct App {
    config: Config,
    glyphs: GlyphSource,
    engine: GlitchEngine<PixelSurface>,
    window: Option<Arc<Window>>,
    presenter: Option<Presenter>,
    hud_layer: PixelSurface,
    hud_painter: HudPainter,
    hud_width_css: f32,
    hud_shown: bool,
    last_fps_label: Option<String>,
    epoch: Instant,
}

impl App {
    fn new(config: Config, glyphs: GlyphSource, seed: u64, texts: (String, String)) -> Self {
        let engine = build_engine(&config, glyphs.clone(), seed, &texts);
        Self {
            hud_layer: PixelSurface::new(glyphs.clone()),
            config,
            glyphs,
            engine,
            window: None,
            presenter: None,
            hud_painter: HudPainter::default(),
            hud_width_css: 0.0,
            hud_shown: false,
            last_fps_label: None,
            epoch: Instant::now(),
        }
    }

    fn now_ms(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64() * 1000.0
    }

    fn handle(&mut self, command: Command) {
        let now = self.now_ms();
        self.engine.handle(command, now);
    }

    fn resize(&mut self, width_px: u32, height_px: u32, scale: f32) {
        let width_css = width_px as f32 / scale;
        let height_css = height_px as f32 / scale;
        self.engine.resize(width_css, scale);
        self.hud_layer.resize(width_css, height_css, scale);
        self.hud_width_css = width_css;
        // Force a HUD repaint into the new layer
        self.hud_shown = true;
        if let Some(presenter) = &mut self.presenter {
            presenter.resize(width_px, height_px);
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let now = self.now_ms();
        let report = self.engine.frame(now);
        let Some(presenter) = &mut self.presenter else {
            return;
        };

        if report.drew {
            presenter.upload_canvas(self.engine.surface().bitmap());
        }

        let readout = self.engine.hud_readout(now);
        let fps_label = self.engine.fps_label();
        if readout.is_some() || self.hud_shown || fps_label != self.last_fps_label {
            self.hud_painter.paint(
                &mut self.hud_layer,
                self.hud_width_css,
                readout.as_ref(),
                fps_label.as_deref(),
            );
            presenter.upload_hud(self.hud_layer.bitmap());
            self.hud_shown = readout.is_some();
            self.last_fps_label = fps_label;
        }

        let signals = self.engine.overlay_signals();
        let overlay = OverlayParams {
            static_opacity: if signals.static_visible {
                signals.static_opacity
            } else {
                0.0
            },
            scanlines: signals.scanlines_visible,
            glitch: signals.glitch_visible,
            pixel_ratio: self.engine.layout().pixel_ratio,
        };

        if let Err(e) = presenter.render(overlay, report.dt_secs as f32) {
            tracing::error!("Render failed: {e}");
            if matches!(e, glitch_renderer::RenderError::Surface(wgpu::SurfaceError::OutOfMemory)) {
                event_loop.exit();
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = WindowAttributes::default()
            .with_title("ascii-glitch")
            .with_inner_size(LogicalSize::new(self.config.window_width, self.config.window_height));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                tracing::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let presenter = match pollster::block_on(Presenter::new(Arc::clone(&window))) {
            Ok(presenter) => presenter,
            Err(e) => {
                tracing::error!("Failed to create presenter: {e}");
                event_loop.exit();
                return;
            }
        };

        let scale = window.scale_factor() as f32;
        let size = window.inner_size();
        tracing::info!(
            "Window created: {}x{} physical pixels, scale factor: {}, glyphs: {:?}",
            size.width,
            size.height,
            scale,
            self.glyphs
        );

        self.presenter = Some(presenter);
        self.resize(size.width, size.height, scale);
        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("Close requested, exiting");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                let scale = self
                    .window
                    .as_ref()
                    .map(|w| w.scale_factor() as f32)
                    .unwrap_or(1.0);
                self.resize(new_size.width, new_size.height, scale);
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                ..
            } => {
                self.handle(Command::ToggleMaster);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || event.repeat {
                    return;
                }
                if let Some(command) = command_for_key(&event.logical_key) {
                    self.handle(command);
                }
            }
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path).with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::load_or_default(),
    };
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }

    if args.write_config {
        let path = config.save_to_default()?;
        tracing::info!("Config written to {}", path.display());
        return Ok(());
    }

    let seed = config.seed.unwrap_or_else(rand::random);
    tracing::info!("Starting ascii-glitch (seed {seed})");

    let texts = texts::load_texts(args.left.as_deref(), args.right.as_deref())?;
    let glyphs = GlyphSource::load(config.font_path.as_deref()).unwrap_or_else(|e| {
        tracing::error!("{e}; drawing block glyphs");
        GlyphSource::Blocks
    });

    if let Some(path) = &args.snapshot {
        let mut engine = build_engine(&config, glyphs, seed, &texts);
        engine.resize(config.window_width as f32, 1.0);
        snapshot::write_snapshot(&mut engine, args.frames, path)?;
        return Ok(());
    }

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config, glyphs, seed, texts);

    event_loop.run_app(&mut app)?;

    Ok(())
}
