// ABOUTME: Drives the glitch engine against the software surface with block glyphs.
// ABOUTME: Checks actual pixels rather than recorded draw calls.

use glitch_core::{ColorRole, Config, ProfileStyles, StyleResolver, Surface, ToggleState};
use glitch_engine::{Command, GlitchEngine};
use glitch_layout::Side;
use glitch_renderer::{GlyphSource, PixelSurface};

fn engine(toggles: ToggleState) -> GlitchEngine<PixelSurface> {
    let config = Config {
        toggles,
        ..Config::default()
    };
    let mut engine = GlitchEngine::new(
        &config,
        PixelSurface::new(GlyphSource::Blocks),
        Box::new(ProfileStyles::default()),
        3,
    );
    engine.set_texts("##\n##", "");
    engine.resize(100.0, 1.0);
    engine
}

fn quiet() -> ToggleState {
    ToggleState {
        glitch: false,
        statik: false,
        scan: false,
        swell: false,
        segments: false,
        orbit: false,
        fps: false,
        ..ToggleState::default()
    }
}

#[test]
fn base_text_is_painted_in_the_base_color() {
    let mut engine = engine(quiet());
    engine.frame(0.0);

    let expected = ProfileStyles::default().color(ColorRole::TextBase).to_rgba8();
    let bitmap = engine.surface().bitmap();
    assert_eq!(engine.surface().pixel_size(), (100, bitmap.height()));
    assert_eq!(bitmap.pixel(2, 3), expected);
    // Right column is empty
    assert_eq!(bitmap.pixel(60, 3)[3], 0);
}

#[test]
fn master_off_clears_every_pixel() {
    let mut engine = engine(ToggleState::default());
    engine.frame(0.0);
    assert!(!engine.surface().bitmap().is_blank());

    engine.handle(Command::ToggleMaster, 10.0);
    engine.frame(16.0);
    assert!(engine.surface().bitmap().is_blank());
}

#[test]
fn atlas_holds_hot_and_dim_renderings() {
    let engine = engine(quiet());
    let atlas = engine.atlas().side(Side::Left).expect("atlas built");
    assert!(!atlas.hot.is_blank());
    assert!(!atlas.dim.is_blank());

    let styles = ProfileStyles::default();
    let hot = styles.color(ColorRole::TextHot).to_rgba8();
    let found = (0..atlas.hot.height())
        .flat_map(|y| (0..atlas.hot.width()).map(move |x| (x, y)))
        .any(|(x, y)| atlas.hot.pixel(x, y) == hot);
    assert!(found);
}
