//! tilecaster demo
//!
//! Runs the demo board in a window: the first-person view on the left, the
//! overhead view on the right. Arrows or WASD move, Alt strafes, Shift runs,
//! Space or Ctrl fires, Escape quits.

use macroquad::prelude::*;
use tilecaster::config::Config;
use tilecaster::game::{FrameTimings, RawInput, Renderer, Simulation};
use tilecaster::rasterizer::{Color as RasterColor, Framebuffer, Texture, TextureError, Vec2 as RasterVec2};
use tilecaster::world::{demo_board, TEXTURE_SIZE};
use tilecaster::VERSION;

const CONFIG_FILE: &str = "tilecaster.ron";
const SEED: u64 = 0x7117_ca57;

fn window_conf() -> Conf {
    let config = Config::load_or_default(CONFIG_FILE);
    Conf {
        window_title: format!("{} v{}", config.title, VERSION),
        window_width: config.window_width as i32,
        window_height: config.window_height as i32,
        window_resizable: true,
        high_dpi: false,
        ..Default::default()
    }
}

/// Four flat-shaded graphics: floor, wall, liquid, door
fn generated_atlas() -> Result<Texture, TextureError> {
    let size = TEXTURE_SIZE as usize;
    Texture::stack(&[
        Texture::checkerboard(size, size, RasterColor::DARK_GRAY, RasterColor::new(40, 40, 40)),
        Texture::checkerboard(size, size, RasterColor::GRAY, RasterColor::new(112, 112, 112)),
        Texture::checkerboard(size, size, RasterColor::LIGHT_BLUE, RasterColor::BLUE),
        Texture::checkerboard(size, size, RasterColor::BROWN, RasterColor::new(64, 48, 32)),
    ])
}

fn load_atlas(config: &Config) -> Option<Texture> {
    let loaded = match &config.texture_file {
        Some(path) => Texture::from_file(path),
        None => generated_atlas(),
    };
    match loaded {
        Ok(atlas) => Some(atlas),
        Err(e) => {
            log::warn!("No texture atlas ({}), drawing flat colors", e);
            None
        }
    }
}

fn load_background(config: &Config) -> Option<Texture> {
    let path = config.background_file.as_ref()?;
    match Texture::from_file(path) {
        Ok(background) => Some(background),
        Err(e) => {
            log::warn!("Failed to load background: {}", e);
            None
        }
    }
}

/// Screen rectangle of each view and the scale from logical pixels
struct Layout {
    scale: f32,
    view: Rect,
    overhead: Rect,
}

fn layout(fb_width: usize, fb_height: usize) -> Layout {
    let w = fb_width as f32;
    let h = fb_height as f32;
    let scale = (screen_width() / (2.0 * w)).min(screen_height() / h).max(0.01);
    let top = (screen_height() - h * scale) / 2.0;
    let left = (screen_width() - 2.0 * w * scale) / 2.0;
    Layout {
        scale,
        view: Rect::new(left, top, w * scale, h * scale),
        overhead: Rect::new(left + w * scale, top, w * scale, h * scale),
    }
}

fn poll_input(layout: &Layout) -> RawInput {
    let (mx, my) = mouse_position();
    let pointer = (mx >= layout.overhead.x && my >= layout.overhead.y).then(|| {
        RasterVec2::new((mx - layout.overhead.x) / layout.scale, (my - layout.overhead.y) / layout.scale)
    });

    RawInput {
        left: is_key_down(KeyCode::Left) || is_key_down(KeyCode::A),
        right: is_key_down(KeyCode::Right) || is_key_down(KeyCode::D),
        up: is_key_down(KeyCode::Up) || is_key_down(KeyCode::W),
        down: is_key_down(KeyCode::Down) || is_key_down(KeyCode::S),
        run: is_key_down(KeyCode::LeftShift) || is_key_down(KeyCode::RightShift),
        strafe: is_key_down(KeyCode::LeftAlt) || is_key_down(KeyCode::RightAlt),
        fire: is_key_down(KeyCode::Space)
            || is_key_down(KeyCode::LeftControl)
            || is_mouse_button_down(MouseButton::Left),
        quit: is_key_pressed(KeyCode::Escape),
        pointer,
    }
}

fn present(fb: &Framebuffer, dest: Rect) {
    let texture = Texture2D::from_rgba8(fb.width as u16, fb.height as u16, &fb.pixels);
    texture.set_filter(FilterMode::Nearest);
    draw_texture_ex(
        &texture,
        dest.x,
        dest.y,
        WHITE,
        DrawTextureParams { dest_size: Some(vec2(dest.w, dest.h)), ..Default::default() },
    );
}

/// Sleep for the bulk of the remaining frame time, then spin for precision
fn wait_for_frame(frame_start: f64, target_frame_time: f64) {
    #[cfg(not(target_arch = "wasm32"))]
    {
        let spin_margin = 0.002; // 2ms
        while get_time() - frame_start + spin_margin < target_frame_time {
            std::thread::sleep(std::time::Duration::from_millis(1));
        }
        while get_time() - frame_start < target_frame_time {
            std::hint::spin_loop();
        }
    }
    #[cfg(target_arch = "wasm32")]
    {
        let _ = (frame_start, target_frame_time);
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    // Initialize crash logging FIRST (before any other code)
    #[cfg(not(target_arch = "wasm32"))]
    {
        crashlog::setup!(crashlog::cargo_metadata!().capitalized(), false);
        // Info and above unless RUST_LOG overrides
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .format_timestamp_secs()
            .try_init();
    }

    let config = Config::load_or_default(CONFIG_FILE);

    let board = match demo_board() {
        Ok(board) => board,
        Err(e) => {
            log::error!("Demo board rejected: {}", e);
            return;
        }
    };
    let mut sim = match Simulation::new(board, config.screen_width, config.screen_height, SEED) {
        Ok(sim) => sim,
        Err(e) => {
            log::error!("Initialization failed: {}", e);
            return;
        }
    };

    let mut renderer = Renderer::new(load_atlas(&config), load_background(&config));
    let mut view_fb = Framebuffer::new(config.screen_width, config.screen_height);
    let mut overhead_fb = Framebuffer::new(config.screen_width, config.screen_height);
    let target_frame_time = config.frame_time().as_secs_f64();
    let mut timings = FrameTimings::default();

    log::info!("=== tilecaster v{} ===", VERSION);

    while !sim.quit {
        let frame_start = FrameTimings::start();
        let layout = layout(view_fb.width, view_fb.height);

        let logic_start = FrameTimings::start();
        sim.handle_input(&poll_input(&layout));
        sim.step();
        timings.logic_ms = FrameTimings::elapsed_ms(logic_start);

        let render_start = FrameTimings::start();
        sim.render_view(&mut renderer, &mut view_fb);
        sim.render_overhead(renderer.atlas(), &mut overhead_fb);
        timings.render_ms = FrameTimings::elapsed_ms(render_start);

        let upload_start = FrameTimings::start();
        clear_background(BLACK);
        present(&view_fb, layout.view);
        present(&overhead_fb, layout.overhead);
        timings.upload_ms = FrameTimings::elapsed_ms(upload_start);

        draw_text(
            &format!(
                "logic {:.2}ms  render {:.2}ms  upload {:.2}ms  total {:.2}ms",
                timings.logic_ms, timings.render_ms, timings.upload_ms, timings.total_ms
            ),
            layout.view.x + 4.0,
            layout.view.y + 14.0,
            16.0,
            YELLOW,
        );

        let remaining = target_frame_time - (get_time() - frame_start);
        if remaining > 0.0 {
            wait_for_frame(frame_start, target_frame_time);
        }
        timings.total_ms = FrameTimings::elapsed_ms(frame_start);

        next_frame().await;
    }

    log::info!("Quit after {} ticks", sim.tick);
}
