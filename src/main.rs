mod app;
mod cli;
mod parameter_editor;
mod print;

use anyhow::{Context, Result};
use clap::Parser;
use double_pendulum::Method;
use double_pendulum::config::{self, SimulationParams};
use macroquad::prelude::*;
use tracing::level_filters::LevelFilter;
use tracing::{error, info, warn};
use tracing_subscriber::FmtSubscriber;

use crate::app::AppState;
use crate::cli::CliOptions;
use crate::parameter_editor::ParameterEditor;
use crate::print::PendulumRenderer;

fn window_conf() -> Conf {
    Conf {
        window_title: "Double Pendulum".to_owned(),
        window_width: 1280,
        window_height: 800,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let options = CliOptions::parse();
    init_tracing(options.verbose);

    let params = match load_params(&options) {
        Ok(params) => params,
        Err(err) => {
            error!("{err:#}");
            std::process::exit(1);
        }
    };

    let mut app = AppState::new(&params);
    app.running = options.run;
    info!(
        pendulums = app.entries.len(),
        method = %app.method,
        speed = app.speed,
        g = app.g,
        "simulation ready"
    );

    let mut renderer = PendulumRenderer::new();
    let mut editor = ParameterEditor::new();

    loop {
        let clicked_at = is_mouse_button_pressed(MouseButton::Left).then(|| Vec2::from(mouse_position()));
        editor.update_focus(clicked_at, screen_width());
        handle_input(&mut app, &mut editor);

        app.advance(get_time());
        renderer.update_view(app.max_span());
        renderer.draw(&app);
        editor.draw(&mut app);

        next_frame().await
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install tracing subscriber: {err}");
    }
}

fn load_params(options: &CliOptions) -> Result<SimulationParams> {
    let mut params = if options.config.exists() || !options.uses_default_config() {
        config::load_from_file(&options.config)
            .with_context(|| format!("Failed to load config from {}", options.config.display()))?
    } else {
        warn!(path = %options.config.display(), "default config not found, using built-in defaults");
        SimulationParams::default()
    };

    if let Some(method) = options.method {
        params.method = Method::from(method);
    }
    if let Some(speed) = options.speed {
        params.speed = speed;
    }
    Ok(params)
}

// (每帧调用) 检查键盘输入
fn handle_input(app: &mut AppState, editor: &mut ParameterEditor) {
    // 编辑框能收到数字、删除和方向键，输入时这些快捷键不生效
    let typing = editor.captures_keyboard(app);

    if is_key_pressed(KeyCode::Space) {
        app.toggle_running();
    }
    if is_key_pressed(KeyCode::R) {
        app.reset_all();
    }
    if is_key_pressed(KeyCode::Tab) {
        app.cycle_selection();
    }
    if is_key_pressed(KeyCode::N) {
        app.add_pendulum();
    }
    if is_key_pressed(KeyCode::F) {
        app.display.fade_trace = !app.display.fade_trace;
    }
    if is_key_pressed(KeyCode::V) {
        app.display.show_pendulum = !app.display.show_pendulum;
    }
    if is_key_pressed(KeyCode::P) {
        editor.visible = !editor.visible;
    }

    if typing {
        return;
    }
    if is_key_pressed(KeyCode::Key1) {
        app.set_method(Method::ForwardEuler);
    }
    if is_key_pressed(KeyCode::Key2) {
        app.set_method(Method::BackwardEuler);
    }
    if is_key_pressed(KeyCode::Key3) {
        app.set_method(Method::RungeKutta4);
    }
    if is_key_pressed(KeyCode::Up) {
        app.faster();
    }
    if is_key_pressed(KeyCode::Down) {
        app.slower();
    }
    if is_key_pressed(KeyCode::Delete) {
        app.remove_selected();
    }
}
