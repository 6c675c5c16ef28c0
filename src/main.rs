#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

#[allow(unused_imports)]
use pulse_dash::{Cli, StartupOverrides, TaskSpawner, run_app};

// --- WASM SPECIFIC CODE ---
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

// This keeps the WASM memory allocator from being stripped
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn _keep_alive() {}

// The binary still needs a main() on wasm; `start` is the real entry point.
#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), wasm_bindgen::JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);

    log::info!("🚀 Pulse Dash starting in WASM mode...");

    let web_options = eframe::WebOptions::default();

    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or("no document on the global window")?;
    let canvas = document
        .get_element_by_id("the_canvas_id")
        .ok_or("Failed to find canvas with id 'the_canvas_id'")?
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .map_err(|_| "the_canvas_id was not a valid HtmlCanvasElement")?;

    eframe::WebRunner::new()
        .start(
            canvas,
            web_options,
            Box::new(|cc| {
                Ok(run_app(
                    cc,
                    TaskSpawner::new(),
                    StartupOverrides::default(),
                ))
            }),
        )
        .await
}

// --- NATIVE SPECIFIC CODE ---
#[cfg(not(target_arch = "wasm32"))]
const APP_STATE_PATH: &str = "app_state.json";

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use clap::Parser;
    use eframe::NativeOptions;
    use std::path::PathBuf;
    use tokio::runtime::Runtime;

    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {:?}", panic_info);
    }));
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Cli::parse();
    #[cfg(debug_assertions)]
    log::info!("Parsed arguments: {:?}", args);

    let rt = Runtime::new()?;

    if args.headless {
        let report = rt.block_on(pulse_dash::headless::run_headless(&args))?;
        print!("{}", report);
        return Ok(());
    }

    // Keep the runtime entered so the UI thread can hand work to it.
    let _guard = rt.enter();
    let spawner = TaskSpawner::new(rt.handle().clone());
    let overrides = args.overrides();

    let options = NativeOptions {
        persistence_path: Some(PathBuf::from(APP_STATE_PATH)),
        ..Default::default()
    };

    eframe::run_native(
        "Pulse Dash",
        options,
        Box::new(move |cc| Ok(run_app(cc, spawner, overrides))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run the window: {}", e))
}
