//! CLI entry point for devmate.

mod cli;

use clap::Parser;
use devmate::api::ApiClient;
use devmate::config::{load_config, Config};
use devmate::executor::Executor;
use devmate::interpreter::ModelInterpreter;
use devmate::session::Session;
use devmate::state::StateStore;
use devmate::ui::{RenderSink, Renderer};
use std::path::PathBuf;
use tracing::info;

#[tokio::main]
async fn main() {
    let args = cli::Args::parse();
    if args.version {
        println!("{}", devmate::build_info::cli_version_text());
        return;
    }
    devmate::logging::init();

    // Load config.
    let loaded = match load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };
    let mut config = loaded.config;
    apply_cli_overrides(&mut config, &args);
    info!(source = %loaded.source, protocol = ?config.api.protocol, model = %config.api.model, "configuration loaded");

    let renderer = Renderer::new(config.display.color);
    if let Err(e) = config.api.require_api_key() {
        renderer.error(&e.to_string());
        std::process::exit(1);
    }

    let store = match StateStore::open(&config.workspace.state_dir) {
        Ok(store) => store,
        Err(e) => {
            renderer.error(&format!("cannot open state directory: {e}"));
            std::process::exit(1);
        }
    };
    renderer.detail(&devmate::build_info::banner_line());

    let executor = Executor::new(store, &config.workspace.projects_dir);
    let interpreter = ModelInterpreter::new(ApiClient::new(&config.api));
    let stdin = std::io::stdin().lock();
    let mut session = Session::new(interpreter, executor, stdin, renderer);
    if let Err(e) = session.run().await {
        renderer.error(&e.to_string());
        std::process::exit(1);
    }
}

/// CLI flags win over every config source.
fn apply_cli_overrides(config: &mut Config, args: &cli::Args) {
    if let Some(model) = args.model.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
        config.api.model = model.to_string();
    }
    if let Some(url) = args.base_url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
        config.api.base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(dir) = args.state_dir.as_deref().filter(|d| !d.trim().is_empty()) {
        config.workspace.state_dir = PathBuf::from(dir);
    }
    if args.no_color {
        config.display.color = false;
    }
}
