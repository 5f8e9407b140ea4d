// SPDX-License-Identifier: MIT OR Apache-2.0
//! `TexMix` - blend two materials into one.
//!
//! Stands in for the content-tool add-on: authors a few materials,
//! mixes two of them and sweeps the ratio the way the panel slider
//! would.
//!
//! Settings are read from the RON file named by the first argument or
//! by `TEXMIX_SETTINGS`; built-in defaults are used otherwise.

mod session;

use session::MixSession;
use std::path::PathBuf;
use std::process::ExitCode;
use texmix_graph::shading::{image_material, principled_material};
use texmix_graph::{ComposeSettings, MaterialLibrary, NodeKind, SettingsError, WireError};
use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const SETTINGS_ENV: &str = "TEXMIX_SETTINGS";

/// Slider positions visited after mixing
const SWEEP: [f64; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("Failed to author sample material: {0}")]
    Authoring(#[from] WireError),

    #[error(transparent)]
    Session(#[from] session::SessionError),
}

fn main() -> ExitCode {
    let env_filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), AppError> {
    let settings = load_settings()?;
    tracing::info!(
        "Blending {} terminals through '{}'",
        settings.terminal_kind,
        settings.blend_template
    );

    let mut library = MaterialLibrary::new();
    let (first, second) = if settings.terminal_kind == NodeKind::ImageSource {
        (
            library.insert(image_material("Brick", "brick.png")?),
            library.insert(image_material("Moss", "moss.png")?),
        )
    } else {
        (
            library.insert(principled_material("Clay", [0.8, 0.35, 0.2, 1.0])?),
            library.insert(principled_material("Slate", [0.2, 0.25, 0.3, 1.0])?),
        )
    };

    let mut session = MixSession::new(settings, library);
    tracing::debug!("{} materials available", session.library().len());
    session.mix(&first, &second)?;

    for position in SWEEP {
        session.slide(position)?;
        tracing::info!("Ratio now {:.2}", session.ratio().unwrap_or(position));
    }

    if let Some(result) = session.result() {
        for node in result.nodes() {
            tracing::info!("  {} [{}] at {:?}", node.name, node.kind, node.position);
        }
    }
    Ok(())
}

fn load_settings() -> Result<ComposeSettings, SettingsError> {
    let path = std::env::args_os()
        .nth(1)
        .or_else(|| std::env::var_os(SETTINGS_ENV))
        .map(PathBuf::from);

    match path {
        Some(path) => {
            tracing::info!("Loading settings from {}", path.display());
            ComposeSettings::load(&path)
        }
        None => Ok(ComposeSettings::default()),
    }
}
