//! softshade command line driver
//!
//! Usage: `softshade [config.ron] < models.txt`
//!
//! Reads whitespace-separated OBJ paths from stdin and renders every model
//! into one framebuffer, then writes it to the configured output file.
//! The depth buffer is shared by all models unless the config asks for a
//! reset between them.

use std::io::BufRead;
use std::path::PathBuf;
use std::process::ExitCode;

use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use thiserror::Error;

use softshade::rasterizer::{
    build_shader, draw_wireframe, render_mesh_with, Framebuffer, Lighting, RasterError,
    RenderStats, Transforms,
};
use softshade::{load_config, ConfigError, Model, RenderConfig, VERSION};

#[derive(Debug, Error)]
enum RunError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Raster(#[from] RasterError),
    #[error("writing {path}: {source}")]
    Output {
        path: PathBuf,
        source: image::ImageError,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), RunError> {
    info!("=== softshade v{} ===", VERSION);

    let config = match std::env::args_os().nth(1) {
        Some(path) => {
            info!("Loading config {}", PathBuf::from(&path).display());
            load_config(&path)?
        }
        None => RenderConfig::default(),
    };

    let mut fb = Framebuffer::new(config.width, config.height);
    let transforms = config.transforms();
    let lighting = config.lighting();

    for name in model_names(std::io::stdin().lock()) {
        let model = match Model::load(&name) {
            Ok(model) => model,
            Err(e) => {
                // An unreadable model ends the run; earlier models are kept
                error!("Failed to load {}: {}", name, e);
                break;
            }
        };

        if config.reset_depth_per_model {
            fb.clear_depth();
        }
        let stats = render_model(&mut fb, &model, &config, transforms, lighting)?;
        info!(
            "Completed {}: {}/{} faces drawn, {} pixels",
            model.name, stats.faces_drawn, stats.faces, stats.pixels
        );
    }

    fb.flip_vertically();
    fb.save(&config.output).map_err(|source| RunError::Output {
        path: config.output.clone(),
        source,
    })?;
    info!("Wrote {}", config.output.display());

    Ok(())
}

/// Whitespace-separated model paths. Stops at the first unreadable line,
/// so whatever was drawn before it is still written out.
fn model_names<R: BufRead>(input: R) -> impl Iterator<Item = String> {
    input
        .lines()
        .map_while(|line| match line {
            Ok(line) => Some(line),
            Err(e) => {
                error!("Failed to read model list: {}", e);
                None
            }
        })
        .flat_map(|line| line.split_whitespace().map(str::to_owned).collect::<Vec<_>>())
}

/// Shade one model into the framebuffer, then overlay its wireframe if asked
fn render_model(
    fb: &mut Framebuffer,
    model: &Model,
    config: &RenderConfig,
    transforms: Transforms,
    lighting: Lighting,
) -> Result<RenderStats, RasterError> {
    let pb = ProgressBar::new(model.face_count() as u64);
    if let Ok(style) = ProgressStyle::default_bar().template("{msg} [{bar:30}] {pos}/{len} faces") {
        pb.set_style(style.progress_chars("█▓░"));
    }
    pb.set_message(model.name.clone());

    let mut shader = build_shader(config.shading, transforms, lighting, model.maps());
    let stats = render_mesh_with(fb, model, shader.as_mut(), |_| pb.inc(1))?;

    if let Some(algorithm) = config.wireframe {
        draw_wireframe(fb, model, &transforms, algorithm, config.wireframe_color);
    }

    pb.finish_and_clear();
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_model_names_split_on_whitespace() {
        let names: Vec<_> = model_names(Cursor::new("head.obj  eyes.obj\n\n\tfloor.obj\n")).collect();
        assert_eq!(names, ["head.obj", "eyes.obj", "floor.obj"]);
    }

    #[test]
    fn test_model_names_stop_at_invalid_utf8() {
        let input = b"head.obj eyes.obj\n\xff\xfe\nfloor.obj\n".to_vec();
        let names: Vec<_> = model_names(Cursor::new(input)).collect();
        assert_eq!(names, ["head.obj", "eyes.obj"]);
    }
}
