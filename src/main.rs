//! train-helpers CLI - padding sizes and training summary images.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use train_helpers::io::{load_json, save_image};
use train_helpers::training::compute_padding;
use train_helpers::validate::{class_names_from_json, dims_from_json, mask_from_json, matrix_from_json};
use train_helpers::visu::{
    confusion_matrix_image, create_image, BuiltinColormaps, ColormapRegistry, ConfusionMatrixConfig,
    ImageOptions,
};

/// Helpers for training neural networks.
#[derive(Parser, Debug)]
#[command(name = "train-helpers")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the `same` padding (top bottom left right) of a 2D convolution.
    Padding {
        /// Spatial dimensions as a JSON pair, e.g. `[10,10]`.
        #[arg(long, value_name = "JSON")]
        spatial: String,

        /// Kernel size as a JSON pair.
        #[arg(long, value_name = "JSON")]
        kernel: String,

        /// Strides as a JSON pair.
        #[arg(long, value_name = "JSON", default_value = "[1,1]")]
        strides: String,
    },

    /// Render a confusion matrix image.
    Confusion {
        /// JSON file with a square matrix.
        #[arg(value_name = "MATRIX")]
        matrix: PathBuf,

        /// JSON file with the class names.
        #[arg(value_name = "CLASSES")]
        classes: PathBuf,

        /// Output image path.
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Figure resolution in dots per inch.
        #[arg(long, default_value = "100", value_name = "INT")]
        dpi: u32,

        /// Figure side length in inches.
        #[arg(long, default_value = "6.0", value_name = "FLOAT")]
        size: f32,

        /// Colormap name.
        #[arg(long, default_value = "Blues")]
        cmap: String,

        /// Output JPEG quality (1-100).
        #[arg(short, long, default_value = "95", value_name = "INT")]
        quality: u8,
    },

    /// Render a 2D tensor as a colored image.
    Colorize {
        /// JSON file with a 2D array of numbers.
        #[arg(value_name = "TENSOR")]
        tensor: PathBuf,

        /// Output image path.
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// JSON file with a boolean mask of the same shape; `true` hides a value.
        #[arg(long, value_name = "MASK")]
        mask: Option<PathBuf>,

        /// Value mapped to the lowest color.
        #[arg(long, value_name = "FLOAT", allow_hyphen_values = true)]
        minval: Option<f32>,

        /// Value mapped to the highest color.
        #[arg(long, value_name = "FLOAT", allow_hyphen_values = true)]
        maxval: Option<f32>,

        /// How many times every row is repeated.
        #[arg(long, default_value = "1", value_name = "INT")]
        expand_height: i64,

        /// How many times the colormap is traversed.
        #[arg(long, default_value = "1", value_name = "INT")]
        cycles: i64,

        /// Colormap name.
        #[arg(long, default_value = "viridis")]
        cmap: String,

        /// Output JPEG quality (1-100).
        #[arg(short, long, default_value = "95", value_name = "INT")]
        quality: u8,
    },

    /// List the available colormaps.
    Colormaps,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("train_helpers={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Err(err) = run(&args) {
        tracing::error!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn run(args: &Args) -> Result<()> {
    match &args.command {
        Command::Padding {
            spatial,
            kernel,
            strides,
        } => {
            let parse = |name: &str, text: &str| -> Result<_> {
                let value = serde_json::from_str::<serde_json::Value>(text)
                    .with_context(|| format!("`{name}` is not valid JSON: {text}"))?;
                Ok(dims_from_json(name, &value)?)
            };
            let quad = compute_padding(
                parse("spatial", spatial)?,
                parse("kernel", kernel)?,
                parse("strides", strides)?,
                None,
            )?;
            println!("{} {} {} {}", quad.top, quad.bottom, quad.left, quad.right);
        }

        Command::Confusion {
            matrix,
            classes,
            output,
            dpi,
            size,
            cmap,
            quality,
        } => {
            let matrix = matrix_from_json("matrix", &load_json(matrix)?)
                .with_context(|| format!("Invalid matrix in {}", matrix.display()))?;
            let class_names = class_names_from_json("class_names", &load_json(classes)?)
                .with_context(|| format!("Invalid class names in {}", classes.display()))?;

            let config = ConfusionMatrixConfig {
                dpi: *dpi,
                size_inches: *size,
                cmap: cmap.clone(),
                ..ConfusionMatrixConfig::default()
            };
            let image = confusion_matrix_image(matrix.view(), &class_names, &config)
                .context("Failed to render confusion matrix")?;
            save_image(&image, output, *quality)?;
            tracing::info!("Saved confusion matrix to {}", output.display());
        }

        Command::Colorize {
            tensor,
            output,
            mask,
            minval,
            maxval,
            expand_height,
            cycles,
            cmap,
            quality,
        } => {
            let values = matrix_from_json("tensor", &load_json(tensor)?)
                .with_context(|| format!("Invalid tensor in {}", tensor.display()))?;
            let mask = match mask {
                Some(path) => Some(
                    mask_from_json("mask", &load_json(path)?)
                        .with_context(|| format!("Invalid mask in {}", path.display()))?,
                ),
                None => None,
            };

            let options = ImageOptions {
                minval: *minval,
                maxval: *maxval,
                expand_height: *expand_height,
                cycle_color_map: *cycles,
                cmap: cmap.clone(),
                ..ImageOptions::default()
            };
            let image = create_image(values.view(), mask.as_ref().map(|m| m.view()), &options)
                .context("Failed to create image")?;
            save_image(&image, output, *quality)?;
            tracing::info!("Saved image to {}", output.display());
        }

        Command::Colormaps => {
            for name in BuiltinColormaps.names() {
                println!("{name}");
            }
        }
    }

    Ok(())
}
