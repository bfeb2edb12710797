// Neural Fractal Asset Generator CLI
//
// Renders the forward-pass and gradient-basin fractals to PNG, with a JSON
// manifest describing the run next to the image.

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::PathBuf;

use neural_fractals::*;

/// CLI arguments for the fractal generator
#[derive(Parser, Debug)]
#[command(name = "generate")]
#[command(about = "Render neural-recurrence fractals to PNG", long_about = None)]
struct Args {
    /// Preset name ("forward-pass" or "gradient-basin")
    #[arg(short, long)]
    preset: String,

    /// Image width in pixels
    #[arg(short, long, default_value_t = 1200)]
    width: u32,

    /// Image height in pixels
    #[arg(short = 'H', long, default_value_t = 1200)]
    height: u32,

    /// Step budget override (defaults to 100 for forward-pass, 150 for gradient-basin)
    #[arg(short, long)]
    budget: Option<u32>,

    /// Half-extent of the square window of the complex plane to render
    #[arg(short = 'e', long, default_value_t = 2.5)]
    extent: f64,

    /// Output directory for generated assets
    #[arg(short, long, default_value = "outputs")]
    output: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Preset {
    ForwardPass,
    GradientBasin,
}

impl Preset {
    // File stem for the emitted image
    fn name(&self) -> &'static str {
        match self {
            Self::ForwardPass => "forward_pass",
            Self::GradientBasin => "gradient_basins",
        }
    }

    // Human-readable title for logging
    fn label(&self) -> &'static str {
        match self {
            Self::ForwardPass => "Forward Pass Dynamics: z -> tanh(w*z + b)",
            Self::GradientBasin => "Gradient Descent Basins: loss landscape attraction",
        }
    }

    fn default_budget(&self) -> u32 {
        match self {
            Self::ForwardPass => 100,
            Self::GradientBasin => 150,
        }
    }
}

/// Parse the fractal preset from its CLI name
fn parse_preset(preset: &str) -> Result<Preset, String> {
    match preset {
        "forward-pass" => Ok(Preset::ForwardPass),
        "gradient-basin" => Ok(Preset::GradientBasin),
        _ => Err(format!(
            "Invalid preset: '{}'. Must be one of: forward-pass, gradient-basin",
            preset
        )),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args = Args::parse();

    let preset = parse_preset(&args.preset).map_err(|e| e.to_string())?;
    let budget = args.budget.unwrap_or(preset.default_budget());

    let config = RenderConfig::new(args.width, args.height);
    let bounds = GridBounds::square(args.extent);

    // Print configuration
    println!("\nNeural Fractal Asset Generator");
    println!("=======================================");
    println!("  Preset: {}", args.preset);
    println!("  Render: {}", preset.label());
    println!("  Resolution: {}x{}", args.width, args.height);
    println!(
        "  Window: [{}, {}] x [{}, {}]",
        bounds.x_min, bounds.x_max, bounds.y_min, bounds.y_max
    );
    println!("  Step budget: {}", budget);
    println!("=======================================\n");

    // Progress bar tracks resolved pixels across iteration rounds
    let total_pixels = config.pixel_count() as u64;
    let pb = ProgressBar::new(total_pixels);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} pixels ({percent}%)")?
            .progress_chars("█▓▒░ "),
    );

    println!("Iterating point dynamics...");

    let (output, palette) = match preset {
        Preset::ForwardPass => {
            let params = ForwardPassParams::new(budget, 20.0);
            let output = render_forward_pass(&config, &bounds, &params, |done| {
                pb.set_position(done);
            });
            (output, forward_pass_palette())
        }
        Preset::GradientBasin => {
            let params = GradientDescentParams::new(budget, 0.04);
            let output = render_gradient_basin(&config, &bounds, &params, |done| {
                pb.set_position(done);
            });
            (output, gradient_basin_palette())
        }
    };

    pb.finish_with_message("✓ iteration complete");

    // Save image and manifest
    println!("\n💾 Writing files...");
    fs::create_dir_all(&args.output)?;

    let image_path = args.output.join(format!("{}.png", preset.name()));
    output.image.to_rgb(&palette).save(&image_path)?;
    println!("  ✓ Wrote image: {}", image_path.display());

    let manifest = Manifest::new(&config, &bounds, preset.name(), budget, output.resolved);
    let manifest_path = args.output.join("manifest.json");
    fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)?;
    println!("  ✓ Wrote manifest: {}", manifest_path.display());

    // Print statistics
    println!("\n📊 Statistics:");
    println!("  Total pixels: {}", total_pixels);
    println!("  Resolved pixels: {}", output.resolved);
    println!(
        "  Resolved fraction: {:.1}%",
        output.resolved as f64 / total_pixels as f64 * 100.0
    );

    println!("\n✨ Generation complete!");
    println!("📁 Output: {}\n", args.output.display());

    Ok(())
}
