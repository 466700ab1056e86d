use clap::{Parser, Subcommand};
use picshelf::imaging::RustBackend;
use picshelf::manifest::{ManifestBuilder, ManifestStats};
use picshelf::{config, manifest, output, process, scan};
use std::path::PathBuf;

/// Shared flags for commands that process images.
#[derive(clap::Args, Clone)]
struct ProcessArgs {
    /// Ignore variant mtimes and regenerate every image
    #[arg(long)]
    force: bool,
}

#[derive(Parser)]
#[command(name = "picshelf")]
#[command(version)]
#[command(about = "Static site generator for photo gallery websites")]
#[command(long_about = "\
Static site generator for photo gallery websites

Your filesystem is the data source. Top-level directories under the source
root become galleries, second-level directories become events, and every
supported image (jpg, jpeg, png, gif, webp) gets a thumbnail, a medium
variant, and an original copy plus an entry in the JSON manifest the
gallery front end fetches.

Source structure:

  pics/
  ├── nature/                      # Gallery
  │   ├── sample_1.jpg             # → event \"general\"
  │   └── forest_walk.jpg          # → event \"forest\" (filename prefix)
  └── track/                       # Gallery
      ├── race_day/                # Event
      │   └── finish_line.jpg
      └── practice/
          └── warmup.jpg

Output structure:

  public/
  ├── images/{thumbnails,medium,original}/...   # mirrors the source tree
  └── js/gallery-config.json                    # the manifest

Run 'picshelf gen-config' to generate a documented gallery.toml.")]
struct Cli {
    /// Source directory of photographs
    #[arg(long, default_value = "pics", global = true)]
    source: PathBuf,

    /// Output directory for variants and the manifest
    #[arg(long, default_value = "public", global = true)]
    output: PathBuf,

    /// Configuration file
    #[arg(long, default_value = "gallery.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline: scan → process → write manifest
    Build(ProcessArgs),
    /// Walk the source directory and print the discovered structure
    Scan,
    /// Validate source directory and configuration without building
    Check,
    /// Print a stock gallery.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Build(process_args) => {
            let config = config::load_config(&cli.config)?;
            init_worker_pool(&config.processing);

            println!("==> Stage 1: Scanning {}", cli.source.display());
            let report = scan::scan(&cli.source)?;
            output::print_scan_output(&report);

            println!("==> Stage 2: Processing images");
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_process_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let backend = RustBackend::new();
            let result = process::process(
                &backend,
                &report.images,
                &cli.output,
                &config,
                process_args.force,
                Some(tx),
            )?;
            printer.join().expect("printer thread panicked");

            println!("==> Stage 3: Writing manifest");
            let stats = ManifestStats::new(
                (result.photos.len()) as u32,
                result.stats.thumbnail_bytes,
                result.stats.medium_bytes,
            );
            let builder = result
                .photos
                .iter()
                .cloned()
                .fold(ManifestBuilder::new(), |builder, placed| {
                    builder.with(&placed.gallery, &placed.event, placed.record)
                });
            let gallery_manifest = builder.finalize(stats);
            let manifest_path = manifest::write_manifest(&gallery_manifest, &cli.output)?;

            output::print_summary(&result.stats, &gallery_manifest, &manifest_path);
        }
        Command::Scan => {
            let report = scan::scan(&cli.source)?;
            output::print_scan_output(&report);
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let config = config::load_config(&cli.config)?;
            config.validate()?;
            let report = scan::scan(&cli.source)?;
            output::print_scan_output(&report);
            println!("==> Source and config are valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Initialize the rayon worker pool based on processing config.
///
/// Caps at the number of available CPU cores — user can constrain down, not up.
fn init_worker_pool(processing: &config::ProcessingConfig) {
    let workers = config::effective_workers(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build_global()
        .ok();
}
