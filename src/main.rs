use carousel_gallery::device::DeviceProfile;
use carousel_gallery::dom::PageLayout;
use carousel_gallery::gallery::Gallery;
use carousel_gallery::heic::UnavailableConverter;
use carousel_gallery::source::{AssetSource, FsSource, HttpSource};
use carousel_gallery::{config, output, render, scan};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

fn version_string() -> &'static str {
    let on_tag = env!("GALLERY_ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GALLERY_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "carousel-gallery")]
#[command(about = "Image manifest builder and carousel preview for product galleries")]
#[command(long_about = "\
Image manifest builder and carousel preview for product galleries

Drop images into the category folders and run the builder. The site's
carousels read the generated manifest on page load.

Image structure:

  images/
  ├── gallery.toml          # Optional overrides (see gen-config)
  ├── manifest.json         # Written by 'build'
  ├── signs/                # One folder per product category
  │   ├── neon-open.jpg     # Alt text: \"signs - neon open\"
  │   └── ._neon-open.jpg   # Hidden/metadata files are skipped
  ├── service-signs/        # Service card background → \"signs-bg\"
  └── Misc/                 # Hero, trust and call-to-action backgrounds

Supported formats: jpg, jpeg, png, webp, gif, heic, heif (any case).

Run 'carousel-gallery gen-config' to generate a documented gallery.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Images directory
    #[arg(long, default_value = "images", global = true)]
    images: PathBuf,

    /// Log progress (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Scan the images directory and write the manifest (default)
    Build {
        /// Exit non-zero when a directory or file could not be read
        #[arg(long)]
        strict: bool,
    },
    /// Scan and report without writing the manifest
    Check,
    /// Run the carousel runtime against the images and summarize the result
    Preview(PreviewArgs),
    /// Print a stock gallery.toml with all options documented
    GenConfig,
}

#[derive(Clone, Copy, ValueEnum)]
enum Device {
    Desktop,
    Mobile,
}

#[derive(Clone, Copy, ValueEnum)]
enum Page {
    Index,
    About,
}

#[derive(clap::Args)]
struct PreviewArgs {
    /// Device profile to simulate
    #[arg(long, value_enum, default_value_t = Device::Desktop)]
    device: Device,

    /// Classify the device from a user-agent string instead
    #[arg(long, conflicts_with = "device")]
    user_agent: Option<String>,

    /// Page layout to populate
    #[arg(long, value_enum, default_value_t = Page::Index)]
    page: Page,

    /// Fetch from a deployed site instead of the local images directory
    #[arg(long)]
    site_url: Option<String>,

    /// Seed for the shuffle order
    #[arg(long)]
    seed: Option<u64>,

    /// Write an HTML snapshot of the populated page
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Error, Debug)]
#[error("{0} image paths could not be read")]
struct StrictFailure(usize);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = config::load_config(&cli.images)?;

    match cli.command.unwrap_or(Command::Build { strict: false }) {
        Command::Build { strict } => {
            let report = scan::build_manifest(&cli.images, &config);
            let path = scan::write_manifest(&cli.images, &config, &report.manifest)?;
            output::print_build_output(&report, Some(&path));
            if strict && report.has_issues() {
                return Err(Box::new(StrictFailure(report.issues.len())));
            }
        }
        Command::Check => {
            let report = scan::build_manifest(&cli.images, &config);
            output::print_build_output(&report, None);
        }
        Command::Preview(args) => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            runtime.block_on(preview(&cli.images, config, args))?;
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::INFO } else { Level::WARN };
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// The site root serving `images/...` URLs is the images directory's parent.
fn site_root(images: &Path) -> PathBuf {
    match images.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

async fn preview(
    images: &Path,
    config: config::GalleryConfig,
    args: PreviewArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let profile = match (&args.user_agent, args.device) {
        (Some(ua), _) => DeviceProfile::from_user_agent(ua),
        (None, Device::Desktop) => DeviceProfile::desktop(),
        (None, Device::Mobile) => DeviceProfile::mobile(),
    };
    let layout = match args.page {
        Page::Index => PageLayout::index(&config),
        Page::About => PageLayout::about(),
    };
    let source: Box<dyn AssetSource> = match &args.site_url {
        Some(url) => Box::new(HttpSource::new(url)?),
        None => Box::new(FsSource::new(site_root(images))),
    };

    let mut gallery = Gallery::new(
        config,
        profile,
        layout,
        source,
        Box::new(UnavailableConverter),
    );
    if let Some(seed) = args.seed {
        gallery = gallery.with_seed(seed);
    }

    let report = gallery.initialize().await;
    output::print_preview_output(&gallery, &report);

    if let Some(out) = &args.out {
        render::write_snapshot(out, render::render_document(gallery.document(), gallery.carousels()))?;
        println!("Snapshot written to {}", out.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_failure_message_counts_issues() {
        assert_eq!(
            StrictFailure(2).to_string(),
            "2 image paths could not be read"
        );
    }

    #[test]
    fn site_root_is_parent_of_images_dir() {
        assert_eq!(site_root(Path::new("site/images")), PathBuf::from("site"));
        assert_eq!(site_root(Path::new("images")), PathBuf::from("."));
    }
}
