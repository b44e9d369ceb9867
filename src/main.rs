use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use webp_upload::config::{self, Settings};
use webp_upload::converter::ImageConverter;
use webp_upload::output::{self, ConversionReport};
use webp_upload::policy::ConversionPolicy;
use webp_upload::upload::{self, UploadedFile};
use webp_upload::{mail, mime};

#[derive(Parser)]
#[command(name = "webp-upload")]
#[command(about = "Convert uploaded JPEG/PNG images to WebP")]
#[command(long_about = "\
Convert uploaded JPEG/PNG images to WebP

Converted files are written next to their source with a .webp extension.
Files that cannot be converted (wrong type, missing, decode failure) are
left as they are; nothing here ever blocks the surrounding workflow.

Settings are read from a TOML file (see 'webp-upload gen-config'):

  enabled = true            # master switch
  replace_original = false  # uploads: delete the JPEG/PNG after converting
  quality = 85              # 1-100
  max_width = 1920          # 0 disables resizing

Set RUST_LOG (e.g. RUST_LOG=webp_upload=debug) for detailed logs.")]
#[command(version)]
struct Cli {
    /// Settings file
    #[arg(long, default_value = "webp-upload.toml", global = true)]
    config: PathBuf,

    /// Log debug detail to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Per-run overrides of the settings file.
#[derive(clap::Args, Clone)]
struct PolicyArgs {
    /// Override the WebP quality (1-100)
    #[arg(long)]
    quality: Option<i64>,
    /// Override the maximum width (0 disables resizing)
    #[arg(long)]
    max_width: Option<i64>,
}

impl PolicyArgs {
    fn apply(&self, settings: &mut Settings) {
        if let Some(quality) = self.quality {
            settings.quality = quality;
        }
        if let Some(max_width) = self.max_width {
            settings.max_width = max_width;
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Convert files to WebP, keeping the originals
    Convert {
        /// Images to convert
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Print a JSON report instead of text
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        policy: PolicyArgs,
    },
    /// Rewrite a mail attachment list, swapping images for WebP
    Mail {
        /// Attachment paths in send order
        #[arg(required = true)]
        attachments: Vec<PathBuf>,
        #[command(flatten)]
        policy: PolicyArgs,
    },
    /// Handle a media upload, replacing the original when configured
    Upload {
        /// Stored upload file
        file: PathBuf,
        /// Public URL of the upload (defaults to the file name)
        #[arg(long)]
        url: Option<String>,
        /// Recorded MIME type (defaults to sniffing the file, then its extension)
        #[arg(long)]
        mime: Option<String>,
        /// Replace the original even if the settings say otherwise
        #[arg(long)]
        replace: bool,
        #[command(flatten)]
        policy: PolicyArgs,
    },
    /// Show which imaging backends are available
    Backends,
    /// Print a stock settings file with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut settings = config::load_config(&cli.config)?;

    match cli.command {
        Command::Convert {
            files,
            json,
            policy,
        } => {
            policy.apply(&mut settings);
            let converter = settings.converter();
            let policy = settings.policy();
            let reports: Vec<ConversionReport> = files
                .iter()
                .map(|file| convert_one(&converter, &policy, file))
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else {
                output::print_conversions(&reports);
            }
        }
        Command::Mail {
            attachments,
            policy,
        } => {
            policy.apply(&mut settings);
            let rewritten = mail::rewrite_attachments(
                &settings.converter(),
                &settings.policy(),
                &attachments,
            );
            output::print_attachments(&attachments, &rewritten);
        }
        Command::Upload {
            file,
            url,
            mime: recorded_mime,
            replace,
            policy,
        } => {
            policy.apply(&mut settings);
            if replace {
                settings.replace_original = true;
            }
            let mime_type = match recorded_mime {
                Some(mime_type) => mime_type,
                None => mime::detect_mime(&file)?
                    .unwrap_or("application/octet-stream")
                    .to_string(),
            };
            let url = url.unwrap_or_else(|| default_url(&file));
            let record = UploadedFile::from_path(file, url, mime_type)?;
            let handled = upload::handle_upload(&settings.converter(), &settings.policy(), record);
            output::print_upload(&handled);
        }
        Command::Backends => {
            output::print_backend_status(&settings.converter());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn convert_one(
    converter: &ImageConverter,
    policy: &ConversionPolicy,
    file: &Path,
) -> ConversionReport {
    let sniffed = mime::sniff_mime(file).ok().flatten();
    let outcome = converter.try_convert(file, sniffed.unwrap_or("unknown"), policy);
    ConversionReport::new(file, sniffed, &outcome)
}

fn default_url(file: &Path) -> String {
    file.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}
