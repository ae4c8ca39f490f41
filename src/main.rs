use clap::{Parser, Subcommand};
use page_deploy::{config, deploy, output, parse};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "page-deploy")]
#[command(about = "Render multilingual content files into HTML pages")]
#[command(long_about = "\
Render multilingual content files into HTML pages

Every content file carries a Header, a Title and a Content section, each in
Czech, English, German and Polish. Each file is rendered into a copy of the
template, and a manifest lists the pages in order.

Project structure:

  ./
  ├── config.toml                  # Optional, see 'page-deploy gen-config'
  ├── ContentFiles/
  │   ├── 1.intro.txt              # Plain text:  Header:\\n    cs: \"...\"
  │   ├── 2.body.md                # Markdown:    # Header\\n**cs:** ...
  │   ├── 10.appendix.txt          # Ordered numerically, 10 after 2
  │   └── draft.txt                # No number prefix = skipped
  ├── template/
  │   └── template.html            # <title>, #header-title, #content-text,
  │                                # and `titles` / `contents` script objects
  └── DeploymentFiles/             # Output: 1.intro.html ... + manifest.txt

Images are written inline as <PictureDeps/path.png|mc>: size s/m/l plus
alignment l/c/r, or w for full width.")]
#[command(version)]
struct Cli {
    /// Project root holding the content, template and output directories
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Content directory (overrides config.toml)
    #[arg(long, global = true)]
    content: Option<String>,

    /// Template file (overrides config.toml)
    #[arg(long, global = true)]
    template: Option<String>,

    /// Output directory (overrides config.toml)
    #[arg(long, global = true)]
    output: Option<String>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render every content file and write the manifest
    Build,
    /// Parse every content file and validate the template without writing
    Check,
    /// Print the parsed form of one content file as JSON
    Inspect {
        /// Content file to parse
        file: PathBuf,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let mut config = config::load_config(&cli.root)?;
    if let Some(content) = cli.content {
        config.content_dir = content;
    }
    if let Some(template) = cli.template {
        config.template_file = template;
    }
    if let Some(output) = cli.output {
        config.output_dir = output;
    }
    config.validate()?;

    match cli.command {
        Command::Build => match deploy::deploy(&cli.root, &config) {
            Ok(report) => output::print_build_output(&report, &cli.root),
            Err(err) => {
                report_failure(&err);
                return Err(err.into());
            }
        },
        Command::Check => {
            println!("==> Checking {}", config.content_path(&cli.root).display());
            match deploy::prepare(&cli.root, &config) {
                Ok(prepared) => output::print_check_output(&prepared),
                Err(err) => {
                    report_failure(&err);
                    return Err(err.into());
                }
            }
            println!("==> Content is valid");
        }
        Command::Inspect { file } => {
            let syntax = page_deploy::image_token::ImageSyntax::new(&config.images.marker);
            let document = parse::parse_content_file(&file, &syntax)?;
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        Command::GenConfig => unreachable!("handled before config loading"),
    }

    Ok(())
}

/// Details the error message leaves out: each failing file, or the pages
/// already on disk.
fn report_failure(err: &deploy::DeployError) {
    let lines = match err {
        deploy::DeployError::Parse(failures) => output::format_failures(failures),
        other => output::format_written_files(other.written()),
    };
    for line in lines {
        eprintln!("{}", line);
    }
}

/// Log to stderr; `RUST_LOG` takes precedence over `-v`.
fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();
}
