use clap::Parser;

use crate::guard::URL_PREFIX_ENV_VAR;
use crate::listing::DEFAULT_API_URL;

#[derive(Parser, Debug)]
#[command(name = "zipstreamer")]
#[command(version)]
#[command(about = "Stream remote files into a single ZIP archive", long_about = None)]
#[command(after_help = "Examples:\n  \
  zipstreamer manifest.json -d out/          fetch the manifest's files into out/<name>.zip\n  \
  zipstreamer -s manifest.json               print the archive size without fetching\n  \
  zipstreamer -p -f movies/2024 > movies.zip walk a folder and stream the archive to stdout")]
pub struct Cli {
    /// Manifest JSON file, or - for stdin
    #[arg(value_name = "MANIFEST", required_unless_present = "folders", conflicts_with = "folders")]
    pub manifest: Option<String>,

    /// Walk this remote folder instead of reading a manifest (repeatable)
    #[arg(short = 'f', long = "folder", value_name = "PATH", requires = "api_key")]
    pub folders: Vec<String>,

    /// Folder listing endpoint
    #[arg(long, value_name = "URL", env = "ZS_LIST_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Folder listing API key
    #[arg(long, value_name = "KEY", env = "ZS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Only URLs starting with this prefix may be fetched
    #[arg(long, value_name = "PREFIX", env = URL_PREFIX_ENV_VAR, default_value = "")]
    pub url_prefix: String,

    /// Print the size breakdown and exit without fetching
    #[arg(short = 's', long = "size")]
    pub size_only: bool,

    /// Write the archive to stdout
    #[arg(short = 'p', conflicts_with_all = ["output", "output_dir"])]
    pub pipe: bool,

    /// Write the archive to this file
    #[arg(short = 'o', value_name = "FILE")]
    pub output: Option<String>,

    /// Directory for the archive, named after the suggested filename
    #[arg(short = 'd', value_name = "DIR", conflicts_with = "output")]
    pub output_dir: Option<String>,

    /// Compress entries with deflate (archive size is no longer predictable)
    #[arg(long)]
    pub deflate: bool,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,
}

impl Cli {
    pub fn is_quiet(&self) -> bool {
        self.quiet > 0
    }

    pub fn is_very_quiet(&self) -> bool {
        self.quiet > 1
    }

    /// Default log filter for the chosen verbosity.
    pub fn log_level(&self) -> &'static str {
        if self.is_very_quiet() {
            "error"
        } else if self.is_quiet() {
            "warn"
        } else {
            "info"
        }
    }
}
