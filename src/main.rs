//! Main entry point for the zipstreamer CLI application.
//!
//! Builds a member list from a manifest or a remote folder walk, reports the
//! predicted archive size, and streams the archive to a file or stdout.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::PathBuf;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use zipstreamer::{
    AllowList, Cli, CompressionMethod, Descriptor, Error, HttpFetcher, Member, PremiumizeLister,
    ZipStream, collect_members, estimate, write_empty_archive,
};

/// Name used for the archive when there is nothing to put in it.
const EMPTY_FILENAME: &str = "empty.zip";

/// Application entry point.
///
/// Logs go to stderr so `-p` can stream the archive to stdout.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let guard = AllowList::new(cli.url_prefix.clone());
    if guard.is_open() {
        warn!("no URL prefix configured; any http(s) URL may be fetched");
    } else if !guard.bounds_host() {
        warn!(
            "URL prefix {:?} does not end its host with '/'; lookalike hosts will match",
            guard.prefix()
        );
    }

    let (filename, members) = load_members(&cli, &guard).await?;

    if members.is_empty() {
        info!("no members to archive, writing an empty archive");
        if cli.size_only {
            println!("{}", estimate(&[]));
            return Ok(());
        }
        let sink = open_output(&cli, EMPTY_FILENAME).await?;
        write_empty_archive(sink).await?;
        return Ok(());
    }

    let breakdown = estimate(&members);
    info!(
        "{} members, predicted size {} bytes",
        members.len(),
        breakdown.total()
    );
    if cli.size_only {
        println!("{breakdown}");
        return Ok(());
    }

    let method = if cli.deflate {
        CompressionMethod::Deflate
    } else {
        CompressionMethod::Stored
    };

    let fetcher = HttpFetcher::new()?;
    let sink = open_output(&cli, &filename).await?;
    let result = ZipStream::new(&members, &fetcher, sink)
        .with_compression(method)
        .stream_all_files()
        .await;

    let report = match result {
        Ok(report) => report,
        Err(Error::AllMembersFailed) => bail!("all {} members failed to fetch", members.len()),
        Err(e) => return Err(e).context("streaming archive failed"),
    };

    info!(
        "wrote {} files and {} directories ({} bytes), skipped {}",
        report.files,
        report.directories,
        report.archive_bytes,
        report.skipped.len()
    );
    if method == CompressionMethod::Stored && report.archive_bytes != breakdown.total() {
        warn!(
            "archive is {} bytes but {} were predicted",
            report.archive_bytes,
            breakdown.total()
        );
    }

    Ok(())
}

/// Build the member list and suggested filename from the CLI input.
async fn load_members(cli: &Cli, guard: &AllowList) -> Result<(String, Vec<Member>)> {
    if !cli.folders.is_empty() {
        let api_key = cli.api_key.clone().context("--api-key is required with --folder")?;
        let lister = PremiumizeLister::new(cli.api_url.clone(), api_key)?;
        let members = collect_members(&lister, &cli.folders, guard).await;
        let descriptor = Descriptor::new("", members);
        return Ok((descriptor.escaped_suggested_filename(), descriptor.into_files()));
    }

    let Some(source) = cli.manifest.as_deref() else {
        bail!("either a manifest or --folder is required");
    };
    let raw = if source == "-" {
        read_all(tokio::io::stdin()).await?
    } else {
        tokio::fs::read(source)
            .await
            .with_context(|| format!("failed to read manifest {source}"))?
    };

    let descriptor = Descriptor::parse(&raw, guard)?;
    Ok((descriptor.escaped_suggested_filename(), descriptor.into_files()))
}

async fn read_all<R: AsyncRead + Unpin>(mut reader: R) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).await?;
    Ok(buf)
}

/// Open the archive destination selected by `-p`, `-o` or `-d`.
async fn open_output(cli: &Cli, filename: &str) -> Result<Box<dyn AsyncWrite + Unpin + Send>> {
    if cli.pipe {
        return Ok(Box::new(tokio::io::stdout()));
    }

    let path = match (&cli.output, &cli.output_dir) {
        (Some(file), _) => PathBuf::from(file),
        (None, Some(dir)) => PathBuf::from(dir).join(filename),
        (None, None) => PathBuf::from(filename),
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    if !cli.is_quiet() {
        eprintln!("  creating: {}", path.display());
    }
    let file = tokio::fs::File::create(&path)
        .await
        .with_context(|| format!("failed to create {}", path.display()))?;
    Ok(Box::new(file))
}
