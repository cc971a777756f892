//! `images` subcommands: download remote images, reconcile catalog
//! references against the asset directory, and resolve one reference the
//! way the site would at display time.

use clap::Subcommand;
use nautic_catalog::{load_catalog, save_catalog};
use nautic_core::AppConfig;
use nautic_images::{
    list_asset_dir, reconcile_records, unique_image_urls, AssetIndex, DirectoryLoader,
    DownloadSettings, HttpLoader, ImageDownloader, ImageProbe, ProbeOutcome, ProbeSettings,
};

#[derive(Debug, Subcommand)]
pub enum ImagesCommands {
    /// Download every distinct catalog image into the asset directory
    Download,
    /// Rewrite catalog image references to downloaded files
    Reconcile {
        /// Report matches without writing the catalog
        #[arg(long)]
        dry_run: bool,
    },
    /// Resolve one image reference through the runtime probe
    Resolve {
        /// Stored image reference (remote URL or local path)
        image_ref: String,
        /// Probe a running site with HEAD requests instead of the asset directory.
        /// Absolute references kept as-is are always checked with HEAD.
        #[arg(long)]
        base_url: Option<String>,
    },
}

pub(crate) async fn run_images(config: &AppConfig, command: ImagesCommands) -> anyhow::Result<()> {
    match command {
        ImagesCommands::Download => run_images_download(config).await,
        ImagesCommands::Reconcile { dry_run } => run_images_reconcile(config, dry_run),
        ImagesCommands::Resolve {
            image_ref,
            base_url,
        } => run_images_resolve(config, &image_ref, base_url.as_deref()).await,
    }
}

async fn run_images_download(config: &AppConfig) -> anyhow::Result<()> {
    let products = load_catalog(&config.catalog_path)?;
    let urls = unique_image_urls(&products);
    tracing::info!(
        products = products.len(),
        distinct_urls = urls.len(),
        asset_dir = %config.asset_dir.display(),
        "starting image download"
    );

    let downloader = ImageDownloader::new(DownloadSettings::from_config(config))?;
    let summary = downloader.download_all(&urls).await?;

    println!(
        "download complete: distinct_urls={} downloaded={} failed={}",
        summary.distinct_urls, summary.downloaded, summary.failed
    );
    println!("assets: {}", config.asset_dir.display());
    Ok(())
}

fn run_images_reconcile(config: &AppConfig, dry_run: bool) -> anyhow::Result<()> {
    let mut products = load_catalog(&config.catalog_path)?;
    let filenames = list_asset_dir(&config.asset_dir)?;
    let index = AssetIndex::from_filenames(&filenames);
    tracing::info!(
        files = filenames.len(),
        basenames = index.len(),
        "indexed asset directory"
    );

    let report = reconcile_records(&mut products, &index, &config.asset_url_prefix);

    println!(
        "reconcile {}: total={} matched={} already_local={} not_matched={} match_rate={:.1}%",
        if dry_run { "dry run" } else { "complete" },
        report.total,
        report.matched,
        report.already_local,
        report.not_matched,
        report.match_rate(),
    );
    for mismatch in &report.mismatches {
        println!(
            "  unmatched {} key={:?} name={:?}",
            mismatch.product_id, mismatch.key, mismatch.product_name
        );
    }

    if dry_run {
        tracing::info!("dry run, catalog not written");
    } else {
        save_catalog(&config.catalog_path, &products)?;
    }
    Ok(())
}

async fn run_images_resolve(
    config: &AppConfig,
    image_ref: &str,
    base_url: Option<&str>,
) -> anyhow::Result<()> {
    let probe = ImageProbe::new(image_ref, &ProbeSettings::from_config(config));

    // Passthrough URLs live on their own host, so they are checked with HEAD
    // even without a site base URL.
    let outcome = if base_url.is_some() || probe.targets_remote() {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.download_timeout_secs))
            .user_agent(&config.download_user_agent)
            .build()?;
        let loader = HttpLoader::new(client, base_url.unwrap_or_default());
        probe
            .resolve_with_async(|candidate| {
                let loader = loader.clone();
                async move { loader.exists(&candidate).await }
            })
            .await
    } else {
        let loader = DirectoryLoader::new(&config.asset_dir, &config.asset_url_prefix);
        probe.resolve_with(|candidate| loader.exists(candidate))
    };

    match outcome {
        ProbeOutcome::Loaded { url, attempts } => {
            println!("loaded: {url} (attempts={attempts})");
        }
        ProbeOutcome::Unavailable { attempts } => {
            println!("unavailable (attempts={attempts})");
        }
    }
    Ok(())
}
