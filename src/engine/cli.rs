//! CLI command handler: merge config file and flags into Opts, run every job into one manifest.

use anyhow::{Context, Result, bail};
use log::{debug, info, warn};
use std::path::Path;

use crate::Opts;
use crate::engine::arg_parser::Cli;
use crate::sink::{CsvManifest, LocalStore, ManifestSink, NullStore, StorageConnect};
use crate::upload::upload_jobs;
use crate::utils::{
    CancelToken, PackagePaths, apply_file_to_opts, cancel_on_ctrlc, load_fanload_toml,
    setup_logging,
};

/// Build Opts: defaults → `.fanload.toml` in `dir` → CLI flags.
pub fn setup_opts(cli: &Cli, dir: &Path) -> Opts {
    let mut opts = Opts::default();
    if let Some(file) = load_fanload_toml(dir) {
        apply_file_to_opts(&file, &mut opts, dir);
    }
    if let Some(w) = cli.workers {
        opts.workers = usize::from(w);
    }
    if cli.store.is_some() {
        opts.store_root = cli.store.clone();
    }
    if let Some(p) = cli.on_error {
        opts.error_policy = p;
    }
    if let Some(v) = cli.strict {
        opts.strict = v;
    }
    if let Some(v) = cli.follow_links {
        opts.follow_links = v;
    }
    if !cli.exclude.is_empty() {
        opts.exclude = cli.exclude.clone();
    }
    if let Some(v) = cli.verbose {
        opts.verbose = v;
    }
    opts.dry_run = cli.dry_run;
    if !cli.job.is_empty() {
        opts.jobs = cli.job.clone();
    }
    opts
}

fn run_with<C: StorageConnect>(opts: &Opts, connector: &C, manifest_path: &Path) -> Result<()> {
    let cancel = CancelToken::new();
    cancel_on_ctrlc(&cancel)?;

    let mut manifest = CsvManifest::create(manifest_path)?;
    let outcome = upload_jobs(opts, connector, &mut manifest, &cancel);
    // Rows appended before a failure stay on disk.
    manifest.flush()?;

    let summary = match outcome {
        Ok(summary) => summary,
        Err(err) => {
            if let Some(n) = err.uploaded() {
                warn!(
                    "{} files of the last job were uploaded before it stopped; their rows are in {}",
                    n,
                    manifest_path.display()
                );
            }
            return Err(err).context("upload run failed");
        }
    };
    info!(
        "Done: {} of {} files uploaded; manifest at {}",
        summary.uploaded,
        summary.dispatched,
        manifest_path.display()
    );
    Ok(())
}

/// Run all configured jobs. Returns the first fatal error (non-zero exit from main).
pub fn handle_run(cli: &Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("read current directory")?;
    let opts = setup_opts(cli, &cwd);
    setup_logging(opts.verbose);
    debug!(
        "{} CONFIG:{:#?}",
        PackagePaths::get().pkg_name().to_uppercase(),
        opts
    );

    if opts.jobs.is_empty() {
        bail!(
            "no jobs given; pass -j LABEL=SOURCE@DESTINATION or add [[jobs]] to {}",
            PackagePaths::get().config_filename()
        );
    }

    if opts.dry_run {
        warn!("RUNNING IN DRY-RUN MODE. FILES ARE READ BUT NOT STORED.");
        run_with(&opts, &NullStore, &cli.manifest)
    } else {
        let root = PackagePaths::get().resolve_store_root(opts.store_root.as_deref(), &cwd);
        info!("Object store: {}", root.display());
        run_with(&opts, &LocalStore::new(root), &cli.manifest)
    }
}
