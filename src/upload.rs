//! Job-level upload operations: list a labelled directory, run the pipeline, repeat per job.

use kdam::Animation;
use log::{debug, info};

use crate::engine::progress::{
    ProgressBarConfig, create_progress_bar, progress_callback, refresh_bar,
};
use crate::error::PipelineError;
use crate::pipeline::run_pipeline;
use crate::sink::{ManifestSink, StorageConnect};
use crate::source::{DirSource, WorkSource};
use crate::utils::CancelToken;
use crate::{Job, Opts, RunSummary, WorkItem};

/// List `job.source` and label every entry. Fails before any upload if the location can't be listed.
pub fn list_job_items<S: WorkSource>(job: &Job, source: &S) -> Result<Vec<WorkItem>, PipelineError> {
    let entries = source
        .list(&job.source)
        .map_err(|err| PipelineError::Enumeration {
            location: job.source.clone(),
            source: err,
        })?;
    Ok(entries
        .into_iter()
        .map(|e| WorkItem::new(e, &job.label))
        .collect())
}

/// Upload every file of `job.source` to `job.destination` and append one manifest row per upload.
/// Uses [`DirSource`] configured from `opts`.
pub fn upload_dir<C, M>(
    job: &Job,
    opts: &Opts,
    connector: &C,
    manifest: &mut M,
    cancel: &CancelToken,
) -> Result<RunSummary, PipelineError>
where
    C: StorageConnect,
    M: ManifestSink + Send,
{
    upload_dir_with_source(job, opts, &DirSource::from_opts(opts), connector, manifest, cancel)
}

/// Same as [`upload_dir`] with a caller-supplied [`WorkSource`].
pub fn upload_dir_with_source<S, C, M>(
    job: &Job,
    opts: &Opts,
    source: &S,
    connector: &C,
    manifest: &mut M,
    cancel: &CancelToken,
) -> Result<RunSummary, PipelineError>
where
    S: WorkSource,
    C: StorageConnect,
    M: ManifestSink + Send,
{
    let items = list_job_items(job, source)?;
    info!(
        "{}: {} files from {} -> {}",
        job.label,
        items.len(),
        job.source.display(),
        job.destination
    );

    let bar = opts.verbose.then(|| {
        create_progress_bar(ProgressBarConfig::new(
            items.len(),
            "Uploading",
            Animation::Classic,
        ))
    });
    let on_row = progress_callback(&bar);

    let config = opts.pipeline_config(job);
    debug!("{:?}", config);
    let result = run_pipeline(items, &config, connector, manifest, cancel, on_row.as_deref());
    if let Some(ref b) = bar {
        refresh_bar(b);
    }

    let summary = result?;
    info!("{}: uploaded {} files", job.label, summary.uploaded);
    Ok(summary)
}

/// Run every job in `opts.jobs` in order into the same manifest. Stops at the first failed job.
pub fn upload_jobs<C, M>(
    opts: &Opts,
    connector: &C,
    manifest: &mut M,
    cancel: &CancelToken,
) -> Result<RunSummary, PipelineError>
where
    C: StorageConnect,
    M: ManifestSink + Send,
{
    let mut total = RunSummary::default();
    for job in &opts.jobs {
        total += upload_dir(job, opts, connector, manifest, cancel)?;
    }
    Ok(total)
}
