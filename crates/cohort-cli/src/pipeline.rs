//! Pipeline stages: load, harmonize, combine, fit, match, report, write.
//!
//! Every stage consumes the previous stage's value. Nothing touches the
//! output directory until all reports and the manifest are rendered.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, info_span, trace, warn};

use cohort_ingest::{RawSheet, load_sheet};
use cohort_match::{
    BalanceReport, PropensityModel, assess_balance, fit_propensity, match_nearest,
};
use cohort_model::{CombinedCohort, Group, MatchedCohort, PatientRecord};
use cohort_report::{RenderedReport, build_reports, write_reports};
use cohort_transform::{combine, harmonize_sheet};

use crate::config::PipelineConfig;
use crate::logging::redact_value;
use crate::manifest::{
    BalanceEntry, CohortCounts, InputEntry, MANIFEST_FILE, Manifest, ModelEntry, OutputEntry,
    compute_sha256,
};
use crate::types::{ReportSummary, RunResult, SheetSummary};

/// One loaded sheet with the bytes it was read from.
pub struct LoadedSheet {
    pub group: Group,
    pub path: PathBuf,
    pub sheet: RawSheet,
    pub sha256: String,
}

/// Locates and reads the sheet of each arm.
pub fn load_sheets(workbook_dir: &Path, config: &PipelineConfig) -> Result<Vec<LoadedSheet>> {
    let span = info_span!("load", workbook = %workbook_dir.display());
    let _guard = span.enter();
    let start = Instant::now();

    let mut loaded = Vec::with_capacity(Group::ALL.len());
    for group in Group::ALL {
        let mapping = config.mappings.get(group);
        let (path, sheet) = load_sheet(workbook_dir, &mapping.sheet)
            .with_context(|| format!("load {group} sheet '{}'", mapping.sheet))?;
        let bytes = fs::read(&path).with_context(|| format!("read {}", path.display()))?;
        loaded.push(LoadedSheet {
            group,
            path,
            sheet,
            sha256: compute_sha256(&bytes),
        });
    }
    info!(
        sheets = loaded.len(),
        rows = loaded.iter().map(|s| s.sheet.len()).sum::<usize>(),
        duration_ms = start.elapsed().as_millis(),
        "load complete"
    );
    Ok(loaded)
}

/// Maps each sheet onto canonical records, returning `(treatment, control)`.
pub fn harmonize(
    sheets: &[LoadedSheet],
    config: &PipelineConfig,
) -> Result<(Vec<PatientRecord>, Vec<PatientRecord>, Vec<SheetSummary>)> {
    let span = info_span!("harmonize");
    let _guard = span.enter();
    let start = Instant::now();

    let mut treatment = Vec::new();
    let mut control = Vec::new();
    let mut summaries = Vec::with_capacity(sheets.len());
    for loaded in sheets {
        let mapping = config.mappings.get(loaded.group);
        let harmonized = harmonize_sheet(&loaded.sheet, mapping)
            .with_context(|| format!("harmonize {}", loaded.path.display()))?;
        summaries.push(SheetSummary {
            group: loaded.group,
            sheet: mapping.sheet.clone(),
            path: loaded.path.clone(),
            rows: loaded.sheet.len(),
            harmonized: harmonized.len(),
            skipped: harmonized.skipped,
        });
        match loaded.group {
            Group::Treatment => treatment.extend(harmonized.records),
            Group::Control => control.extend(harmonized.records),
        }
    }
    info!(
        treatment = treatment.len(),
        control = control.len(),
        duration_ms = start.elapsed().as_millis(),
        "harmonize complete"
    );
    Ok((treatment, control, summaries))
}

/// Fits the propensity model and scores every cohort record.
pub fn estimate(
    cohort: &CombinedCohort,
    config: &PipelineConfig,
) -> Result<(PropensityModel, Vec<f64>)> {
    let span = info_span!("fit", records = cohort.len());
    let _guard = span.enter();
    let start = Instant::now();

    let model = fit_propensity(cohort, &config.fit).context("fit propensity model")?;
    let scores = model.scores(cohort);
    info!(
        intercept = model.intercept(),
        age = model.age_coefficient(),
        sex = model.sex_coefficient(),
        iterations = model.iterations,
        duration_ms = start.elapsed().as_millis(),
        "fit complete"
    );
    Ok((model, scores))
}

/// Pairs the cohort and reports covariate balance on both snapshots.
pub fn match_cohort(
    cohort: &CombinedCohort,
    scores: &[f64],
    config: &PipelineConfig,
) -> Result<(MatchedCohort, BalanceReport, BalanceReport)> {
    let span = info_span!("match", order = ?config.matching.order);
    let _guard = span.enter();
    let start = Instant::now();

    let matched = match_nearest(cohort, scores, &config.matching).context("match cohort")?;
    for (treated, control) in matched.pairs() {
        trace!(
            pair_id = treated.pair_id,
            treatment = redact_value(&treated.patient().patient_id),
            control = redact_value(&control.patient().patient_id),
            "pair"
        );
    }

    let before = assess_balance(&cohort.records);
    let after = assess_balance(matched.records.iter().map(|m| &m.record));
    for metric in after.metrics.iter().filter(|m| m.is_imbalanced()) {
        warn!(
            covariate = %metric.covariate,
            smd = metric.standardized_difference,
            "covariate imbalanced after matching"
        );
    }
    info!(
        pairs = matched.pair_count(),
        imbalanced_prematch = before.imbalanced(),
        imbalanced_postmatch = after.imbalanced(),
        duration_ms = start.elapsed().as_millis(),
        "match complete"
    );
    Ok((matched, before, after))
}

/// Runs every stage over one workbook.
///
/// On a dry run all outputs are computed but nothing is written.
pub fn run_pipeline(
    workbook_dir: &Path,
    output_dir: &Path,
    config: &PipelineConfig,
    dry_run: bool,
) -> Result<RunResult> {
    let run_span = info_span!("run", workbook = %workbook_dir.display(), dry_run);
    let _run_guard = run_span.enter();
    config.mappings.validate().context("validate mappings")?;

    let sheets = load_sheets(workbook_dir, config)?;
    let (treatment, control, sheet_summaries) = harmonize(&sheets, config)?;

    let cohort = info_span!("combine").in_scope(|| combine(treatment, control));
    info!(
        records = cohort.len(),
        dropped = cohort.dropped,
        "combine complete"
    );

    let (model, scores) = estimate(&cohort, config)?;
    let (matched, balance_prematch, balance_postmatch) = match_cohort(&cohort, &scores, config)?;

    let report_span = info_span!("report");
    let report_start = Instant::now();
    let (reports, rendered) = report_span.in_scope(|| -> Result<_> {
        let reports =
            build_reports(&cohort, &matched, &config.subgroups).context("build reports")?;
        let rendered = reports.render().context("render reports")?;
        Ok((reports, rendered))
    })?;
    info!(
        reports = rendered.len(),
        duration_ms = report_start.elapsed().as_millis(),
        "report complete"
    );

    let counts = CohortCounts {
        treatment: cohort.count(Group::Treatment),
        control: cohort.count(Group::Control),
        skipped: sheet_summaries.iter().map(|s| s.skipped).sum(),
        dropped: cohort.dropped,
        pairs: matched.pair_count(),
    };
    let manifest = Manifest {
        tool_version: env!("CARGO_PKG_VERSION"),
        inputs: sheets
            .iter()
            .zip(&sheet_summaries)
            .map(|(loaded, summary)| {
                InputEntry::new(
                    summary,
                    config.mappings.get(loaded.group).version,
                    loaded.sha256.clone(),
                )
            })
            .collect(),
        cohort: counts,
        model: ModelEntry::from(&model),
        balance: BalanceEntry {
            max_abs_smd_prematch: balance_prematch.max_abs_difference(),
            max_abs_smd_postmatch: balance_postmatch.max_abs_difference(),
        },
        outputs: rendered.iter().map(OutputEntry::from).collect(),
    };
    let manifest_bytes = manifest.to_json().context("serialize manifest")?;

    let written = if dry_run {
        info!(output_dir = %output_dir.display(), "dry run, nothing written");
        Vec::new()
    } else {
        write_outputs(output_dir, &rendered, &manifest_bytes)?
    };

    Ok(RunResult {
        workbook_dir: workbook_dir.to_path_buf(),
        output_dir: output_dir.to_path_buf(),
        dry_run,
        sheets: sheet_summaries,
        counts,
        model,
        balance_prematch,
        balance_postmatch,
        reports: rendered
            .iter()
            .map(|report| ReportSummary {
                file_name: report.file_name,
                rows: report.rows,
                sha256: compute_sha256(&report.bytes),
            })
            .collect(),
        dose_response: reports.dose_response,
        written,
    })
}

/// Writes the rendered reports, then the manifest.
pub fn write_outputs(
    output_dir: &Path,
    rendered: &[RenderedReport],
    manifest: &[u8],
) -> Result<Vec<PathBuf>> {
    let span = info_span!("write", output_dir = %output_dir.display());
    let _guard = span.enter();
    let start = Instant::now();

    let mut written = write_reports(output_dir, rendered).context("write reports")?;
    let manifest_path = output_dir.join(MANIFEST_FILE);
    fs::write(&manifest_path, manifest)
        .with_context(|| format!("write {}", manifest_path.display()))?;
    written.push(manifest_path);
    info!(
        files = written.len(),
        duration_ms = start.elapsed().as_millis(),
        "write complete"
    );
    Ok(written)
}
