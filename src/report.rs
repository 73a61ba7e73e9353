use log::{debug, info, warn};

use cef_scoring::resolver::resolve;
use cef_scoring::segmenter::segment;
use cef_scoring::view::*;
use cef_scoring::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::report::action_plan::render_action_plan;
use crate::report::config_reader::*;
use crate::report::io_common::{action_plan_file_name, input_type_from_path, simplify_file_name};

mod action_plan;
mod config_reader;
mod io_common;
mod io_csv;
mod io_xlsx;

#[derive(Debug, Snafu)]
pub enum ReportError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The workbook {path} has no worksheet"))]
    EmptyExcel { path: String },
    #[snafu(display("The workbook {path} has several worksheets, the worksheet name must be provided"))]
    AmbiguousWorksheet { path: String },
    #[snafu(display("Worksheet {name} not found in {path}"))]
    MissingWorksheet { name: String, path: String },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of the CSV file"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Error reading file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the JSON content"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Could not understand the column index {value}"))]
    ParsingColumnIndex { value: String },
    #[snafu(display("Error writing {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("{source}"))]
    Scoring { source: ScoringError },
    #[snafu(display("Difference detected between calculated summary and reference summary"))]
    ReferenceMismatch {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ReportResult<T> = Result<T, ReportError>;

fn format_score(x: f64) -> String {
    format!("{:.2}", x)
}

fn total_to_json(total: &Total) -> JSValue {
    match total {
        Total::Complete(x) => json!(format_score(*x)),
        Total::Incomplete { partial, missing } => json!({
            "partial": format_score(*partial),
            "missing": missing
        }),
    }
}

fn band_to_json(band: Option<ColorBand>) -> JSValue {
    match band {
        Some(b) => json!(b.as_str()),
        None => JSValue::Null,
    }
}

fn direction_to_json(direction: Option<Direction>) -> JSValue {
    match direction {
        Some(d) => json!(d.as_str()),
        None => JSValue::Null,
    }
}

fn items_to_json(items: &[ActionItem]) -> Vec<JSValue> {
    items
        .iter()
        .map(|i| json!({"question": i.question.to_string(), "label": i.label}))
        .collect()
}

fn block_scores_to_json(scores: &BlockScores) -> JSValue {
    let groups: Vec<JSValue> = scores
        .groups
        .iter()
        .map(|g| {
            json!({
                "group": g.label,
                "total": total_to_json(&g.total),
                "band": band_to_json(g.band())
            })
        })
        .collect();
    let safeguarding: Vec<JSValue> = scores
        .safeguarding
        .iter()
        .map(|c| {
            json!({
                "question": c.question.to_string(),
                "label": c.label,
                "score": c.score.map(format_score),
                "band": band_to_json(c.band)
            })
        })
        .collect();
    let unrecognized: Vec<JSValue> = scores
        .unrecognized
        .iter()
        .map(|u| json!({"question": u.question.to_string(), "answer": u.token}))
        .collect();
    json!({
        "block": scores.label(),
        "completed": true,
        "groups": groups,
        "safeguarding": {
            "total": total_to_json(&scores.safeguarding_total),
            "questions": safeguarding
        },
        "total": total_to_json(&scores.block_total),
        "developing": items_to_json(&scores.action_items.developing),
        "attention": items_to_json(&scores.action_items.attention),
        "unrecognized": unrecognized
    })
}

fn block_view_to_json(bv: &BlockView) -> JSValue {
    match bv {
        BlockView::Completed(scores) => block_scores_to_json(scores),
        BlockView::NotCompleted { sequence } => json!({
            "block": block_label(*sequence),
            "completed": false
        }),
    }
}

fn comparison_to_json(matrix: &ComparisonMatrix) -> Vec<JSValue> {
    let mut l: Vec<JSValue> = Vec::new();
    for row in matrix.rows.iter() {
        let cells: Vec<JSValue> = row
            .cells
            .iter()
            .map(|c| match &c.status {
                CellStatus::NotCompleted => json!({
                    "block": block_label(c.sequence),
                    "completed": false
                }),
                CellStatus::Scored { total, direction } => json!({
                    "block": block_label(c.sequence),
                    "total": total_to_json(total),
                    "direction": direction_to_json(*direction)
                }),
            })
            .collect();
        l.push(json!({"group": row.label, "cells": cells}));
    }
    l
}

fn pair_to_json(pair: &PairView) -> JSValue {
    match &pair.outcome {
        PairOutcome::Compared(deltas) => {
            let ds: Vec<JSValue> = deltas
                .iter()
                .map(|d| {
                    json!({
                        "group": d.label,
                        "first": total_to_json(&d.first),
                        "second": total_to_json(&d.second),
                        "delta": d.delta.map(format_score),
                        "direction": direction_to_json(d.direction)
                    })
                })
                .collect();
            json!({
                "first": block_label(pair.first),
                "second": block_label(pair.second),
                "deltas": ds
            })
        }
        PairOutcome::NotCompleted { sequence } => json!({
            "first": block_label(pair.first),
            "second": block_label(pair.second),
            "notCompleted": block_label(*sequence)
        }),
    }
}

/// The results of one respondent.
struct RespondentResults {
    respondent: String,
    blocks: Vec<BlockView>,
    view: RespondentView,
}

fn respondent_to_json(rr: &RespondentResults) -> JSValue {
    let blocks: Vec<JSValue> = rr.blocks.iter().map(block_view_to_json).collect();
    let mut js = json!({
        "respondent": rr.respondent,
        "blocks": blocks,
        "comparison": comparison_to_json(&rr.view.comparison)
    });
    if let Some(pair) = &rr.view.pair {
        js["pair"] = pair_to_json(pair);
    }
    js
}

fn missing_answers_name(m: MissingAnswers) -> &'static str {
    match m {
        MissingAnswers::Propagate => "propagate",
        MissingAnswers::CountAsZero => "countAsZero",
    }
}

fn build_summary_js(
    config: &ReportConfig,
    rubric: &Rubric,
    segmentation: &Segmentation,
    results: &[RespondentResults],
) -> JSValue {
    let report_name = config
        .output_settings
        .as_ref()
        .and_then(|os| os.report_name.clone())
        .unwrap_or_else(|| simplify_file_name(&config.input_source.file_path));
    let c = OutputConfig {
        report: report_name,
        input: simplify_file_name(&config.input_source.file_path),
        layout: config
            .input_source
            .layout
            .clone()
            .unwrap_or_else(|| "auto".to_string()),
        missing_answers: missing_answers_name(rubric.missing_answers()).to_string(),
    };
    let rs: Vec<JSValue> = results.iter().map(respondent_to_json).collect();
    json!({
        "config": c,
        "respondents": segmentation.respondents,
        "blocks": segmentation.labels(),
        "results": rs
    })
}

// The configuration, and the directory relative to which the input paths are read.
fn load_config(args: &Args) -> ReportResult<(ReportConfig, PathBuf)> {
    let (mut config, mut root) = match &args.config {
        Some(config_path) => {
            let config = read_config(config_path)?;
            let root = Path::new(config_path)
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_default();
            (config, root)
        }
        None => {
            let input = match &args.input {
                Some(x) => x.clone(),
                None => whatever!("Either a configuration file (--config) or an input file (--input) must be provided"),
            };
            (ReportConfig::from_input(&input), PathBuf::new())
        }
    };

    // Command line values override the configuration file.
    if let Some(input) = &args.input {
        config.input_source.file_path = input.clone();
        root = PathBuf::new();
        if let Some(t) = input_type_from_path(input) {
            config.input_source.provider = t;
        }
    }
    if let Some(t) = &args.input_type {
        config.input_source.provider = t.clone();
    }
    if let Some(ws) = &args.excel_worksheet_name {
        config.input_source.excel_worksheet_name = Some(ws.clone());
    }
    if let Some(layout) = &args.layout {
        config.input_source.layout = Some(layout.clone());
    }
    debug!("load_config: config: {:?} root: {:?}", config, root);
    Ok((config, root))
}

fn read_input(root: &Path, source: &InputSource) -> ReportResult<RawTable> {
    let p: PathBuf = root.join(&source.file_path);
    let p2 = p.as_path().display().to_string();
    info!("Attempting to read survey file {:?}", p2);
    match source.provider.as_str() {
        "xlsx" => io_xlsx::read_xlsx(&p2, source.excel_worksheet_name.as_deref()),
        "csv" => io_csv::read_csv(&p2),
        x => whatever!("Provider not implemented {:?}", x),
    }
}

fn action_plan_dir(args: &Args, config: &ReportConfig, root: &Path) -> Option<PathBuf> {
    if let Some(d) = &args.action_plan_dir {
        return Some(PathBuf::from(d));
    }
    match &config.output_settings {
        Some(os) if os.generate_action_plans == Some(true) => Some(
            os.output_directory
                .as_ref()
                .map(|d| root.join(d))
                .unwrap_or_else(|| root.to_path_buf()),
        ),
        _ => None,
    }
}

fn write_action_plans(
    dir: &Path,
    title: &str,
    rubric: &Rubric,
    results: &[RespondentResults],
) -> ReportResult<Vec<PathBuf>> {
    fs::create_dir_all(dir).context(WritingOutputSnafu {
        path: dir.display().to_string(),
    })?;
    let mut written: Vec<PathBuf> = Vec::new();
    for rr in results.iter() {
        for bv in rr.blocks.iter() {
            if let BlockView::Completed(scores) = bv {
                let p = dir.join(action_plan_file_name(&rr.respondent, &scores.label()));
                let content = render_action_plan(title, rubric, scores);
                info!("Writing action plan {:?}", p);
                fs::write(&p, content.as_bytes()).context(WritingOutputSnafu {
                    path: p.display().to_string(),
                })?;
                written.push(p);
            }
        }
    }
    Ok(written)
}

/// Reads the survey, scores all the selected respondents and writes the reports.
///
/// Returns the JSON summary.
pub fn run(args: &Args) -> ReportResult<JSValue> {
    let (config, root) = load_config(args)?;
    info!("config: {:?}", config);

    let mut rubric = match &config.rubric {
        Some(rs) => rs.rubric()?,
        None => Rubric::default(),
    };
    if args.missing_as_zero {
        rubric = rubric.with_missing_answers(MissingAnswers::CountAsZero);
    }
    let layout = config.input_source.column_layout()?;

    let table = read_input(&root, &config.input_source)?;
    info!("Read {} rows", table.rows.len());

    // A sheet without the expected columns stops here: nothing is reported for this file.
    let sheet = resolve(&table, &layout).context(ScoringSnafu)?;
    let segmentation = segment(&sheet);

    let compare: Option<(u32, u32)> = match args.compare.as_deref() {
        None => None,
        Some([a, b]) => Some((*a, *b)),
        Some(x) => whatever!("--compare expects two blocks, got {:?}", x),
    };

    let respondents: Vec<String> = match &args.coach {
        Some(c) => vec![c.trim().to_string()],
        None => segmentation.respondents.clone(),
    };
    let sequences: Vec<u32> = match args.block {
        Some(b) => vec![b],
        None => segmentation.blocks.iter().map(|b| b.sequence).collect(),
    };

    let mut results: Vec<RespondentResults> = Vec::new();
    for respondent in respondents.iter() {
        let mut blocks: Vec<BlockView> = Vec::new();
        let mut last_view: Option<RespondentView> = None;
        for seq in sequences.iter() {
            let selection = Selection {
                respondent: Some(respondent.clone()),
                block: Some(*seq),
                compare,
            };
            let view = view_of(&segmentation, &rubric, &selection);
            if let Some(rv) = view.respondent {
                if let Some(bv) = rv.selected.clone() {
                    blocks.push(bv);
                }
                last_view = Some(rv);
            }
        }
        let view = match last_view {
            Some(v) => v,
            None => {
                // No block at all in this sheet.
                let selection = Selection {
                    respondent: Some(respondent.clone()),
                    block: None,
                    compare,
                };
                match view_of(&segmentation, &rubric, &selection).respondent {
                    Some(v) => v,
                    None => continue,
                }
            }
        };
        results.push(RespondentResults {
            respondent: respondent.clone(),
            blocks,
            view,
        });
    }

    let result_js = build_summary_js(&config, &rubric, &segmentation, &results);

    if let Some(dir) = action_plan_dir(args, &config, &root) {
        let title = result_js["config"]["report"]
            .as_str()
            .unwrap_or("CEF self-assessment")
            .to_string();
        let written = write_action_plans(&dir, &title, &rubric, &results)?;
        info!("{} action plans written in {:?}", written.len(), dir);
    }

    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;
    match args.out.as_deref() {
        None | Some("stdout") => {
            println!("{}", pretty_js_stats);
        }
        Some(out_path) => {
            info!("Writing summary {:?}", out_path);
            fs::write(out_path, pretty_js_stats.as_bytes()).context(WritingOutputSnafu {
                path: out_path.to_string(),
            })?;
        }
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = &args.reference {
        let summary_ref = read_summary(summary_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            return ReferenceMismatchSnafu {}.fail();
        }
    }

    Ok(result_js)
}
