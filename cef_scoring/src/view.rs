//! Everything that is displayed for a selection, computed in one call.

use log::{info, warn};

use crate::config::*;
use crate::resolver::resolve;
use crate::segmenter::segment;
use crate::{compare_across_blocks, compare_blocks, score_block};

/// What the user selected. All the fields are optional.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Selection {
    pub respondent: Option<String>,
    /// The sequence of the block to display.
    pub block: Option<u32>,
    /// Two blocks to compare side by side.
    pub compare: Option<(u32, u32)>,
}

#[derive(PartialEq, Debug, Clone)]
pub enum BlockView {
    Completed(BlockScores),
    NotCompleted { sequence: u32 },
}

#[derive(PartialEq, Debug, Clone)]
pub enum PairOutcome {
    Compared(Vec<GroupDelta>),
    /// The respondent did not complete this block of the pair.
    NotCompleted { sequence: u32 },
}

#[derive(PartialEq, Debug, Clone)]
pub struct PairView {
    pub first: u32,
    pub second: u32,
    pub outcome: PairOutcome,
}

#[derive(PartialEq, Debug, Clone)]
pub struct RespondentView {
    pub respondent: String,
    pub selected: Option<BlockView>,
    pub comparison: ComparisonMatrix,
    pub pair: Option<PairView>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct ViewModel {
    /// The respondents that can be selected.
    pub respondents: Vec<String>,
    /// The labels of all the blocks of the sheet.
    pub blocks: Vec<String>,
    pub respondent: Option<RespondentView>,
}

/// Runs the whole pipeline on a sheet: column resolution, normalization, segmentation and scoring.
///
/// Only a sheet with undetectable columns is an error. A selection that does not match the
/// content of the sheet is displayed as not completed.
pub fn compute(
    table: &RawTable,
    rubric: &Rubric,
    layout: &ColumnLayout,
    selection: &Selection,
) -> Result<ViewModel, ScoringError> {
    let sheet = resolve(table, layout)?;
    let segmentation = segment(&sheet);
    Ok(view_of(&segmentation, rubric, selection))
}

/// The view of a selection, for blocks that are already segmented.
pub fn view_of(segmentation: &Segmentation, rubric: &Rubric, selection: &Selection) -> ViewModel {
    let respondent = selection
        .respondent
        .as_ref()
        .map(|r| respondent_view(segmentation, rubric, r.trim(), selection));
    ViewModel {
        respondents: segmentation.respondents.clone(),
        blocks: segmentation.labels(),
        respondent,
    }
}

fn block_view(
    segmentation: &Segmentation,
    rubric: &Rubric,
    respondent: &str,
    sequence: u32,
) -> BlockView {
    let res = segmentation
        .block(sequence)
        .map(|table| score_block(rubric, table, respondent));
    match res {
        Some(Ok(scores)) => BlockView::Completed(scores),
        Some(Err(e)) => {
            info!("block_view: {}", e);
            BlockView::NotCompleted { sequence }
        }
        None => {
            warn!("block_view: no block {} in this sheet", sequence);
            BlockView::NotCompleted { sequence }
        }
    }
}

fn pair_view(
    segmentation: &Segmentation,
    rubric: &Rubric,
    respondent: &str,
    first: u32,
    second: u32,
) -> PairView {
    let outcome = match (segmentation.block(first), segmentation.block(second)) {
        (Some(t1), Some(t2)) => match compare_blocks(rubric, respondent, t1, t2) {
            Ok(deltas) => PairOutcome::Compared(deltas),
            Err(ScoringError::RespondentNotFoundInBlock { block, .. }) => {
                PairOutcome::NotCompleted { sequence: block }
            }
            Err(e) => {
                warn!("pair_view: {}", e);
                PairOutcome::NotCompleted { sequence: first }
            }
        },
        (None, _) => PairOutcome::NotCompleted { sequence: first },
        (_, None) => PairOutcome::NotCompleted { sequence: second },
    };
    PairView {
        first,
        second,
        outcome,
    }
}

fn respondent_view(
    segmentation: &Segmentation,
    rubric: &Rubric,
    respondent: &str,
    selection: &Selection,
) -> RespondentView {
    if !segmentation.respondents.iter().any(|r| r == respondent) {
        warn!("respondent_view: unknown respondent {:?}", respondent);
    }
    RespondentView {
        respondent: respondent.to_string(),
        selected: selection
            .block
            .map(|seq| block_view(segmentation, rubric, respondent, seq)),
        comparison: compare_across_blocks(rubric, respondent, &segmentation.blocks),
        pair: selection
            .compare
            .map(|(a, b)| pair_view(segmentation, rubric, respondent, a, b)),
    }
}
