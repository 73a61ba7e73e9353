/*!
Scoring engine for the CEF coach self-assessment survey.

A submission answers 36 questions with "YES", "Neither YES or NO" or "NO". The questions are
grouped into 9 competency groups of 4 questions, and 5 of them are also tracked as the
safeguarding subset.

The pipeline is:
- [`resolver`] finds the respondent, time and question columns of the sheet
- [`normalizer`] turns the answers into scores (1, 0.5, 0 or absent)
- [`segmenter`] numbers the submissions of every respondent into blocks
- this module computes the totals, color bands, comparisons and action items
- [`view::compute`] runs everything for a given selection.

All the functions are pure: nothing is cached between two calls.
*/

mod config;
pub mod builder;
pub mod manual;
pub mod normalizer;
pub mod resolver;
pub mod segmenter;
pub mod view;

use log::{debug, info};

pub use crate::config::*;

fn find_block<'a>(
    table: &'a BlockTable,
    respondent: &str,
) -> Result<&'a Block, ScoringError> {
    table
        .find(respondent)
        .ok_or_else(|| ScoringError::RespondentNotFoundInBlock {
            respondent: respondent.to_string(),
            block: table.sequence,
        })
}

// The scores are read through Rubric::effective_score: only the absent ones are missing.
fn sum_scores<I: Iterator<Item = NormalizedScore>>(scores: I) -> Total {
    let mut partial = 0.0;
    let mut missing: u32 = 0;
    for s in scores {
        match s {
            Some(x) => partial += x,
            None => missing += 1,
        }
    }
    if missing == 0 {
        Total::Complete(partial)
    } else {
        Total::Incomplete { partial, missing }
    }
}

fn block_group_totals(rubric: &Rubric, block: &Block) -> Vec<GroupTotal> {
    GroupId::all()
        .map(|group| GroupTotal {
            group,
            label: rubric.group_label(group).to_string(),
            total: sum_scores(group.questions().map(|q| rubric.effective_score(block, q))),
        })
        .collect()
}

fn block_safeguarding_total(rubric: &Rubric, block: &Block) -> Total {
    sum_scores(
        rubric
            .safeguarding()
            .map(|q| rubric.effective_score(block, q)),
    )
}

/// The totals of the 9 groups for this respondent, in group order.
///
/// Fails with [`ScoringError::RespondentNotFoundInBlock`] if the respondent did not complete
/// this block.
pub fn group_totals(
    rubric: &Rubric,
    table: &BlockTable,
    respondent: &str,
) -> Result<Vec<GroupTotal>, ScoringError> {
    let block = find_block(table, respondent)?;
    let res = block_group_totals(rubric, block);
    debug!(
        "group_totals: {} {}: {:?}",
        respondent,
        table.label(),
        res.iter().map(|g| g.total).collect::<Vec<Total>>()
    );
    Ok(res)
}

/// The total of the safeguarding questions, between 0 and 5.
pub fn safeguarding_total(
    rubric: &Rubric,
    table: &BlockTable,
    respondent: &str,
) -> Result<Total, ScoringError> {
    let block = find_block(table, respondent)?;
    Ok(block_safeguarding_total(rubric, block))
}

/// The sum of the group totals, between 0 and 36.
pub fn block_total(groups: &[GroupTotal]) -> Total {
    groups.iter().map(|g| g.total).sum()
}

/// The color band of a score. The lower bound of each band is inclusive.
pub fn color_band(score: f64, kind: ScoreKind) -> ColorBand {
    let thresholds: &[(f64, ColorBand)] = match kind {
        ScoreKind::Group => &ColorBand::GROUP_THRESHOLDS,
        ScoreKind::SafeguardingQuestion => &ColorBand::SAFEGUARDING_THRESHOLDS,
    };
    thresholds
        .iter()
        .find(|(lower, _)| score >= *lower)
        .map(|(_, band)| *band)
        .unwrap_or(ColorBand::Critical)
}

fn direction(previous: &Total, current: &Total) -> Option<Direction> {
    match (previous.value(), current.value()) {
        (Some(p), Some(c)) if c > p => Some(Direction::Increased),
        (Some(p), Some(c)) if c < p => Some(Direction::Decreased),
        (Some(_), Some(_)) => Some(Direction::Unchanged),
        _ => None,
    }
}

/// The group totals of a respondent in every block, with the direction of the change
/// from one block to the next.
///
/// The blocks that the respondent did not complete are marked as such, they are not
/// an error.
pub fn compare_across_blocks(
    rubric: &Rubric,
    respondent: &str,
    blocks: &[BlockTable],
) -> ComparisonMatrix {
    let mut sorted: Vec<&BlockTable> = blocks.iter().collect();
    sorted.sort_by_key(|b| b.sequence);

    // One entry per block: the group totals, if the block was completed.
    let per_block: Vec<(u32, Option<Vec<GroupTotal>>)> = sorted
        .iter()
        .map(|b| (b.sequence, group_totals(rubric, b, respondent).ok()))
        .collect();

    let rows: Vec<ComparisonRow> = GroupId::all()
        .map(|group| {
            let mut cells: Vec<ComparisonCell> = Vec::new();
            let mut previous: Option<CellStatus> = None;
            for (sequence, totals) in per_block.iter() {
                let status = match totals {
                    None => CellStatus::NotCompleted,
                    Some(gts) => {
                        let total = gts[group.index()].total;
                        let dir = match &previous {
                            // The first block is the reference.
                            None => total.value().map(|_| Direction::Unchanged),
                            Some(CellStatus::Scored { total: prev, .. }) => {
                                direction(prev, &total)
                            }
                            Some(CellStatus::NotCompleted) => None,
                        };
                        CellStatus::Scored {
                            total,
                            direction: dir,
                        }
                    }
                };
                previous = Some(status.clone());
                cells.push(ComparisonCell {
                    sequence: *sequence,
                    status,
                });
            }
            ComparisonRow {
                group,
                label: rubric.group_label(group).to_string(),
                cells,
            }
        })
        .collect();

    info!(
        "compare_across_blocks: {}: {} blocks",
        respondent,
        per_block.len()
    );
    ComparisonMatrix {
        respondent: respondent.to_string(),
        sequences: per_block.iter().map(|(s, _)| *s).collect(),
        rows,
    }
}

/// The difference between two selected blocks, group by group.
pub fn compare_blocks(
    rubric: &Rubric,
    respondent: &str,
    first: &BlockTable,
    second: &BlockTable,
) -> Result<Vec<GroupDelta>, ScoringError> {
    let g1 = group_totals(rubric, first, respondent)?;
    let g2 = group_totals(rubric, second, respondent)?;
    let res = g1
        .iter()
        .zip(g2.iter())
        .map(|(a, b)| GroupDelta {
            group: a.group,
            label: a.label.clone(),
            first: a.total,
            second: b.total,
            delta: match (a.total.value(), b.total.value()) {
                (Some(x), Some(y)) => Some(y - x),
                _ => None,
            },
            direction: direction(&a.total, &b.total),
        })
        .collect();
    Ok(res)
}

fn block_action_items(rubric: &Rubric, block: &Block) -> ActionItems {
    let mut res = ActionItems::default();
    for question in QuestionId::all() {
        let item = || ActionItem {
            question,
            label: rubric.question_label(question).to_string(),
        };
        match rubric.effective_score(block, question) {
            Some(x) if x == 0.5 => res.developing.push(item()),
            Some(x) if x == 0.0 => res.attention.push(item()),
            _ => {}
        }
    }
    res
}

/// The questions to work on: the ones answered "Neither YES or NO" (developing) and the ones
/// answered "NO" (attention), in question order.
pub fn action_items(
    rubric: &Rubric,
    table: &BlockTable,
    respondent: &str,
) -> Result<ActionItems, ScoringError> {
    let block = find_block(table, respondent)?;
    Ok(block_action_items(rubric, block))
}

fn block_safeguarding_cells(rubric: &Rubric, block: &Block) -> Vec<SafeguardingCell> {
    rubric
        .safeguarding()
        .map(|question| {
            let score = rubric.effective_score(block, question);
            SafeguardingCell {
                question,
                label: rubric.question_label(question).to_string(),
                score,
                band: score.map(|x| color_band(x, ScoreKind::SafeguardingQuestion)),
            }
        })
        .collect()
}

/// The 5 safeguarding questions, with their individual scores.
pub fn safeguarding_cells(
    rubric: &Rubric,
    table: &BlockTable,
    respondent: &str,
) -> Result<Vec<SafeguardingCell>, ScoringError> {
    let block = find_block(table, respondent)?;
    Ok(block_safeguarding_cells(rubric, block))
}

/// The safeguarding questions that are not answered, or scored at or below the attention threshold.
pub fn unresolved_safeguarding(cells: &[SafeguardingCell]) -> Vec<&SafeguardingCell> {
    cells
        .iter()
        .filter(|c| match c.score {
            Some(x) => x <= Rubric::SAFEGUARDING_ATTENTION_THRESHOLD,
            None => true,
        })
        .collect()
}

/// All the scores of one respondent in one block.
pub fn score_block(
    rubric: &Rubric,
    table: &BlockTable,
    respondent: &str,
) -> Result<BlockScores, ScoringError> {
    let block = find_block(table, respondent)?;
    let groups = block_group_totals(rubric, block);
    let total = block_total(&groups);
    Ok(BlockScores {
        respondent: respondent.to_string(),
        sequence: table.sequence,
        safeguarding_total: block_safeguarding_total(rubric, block),
        safeguarding: block_safeguarding_cells(rubric, block),
        block_total: total,
        action_items: block_action_items(rubric, block),
        unrecognized: block.unrecognized.clone(),
        groups,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TableBuilder;
    use crate::resolver::{parse_timestamp, resolve};
    use crate::segmenter::segment;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn block_of(respondent: &str, sequence: u32, answers: &[&str]) -> Block {
        let raw: Vec<Option<String>> = answers.iter().map(|s| Some(s.to_string())).collect();
        let (scores, unrecognized) = normalizer::normalize_answers(respondent, &raw);
        Block {
            respondent: respondent.to_string(),
            sequence,
            timestamp: None,
            scores,
            unrecognized,
        }
    }

    fn table_of(sequence: u32, blocks: Vec<Block>) -> BlockTable {
        BlockTable {
            sequence,
            entries: blocks,
        }
    }

    fn values(groups: &[GroupTotal]) -> Vec<Option<f64>> {
        groups.iter().map(|g| g.total.value()).collect()
    }

    #[test]
    fn all_yes() {
        init();
        let rubric = Rubric::default();
        let t = table_of(1, vec![block_of("Jane Doe", 1, &["YES"; NUM_QUESTIONS])]);
        let groups = group_totals(&rubric, &t, "Jane Doe").unwrap();
        assert_eq!(groups.len(), NUM_GROUPS);
        assert!(groups.iter().all(|g| g.total == Total::Complete(4.0)));
        assert!(groups.iter().all(|g| g.band() == Some(ColorBand::Strong)));
        assert_eq!(groups[0].label, "Planning & Preparation");
        assert_eq!(block_total(&groups), Total::Complete(36.0));
        assert_eq!(
            safeguarding_total(&rubric, &t, "Jane Doe").unwrap(),
            Total::Complete(5.0)
        );
        let cells = safeguarding_cells(&rubric, &t, "Jane Doe").unwrap();
        assert!(cells.iter().all(|c| c.band == Some(ColorBand::Strong)));
        assert!(unresolved_safeguarding(&cells).is_empty());
        let items = action_items(&rubric, &t, "Jane Doe").unwrap();
        assert!(items.developing.is_empty());
        assert!(items.attention.is_empty());
    }

    #[test]
    fn group_windows_and_safeguarding_set() {
        let rubric = Rubric::default();
        let mut answers = ["YES"; NUM_QUESTIONS];
        // Group 1: one NO, group 2: one neither
        answers[0] = "NO";
        answers[5] = "Neither YES or NO";
        // Safeguarding: 20 and 34
        answers[19] = "NO";
        answers[33] = "Neither YES or NO";
        let t = table_of(1, vec![block_of("Jane Doe", 1, &answers)]);
        let groups = group_totals(&rubric, &t, "Jane Doe").unwrap();
        assert_eq!(
            values(&groups),
            vec![
                Some(3.0),
                Some(3.5),
                Some(4.0),
                Some(4.0),
                Some(3.0),
                Some(4.0),
                Some(4.0),
                Some(4.0),
                Some(3.5)
            ]
        );
        assert_eq!(block_total(&groups), Total::Complete(33.0));
        assert_eq!(
            safeguarding_total(&rubric, &t, "Jane Doe").unwrap(),
            Total::Complete(3.5)
        );

        let cells = safeguarding_cells(&rubric, &t, "Jane Doe").unwrap();
        let questions: Vec<u32> = cells.iter().map(|c| c.question.0).collect();
        assert_eq!(questions, vec![20, 22, 30, 33, 34]);
        assert_eq!(cells[0].band, Some(ColorBand::Critical));
        assert_eq!(cells[4].band, Some(ColorBand::Developing));
        let unresolved: Vec<u32> = unresolved_safeguarding(&cells)
            .iter()
            .map(|c| c.question.0)
            .collect();
        assert_eq!(unresolved, vec![20, 34]);

        let items = action_items(&rubric, &t, "Jane Doe").unwrap();
        let dev: Vec<u32> = items.developing.iter().map(|i| i.question.0).collect();
        let att: Vec<u32> = items.attention.iter().map(|i| i.question.0).collect();
        assert_eq!(dev, vec![6, 34]);
        assert_eq!(att, vec![1, 20]);
        assert_eq!(
            items.attention[1].label,
            "I check that the playing area and equipment are safe before every session"
        );
    }

    #[test]
    fn missing_answers_propagate() {
        let rubric = Rubric::default();
        let mut answers = ["YES"; NUM_QUESTIONS];
        answers[1] = "";
        answers[21] = "Sometimes";
        let t = table_of(1, vec![block_of("Jane Doe", 1, &answers)]);
        let groups = group_totals(&rubric, &t, "Jane Doe").unwrap();
        assert_eq!(
            groups[0].total,
            Total::Incomplete {
                partial: 3.0,
                missing: 1
            }
        );
        assert_eq!(groups[0].band(), None);
        assert_eq!(groups[1].total, Total::Complete(4.0));
        // The block total is incomplete too, and consistent with the group totals.
        let total = block_total(&groups);
        assert_eq!(
            total,
            Total::Incomplete {
                partial: 34.0,
                missing: 2
            }
        );
        assert_eq!(
            total.partial(),
            groups.iter().map(|g| g.total.partial()).sum::<f64>()
        );
        let sg = safeguarding_total(&rubric, &t, "Jane Doe").unwrap();
        assert_eq!(sg.value(), None);
        assert_eq!(sg.missing(), 1);
        let cells = safeguarding_cells(&rubric, &t, "Jane Doe").unwrap();
        assert_eq!(cells[1].score, None);
        assert_eq!(cells[1].band, None);
        assert_eq!(unresolved_safeguarding(&cells).len(), 1);
        // Missing answers are neither developing nor attention items.
        let items = action_items(&rubric, &t, "Jane Doe").unwrap();
        assert!(items.attention.is_empty());
        assert!(items.developing.is_empty());
    }

    #[test]
    fn missing_answers_count_as_zero() {
        let rubric = Rubric::default().with_missing_answers(MissingAnswers::CountAsZero);
        let mut answers = ["YES"; NUM_QUESTIONS];
        answers[1] = "";
        answers[21] = "";
        let t = table_of(1, vec![block_of("Jane Doe", 1, &answers)]);
        let groups = group_totals(&rubric, &t, "Jane Doe").unwrap();
        assert_eq!(groups[0].total, Total::Complete(3.0));
        assert_eq!(block_total(&groups), Total::Complete(34.0));
        assert_eq!(
            safeguarding_total(&rubric, &t, "Jane Doe").unwrap(),
            Total::Complete(4.0)
        );

        // The missing answers are NO in the per-question views too.
        let items = action_items(&rubric, &t, "Jane Doe").unwrap();
        let attention: Vec<QuestionId> = items.attention.iter().map(|i| i.question).collect();
        assert_eq!(attention, vec![QuestionId(2), QuestionId(22)]);
        assert!(items.developing.is_empty());
        let cells = safeguarding_cells(&rubric, &t, "Jane Doe").unwrap();
        let q22 = cells.iter().find(|c| c.question == QuestionId(22)).unwrap();
        assert_eq!(q22.score, Some(0.0));
        assert_eq!(q22.band, Some(ColorBand::Critical));
        assert_eq!(unresolved_safeguarding(&cells).len(), 1);

        // Without the policy, they are only missing.
        let propagate = Rubric::default();
        let items = action_items(&propagate, &t, "Jane Doe").unwrap();
        assert!(items.attention.is_empty());
        let cells = safeguarding_cells(&propagate, &t, "Jane Doe").unwrap();
        let q22 = cells.iter().find(|c| c.question == QuestionId(22)).unwrap();
        assert_eq!(q22.score, None);
        assert_eq!(q22.band, None);
    }

    #[test]
    fn identifiers_out_of_range() {
        let b = block_of("Jane Doe", 1, &["YES"; NUM_QUESTIONS]);
        let rubric = Rubric::default();
        assert_eq!(b.score(QuestionId(0)), None);
        assert_eq!(b.score(QuestionId(37)), None);
        assert_eq!(rubric.question_label(QuestionId(0)), "");
        assert_eq!(rubric.group_label(GroupId(0)), "");
        assert_eq!(QuestionId(0).group(), GroupId(0));
        assert_eq!(QuestionId(1).group(), GroupId(1));
        assert_eq!(QuestionId(4).group(), GroupId(1));
        assert_eq!(QuestionId(5).group(), GroupId(2));
        assert_eq!(QuestionId(36).group(), GroupId(9));
        assert_eq!(GroupId(0).questions().count(), 0);
        assert_eq!(GroupId(10).questions().count(), 0);
        assert_eq!(
            GroupId(9).questions().collect::<Vec<QuestionId>>(),
            vec![QuestionId(33), QuestionId(34), QuestionId(35), QuestionId(36)]
        );
    }

    #[test]
    fn group_totals_sum_to_block_total() {
        let rubric = Rubric::default();
        let tokens = ["YES", "NO", "Neither YES or NO"];
        let answers: Vec<&str> = (0..NUM_QUESTIONS).map(|i| tokens[(i * 7) % 3]).collect();
        let t = table_of(1, vec![block_of("Jane Doe", 1, &answers)]);
        let scores = score_block(&rubric, &t, "Jane Doe").unwrap();
        let sum: f64 = scores.groups.iter().map(|g| g.total.value().unwrap()).sum();
        assert_eq!(scores.block_total, Total::Complete(sum));
        assert_eq!(scores.label(), "Block 1");
    }

    #[test]
    fn color_band_boundaries() {
        use ColorBand::*;
        let g = |x| color_band(x, ScoreKind::Group);
        assert_eq!(g(4.0), Strong);
        assert_eq!(g(3.25), Strong);
        assert_eq!(g(3.24999), Good);
        assert_eq!(g(2.51), Good);
        assert_eq!(g(2.5), Developing);
        assert_eq!(g(1.75), Developing);
        assert_eq!(g(1.74999), Critical);
        assert_eq!(g(0.0), Critical);

        let s = |x| color_band(x, ScoreKind::SafeguardingQuestion);
        assert_eq!(s(1.0), Strong);
        assert_eq!(s(0.5), Developing);
        assert_eq!(s(0.0), Critical);
    }

    #[test]
    fn respondent_not_in_block() {
        let rubric = Rubric::default();
        let t = table_of(2, vec![block_of("John Smith", 1, &["YES"; NUM_QUESTIONS])]);
        let err = group_totals(&rubric, &t, "Jane Doe").unwrap_err();
        assert_eq!(
            err,
            ScoringError::RespondentNotFoundInBlock {
                respondent: "Jane Doe".to_string(),
                block: 2
            }
        );
        assert!(score_block(&rubric, &t, "Jane Doe").is_err());
        assert!(action_items(&rubric, &t, "Jane Doe").is_err());
        assert_eq!(err.to_string(), "Jane Doe did not complete Block 2");
    }

    // The first group goes through the scores [1.0, 1.0, 2.0]
    #[test]
    fn directions() {
        let rubric = Rubric::default();
        let mut a1 = ["YES"; NUM_QUESTIONS];
        a1[..3].copy_from_slice(&["NO", "NO", "NO"]);
        let mut a3 = ["YES"; NUM_QUESTIONS];
        a3[..2].copy_from_slice(&["NO", "NO"]);
        // Block 2 has a lower score on the second group.
        let mut a2 = a1;
        a2[4] = "NO";
        let blocks = vec![
            table_of(3, vec![block_of("Jane Doe", 3, &a3)]),
            table_of(1, vec![block_of("Jane Doe", 1, &a1)]),
            table_of(2, vec![block_of("Jane Doe", 2, &a2)]),
        ];
        let m = compare_across_blocks(&rubric, "Jane Doe", &blocks);
        assert_eq!(m.sequences, vec![1, 2, 3]);
        assert_eq!(m.rows.len(), NUM_GROUPS);
        let dirs = |row: &ComparisonRow| -> Vec<Option<Direction>> {
            row.cells
                .iter()
                .map(|c| match &c.status {
                    CellStatus::Scored { direction, .. } => *direction,
                    CellStatus::NotCompleted => None,
                })
                .collect()
        };
        use Direction::*;
        assert_eq!(
            dirs(&m.rows[0]),
            vec![Some(Unchanged), Some(Unchanged), Some(Increased)]
        );
        assert_eq!(
            dirs(&m.rows[1]),
            vec![Some(Unchanged), Some(Decreased), Some(Increased)]
        );
        assert_eq!(
            m.rows[0].cells[2].status,
            CellStatus::Scored {
                total: Total::Complete(2.0),
                direction: Some(Increased)
            }
        );
    }

    #[test]
    fn comparison_with_missing_block() {
        let rubric = Rubric::default();
        let blocks = vec![
            table_of(1, vec![block_of("Jane Doe", 1, &["NO"; NUM_QUESTIONS])]),
            table_of(2, vec![block_of("John Smith", 1, &["YES"; NUM_QUESTIONS])]),
            table_of(3, vec![block_of("Jane Doe", 2, &["YES"; NUM_QUESTIONS])]),
        ];
        let m = compare_across_blocks(&rubric, "Jane Doe", &blocks);
        let row = &m.rows[0];
        assert_eq!(row.cells[1].status, CellStatus::NotCompleted);
        // No direction against a block that was not completed.
        assert_eq!(
            row.cells[2].status,
            CellStatus::Scored {
                total: Total::Complete(4.0),
                direction: None
            }
        );

        assert!(compare_blocks(&rubric, "Jane Doe", &blocks[0], &blocks[1]).is_err());
        let deltas = compare_blocks(&rubric, "Jane Doe", &blocks[0], &blocks[2]).unwrap();
        assert_eq!(deltas.len(), NUM_GROUPS);
        assert!(deltas.iter().all(|d| d.delta == Some(4.0)));
        assert!(deltas
            .iter()
            .all(|d| d.direction == Some(Direction::Increased)));
    }

    #[test]
    fn two_submissions_end_to_end() {
        init();
        let rubric = Rubric::default();
        let mut first = vec!["YES"; NUM_QUESTIONS];
        first[0] = "NO";
        let mut b = TableBuilder::new().survey_header(&["Timestamp", "Full Name"]);
        // Submitted out of order in the sheet.
        b.add_submission(
            parse_timestamp("2024-06-01 09:00:00"),
            "Jane Doe",
            &["YES"; NUM_QUESTIONS],
        );
        b.add_submission(parse_timestamp("2024-01-01 09:00:00"), "Jane Doe", &first);
        let sheet = resolve(&b.build(), &ColumnLayout::Auto).unwrap();
        let seg = segment(&sheet);
        assert_eq!(seg.labels(), vec!["Block 1", "Block 2"]);
        let m = compare_across_blocks(&rubric, "Jane Doe", &seg.blocks);
        assert_eq!(
            m.rows[0].cells[1].status,
            CellStatus::Scored {
                total: Total::Complete(4.0),
                direction: Some(Direction::Increased)
            }
        );
        assert_eq!(
            m.rows[1].cells[1].status,
            CellStatus::Scored {
                total: Total::Complete(4.0),
                direction: Some(Direction::Unchanged)
            }
        );
    }

    #[test]
    fn rubric_shape_is_checked() {
        let groups: Vec<String> = (1..=9).map(|i| format!("G{}", i)).collect();
        let questions: Vec<String> = (1..=36).map(|i| format!("Q{}", i)).collect();
        assert!(Rubric::new(&groups, &questions, MissingAnswers::Propagate).is_ok());
        assert!(matches!(
            Rubric::new(&groups[..8], &questions, MissingAnswers::Propagate),
            Err(ScoringError::InvalidRubric(_))
        ));
        assert!(matches!(
            Rubric::new(&groups, &questions[1..], MissingAnswers::Propagate),
            Err(ScoringError::InvalidRubric(_))
        ));
        let r = Rubric::new(&groups, &questions, MissingAnswers::CountAsZero).unwrap();
        assert_eq!(r.group_label(GroupId(9)), "G9");
        assert_eq!(r.question_label(QuestionId(36)), "Q36");
        assert!(r.is_safeguarding(QuestionId(30)));
        assert!(!r.is_safeguarding(QuestionId(31)));
    }
}
