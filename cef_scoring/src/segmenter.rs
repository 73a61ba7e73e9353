//! Splitting the submissions into numbered blocks.

use log::{debug, info, warn};
use std::collections::{BTreeMap, HashMap};

use crate::config::*;
use crate::normalizer::normalize_answers;

/// Builds the blocks of a resolved sheet.
pub fn segment(sheet: &ResolvedSheet) -> Segmentation {
    match sheet {
        ResolvedSheet::Single(table) => segment_by_timestamp(table),
        ResolvedSheet::Sections(sections) => segment_sections(sections),
    }
}

/// The n-th submission of every respondent goes in block n.
///
/// Submissions are sorted by time. The submissions without a time come last, and the ties
/// keep the order of the sheet.
pub fn segment_by_timestamp(table: &CanonicalTable) -> Segmentation {
    let mut respondents: Vec<String> = Vec::new();
    let mut by_respondent: HashMap<String, Vec<&CanonicalRow>> = HashMap::new();
    for row in table.rows.iter() {
        by_respondent
            .entry(row.respondent.clone())
            .or_insert_with(|| {
                respondents.push(row.respondent.clone());
                Vec::new()
            })
            .push(row);
    }

    let mut blocks: BTreeMap<u32, Vec<Block>> = BTreeMap::new();
    for respondent in respondents.iter() {
        let mut rows = by_respondent.remove(respondent).unwrap_or_default();
        // sort_by_key is stable
        rows.sort_by_key(|r| (r.timestamp.is_none(), r.timestamp));
        for (idx, row) in rows.iter().enumerate() {
            let sequence = (idx + 1) as u32;
            debug!(
                "segment_by_timestamp: {} row {} -> {}",
                respondent,
                row.source_row,
                block_label(sequence)
            );
            blocks
                .entry(sequence)
                .or_default()
                .push(to_block(row, sequence));
        }
    }

    info!(
        "segment_by_timestamp: {} respondents, {} blocks",
        respondents.len(),
        blocks.len()
    );
    Segmentation {
        blocks: blocks
            .into_iter()
            .map(|(sequence, entries)| BlockTable { sequence, entries })
            .collect(),
        respondents,
    }
}

/// Every section is a block, in the order of the sheet.
///
/// A respondent missing from a section did not complete this block.
pub fn segment_sections(sections: &[CanonicalTable]) -> Segmentation {
    let mut respondents: Vec<String> = Vec::new();
    let mut blocks: Vec<BlockTable> = Vec::new();
    for (idx, section) in sections.iter().enumerate() {
        let sequence = (idx + 1) as u32;
        let mut entries: Vec<Block> = Vec::new();
        for row in section.rows.iter() {
            if entries.iter().any(|b| b.respondent == row.respondent) {
                warn!(
                    "segment_sections: {}: {} appears again at row {}, keeping the first submission",
                    block_label(sequence),
                    row.respondent,
                    row.source_row
                );
                continue;
            }
            if !respondents.contains(&row.respondent) {
                respondents.push(row.respondent.clone());
            }
            entries.push(to_block(row, sequence));
        }
        blocks.push(BlockTable { sequence, entries });
    }
    info!(
        "segment_sections: {} respondents, {} blocks",
        respondents.len(),
        blocks.len()
    );
    Segmentation {
        blocks,
        respondents,
    }
}

fn to_block(row: &CanonicalRow, sequence: u32) -> Block {
    let (scores, unrecognized) = normalize_answers(&row.respondent, &row.answers);
    Block {
        respondent: row.respondent.clone(),
        sequence,
        timestamp: row.timestamp,
        scores,
        unrecognized,
    }
}
