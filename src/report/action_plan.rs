//! The action plan of one respondent for one block, as a plain text document.

use cef_scoring::{unresolved_safeguarding, BlockScores, ColorBand, Rubric, Total};

const GRID_COLUMNS: usize = 3;

fn total_text(total: &Total) -> String {
    match total {
        Total::Complete(x) => format!("{:.2}", x),
        Total::Incomplete { partial, missing } => {
            format!("{:.2} ({} missing)", partial, missing)
        }
    }
}

fn band_text(band: Option<ColorBand>) -> String {
    match band {
        Some(b) => format!("[{}]", b.as_str()),
        None => "[incomplete]".to_string(),
    }
}

fn score_text(score: Option<f64>) -> &'static str {
    match score {
        Some(x) if x >= 1.0 => "YES",
        Some(x) if x > 0.0 => "Neither YES or NO",
        Some(_) => "NO",
        None => "no answer",
    }
}

fn title_block(text: &str, underline: char) -> String {
    let line: String = std::iter::repeat(underline).take(text.chars().count()).collect();
    format!("{}\n{}\n", text, line)
}

// Rows of cells, each cell is two lines: the label and the value.
fn grid(cells: &[(String, String)]) -> String {
    let width = cells
        .iter()
        .flat_map(|(a, b)| [a.chars().count(), b.chars().count()])
        .max()
        .unwrap_or(0);
    let separator = format!(
        "+{}\n",
        std::iter::repeat(format!("{}+", "-".repeat(width + 2)))
            .take(GRID_COLUMNS)
            .collect::<String>()
    );
    let mut res = separator.clone();
    for chunk in cells.chunks(GRID_COLUMNS) {
        for line in 0..2 {
            res.push('|');
            for idx in 0..GRID_COLUMNS {
                let text = chunk
                    .get(idx)
                    .map(|(a, b)| if line == 0 { a.as_str() } else { b.as_str() })
                    .unwrap_or("");
                res.push_str(&format!(" {:<width$} |", text, width = width));
            }
            res.push('\n');
        }
        res.push_str(&separator);
    }
    res
}

pub fn render_action_plan(title: &str, rubric: &Rubric, scores: &BlockScores) -> String {
    let mut res = String::new();
    res.push_str(&title_block(&format!("{}: Action Plan", title), '='));
    res.push('\n');
    res.push_str(&format!("Coach:  {}\n", scores.respondent));
    res.push_str(&format!("Period: {}\n", scores.label()));
    res.push_str(&format!("Total:  {}\n\n", total_text(&scores.block_total)));

    res.push_str(&title_block("Competency groups", '-'));
    let group_cells: Vec<(String, String)> = scores
        .groups
        .iter()
        .map(|g| {
            (
                g.label.clone(),
                format!("{} {}", total_text(&g.total), band_text(g.band())),
            )
        })
        .collect();
    res.push_str(&grid(&group_cells));
    res.push('\n');

    res.push_str(&title_block(
        &format!(
            "Safeguarding: {}",
            total_text(&scores.safeguarding_total)
        ),
        '-',
    ));
    for cell in scores.safeguarding.iter() {
        res.push_str(&format!(
            "{:>4} {:<18} {:<14} {}\n",
            cell.question.to_string(),
            score_text(cell.score),
            band_text(cell.band),
            cell.label
        ));
    }
    res.push('\n');

    let unresolved = unresolved_safeguarding(&scores.safeguarding);
    if !unresolved.is_empty() {
        res.push_str(&title_block("Safeguarding items to resolve", '-'));
        for cell in unresolved.iter() {
            res.push_str(&format!("[ ] {} {}\n", cell.question, cell.label));
        }
        res.push('\n');
    }

    res.push_str(&title_block("Needs attention", '-'));
    if scores.action_items.attention.is_empty() {
        res.push_str("Nothing to report\n");
    }
    for item in scores.action_items.attention.iter() {
        res.push_str(&format!("[ ] {} {}\n", item.question, item.label));
    }
    res.push('\n');

    res.push_str(&title_block("Developing", '-'));
    if scores.action_items.developing.is_empty() {
        res.push_str("Nothing to report\n");
    }
    for item in scores.action_items.developing.iter() {
        res.push_str(&format!("[ ] {} {}\n", item.question, item.label));
    }

    if !scores.unrecognized.is_empty() {
        res.push('\n');
        res.push_str(&title_block("Answers that could not be scored", '-'));
        for u in scores.unrecognized.iter() {
            res.push_str(&format!(
                "{} {:?} ({})\n",
                u.question,
                u.token,
                rubric.question_label(u.question)
            ));
        }
    }
    res
}
