use chrono::NaiveDateTime;

pub use crate::config::*;

/// A builder for survey sheets.
///
/// It is mostly useful for testing, or when the submissions do not come from a
/// spreadsheet.
///
/// ```
/// use cef_scoring::builder::TableBuilder;
/// use cef_scoring::view::{compute, Selection};
/// use cef_scoring::{ColumnLayout, Rubric, NUM_QUESTIONS};
///
/// let mut builder = TableBuilder::new().survey_header(&["Timestamp", "Full Name"]);
/// builder.add_submission(None, "Jane Doe", &["YES"; NUM_QUESTIONS]);
///
/// let view = compute(
///     &builder.build(),
///     &Rubric::default(),
///     &ColumnLayout::Auto,
///     &Selection::default(),
/// )?;
/// assert_eq!(view.respondents, vec!["Jane Doe".to_string()]);
/// # Ok::<(), cef_scoring::ScoringError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct TableBuilder {
    pub(crate) rows: Vec<Vec<RawCell>>,
}

impl TableBuilder {
    pub fn new() -> TableBuilder {
        TableBuilder { rows: Vec::new() }
    }

    /// Adds a header row with the given names.
    pub fn header(self, names: &[&str]) -> TableBuilder {
        let mut rows = self.rows;
        rows.push(text_cells(names));
        TableBuilder { rows }
    }

    /// Adds a header row: the given metadata columns followed by Q1..Q36.
    pub fn survey_header(self, metadata: &[&str]) -> TableBuilder {
        let mut b = self;
        b.add_section_header(metadata);
        b
    }

    /// Adds a header row in the middle of the sheet. Use "Full Name" as a metadata column
    /// to start a new section.
    pub fn add_section_header(&mut self, metadata: &[&str]) {
        let mut row = text_cells(metadata);
        row.extend(QuestionId::all().map(|q| RawCell::Text(q.to_string())));
        self.rows.push(row);
    }

    pub fn add_row(&mut self, cells: Vec<RawCell>) {
        self.rows.push(cells);
    }

    /// Adds a row of text cells. Empty strings are empty cells.
    pub fn add_text_row(&mut self, cells: &[&str]) {
        self.rows.push(text_cells(cells));
    }

    /// Adds a submission for a sheet that starts with a time and a name column.
    pub fn add_submission(
        &mut self,
        timestamp: Option<NaiveDateTime>,
        respondent: &str,
        answers: &[&str],
    ) {
        let mut row = vec![
            timestamp.map(RawCell::Timestamp).unwrap_or(RawCell::Empty),
            RawCell::Text(respondent.to_string()),
        ];
        row.extend(text_cells(answers));
        self.rows.push(row);
    }

    pub fn build(&self) -> RawTable {
        RawTable::new(self.rows.clone())
    }
}

fn text_cells(cells: &[&str]) -> Vec<RawCell> {
    cells
        .iter()
        .map(|s| {
            if s.is_empty() {
                RawCell::Empty
            } else {
                RawCell::Text(s.to_string())
            }
        })
        .collect()
}
