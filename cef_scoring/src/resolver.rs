//! Locating the respondent, timestamp and question columns in a survey sheet.
//!
//! The survey exports do not always have the same shape. Three strategies are
//! supported, see [`ColumnLayout`].

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::{debug, info, warn};

use crate::config::*;

/// The literal header that starts a new period in stacked sheets.
pub const SECTION_HEADER: &str = "Full Name";

pub trait ColumnResolver {
    fn resolve(&self, table: &RawTable) -> Result<ResolvedSheet, SchemaDetectionError>;
}

/// Columns at fixed positions.
pub struct PositionalResolver {
    pub layout: PositionalLayout,
}

/// Columns found by their header text.
pub struct HeaderTextResolver;

/// Multiple tables stacked in the same sheet, each with its own "Full Name" header row.
pub struct StackedSectionResolver;

/// Resolves the columns of the sheet with the given layout.
pub fn resolve(table: &RawTable, layout: &ColumnLayout) -> Result<ResolvedSheet, ScoringError> {
    let concrete = match layout {
        ColumnLayout::Auto => detect_layout(table),
        x => x.clone(),
    };
    info!("resolve: layout: {:?} (requested {:?})", concrete, layout);
    let res = match concrete {
        ColumnLayout::Positional(layout) => PositionalResolver { layout }.resolve(table),
        ColumnLayout::StackedSections => StackedSectionResolver.resolve(table),
        ColumnLayout::HeaderText | ColumnLayout::Auto => HeaderTextResolver.resolve(table),
    }?;
    Ok(res)
}

/// Picks a strategy by looking at the content of the sheet.
///
/// Sheets in which the "Full Name" header appears more than once, or below the first row,
/// are stacked sections. Everything else is read through the header text.
pub fn detect_layout(table: &RawTable) -> ColumnLayout {
    let section_headers: Vec<usize> = table
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| is_section_header(row))
        .map(|(idx, _)| idx)
        .collect();
    debug!("detect_layout: section headers: {:?}", section_headers);
    // A single section is stacked when it does not start on the first row.
    let stacked = match section_headers.as_slice() {
        [] => false,
        [first] => *first > 0,
        _ => true,
    };
    if stacked {
        ColumnLayout::StackedSections
    } else {
        ColumnLayout::HeaderText
    }
}

impl ColumnResolver for PositionalResolver {
    fn resolve(&self, table: &RawTable) -> Result<ResolvedSheet, SchemaDetectionError> {
        let header = table
            .header()
            .ok_or_else(|| SchemaDetectionError::new(MissingColumn::Header))?;
        let width = table.width();
        let l = self.layout;
        if l.name_column >= width {
            return Err(SchemaDetectionError::new(MissingColumn::Name));
        }
        if let Some(tc) = l.time_column {
            if tc >= width {
                return Err(SchemaDetectionError::new(MissingColumn::Timestamp));
            }
        }
        let available = width.saturating_sub(l.first_question_column);
        if available < NUM_QUESTIONS {
            return Err(SchemaDetectionError::new(MissingColumn::Questions {
                found: available,
            }));
        }
        let columns = ColumnMap {
            name: l.name_column,
            time: l.time_column,
            questions: (l.first_question_column..l.first_question_column + NUM_QUESTIONS)
                .collect(),
        };
        Ok(ResolvedSheet::Single(canonical_table(
            header,
            &table.rows[1..],
            2,
            &columns,
        )))
    }
}

impl ColumnResolver for HeaderTextResolver {
    fn resolve(&self, table: &RawTable) -> Result<ResolvedSheet, SchemaDetectionError> {
        let header = table
            .header()
            .ok_or_else(|| SchemaDetectionError::new(MissingColumn::Header))?;
        let columns = map_by_header(header, true).map_err(SchemaDetectionError::new)?;
        Ok(ResolvedSheet::Single(canonical_table(
            header,
            &table.rows[1..],
            2,
            &columns,
        )))
    }
}

impl ColumnResolver for StackedSectionResolver {
    fn resolve(&self, table: &RawTable) -> Result<ResolvedSheet, SchemaDetectionError> {
        let header_rows: Vec<usize> = table
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| is_section_header(row))
            .map(|(idx, _)| idx)
            .collect();
        debug!("StackedSectionResolver: header rows: {:?}", header_rows);
        if header_rows.is_empty() {
            return Err(SchemaDetectionError::new(MissingColumn::Header));
        }
        if let Some(first) = header_rows.first() {
            if *first > 0 {
                debug!(
                    "StackedSectionResolver: ignoring {} rows before the first section",
                    first
                );
            }
        }

        let mut sections: Vec<CanonicalTable> = Vec::new();
        for (section_idx, start) in header_rows.iter().enumerate() {
            let end = header_rows
                .get(section_idx + 1)
                .cloned()
                .unwrap_or(table.rows.len());
            let header = &table.rows[*start];
            let columns = map_by_header(header, false).map_err(|missing| SchemaDetectionError {
                missing,
                section: Some(section_idx + 1),
            })?;
            let section = canonical_table(header, &table.rows[start + 1..end], start + 2, &columns);
            info!(
                "StackedSectionResolver: section {}: {} rows",
                section_idx + 1,
                section.rows.len()
            );
            sections.push(section);
        }
        Ok(ResolvedSheet::Sections(sections))
    }
}

struct ColumnMap {
    name: usize,
    time: Option<usize>,
    questions: Vec<usize>,
}

fn is_section_header(row: &[RawCell]) -> bool {
    row.iter().any(|c| match c.as_text() {
        Some(s) => s.eq_ignore_ascii_case(SECTION_HEADER),
        None => false,
    })
}

fn is_metadata_header(text: &str) -> bool {
    text.contains("name") || text.contains("time") || text.contains("email") || text == "id"
}

// The metadata columns are the leading headers with "name", "time", "email" or "id". The name
// and the time are looked up among them only, the questions are the 36 columns that follow.
fn map_by_header(header: &[RawCell], require_time: bool) -> Result<ColumnMap, MissingColumn> {
    let texts: Vec<String> = header
        .iter()
        .map(|c| c.as_text().unwrap_or_default().to_lowercase())
        .collect();
    debug!("map_by_header: header: {:?}", texts);

    let width = texts.len();
    let num_metadata = texts.iter().take_while(|t| is_metadata_header(t)).count();
    let name = texts[..num_metadata]
        .iter()
        .position(|t| t.contains("name") && !t.contains("email"))
        .ok_or(MissingColumn::Name)?;

    // A question header may also mention a name or a time.
    let start = if num_metadata + NUM_QUESTIONS > width {
        (name + 1).max(width.saturating_sub(NUM_QUESTIONS))
    } else {
        num_metadata
    };
    let time = texts[..start]
        .iter()
        .position(|t| t.contains("time") && !t.contains("email"));
    if require_time && time.is_none() {
        return Err(MissingColumn::Timestamp);
    }

    let available = width.saturating_sub(start);
    if available < NUM_QUESTIONS {
        return Err(MissingColumn::Questions { found: available });
    }
    debug!(
        "map_by_header: name: {} time: {:?} questions start: {}",
        name, time, start
    );
    Ok(ColumnMap {
        name,
        time,
        questions: (start..start + NUM_QUESTIONS).collect(),
    })
}

fn canonical_table(
    header: &[RawCell],
    rows: &[Vec<RawCell>],
    first_row_number: usize,
    columns: &ColumnMap,
) -> CanonicalTable {
    let question_headers: Vec<String> = columns
        .questions
        .iter()
        .zip(QuestionId::all())
        .map(|(idx, q)| {
            header
                .get(*idx)
                .and_then(|c| c.as_text())
                .unwrap_or_else(|| q.to_string())
        })
        .collect();

    let mut res: Vec<CanonicalRow> = Vec::new();
    for (idx, row) in rows.iter().enumerate() {
        let source_row = first_row_number + idx;
        if row.iter().all(|c| c.is_empty()) {
            continue;
        }
        let respondent = match row.get(columns.name).and_then(|c| c.as_text()) {
            Some(s) => s,
            None => {
                warn!(
                    "canonical_table: row {}: no respondent name, skipping",
                    source_row
                );
                continue;
            }
        };
        let timestamp = columns
            .time
            .and_then(|tc| row.get(tc))
            .and_then(cell_timestamp);
        if columns.time.is_some() && timestamp.is_none() {
            warn!(
                "canonical_table: row {}: could not read the timestamp of {}",
                source_row, respondent
            );
        }
        let answers: Vec<Option<String>> = columns
            .questions
            .iter()
            .map(|qc| row.get(*qc).and_then(|c| c.as_text()))
            .collect();
        debug!(
            "canonical_table: row {}: {} {:?}",
            source_row, respondent, timestamp
        );
        res.push(CanonicalRow {
            respondent,
            timestamp,
            answers,
            source_row,
        });
    }
    CanonicalTable {
        question_headers,
        rows: res,
    }
}

fn cell_timestamp(cell: &RawCell) -> Option<NaiveDateTime> {
    match cell {
        RawCell::Timestamp(ts) => Some(*ts),
        RawCell::Text(s) => parse_timestamp(s),
        _ => None,
    }
}

const TIMESTAMP_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%y %H:%M",
];

/// Reads the timestamps found in the exports of the common forms tools.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    for fmt in TIMESTAMP_FORMATS.iter() {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TableBuilder;

    fn text(s: &str) -> RawCell {
        RawCell::Text(s.to_string())
    }

    fn all_yes() -> Vec<&'static str> {
        vec!["YES"; NUM_QUESTIONS]
    }

    #[test]
    fn header_text_google_forms() {
        let mut b = TableBuilder::new().survey_header(&["Timestamp", "Email Address", "Full Name"]);
        b.add_text_row(
            &[
                vec!["2024-01-05 10:00:00", "jane@example.com", " Jane Doe "],
                all_yes(),
            ]
            .concat(),
        );
        let sheet = resolve(&b.build(), &ColumnLayout::Auto).unwrap();
        let table = match sheet {
            ResolvedSheet::Single(t) => t,
            x => panic!("unexpected {:?}", x),
        };
        assert_eq!(table.question_headers.len(), NUM_QUESTIONS);
        assert_eq!(table.question_headers[0], "Q1");
        assert_eq!(table.rows.len(), 1);
        let row = &table.rows[0];
        assert_eq!(row.respondent, "Jane Doe");
        assert_eq!(row.source_row, 2);
        assert_eq!(row.timestamp, parse_timestamp("2024-01-05 10:00:00"));
        assert_eq!(row.answers.len(), NUM_QUESTIONS);
        assert!(row.answers.iter().all(|a| a.as_deref() == Some("YES")));
    }

    #[test]
    fn header_text_skips_trailing_metadata() {
        // Microsoft Forms layout
        let b = TableBuilder::new().survey_header(&[
            "ID",
            "Start time",
            "Completion time",
            "Email",
            "Name",
            "Last modified time",
        ]);
        let table = match HeaderTextResolver.resolve(&b.build()).unwrap() {
            ResolvedSheet::Single(t) => t,
            x => panic!("unexpected {:?}", x),
        };
        assert_eq!(table.question_headers[0], "Q1");
        assert_eq!(table.question_headers[35], "Q36");
    }

    #[test]
    fn header_text_missing_columns() {
        let b = TableBuilder::new().survey_header(&["Timestamp", "Email Address"]);
        let err = HeaderTextResolver.resolve(&b.build()).unwrap_err();
        assert_eq!(err.missing, MissingColumn::Name);

        let b = TableBuilder::new().survey_header(&["Full Name"]);
        let err = HeaderTextResolver.resolve(&b.build()).unwrap_err();
        assert_eq!(err.missing, MissingColumn::Timestamp);

        let mut cells = vec!["Timestamp", "Full Name"];
        cells.extend(vec!["question"; 30]);
        let b = TableBuilder::new().header(&cells);
        let err = HeaderTextResolver.resolve(&b.build()).unwrap_err();
        assert_eq!(err.missing, MissingColumn::Questions { found: 30 });

        let err = resolve(&RawTable::default(), &ColumnLayout::Auto).unwrap_err();
        assert_eq!(
            err,
            ScoringError::SchemaDetection(SchemaDetectionError::new(MissingColumn::Header))
        );
    }

    #[test]
    fn positional_layout() {
        let mut b = TableBuilder::new().header(&["a", "b", "c"]);
        b.add_text_row(&[vec!["x", "Jane Doe"], all_yes()].concat());
        let layout = PositionalLayout {
            name_column: 1,
            time_column: None,
            first_question_column: 2,
        };
        let table = match resolve(&b.build(), &ColumnLayout::Positional(layout)).unwrap() {
            ResolvedSheet::Single(t) => t,
            x => panic!("unexpected {:?}", x),
        };
        assert_eq!(table.rows[0].respondent, "Jane Doe");
        assert_eq!(table.rows[0].timestamp, None);
        assert_eq!(table.question_headers[0], "c");
        assert_eq!(table.question_headers[1], "Q2");

        let too_far = PositionalLayout {
            name_column: 1,
            time_column: None,
            first_question_column: 3,
        };
        let err = PositionalResolver { layout: too_far }
            .resolve(&b.build())
            .unwrap_err();
        assert_eq!(err.missing, MissingColumn::Questions { found: 35 });
    }

    #[test]
    fn stacked_sections() {
        let mut b = TableBuilder::new();
        b.add_row(vec![text("CEF self assessment 2024")]);
        b.add_section_header(&["Full Name"]);
        b.add_text_row(&[vec!["Jane Doe"], all_yes()].concat());
        b.add_text_row(&[vec!["John Smith"], all_yes()].concat());
        b.add_row(vec![]);
        b.add_section_header(&["Full Name"]);
        b.add_text_row(&[vec!["John Smith"], all_yes()].concat());
        let table = b.build();
        assert_eq!(detect_layout(&table), ColumnLayout::StackedSections);
        let sections = match resolve(&table, &ColumnLayout::Auto).unwrap() {
            ResolvedSheet::Sections(s) => s,
            x => panic!("unexpected {:?}", x),
        };
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].rows.len(), 2);
        assert_eq!(sections[1].rows.len(), 1);
        assert_eq!(sections[1].rows[0].respondent, "John Smith");
        assert_eq!(sections[1].rows[0].source_row, 7);
    }

    #[test]
    fn question_headers_mentioning_names_and_times() {
        // Q16 mentions the playing time and Q29 arriving on time.
        let rubric = Rubric::default();
        let mut header = vec!["Full Name"];
        header.extend(QuestionId::all().map(|q| rubric.question_label(q)));
        let mut b = TableBuilder::new();
        b.add_text_row(&header);
        b.add_text_row(&[vec!["Jane Doe"], all_yes()].concat());
        b.add_text_row(&header);
        b.add_text_row(&[vec!["Jane Doe"], all_yes()].concat());
        let sections = match resolve(&b.build(), &ColumnLayout::Auto).unwrap() {
            ResolvedSheet::Sections(s) => s,
            x => panic!("unexpected {:?}", x),
        };
        assert_eq!(sections.len(), 2);
        for section in sections.iter() {
            assert_eq!(section.question_headers[0], rubric.question_label(QuestionId(1)));
            assert_eq!(section.question_headers[28], rubric.question_label(QuestionId(29)));
            assert_eq!(section.rows[0].timestamp, None);
            assert!(section.rows[0]
                .answers
                .iter()
                .all(|a| a.as_deref() == Some("YES")));
        }
    }

    #[test]
    fn first_question_mentions_time() {
        let others: Vec<String> = (2..=NUM_QUESTIONS).map(|i| format!("Question {}", i)).collect();
        let mut header = vec!["Timestamp", "Full Name", "I arrive on time"];
        header.extend(others.iter().map(|s| s.as_str()));
        let mut b = TableBuilder::new().header(&header);
        b.add_text_row(&[vec!["2024-01-05 10:00:00", "Jane Doe"], all_yes()].concat());
        let table = match resolve(&b.build(), &ColumnLayout::Auto).unwrap() {
            ResolvedSheet::Single(t) => t,
            x => panic!("unexpected {:?}", x),
        };
        assert_eq!(table.question_headers[0], "I arrive on time");
        assert_eq!(table.question_headers[35], "Question 36");
        assert_eq!(table.rows[0].respondent, "Jane Doe");
        assert_eq!(table.rows[0].timestamp, parse_timestamp("2024-01-05 10:00:00"));
        assert_eq!(table.rows[0].answers.len(), NUM_QUESTIONS);
    }

    #[test]
    fn single_section_below_a_title() {
        let mut b = TableBuilder::new();
        b.add_row(vec![text("CEF self assessment, autumn")]);
        b.add_section_header(&["Full Name"]);
        b.add_text_row(&[vec!["Jane Doe"], all_yes()].concat());
        let table = b.build();
        assert_eq!(detect_layout(&table), ColumnLayout::StackedSections);
        let sections = match resolve(&table, &ColumnLayout::Auto).unwrap() {
            ResolvedSheet::Sections(s) => s,
            x => panic!("unexpected {:?}", x),
        };
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].rows[0].respondent, "Jane Doe");

        // A single header on the first row is a plain table.
        let b = TableBuilder::new().survey_header(&["Timestamp", "Full Name"]);
        assert_eq!(detect_layout(&b.build()), ColumnLayout::HeaderText);
    }

    #[test]
    fn stacked_section_missing_questions() {
        let mut b = TableBuilder::new();
        b.add_section_header(&["Full Name"]);
        b.add_text_row(&[vec!["Jane Doe"], all_yes()].concat());
        b.add_text_row(&["Full Name", "Q1", "Q2"]);
        let err = StackedSectionResolver.resolve(&b.build()).unwrap_err();
        assert_eq!(err.missing, MissingColumn::Questions { found: 2 });
        assert_eq!(err.section, Some(2));
    }

    #[test]
    fn rows_without_name_are_skipped() {
        let mut b = TableBuilder::new().survey_header(&["Timestamp", "Full Name"]);
        b.add_text_row(&[vec!["2024-01-05 10:00:00", "  "], all_yes()].concat());
        b.add_text_row(&[vec!["2024-01-05 10:00:00", "Jane Doe"], all_yes()].concat());
        let table = match HeaderTextResolver.resolve(&b.build()).unwrap() {
            ResolvedSheet::Single(t) => t,
            x => panic!("unexpected {:?}", x),
        };
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].source_row, 3);
    }

    #[test]
    fn timestamps() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2024-03-01 09:30:00"), Some(expected));
        assert_eq!(parse_timestamp("3/1/2024 09:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T09:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("not a date"), None);
        assert_eq!(parse_timestamp(""), None);
    }
}
