use crate::report::*;

use serde::{Deserialize, Serialize};
use std::fs;

use cef_scoring::{ColumnLayout, MissingAnswers, PositionalLayout, QuestionId, Rubric};

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "reportName")]
    pub report_name: Option<String>,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "generateActionPlans")]
    pub generate_action_plans: Option<bool>,
}

/// The configuration as it is written in the summary.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub report: String,
    pub input: String,
    pub layout: String,
    #[serde(rename = "missingAnswers")]
    pub missing_answers: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct InputSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    pub layout: Option<String>,
    #[serde(rename = "nameColumnIndex")]
    pub name_column_index: Option<JSValue>,
    #[serde(rename = "timeColumnIndex")]
    pub time_column_index: Option<JSValue>,
    #[serde(rename = "firstQuestionColumnIndex")]
    pub first_question_column_index: Option<JSValue>,
}

impl InputSource {
    pub fn column_layout(&self) -> ReportResult<ColumnLayout> {
        match self.layout.as_deref().unwrap_or("auto") {
            "auto" => Ok(ColumnLayout::Auto),
            "headerText" => Ok(ColumnLayout::HeaderText),
            "stackedSections" => Ok(ColumnLayout::StackedSections),
            "positional" => {
                let name_column = match &self.name_column_index {
                    Some(x) => read_js_int(x)?,
                    None => whatever!("the positional layout requires nameColumnIndex"),
                };
                let first_question_column = match &self.first_question_column_index {
                    Some(x) => read_js_int(x)?,
                    None => whatever!("the positional layout requires firstQuestionColumnIndex"),
                };
                let time_column = match &self.time_column_index {
                    Some(x) => Some(read_js_int(x)?),
                    None => None,
                };
                Ok(ColumnLayout::Positional(PositionalLayout {
                    name_column,
                    time_column,
                    first_question_column,
                }))
            }
            x => whatever!("unknown layout: {}", x),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RubricSettings {
    #[serde(rename = "groupLabels")]
    pub group_labels: Option<Vec<String>>,
    #[serde(rename = "questionLabels")]
    pub question_labels: Option<Vec<String>>,
    #[serde(rename = "missingAnswers")]
    pub missing_answers: Option<String>,
}

impl RubricSettings {
    pub fn rubric(&self) -> ReportResult<Rubric> {
        let default_rubric = Rubric::default();
        let groups = match &self.group_labels {
            Some(l) => l.clone(),
            None => default_rubric.group_labels().to_vec(),
        };
        let questions = match &self.question_labels {
            Some(l) => l.clone(),
            None => QuestionId::all()
                .map(|q| default_rubric.question_label(q).to_string())
                .collect(),
        };
        let missing = match self.missing_answers.as_deref() {
            None | Some("propagate") => MissingAnswers::Propagate,
            Some("countAsZero") => MissingAnswers::CountAsZero,
            Some(x) => whatever!("unknown missing answers policy: {}", x),
        };
        Rubric::new(&groups, &questions, missing).context(ScoringSnafu)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: Option<OutputSettings>,
    #[serde(rename = "inputSource")]
    pub input_source: InputSource,
    pub rubric: Option<RubricSettings>,
}

impl ReportConfig {
    /// The configuration when only an input file is given.
    pub fn from_input(path: &str) -> ReportConfig {
        ReportConfig {
            output_settings: None,
            input_source: InputSource {
                provider: input_type_from_path(path).unwrap_or_else(|| "csv".to_string()),
                file_path: path.to_string(),
                excel_worksheet_name: None,
                layout: None,
                name_column_index: None,
                time_column_index: None,
                first_question_column_index: None,
            },
            rubric: None,
        }
    }
}

pub fn read_config(path: &str) -> ReportResult<ReportConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: ReportConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(config)
}

pub fn read_summary(path: &str) -> ReportResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

// Column indexes start at 1, or are spreadsheet letters. Returns the index starting at 0.
fn read_js_int(x: &JSValue) -> ReportResult<usize> {
    let res = match x {
        JSValue::Number(n) => n.as_u64().map(|x| x as usize),
        // Parsing the Excel-style columns
        JSValue::String(s) if !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic()) => Some(
            s.to_ascii_lowercase()
                .chars()
                .fold(0, |acc, c| acc * 26 + (c as usize) - ('a' as usize) + 1),
        ),
        JSValue::String(s) => s.trim().parse::<usize>().ok(),
        _ => None,
    };
    match res {
        Some(n) if n >= 1 => Ok(n - 1),
        _ => ParsingColumnIndexSnafu {
            value: x.to_string(),
        }
        .fail(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_indexes() {
        assert_eq!(read_js_int(&json!(1)).unwrap(), 0);
        assert_eq!(read_js_int(&json!("3")).unwrap(), 2);
        assert_eq!(read_js_int(&json!("A")).unwrap(), 0);
        assert_eq!(read_js_int(&json!("c")).unwrap(), 2);
        assert_eq!(read_js_int(&json!("AA")).unwrap(), 26);
        assert_eq!(read_js_int(&json!("AN")).unwrap(), 39);
        assert!(read_js_int(&json!(0)).is_err());
        assert!(read_js_int(&json!("")).is_err());
        assert!(read_js_int(&json!("A1")).is_err());
        assert!(read_js_int(&json!(null)).is_err());
    }

    #[test]
    fn positional_layout() {
        let js = json!({
            "provider": "csv",
            "filePath": "survey.csv",
            "layout": "positional",
            "nameColumnIndex": "B",
            "firstQuestionColumnIndex": 3
        });
        let source: InputSource = serde_json::from_value(js).unwrap();
        assert_eq!(
            source.column_layout().unwrap(),
            ColumnLayout::Positional(PositionalLayout {
                name_column: 1,
                time_column: None,
                first_question_column: 2,
            })
        );
    }

    #[test]
    fn bad_layouts() {
        let mut source = ReportConfig::from_input("survey.xlsx").input_source;
        assert_eq!(source.provider, "xlsx");
        assert_eq!(source.column_layout().unwrap(), ColumnLayout::Auto);
        source.layout = Some("positional".to_string());
        assert!(source.column_layout().is_err());
        source.layout = Some("diagonal".to_string());
        assert!(source.column_layout().is_err());
    }

    #[test]
    fn rubric_settings() {
        let settings = RubricSettings {
            group_labels: None,
            question_labels: None,
            missing_answers: Some("countAsZero".to_string()),
        };
        let rubric = settings.rubric().unwrap();
        assert_eq!(rubric.missing_answers(), MissingAnswers::CountAsZero);
        assert_eq!(rubric.group_labels(), Rubric::default().group_labels());

        let too_short = RubricSettings {
            group_labels: Some(vec!["Only one".to_string()]),
            question_labels: None,
            missing_answers: None,
        };
        assert!(matches!(
            too_short.rubric(),
            Err(ReportError::Scoring {
                source: ScoringError::InvalidRubric(_)
            })
        ));
    }
}
