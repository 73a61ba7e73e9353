// ********* Input data structures ***********

use chrono::NaiveDateTime;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::Display;
use std::ops::Add;

/// Number of questions in the self-assessment.
pub const NUM_QUESTIONS: usize = 36;
/// Number of competency groups.
pub const NUM_GROUPS: usize = 9;
/// Every group covers this many consecutive questions.
pub const QUESTIONS_PER_GROUP: usize = 4;

/// A cell of an uploaded survey export, before any interpretation.
///
/// The readers (Excel, CSV) only need to produce these cells. All the
/// interpretation of the content is done by the column resolver.
#[derive(PartialEq, Debug, Clone)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
    Timestamp(NaiveDateTime),
}

impl RawCell {
    /// The textual content of the cell, trimmed. Blank text is treated as no content.
    pub fn as_text(&self) -> Option<String> {
        match self {
            RawCell::Empty => None,
            RawCell::Text(s) if s.trim().is_empty() => None,
            RawCell::Text(s) => Some(s.trim().to_string()),
            RawCell::Number(f) if f.fract() == 0.0 => Some(format!("{}", *f as i64)),
            RawCell::Number(f) => Some(f.to_string()),
            RawCell::Timestamp(ts) => Some(ts.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.as_text().is_none()
    }
}

/// A sheet as read from the input file. The first row is expected to be the header.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct RawTable {
    pub rows: Vec<Vec<RawCell>>,
}

impl RawTable {
    pub fn new(rows: Vec<Vec<RawCell>>) -> RawTable {
        RawTable { rows }
    }

    pub fn header(&self) -> Option<&[RawCell]> {
        self.rows.first().map(|r| r.as_slice())
    }

    /// The number of columns of the widest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0)
    }
}

/// Identifier of a question, between 1 and 36.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct QuestionId(pub u32);

impl QuestionId {
    pub fn all() -> impl Iterator<Item = QuestionId> {
        (1..=NUM_QUESTIONS as u32).map(QuestionId)
    }

    /// The group this question belongs to: 4 consecutive questions per group.
    pub fn group(&self) -> GroupId {
        let per_group = QUESTIONS_PER_GROUP as u32;
        GroupId(self.0.saturating_add(per_group - 1) / per_group)
    }

    // Out of range for Q0, so that lookups return nothing.
    pub(crate) fn index(&self) -> usize {
        (self.0 as usize).wrapping_sub(1)
    }
}

impl Display for QuestionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Q{}", self.0)
    }
}

/// Identifier of a competency group, between 1 and 9.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct GroupId(pub u32);

impl GroupId {
    pub fn all() -> impl Iterator<Item = GroupId> {
        (1..=NUM_GROUPS as u32).map(GroupId)
    }

    /// The 4 questions of the group. There is none for an identifier out of range.
    pub fn questions(&self) -> impl Iterator<Item = QuestionId> {
        let per_group = QUESTIONS_PER_GROUP as u32;
        let range = match self.0 {
            g if g == 0 || g > NUM_GROUPS as u32 => 0..0,
            g => (g - 1) * per_group + 1..g * per_group + 1,
        };
        range.map(QuestionId)
    }

    // Out of range for group 0, so that lookups return nothing.
    pub(crate) fn index(&self) -> usize {
        (self.0 as usize).wrapping_sub(1)
    }
}

/// How the question columns of a sheet are located.
#[derive(PartialEq, Debug, Clone)]
pub enum ColumnLayout {
    /// Inspect the sheet and pick one of the strategies below.
    Auto,
    /// Columns are found by looking for "name" and "time" in the header.
    HeaderText,
    /// The sheet contains multiple tables, each starting with a "Full Name" header row.
    StackedSections,
    /// Columns are at fixed positions.
    Positional(PositionalLayout),
}

/// Fixed column positions. All the indexes start at 0.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct PositionalLayout {
    pub name_column: usize,
    pub time_column: Option<usize>,
    /// The 36 question columns are consecutive, starting at this column.
    pub first_question_column: usize,
}

/// One submission, with the question columns renamed Q1..Q36.
#[derive(PartialEq, Debug, Clone)]
pub struct CanonicalRow {
    /// Trimmed, never empty.
    pub respondent: String,
    pub timestamp: Option<NaiveDateTime>,
    /// The 36 raw answers, in question order.
    pub answers: Vec<Option<String>>,
    /// The row number in the sheet (starting at 1, as in spreadsheets).
    pub source_row: usize,
}

#[derive(PartialEq, Debug, Clone)]
pub struct CanonicalTable {
    /// The original headers of the question columns, in question order.
    pub question_headers: Vec<String>,
    pub rows: Vec<CanonicalRow>,
}

/// The outcome of the column resolution.
#[derive(PartialEq, Debug, Clone)]
pub enum ResolvedSheet {
    /// One table, the periods are derived from the submission times.
    Single(CanonicalTable),
    /// One table per period, in the order of the sheet.
    Sections(Vec<CanonicalTable>),
}

// ******** Scores *********

/// A normalized answer: 1.0, 0.5 or 0.0. None if the answer is missing or not recognized.
pub type NormalizedScore = Option<f64>;

/// An answer that could not be understood. This is not an error: the block is simply
/// incomplete for this question.
#[derive(PartialEq, Debug, Clone)]
pub struct UnrecognizedResponseToken {
    pub question: QuestionId,
    pub token: String,
}

/// All the scores of one respondent for one submission.
#[derive(PartialEq, Debug, Clone)]
pub struct Block {
    pub respondent: String,
    /// Starts at 1 for every respondent.
    pub sequence: u32,
    pub timestamp: Option<NaiveDateTime>,
    /// Invariant: 36 elements, in question order.
    pub scores: Vec<NormalizedScore>,
    pub unrecognized: Vec<UnrecognizedResponseToken>,
}

impl Block {
    pub fn score(&self, question: QuestionId) -> NormalizedScore {
        self.scores.get(question.index()).cloned().flatten()
    }

    pub fn is_complete(&self) -> bool {
        self.scores.iter().all(|s| s.is_some())
    }
}

pub fn block_label(sequence: u32) -> String {
    format!("Block {}", sequence)
}

/// All the blocks sharing the same sequence number.
#[derive(PartialEq, Debug, Clone)]
pub struct BlockTable {
    pub sequence: u32,
    pub entries: Vec<Block>,
}

impl BlockTable {
    pub fn label(&self) -> String {
        block_label(self.sequence)
    }

    /// The block of this respondent. If the respondent appears multiple times, the first one is returned.
    pub fn find(&self, respondent: &str) -> Option<&Block> {
        self.entries.iter().find(|b| b.respondent == respondent)
    }
}

/// The block tables of a sheet, ordered by sequence.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Segmentation {
    pub blocks: Vec<BlockTable>,
    /// All the respondents, in the order they first appear in the sheet.
    pub respondents: Vec<String>,
}

impl Segmentation {
    pub fn block(&self, sequence: u32) -> Option<&BlockTable> {
        self.blocks.iter().find(|b| b.sequence == sequence)
    }

    pub fn labels(&self) -> Vec<String> {
        self.blocks.iter().map(|b| b.label()).collect()
    }
}

/// A sum of normalized scores.
///
/// When some of the answers are missing, the sum is incomplete: only the partial sum over the
/// answered questions is known.
#[derive(PartialEq, Debug, Clone, Copy)]
pub enum Total {
    Complete(f64),
    Incomplete { partial: f64, missing: u32 },
}

impl Total {
    pub const ZERO: Total = Total::Complete(0.0);

    /// The definitive value, if all the answers were available.
    pub fn value(&self) -> Option<f64> {
        match self {
            Total::Complete(x) => Some(*x),
            Total::Incomplete { .. } => None,
        }
    }

    pub fn partial(&self) -> f64 {
        match self {
            Total::Complete(x) => *x,
            Total::Incomplete { partial, .. } => *partial,
        }
    }

    pub fn missing(&self) -> u32 {
        match self {
            Total::Complete(_) => 0,
            Total::Incomplete { missing, .. } => *missing,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Total::Complete(_))
    }
}

impl Add for Total {
    type Output = Total;
    fn add(self, rhs: Total) -> Total {
        match (self, rhs) {
            (Total::Complete(a), Total::Complete(b)) => Total::Complete(a + b),
            (a, b) => Total::Incomplete {
                partial: a.partial() + b.partial(),
                missing: a.missing() + b.missing(),
            },
        }
    }
}

impl std::iter::Sum for Total {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Total::ZERO, |acc, t| acc + t)
    }
}

// ******** Output data structures *********

/// Quality tier of a score.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum ColorBand {
    Critical,
    Developing,
    Good,
    Strong,
}

impl ColorBand {
    /// Lower bounds (inclusive) for group scores, from the highest band down.
    pub const GROUP_THRESHOLDS: [(f64, ColorBand); 3] = [
        (3.25, ColorBand::Strong),
        (2.51, ColorBand::Good),
        (1.75, ColorBand::Developing),
    ];

    /// Lower bounds (inclusive) for the score of a single safeguarding question.
    pub const SAFEGUARDING_THRESHOLDS: [(f64, ColorBand); 2] =
        [(1.0, ColorBand::Strong), (0.5, ColorBand::Developing)];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColorBand::Critical => "critical",
            ColorBand::Developing => "developing",
            ColorBand::Good => "good",
            ColorBand::Strong => "strong",
        }
    }
}

/// What a score is measuring, which controls the thresholds of the color bands.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ScoreKind {
    /// The total of a group, between 0 and 4.
    Group,
    /// A single safeguarding question: 0, 0.5 or 1.
    SafeguardingQuestion,
}

#[derive(PartialEq, Debug, Clone)]
pub struct GroupTotal {
    pub group: GroupId,
    pub label: String,
    pub total: Total,
}

impl GroupTotal {
    /// The color band, only defined if the total is complete.
    pub fn band(&self) -> Option<ColorBand> {
        self.total
            .value()
            .map(|x| crate::color_band(x, ScoreKind::Group))
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Direction {
    Increased,
    Decreased,
    Unchanged,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Increased => "increased",
            Direction::Decreased => "decreased",
            Direction::Unchanged => "unchanged",
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub enum CellStatus {
    /// The respondent has no submission in this block.
    NotCompleted,
    /// The direction is computed against the previous block. It is missing if the previous
    /// block was not completed or if one of the totals is incomplete.
    Scored {
        total: Total,
        direction: Option<Direction>,
    },
}

#[derive(PartialEq, Debug, Clone)]
pub struct ComparisonCell {
    pub sequence: u32,
    pub status: CellStatus,
}

#[derive(PartialEq, Debug, Clone)]
pub struct ComparisonRow {
    pub group: GroupId,
    pub label: String,
    /// One cell per block, in sequence order.
    pub cells: Vec<ComparisonCell>,
}

/// Group totals of one respondent across all the blocks.
#[derive(PartialEq, Debug, Clone)]
pub struct ComparisonMatrix {
    pub respondent: String,
    pub sequences: Vec<u32>,
    pub rows: Vec<ComparisonRow>,
}

/// Difference for one group between two selected blocks.
#[derive(PartialEq, Debug, Clone)]
pub struct GroupDelta {
    pub group: GroupId,
    pub label: String,
    pub first: Total,
    pub second: Total,
    /// second - first, if both totals are complete.
    pub delta: Option<f64>,
    pub direction: Option<Direction>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct ActionItem {
    pub question: QuestionId,
    pub label: String,
}

#[derive(PartialEq, Debug, Clone, Default)]
pub struct ActionItems {
    /// Questions answered "Neither YES or NO".
    pub developing: Vec<ActionItem>,
    /// Questions answered "NO".
    pub attention: Vec<ActionItem>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct SafeguardingCell {
    pub question: QuestionId,
    pub label: String,
    pub score: NormalizedScore,
    pub band: Option<ColorBand>,
}

/// Everything that is known about one respondent for one block.
#[derive(PartialEq, Debug, Clone)]
pub struct BlockScores {
    pub respondent: String,
    pub sequence: u32,
    pub groups: Vec<GroupTotal>,
    pub safeguarding_total: Total,
    pub safeguarding: Vec<SafeguardingCell>,
    pub block_total: Total,
    pub action_items: ActionItems,
    pub unrecognized: Vec<UnrecognizedResponseToken>,
}

impl BlockScores {
    pub fn label(&self) -> String {
        block_label(self.sequence)
    }
}

// ********* Errors **********

/// The column that could not be located in the sheet.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum MissingColumn {
    Header,
    Name,
    Timestamp,
    Questions { found: usize },
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SchemaDetectionError {
    pub missing: MissingColumn,
    /// For stacked sheets, the section (starting at 1) in which the column is missing.
    pub section: Option<usize>,
}

impl SchemaDetectionError {
    pub fn new(missing: MissingColumn) -> SchemaDetectionError {
        SchemaDetectionError {
            missing,
            section: None,
        }
    }
}

impl Error for SchemaDetectionError {}

impl Display for SchemaDetectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let what = match &self.missing {
            MissingColumn::Header => "header row not found".to_string(),
            MissingColumn::Name => "respondent name column not found".to_string(),
            MissingColumn::Timestamp => "timestamp column not found".to_string(),
            MissingColumn::Questions { found } => format!(
                "expected {} question columns, found {}",
                NUM_QUESTIONS, found
            ),
        };
        match self.section {
            Some(s) => write!(f, "{} (section {})", what, s),
            None => write!(f, "{}", what),
        }
    }
}

/// Errors that prevent the scoring from completing.
#[derive(PartialEq, Debug, Clone)]
pub enum ScoringError {
    /// The sheet does not have the expected columns. The file cannot be used.
    SchemaDetection(SchemaDetectionError),
    /// The respondent did not complete this block.
    RespondentNotFoundInBlock { respondent: String, block: u32 },
    InvalidRubric(String),
}

impl Error for ScoringError {}

impl Display for ScoringError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoringError::SchemaDetection(e) => write!(f, "Could not read the survey: {}", e),
            ScoringError::RespondentNotFoundInBlock { respondent, block } => {
                write!(f, "{} did not complete {}", respondent, block_label(*block))
            }
            ScoringError::InvalidRubric(msg) => write!(f, "Invalid rubric: {}", msg),
        }
    }
}

impl From<SchemaDetectionError> for ScoringError {
    fn from(e: SchemaDetectionError) -> ScoringError {
        ScoringError::SchemaDetection(e)
    }
}

// ********* Configuration **********

/// How the unanswered (or unrecognized) questions are accounted for in the totals.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum MissingAnswers {
    /// A total that includes a missing answer is incomplete.
    Propagate,
    /// Missing answers count as "NO".
    CountAsZero,
}

/// The labels of the rubric and the scoring policy.
///
/// Built once and passed to all the scoring functions.
#[derive(PartialEq, Debug, Clone)]
pub struct Rubric {
    group_labels: Vec<String>,
    question_labels: Vec<String>,
    safeguarding: BTreeSet<QuestionId>,
    missing_answers: MissingAnswers,
}

impl Rubric {
    pub const SAFEGUARDING_QUESTIONS: [u32; 5] = [20, 22, 30, 33, 34];

    /// Safeguarding questions scored at or below this value need attention.
    pub const SAFEGUARDING_ATTENTION_THRESHOLD: f64 = 0.5;

    pub fn new(
        group_labels: &[String],
        question_labels: &[String],
        missing_answers: MissingAnswers,
    ) -> Result<Rubric, ScoringError> {
        if group_labels.len() != NUM_GROUPS {
            return Err(ScoringError::InvalidRubric(format!(
                "expected {} group labels, got {}",
                NUM_GROUPS,
                group_labels.len()
            )));
        }
        if question_labels.len() != NUM_QUESTIONS {
            return Err(ScoringError::InvalidRubric(format!(
                "expected {} question labels, got {}",
                NUM_QUESTIONS,
                question_labels.len()
            )));
        }
        Ok(Rubric {
            group_labels: group_labels.to_vec(),
            question_labels: question_labels.to_vec(),
            safeguarding: Rubric::SAFEGUARDING_QUESTIONS
                .iter()
                .map(|q| QuestionId(*q))
                .collect(),
            missing_answers,
        })
    }

    pub fn with_missing_answers(self, missing_answers: MissingAnswers) -> Rubric {
        Rubric {
            missing_answers,
            ..self
        }
    }

    pub fn group_label(&self, group: GroupId) -> &str {
        self.group_labels
            .get(group.index())
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    pub fn question_label(&self, question: QuestionId) -> &str {
        self.question_labels
            .get(question.index())
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    pub fn group_labels(&self) -> &[String] {
        &self.group_labels
    }

    /// The safeguarding questions, in increasing order.
    pub fn safeguarding(&self) -> impl Iterator<Item = QuestionId> + '_ {
        self.safeguarding.iter().cloned()
    }

    pub fn is_safeguarding(&self, question: QuestionId) -> bool {
        self.safeguarding.contains(&question)
    }

    pub fn missing_answers(&self) -> MissingAnswers {
        self.missing_answers
    }

    /// The score of a question once the missing answer policy is applied.
    ///
    /// All the totals and the per-question views read the scores through this function.
    pub fn effective_score(&self, block: &Block, question: QuestionId) -> NormalizedScore {
        match (block.score(question), self.missing_answers) {
            (None, MissingAnswers::CountAsZero) => Some(0.0),
            (x, _) => x,
        }
    }
}

const DEFAULT_GROUP_LABELS: [&str; NUM_GROUPS] = [
    "Planning & Preparation",
    "Session Delivery",
    "Communication",
    "Player Development",
    "Learning Environment",
    "Relationships & Welfare",
    "Reflective Practice",
    "Professional Conduct",
    "Safeguarding & Duty of Care",
];

const DEFAULT_QUESTION_LABELS: [&str; NUM_QUESTIONS] = [
    // Planning & Preparation
    "I plan every session with clear objectives",
    "I adapt my plans to the age and stage of the players",
    "I prepare equipment and resources before the session",
    "I link my sessions to a longer-term programme",
    // Session Delivery
    "I give clear and concise demonstrations",
    "I keep players active for most of the session",
    "I adjust activities when they are too easy or too hard",
    "I end sessions with a review of the objectives",
    // Communication
    "I use positive language with players",
    "I check that players understood my instructions",
    "I ask questions instead of only giving answers",
    "I communicate regularly with parents and carers",
    // Player Development
    "I give individual feedback to each player",
    "I set development goals with my players",
    "I track the progress of my players over the season",
    "I give every player fair playing time",
    // Learning Environment
    "I create an environment where mistakes are accepted",
    "I include players of all abilities",
    "I encourage players to take ownership of their learning",
    "I check that the playing area and equipment are safe before every session",
    // Relationships & Welfare
    "I know each player's needs and circumstances",
    "I know who the club welfare officer is and how to contact them",
    "I build trusting relationships with players",
    "I work well with the other coaches and volunteers",
    // Reflective Practice
    "I reflect on my sessions after delivering them",
    "I ask for feedback from other coaches",
    "I take part in coach development opportunities",
    "I try new ideas and approaches in my sessions",
    // Professional Conduct
    "I arrive on time and prepared",
    "My safeguarding training and background check are up to date",
    "I am a positive role model on and off the field",
    "I treat officials, opponents and parents with respect",
    // Safeguarding & Duty of Care
    "I know how to report a safeguarding concern",
    "I follow the club's code of conduct when communicating with young players",
    "I know the emergency and first aid procedures of the venue",
    "I keep player information confidential and secure",
];

impl Default for Rubric {
    fn default() -> Self {
        let groups: Vec<String> = DEFAULT_GROUP_LABELS.iter().map(|s| s.to_string()).collect();
        let questions: Vec<String> = DEFAULT_QUESTION_LABELS
            .iter()
            .map(|s| s.to_string())
            .collect();
        Rubric {
            group_labels: groups,
            question_labels: questions,
            safeguarding: Rubric::SAFEGUARDING_QUESTIONS
                .iter()
                .map(|q| QuestionId(*q))
                .collect(),
            missing_answers: MissingAnswers::Propagate,
        }
    }
}
