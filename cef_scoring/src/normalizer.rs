//! Conversion of the raw answers into scores.

use log::{debug, warn};

use crate::config::*;

/// The answers recognized in the survey exports. They are case-sensitive.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum ResponseToken {
    Yes,
    Neither,
    No,
}

impl ResponseToken {
    pub const YES: &'static str = "YES";
    pub const NEITHER: &'static str = "Neither YES or NO";
    pub const NO: &'static str = "NO";

    pub fn parse(raw: &str) -> Option<ResponseToken> {
        match raw.trim() {
            ResponseToken::YES => Some(ResponseToken::Yes),
            ResponseToken::NEITHER => Some(ResponseToken::Neither),
            ResponseToken::NO => Some(ResponseToken::No),
            _ => None,
        }
    }

    pub fn value(&self) -> f64 {
        match self {
            ResponseToken::Yes => 1.0,
            ResponseToken::Neither => 0.5,
            ResponseToken::No => 0.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseToken::Yes => ResponseToken::YES,
            ResponseToken::Neither => ResponseToken::NEITHER,
            ResponseToken::No => ResponseToken::NO,
        }
    }
}

/// The score of a single answer. Anything else than the three recognized answers is absent.
pub fn normalize(raw: &str) -> NormalizedScore {
    ResponseToken::parse(raw).map(|t| t.value())
}

/// Normalizes the 36 answers of a submission.
///
/// Returns the scores and the answers that were filled in but not understood.
pub fn normalize_answers(
    respondent: &str,
    answers: &[Option<String>],
) -> (Vec<NormalizedScore>, Vec<UnrecognizedResponseToken>) {
    let mut scores: Vec<NormalizedScore> = Vec::with_capacity(NUM_QUESTIONS);
    let mut unrecognized: Vec<UnrecognizedResponseToken> = Vec::new();
    for question in QuestionId::all() {
        let raw = answers.get(question.index()).cloned().flatten();
        let score = match raw {
            Some(s) if s.trim().is_empty() => None,
            Some(s) => {
                let score = normalize(&s);
                if score.is_none() {
                    warn!(
                        "normalize_answers: {}: unrecognized answer {:?} for {}",
                        respondent, s, question
                    );
                    unrecognized.push(UnrecognizedResponseToken {
                        question,
                        token: s.clone(),
                    });
                }
                score
            }
            None => None,
        };
        scores.push(score);
    }
    debug!("normalize_answers: {}: {:?}", respondent, scores);
    (scores, unrecognized)
}
