//! Policy-matching quiz.
//!
//! A voter answers a fixed questionnaire on a five-point scale and is scored
//! against fixed party answer vectors. Per question a party earns
//! `2 - |user - party|` points, so strong disagreement (a gap of 3 or 4)
//! subtracts points. Percentages are therefore not clamped and can reach
//! -100 for a fully opposed profile.

use serde::Serialize;

use super::rounded_percent;

pub const QUESTION_COUNT: usize = 20;

/// Lowest and highest accepted answer.
pub const ANSWER_MIN: i8 = -2;
pub const ANSWER_MAX: i8 = 2;

pub type Answers = [i8; QUESTION_COUNT];

pub const QUESTIONS: [&str; QUESTION_COUNT] = [
    "消費税の引き下げを優先すべきだ。",
    "防衛費の増額に賛成だ。",
    "原発の再稼働を進めるべきだ。",
    "ベーシックインカムを導入すべきだ。",
    "同性婚を法制化すべきだ。",
    "入管・移民の受け入れを拡大すべきだ。",
    "教育無償化（大学含む）を進めるべきだ。",
    "積極的な政府支出（財政出動）に賛成だ。",
    "企業への規制緩和を進めるべきだ。",
    "労働者保護（解雇規制など）を強化すべきだ。",
    "環境税・炭素税の導入/強化に賛成だ。",
    "公共交通や子育て支援などの社会インフラへ投資を増やすべきだ。",
    "憲法9条を含む改憲を進めるべきだ。",
    "富裕層や大企業への課税を強化すべきだ。",
    "消費者保護のために独占禁止法を強化すべきだ。",
    "最低賃金を大幅に引き上げるべきだ。",
    "カーボンニュートラル（2050年目標）を重視すべきだ。",
    "防衛装備の輸出を拡大すべきだ。",
    "緊急事態条項を憲法に明記すべきだ。",
    "地方分権（自治体への権限移譲）を進めるべきだ。",
];

pub const SCALE: [(&str, i8); 5] = [
    ("強く反対", -2),
    ("やや反対", -1),
    ("どちらでもない", 0),
    ("やや賛成", 1),
    ("強く賛成", 2),
];

/// Reference answers per party, in declaration order. Ties in the ranking
/// keep this order.
#[rustfmt::skip]
pub const PARTY_PROFILES: [(&str, Answers); 8] = [
    ("自民党",       [ 0,  2,  1, -2, -2, -1,  0, -1,  1, -1,  0,  0,  2, -1, -1, -1,  0,  2,  2,  1]),
    ("立憲民主党",   [ 1, -1, -2,  1,  2,  1,  2,  2, -1,  2,  2,  2, -2,  2,  2,  2,  2, -2, -2,  1]),
    ("公明党",       [ 0,  1,  0,  0,  1,  0,  1,  1,  0,  1,  1,  1,  0,  1,  1,  1,  1,  0,  1,  1]),
    ("日本維新の会", [ 1,  1,  0,  1,  0,  1,  1,  0,  2, -1,  0,  1,  1,  0,  1,  0,  0,  1,  2,  2]),
    ("国民民主党",   [ 1,  1,  0,  0,  1,  0,  1,  1,  1,  0,  1,  1,  0,  0,  1,  1,  1,  0,  1,  2]),
    ("共産党",       [ 2, -2, -2,  2,  2,  2,  2,  2, -2,  2,  2,  2, -2,  2,  2,  2,  2, -2, -2,  1]),
    ("れいわ新選組", [ 2, -2, -2,  2,  2,  2,  2,  2, -1,  2,  2,  2, -2,  2,  2,  2,  2, -2, -2,  2]),
    ("社民党",       [ 2, -2, -2,  2,  2,  1,  2,  2, -2,  2,  2,  2, -2,  2,  2,  2,  2, -2, -2,  2]),
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidAnswers {
    #[error("expected {expected} answers, got {got}")]
    WrongLength { expected: usize, got: usize },

    #[error("answer {index} is {value}, must be between -2 and 2")]
    OutOfRange { index: usize, value: i64 },
}

/// Validates a raw answer sheet before scoring.
pub fn parse_answers(raw: &[i64]) -> Result<Answers, InvalidAnswers> {
    if raw.len() != QUESTION_COUNT {
        return Err(InvalidAnswers::WrongLength {
            expected: QUESTION_COUNT,
            got: raw.len(),
        });
    }

    let mut answers = [0i8; QUESTION_COUNT];
    for (index, &value) in raw.iter().enumerate() {
        if value < ANSWER_MIN as i64 || value > ANSWER_MAX as i64 {
            return Err(InvalidAnswers::OutOfRange { index, value });
        }
        answers[index] = value as i8;
    }
    Ok(answers)
}

/// Agreement between two answer sheets as a percentage, in `-100..=100`.
pub fn match_percent(user: &Answers, party: &Answers) -> i64 {
    let score: i64 = user
        .iter()
        .zip(party.iter())
        .map(|(&u, &p)| 2 - (u as i64 - p as i64).abs())
        .sum();
    rounded_percent(score, (QUESTION_COUNT * 2) as i64)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartyMatch {
    pub party: &'static str,
    pub percent: i64,
}

/// Scores every party and sorts best match first. The sort is stable, so
/// equal percentages keep the [`PARTY_PROFILES`] declaration order.
pub fn rank_parties(user: &Answers) -> Vec<PartyMatch> {
    let mut results: Vec<PartyMatch> = PARTY_PROFILES
        .iter()
        .map(|(party, profile)| PartyMatch {
            party: *party,
            percent: match_percent(user, profile),
        })
        .collect();
    results.sort_by(|a, b| b.percent.cmp(&a.percent));
    results
}
