//! Review-effort scoring for a single statement.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static JOIN_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\bJOIN\b",
        r"\bINNER\s+JOIN\b",
        r"\bLEFT\s+JOIN\b",
        r"\bRIGHT\s+JOIN\b",
        r"\bFULL\s+JOIN\b",
        r"\bCROSS\s+JOIN\b",
    ]
    .into_iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static FROM_CLAUSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\bFROM\s+(.*?)(?:\bWHERE\b|\bGROUP\s+BY\b|\bHAVING\b|\bORDER\s+BY\b|\bLIMIT\b|$)")
        .unwrap()
});

static WHERE_CLAUSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\bWHERE\s+(.*?)(?:\bGROUP\s+BY\b|\bHAVING\b|\bORDER\s+BY\b|\bLIMIT\b|$)")
        .unwrap()
});

static AND_OR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(?:AND|OR)\b").unwrap());

static SUBQUERY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(\s*SELECT\b").unwrap());

/// Coarse bucket for a complexity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityLevel {
    /// Score below 30.
    Simple,
    /// Score below 70.
    Moderate,
    /// Score of 70 or more.
    Complex,
}

impl ComplexityLevel {
    /// Buckets a 0..=100 score.
    #[must_use]
    pub const fn from_score(score: u32) -> Self {
        if score < 30 {
            Self::Simple
        } else if score < 70 {
            Self::Moderate
        } else {
            Self::Complex
        }
    }
}

/// Counts and score for one statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplexityReport {
    /// `min(100, 10*tables + 15*joins + 5*conditions + 20*subqueries)`.
    pub complexity_score: u32,
    /// Join keyword occurrences. A qualified join such as `LEFT JOIN` counts
    /// once for `JOIN` and once for `LEFT JOIN`.
    pub join_count: u32,
    /// Comma-separated `FROM` entries plus the join count.
    pub table_count: u32,
    /// Atomic `WHERE` conditions (`AND`/`OR` count + 1), 0 without `WHERE`.
    pub condition_count: u32,
    /// `(SELECT` occurrences.
    pub subquery_count: u32,
    /// Bucket for the score.
    pub complexity_level: ComplexityLevel,
    /// Refactoring hints, only given for scores above 50.
    pub suggestions: Vec<String>,
}

fn count(re: &Regex, text: &str) -> u32 {
    u32::try_from(re.find_iter(text).count()).unwrap_or(u32::MAX)
}

/// Scores a statement. The result depends only on the text.
#[must_use]
pub fn analyze_complexity(sql: &str) -> ComplexityReport {
    let upper = sql.trim().to_uppercase();

    let join_count = JOIN_PATTERNS
        .iter()
        .map(|re| count(re, &upper))
        .fold(0u32, u32::saturating_add);

    let table_count = FROM_CLAUSE_RE.captures(&upper).map_or(0, |caps| {
        let from = caps.get(1).map_or("", |m| m.as_str());
        let commas = u32::try_from(from.matches(',').count()).unwrap_or(u32::MAX);
        commas.saturating_add(1).saturating_add(join_count)
    });

    let condition_count = WHERE_CLAUSE_RE.captures(&upper).map_or(0, |caps| {
        let clause = caps.get(1).map_or("", |m| m.as_str());
        count(&AND_OR_RE, clause).saturating_add(1)
    });

    let subquery_count = count(&SUBQUERY_RE, &upper);

    let weighted = table_count
        .saturating_mul(10)
        .saturating_add(join_count.saturating_mul(15))
        .saturating_add(condition_count.saturating_mul(5))
        .saturating_add(subquery_count.saturating_mul(20));
    let complexity_score = weighted.min(100);

    let mut suggestions = vec![];
    if complexity_score > 50 {
        if join_count > 3 {
            suggestions.push(String::from(
                "the query has many joins; consider splitting it into smaller queries",
            ));
        }
        if subquery_count > 2 {
            suggestions.push(String::from(
                "the query nests several subqueries; consider temporary tables or CTEs",
            ));
        }
        if condition_count > 5 {
            suggestions.push(String::from(
                "the WHERE clause is complex; consider restructuring it or indexing the filtered columns",
            ));
        }
    }

    ComplexityReport {
        complexity_score,
        join_count,
        table_count,
        condition_count,
        subquery_count,
        complexity_level: ComplexityLevel::from_score(complexity_score),
        suggestions,
    }
}
