use std::{fmt::Display, path::Path};

use derive_new::new;
use serde::Deserialize;

use super::DatasetError;

/// The column holding the review text
pub static TEXT_COLUMN: &str = "verified_reviews";

/// The column holding the 0/1 feedback label
pub static LABEL_COLUMN: &str = "feedback";

/// The binary ground-truth sentiment of a review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Feedback {
    /// Label 0
    Negative,

    /// Label 1
    Positive,
}

impl Feedback {
    /// The class id used as the classification target
    pub fn class_id(&self) -> usize {
        match self {
            Feedback::Negative => 0,
            Feedback::Positive => 1,
        }
    }
}

impl TryFrom<i64> for Feedback {
    type Error = i64;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Feedback::Negative),
            1 => Ok(Feedback::Positive),
            other => Err(other),
        }
    }
}

impl Display for Feedback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Feedback::Negative => "negative",
            Feedback::Positive => "positive",
        };

        write!(f, "{} ({})", self.class_id(), name)
    }
}

/// A single labeled product review
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Review {
    /// The review text, coerced to an empty string when absent
    pub text: String,

    /// The ground-truth label
    pub feedback: Feedback,

    /// Number of whitespace-separated tokens in `text`
    pub review_length: usize,
}

impl Review {
    /// Create a review, deriving its length from the text
    pub fn new(text: impl Into<String>, feedback: Feedback) -> Self {
        let text = text.into();
        let review_length = text.split_whitespace().count();

        Self {
            text,
            feedback,
            review_length,
        }
    }
}

/// A raw row as it appears in the file, before validation
#[derive(Debug, Deserialize)]
struct Row {
    #[serde(default)]
    verified_reviews: Option<String>,

    #[serde(default)]
    feedback: Option<String>,
}

impl Row {
    /// Validate the row, returning `None` when the label is missing or not binary
    fn into_review(self) -> Option<Review> {
        let feedback = self
            .feedback
            .as_deref()
            .map(str::trim)
            .and_then(|value| value.parse::<i64>().ok())
            .and_then(|value| Feedback::try_from(value).ok())?;

        Some(Review::new(self.verified_reviews.unwrap_or_default(), feedback))
    }
}

/// Load reviews from a tab-separated file with `verified_reviews` and `feedback` columns.
///
/// Rows with a missing or non-binary label are skipped with a warning. Missing review text is
/// kept as an empty string.
pub async fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Review>> {
    let path = path.as_ref();

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(|e| anyhow!("Unable to open {}: {}", path.display(), e))?;

    let headers = reader.headers()?.clone();
    for column in [TEXT_COLUMN, LABEL_COLUMN] {
        if !headers.iter().any(|header| header == column) {
            return Err(DatasetError::MissingColumn(column.to_string()).into());
        }
    }

    let mut reviews = Vec::new();
    let mut skipped = 0;

    for (index, row) in reader.deserialize::<Row>().enumerate() {
        // Header is line 1
        let line = index + 2;

        match row {
            Ok(row) => match row.into_review() {
                Some(review) => reviews.push(review),
                None => {
                    log::warn!("Skipping line {line}: missing or non-binary {LABEL_COLUMN}");
                    skipped += 1;
                }
            },
            Err(e) => {
                log::warn!("Skipping line {line}: {e}");
                skipped += 1;
            }
        }
    }

    log::info!(
        "Loaded {} reviews from {} ({} skipped)",
        reviews.len(),
        path.display(),
        skipped
    );

    Ok(reviews)
}

/// Per-label row counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, new)]
pub struct ClassCounts {
    /// Rows labeled 0
    pub negative: usize,

    /// Rows labeled 1
    pub positive: usize,
}

impl ClassCounts {
    /// Count the rows of each label
    pub fn of(reviews: &[Review]) -> Self {
        reviews
            .iter()
            .fold(Self::default(), |mut counts, review| {
                match review.feedback {
                    Feedback::Negative => counts.negative += 1,
                    Feedback::Positive => counts.positive += 1,
                }
                counts
            })
    }
}

impl Display for ClassCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "negative: {}, positive: {}", self.negative, self.positive)
    }
}

/// Summary statistics for review lengths
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LengthStats {
    /// Shortest review, in words
    pub min: usize,

    /// Longest review, in words
    pub max: usize,

    /// Mean review length, in words
    pub mean: f64,
}

impl LengthStats {
    /// Summarize review lengths, or `None` for an empty corpus
    pub fn of(reviews: &[Review]) -> Option<Self> {
        let lengths = reviews.iter().map(|review| review.review_length);

        let min = lengths.clone().min()?;
        let max = lengths.clone().max()?;
        let mean = lengths.sum::<usize>() as f64 / reviews.len() as f64;

        Some(Self { min, max, mean })
    }
}
