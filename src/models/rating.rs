use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single star score. Only values 1..=5 can be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Score(u8);

impl Score {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn value(self) -> u8 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidScore(pub i64);

impl fmt::Display for InvalidScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "score must be between {} and {}, got {}",
            Score::MIN,
            Score::MAX,
            self.0
        )
    }
}

impl std::error::Error for InvalidScore {}

impl TryFrom<u8> for Score {
    type Error = InvalidScore;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidScore(value as i64))
        }
    }
}

impl TryFrom<i64> for Score {
    type Error = InvalidScore;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .map_err(|_| InvalidScore(value))
            .and_then(Score::try_from)
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> Self {
        score.0
    }
}

impl FromStr for Score {
    type Err = InvalidScore;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s.trim().parse().map_err(|_| InvalidScore(0))?;
        Score::try_from(value)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Denormalized `(avg, count)` pair cached on a product record.
///
/// `avg` is zero exactly when `count` is zero; otherwise it is the mean of all
/// cast scores.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RatingStats {
    pub avg: f64,
    pub count: u32,
}

impl RatingStats {
    /// Builds stats from wire values, clamping impossible combinations.
    pub fn new(avg: f64, count: u32) -> Self {
        if count == 0 || !avg.is_finite() {
            return Self::default();
        }
        Self { avg, count }
    }

    /// Stats after a voter who never rated this product casts `score`.
    pub fn with_new_vote(self, score: Score) -> Self {
        let count = self.count + 1;
        let avg = (self.avg * self.count as f64 + score.value() as f64) / count as f64;
        Self { avg, count }
    }

    /// Stats after an existing voter moves from `old` to `new`.
    ///
    /// Falls back to [`RatingStats::with_new_vote`] when the cached count is
    /// zero, which only happens if the aggregate drifted from the vote records.
    pub fn with_changed_vote(self, old: Score, new: Score) -> Self {
        if self.count == 0 {
            return self.with_new_vote(new);
        }
        if old == new {
            return self;
        }
        let total = self.avg * self.count as f64 - old.value() as f64 + new.value() as f64;
        Self {
            avg: total / self.count as f64,
            count: self.count,
        }
    }
}

impl fmt::Display for RatingStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.count == 1 { "vote" } else { "votes" };
        write!(f, "{:.1} ({} {})", self.avg, self.count, noun)
    }
}

/// One user's vote on one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub id: String,
    pub score: Score,
    pub product_id: Option<String>,
    pub user_id: Option<String>,
}
