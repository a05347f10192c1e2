use crate::models::{InvalidScore, Score};
use serde::{Deserialize, Serialize};
use serde_valid::Validate;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Validate)]
pub struct Vote {
    #[validate(minimum = 1)]
    #[validate(maximum = 5)]
    pub score: u8,
}

impl Vote {
    pub fn score(&self) -> Result<Score, InvalidScore> {
        Score::try_from(self.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vote_range_is_enforced() {
        assert!(Vote { score: 0 }.validate().is_err());
        assert!(Vote { score: 6 }.validate().is_err());
        let vote = Vote { score: 4 };
        assert!(vote.validate().is_ok());
        assert_eq!(vote.score().unwrap().value(), 4);
    }
}
