//! Plain-text rendering of storefront data for the terminal.

use std::fmt::Write as _;

use crate::models::{Comment, Product, RatingStats, Score};

/// Five stars, the first `floor(value)` filled.
pub fn stars(value: f64) -> String {
    let filled = if value.is_finite() {
        value.floor().clamp(0.0, 5.0) as usize
    } else {
        0
    };
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

/// Stars follow the user's own vote when there is one, the average otherwise.
pub fn rating_line(stats: RatingStats, user_score: Option<Score>) -> String {
    let shown = user_score.map_or(stats.avg, |s| f64::from(s.value()));
    match user_score {
        Some(score) => format!("{} {}  your vote: {}", stars(shown), stats, score),
        None => format!("{} {}", stars(shown), stats),
    }
}

pub fn product_row(product: &Product) -> String {
    let category = product.category.map_or("-", |c| c.label());
    format!(
        "{:<32} {:<10} {:<13} {:>10}  {}  [{}]",
        product.name,
        category,
        product.kind_label(),
        product.display_price(),
        stars(product.rating.avg),
        product.slug.as_deref().unwrap_or(&product.id),
    )
}

pub fn product_detail(product: &Product, user_score: Option<Score>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", product.name);
    let _ = writeln!(
        out,
        "{} · {} · {}",
        product.kind_label(),
        product.category.map_or("Uncategorized", |c| c.label()),
        product.display_price()
    );
    let _ = writeln!(out, "{}", rating_line(product.rating, user_score));
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", product.description);
    if let Some(long) = product.long_description.as_deref() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", long);
    }
    if !product.features.is_empty() {
        let _ = writeln!(out);
        for feature in &product.features {
            let _ = writeln!(out, "  • {}", feature.text);
        }
    }
    let _ = write!(out, "\nImage: {}", product.image);
    out
}

pub fn comment_block(comment: &Comment) -> String {
    format!(
        "[{}] {} · {}\n    {}",
        comment.author.initial(),
        comment.author.username,
        comment.created_at.format("%Y-%m-%d"),
        comment.content.replace('\n', "\n    ")
    )
}

/// Hint printed under a partially loaded feed.
pub fn feed_footer(shown: usize, has_more: bool) -> String {
    if has_more {
        format!("Showing {}. More available, raise --pages to load them.", shown)
    } else {
        format!("Showing all {}.", shown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CommentAuthor;
    use chrono::{TimeZone, Utc};

    #[test]
    fn stars_floor_the_average() {
        assert_eq!(stars(4.333), "★★★★☆");
        assert_eq!(stars(0.0), "☆☆☆☆☆");
        assert_eq!(stars(5.0), "★★★★★");
        assert_eq!(stars(f64::NAN), "☆☆☆☆☆");
    }

    #[test]
    fn own_vote_drives_the_stars() {
        let stats = RatingStats::new(4.333, 3);
        let line = rating_line(stats, Some(Score::try_from(2u8).unwrap()));
        assert!(line.starts_with("★★☆☆☆"));
        assert!(line.contains("4.3 (3 votes)"));
        assert!(line.contains("your vote: 2"));
    }

    #[test]
    fn comment_shows_initial_and_date() {
        let comment = Comment {
            id: "1".into(),
            content: "Hi-diddly-ho".into(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap(),
            author: CommentAuthor {
                username: "ned".into(),
                avatar: None,
            },
        };
        assert_eq!(comment_block(&comment), "[N] ned · 2024-03-09\n    Hi-diddly-ho");
    }

    #[test]
    fn footer_mentions_remaining() {
        assert!(feed_footer(5, true).contains("More available"));
        assert_eq!(feed_footer(12, false), "Showing all 12.");
    }
}
