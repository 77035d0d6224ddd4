/// Poll, option, and vote models with vote tallying
///
/// # Invariants
///
/// - At most one vote per (poll, user), enforced by the UNIQUE constraint
///   on the votes table; a duplicate vote surfaces as an error and leaves
///   tallies unchanged.
/// - `vote_count` on each option equals the number of vote rows referencing
///   it. The vote insert and the counter increment run in one transaction,
///   so the invariant holds under concurrent voters.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE polls (
///     poll_id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(200) NOT NULL,
///     description TEXT,
///     created_by UUID REFERENCES users(user_id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     end_date DATE,
///     status VARCHAR(20) NOT NULL DEFAULT 'active'
///         CHECK (status IN ('active', 'closed'))
/// );
///
/// CREATE TABLE poll_options (
///     option_id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     poll_id UUID NOT NULL REFERENCES polls(poll_id) ON DELETE CASCADE,
///     option_text VARCHAR(200) NOT NULL,
///     vote_count INTEGER NOT NULL DEFAULT 0,
///     position INTEGER NOT NULL
/// );
///
/// CREATE TABLE votes (
///     vote_id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     poll_id UUID NOT NULL REFERENCES polls(poll_id) ON DELETE CASCADE,
///     option_id UUID NOT NULL REFERENCES poll_options(option_id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
///     voted_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (poll_id, user_id)
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Positions that receive a podium rank in results
const PODIUM_SIZE: usize = 3;

/// Poll status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PollStatus {
    /// Accepting votes
    Active,

    /// Closed, no further votes
    Closed,
}

impl PollStatus {
    /// Converts status to its database string
    pub fn as_str(&self) -> &'static str {
        match self {
            PollStatus::Active => "active",
            PollStatus::Closed => "closed",
        }
    }
}

/// Error type for poll operations
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    /// Fewer than two distinct non-blank options after trimming
    #[error("A poll needs at least 2 distinct options")]
    NotEnoughOptions,

    /// Poll does not exist
    #[error("Poll not found")]
    PollNotFound,

    /// Poll is closed, no further votes accepted
    #[error("Poll is closed")]
    PollClosed,

    /// User has already voted in this poll
    #[error("User has already voted in this poll")]
    AlreadyVoted,

    /// Option does not belong to the poll (or does not exist)
    #[error("Option does not belong to this poll")]
    OptionMismatch,

    /// Underlying database error
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for PollError {
    fn from(err: sqlx::Error) -> Self {
        // The (poll_id, user_id) unique constraint is the double-vote guard
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return PollError::AlreadyVoted;
            }
        }
        PollError::Database(err)
    }
}

/// Poll model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Poll {
    /// Unique poll ID
    pub poll_id: Uuid,

    /// Question being polled
    pub title: String,

    /// Longer description
    pub description: Option<String>,

    /// Admin who created the poll
    pub created_by: Option<Uuid>,

    /// When the poll was created
    pub created_at: DateTime<Utc>,

    /// Intended last day of voting (informational)
    pub end_date: Option<NaiveDate>,

    /// Whether the poll accepts votes
    pub status: PollStatus,
}

/// Poll option with its denormalized tally
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PollOption {
    /// Unique option ID
    pub option_id: Uuid,

    /// Poll this option belongs to
    pub poll_id: Uuid,

    /// Option text
    pub option_text: String,

    /// Denormalized vote tally
    pub vote_count: i32,

    /// Creation order within the poll, the tie-break for results
    pub position: i32,
}

/// A cast vote
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Vote {
    /// Unique vote ID
    pub vote_id: Uuid,

    /// Poll voted in
    pub poll_id: Uuid,

    /// Option chosen
    pub option_id: Uuid,

    /// Voter
    pub user_id: Uuid,

    /// When the vote was cast
    pub voted_at: DateTime<Utc>,
}

/// Input for creating a poll
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePoll {
    /// Question being polled
    pub title: String,

    /// Longer description
    pub description: Option<String>,

    /// Intended last day of voting
    pub end_date: Option<NaiveDate>,

    /// Option texts; at least 2 distinct non-blank entries after trimming
    pub options: Vec<String>,

    /// Admin creating the poll
    pub created_by: Option<Uuid>,
}

/// One option's standing in the results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionResult {
    /// Option ID
    pub option_id: Uuid,

    /// Option text
    pub option_text: String,

    /// Votes received
    pub vote_count: i32,

    /// Share of the total, 0.0 when no votes were cast at all
    pub percentage: f64,

    /// Podium rank (1-3); None for 4th place and beyond
    pub rank: Option<u8>,
}

/// Ranked results for a poll
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollResults {
    /// Poll these results belong to
    pub poll_id: Uuid,

    /// Sum of all option tallies
    pub total_votes: i64,

    /// Options ordered by vote count descending, creation order on ties
    pub options: Vec<OptionResult>,
}

/// Trims, drops blanks, and deduplicates option texts preserving order
///
/// # Errors
///
/// Returns [`PollError::NotEnoughOptions`] when fewer than two distinct
/// options survive.
pub fn normalize_options(raw: &[String]) -> Result<Vec<String>, PollError> {
    let mut seen = std::collections::HashSet::new();
    let options: Vec<String> = raw
        .iter()
        .map(|o| o.trim())
        .filter(|o| !o.is_empty())
        .filter(|o| seen.insert(o.to_string()))
        .map(str::to_string)
        .collect();

    if options.len() < 2 {
        return Err(PollError::NotEnoughOptions);
    }

    Ok(options)
}

/// Ranks a poll's options into [`PollResults`]
///
/// Options are sorted by vote count descending with creation order as the
/// explicit tie-break. Percentages are against the total; a poll with zero
/// votes yields 0.0% for every option rather than a division error. The
/// first three positions get podium ranks.
pub fn rank_options(poll_id: Uuid, mut options: Vec<PollOption>) -> PollResults {
    options.sort_by(|a, b| {
        b.vote_count
            .cmp(&a.vote_count)
            .then(a.position.cmp(&b.position))
    });

    let total_votes: i64 = options.iter().map(|o| i64::from(o.vote_count)).sum();

    let options = options
        .into_iter()
        .enumerate()
        .map(|(i, o)| OptionResult {
            option_id: o.option_id,
            option_text: o.option_text,
            vote_count: o.vote_count,
            percentage: if total_votes == 0 {
                0.0
            } else {
                f64::from(o.vote_count) / total_votes as f64 * 100.0
            },
            rank: if i < PODIUM_SIZE {
                Some(i as u8 + 1)
            } else {
                None
            },
        })
        .collect();

    PollResults {
        poll_id,
        total_votes,
        options,
    }
}

impl Poll {
    /// Creates a poll with its options in one transaction
    ///
    /// Requires at least 2 distinct non-blank options after trimming.
    /// Options start at a zero tally; their creation order is recorded as
    /// the results tie-break.
    pub async fn create(pool: &PgPool, data: CreatePoll) -> Result<Self, PollError> {
        let options = normalize_options(&data.options)?;

        let mut tx = pool.begin().await?;

        let poll = sqlx::query_as::<_, Poll>(
            r#"
            INSERT INTO polls (title, description, end_date, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.end_date)
        .bind(data.created_by)
        .fetch_one(&mut *tx)
        .await?;

        for (position, option_text) in options.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO poll_options (poll_id, option_text, position)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(poll.poll_id)
            .bind(option_text)
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(poll)
    }

    /// Finds a poll by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Poll>("SELECT * FROM polls WHERE poll_id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists polls, optionally filtered by status, newest first
    pub async fn list(pool: &PgPool, status: Option<PollStatus>) -> Result<Vec<Self>, sqlx::Error> {
        match status {
            Some(status) => {
                sqlx::query_as::<_, Poll>(
                    "SELECT * FROM polls WHERE status = $1 ORDER BY created_at DESC",
                )
                .bind(status)
                .fetch_all(pool)
                .await
            }
            None => {
                sqlx::query_as::<_, Poll>("SELECT * FROM polls ORDER BY created_at DESC")
                    .fetch_all(pool)
                    .await
            }
        }
    }

    /// Lists a poll's options in creation order
    pub async fn options(pool: &PgPool, poll_id: Uuid) -> Result<Vec<PollOption>, sqlx::Error> {
        sqlx::query_as::<_, PollOption>(
            "SELECT * FROM poll_options WHERE poll_id = $1 ORDER BY position",
        )
        .bind(poll_id)
        .fetch_all(pool)
        .await
    }

    /// Casts a vote
    ///
    /// The vote insert and the tally increment run in one transaction so
    /// `vote_count` never drifts from the vote rows. A duplicate
    /// (poll, user) pair hits the unique constraint, rolls everything
    /// back, and surfaces as [`PollError::AlreadyVoted`].
    ///
    /// # Errors
    ///
    /// - [`PollError::PollNotFound`] — no such poll
    /// - [`PollError::PollClosed`] — poll no longer accepts votes
    /// - [`PollError::AlreadyVoted`] — user already voted in this poll
    /// - [`PollError::OptionMismatch`] — option not part of this poll
    pub async fn cast_vote(
        pool: &PgPool,
        poll_id: Uuid,
        user_id: Uuid,
        option_id: Uuid,
    ) -> Result<Vote, PollError> {
        let mut tx = pool.begin().await?;

        let status: Option<PollStatus> =
            sqlx::query_scalar("SELECT status FROM polls WHERE poll_id = $1")
                .bind(poll_id)
                .fetch_optional(&mut *tx)
                .await?;

        match status {
            None => return Err(PollError::PollNotFound),
            Some(PollStatus::Closed) => return Err(PollError::PollClosed),
            Some(PollStatus::Active) => {}
        }

        let vote = sqlx::query_as::<_, Vote>(
            r#"
            INSERT INTO votes (poll_id, option_id, user_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(poll_id)
        .bind(option_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let updated = sqlx::query(
            r#"
            UPDATE poll_options
            SET vote_count = vote_count + 1
            WHERE option_id = $1 AND poll_id = $2
            "#,
        )
        .bind(option_id)
        .bind(poll_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            // Dropping the transaction rolls the vote insert back
            return Err(PollError::OptionMismatch);
        }

        tx.commit().await?;

        Ok(vote)
    }

    /// Checks whether a user has voted in a poll
    pub async fn has_voted(
        pool: &PgPool,
        poll_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM votes WHERE poll_id = $1 AND user_id = $2)",
        )
        .bind(poll_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Closes a poll
    ///
    /// One-way: a closed poll never reopens. Returns the updated poll, or
    /// `None` if the poll doesn't exist or was already closed.
    pub async fn close(pool: &PgPool, poll_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Poll>(
            r#"
            UPDATE polls
            SET status = 'closed'
            WHERE poll_id = $1 AND status = 'active'
            RETURNING *
            "#,
        )
        .bind(poll_id)
        .fetch_optional(pool)
        .await
    }

    /// Computes ranked results for a poll
    ///
    /// # Errors
    ///
    /// Returns [`PollError::PollNotFound`] if the poll doesn't exist.
    pub async fn results(pool: &PgPool, poll_id: Uuid) -> Result<PollResults, PollError> {
        if Self::find_by_id(pool, poll_id).await?.is_none() {
            return Err(PollError::PollNotFound);
        }

        let options = Self::options(pool, poll_id).await?;
        Ok(rank_options(poll_id, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(text: &str, votes: i32, position: i32) -> PollOption {
        PollOption {
            option_id: Uuid::new_v4(),
            poll_id: Uuid::new_v4(),
            option_text: text.to_string(),
            vote_count: votes,
            position,
        }
    }

    #[test]
    fn test_normalize_options_trims_and_dedupes() {
        let raw = vec![
            "  Allow ".to_string(),
            "Disallow".to_string(),
            "Allow".to_string(),
            "   ".to_string(),
        ];

        let options = normalize_options(&raw).unwrap();
        assert_eq!(options, vec!["Allow", "Disallow"]);
    }

    #[test]
    fn test_normalize_options_requires_two() {
        assert!(matches!(
            normalize_options(&["Only one".to_string()]),
            Err(PollError::NotEnoughOptions)
        ));

        // Duplicates collapse below the minimum
        assert!(matches!(
            normalize_options(&["Same".to_string(), " Same ".to_string()]),
            Err(PollError::NotEnoughOptions)
        ));

        assert!(matches!(
            normalize_options(&[]),
            Err(PollError::NotEnoughOptions)
        ));
    }

    #[test]
    fn test_rank_options_even_split() {
        // "Pet Policy" with two voters, one for each option
        let poll_id = Uuid::new_v4();
        let results = rank_options(
            poll_id,
            vec![option("Allow", 1, 0), option("Disallow", 1, 1)],
        );

        assert_eq!(results.total_votes, 2);
        assert_eq!(results.options.len(), 2);
        for result in &results.options {
            assert!((result.percentage - 50.0).abs() < f64::EPSILON);
        }
        // Tie broken by creation order
        assert_eq!(results.options[0].option_text, "Allow");
        assert_eq!(results.options[1].option_text, "Disallow");
    }

    #[test]
    fn test_rank_options_orders_by_votes() {
        let results = rank_options(
            Uuid::new_v4(),
            vec![
                option("Third", 1, 0),
                option("First", 10, 1),
                option("Second", 5, 2),
            ],
        );

        let texts: Vec<&str> = results
            .options
            .iter()
            .map(|o| o.option_text.as_str())
            .collect();
        assert_eq!(texts, vec!["First", "Second", "Third"]);
        assert_eq!(results.total_votes, 16);
    }

    #[test]
    fn test_rank_options_podium() {
        let results = rank_options(
            Uuid::new_v4(),
            vec![
                option("A", 8, 0),
                option("B", 6, 1),
                option("C", 4, 2),
                option("D", 2, 3),
            ],
        );

        let ranks: Vec<Option<u8>> = results.options.iter().map(|o| o.rank).collect();
        // Top three ranked, fourth and beyond unranked
        assert_eq!(ranks, vec![Some(1), Some(2), Some(3), None]);
    }

    #[test]
    fn test_rank_options_zero_votes() {
        let results = rank_options(
            Uuid::new_v4(),
            vec![option("A", 0, 0), option("B", 0, 1)],
        );

        assert_eq!(results.total_votes, 0);
        for result in &results.options {
            // 0%, not a division error
            assert_eq!(result.percentage, 0.0);
        }
    }

    #[test]
    fn test_rank_options_tie_break_is_creation_order() {
        let results = rank_options(
            Uuid::new_v4(),
            vec![
                option("Later", 3, 5),
                option("Earlier", 3, 1),
                option("Winner", 4, 7),
            ],
        );

        let texts: Vec<&str> = results
            .options
            .iter()
            .map(|o| o.option_text.as_str())
            .collect();
        assert_eq!(texts, vec!["Winner", "Earlier", "Later"]);
    }

    #[test]
    fn test_status_as_str() {
        assert_eq!(PollStatus::Active.as_str(), "active");
        assert_eq!(PollStatus::Closed.as_str(), "closed");
    }
}
