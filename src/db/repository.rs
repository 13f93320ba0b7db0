// Repository pattern - every database side effect of the civic board
use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row, TransactionBehavior};

use crate::auth::Identity;
use crate::civic::election::{BallotKind, Voter};
use crate::civic::votes::{VoteTally, VoteValue};
use crate::db::models::{Bill, BillSummary, Comment, NewBill, NewVideo, Video};
use crate::error::{AppError, AppResult};
use crate::state::DbPool;

/// Storage operations behind the HTTP handlers.
///
/// One-vote and one-ballot invariants are enforced by uniqueness constraints
/// in the store; implementations must upsert rather than read-then-insert.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Insert a bill and return its id
    async fn create_bill(&self, author: &Identity, bill: &NewBill) -> AppResult<String>;

    /// All bills with live tallies, newest first
    async fn list_bills(&self) -> AppResult<Vec<BillSummary>>;

    async fn get_bill(&self, id: &str) -> AppResult<Option<BillSummary>>;

    /// Bills written by one signed-in user, newest first. Bills posted
    /// anonymously are never included.
    async fn bills_by_user(&self, user_id: &str) -> AppResult<Vec<BillSummary>>;

    /// Record or overwrite `voter`'s vote on a bill and return the new tally.
    /// Fails with `NotFound` if the bill does not exist.
    async fn upsert_vote(
        &self,
        voter: &Identity,
        bill_id: &str,
        value: VoteValue,
    ) -> AppResult<VoteTally>;

    /// Append a comment. Fails with `NotFound` if the bill does not exist.
    async fn add_comment(&self, user_id: &str, bill_id: &str, content: &str)
        -> AppResult<Comment>;

    /// Comments on a bill, newest first
    async fn list_comments(&self, bill_id: &str) -> AppResult<Vec<Comment>>;

    /// Record or overwrite the voter's ballot for one race kind
    async fn upsert_ballot(&self, voter: &Voter, kind: BallotKind, value: &str) -> AppResult<()>;

    /// Ballot counts grouped by value for one race kind
    async fn ballot_counts(&self, kind: BallotKind) -> AppResult<Vec<(String, i64)>>;

    async fn record_video(&self, video: &NewVideo) -> AppResult<Video>;

    /// Uploaded videos, newest first
    async fn list_videos(&self) -> AppResult<Vec<Video>>;
}

/// SQLite implementation
pub struct SqliteRepository {
    pool: DbPool,
}

impl SqliteRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const BILL_COLUMNS: &str = "b.id, b.title, b.text, b.benefit, b.author_id, b.created_at,
    (SELECT COUNT(*) FROM votes v WHERE v.bill_id = b.id AND v.value = 'UP') AS up,
    (SELECT COUNT(*) FROM votes v WHERE v.bill_id = b.id AND v.value = 'DOWN') AS down";

fn bill_summary_from_row(row: &Row<'_>) -> rusqlite::Result<BillSummary> {
    let bill = Bill {
        id: row.get(0)?,
        title: row.get(1)?,
        text: row.get(2)?,
        benefit: row.get(3)?,
        author_id: row.get(4)?,
        created_at: row.get(5)?,
    };
    Ok(BillSummary::new(bill, VoteTally::new(row.get(6)?, row.get(7)?)))
}

fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get(0)?,
        bill_id: row.get(1)?,
        content: row.get(2)?,
        user_id: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn video_from_row(row: &Row<'_>) -> rusqlite::Result<Video> {
    let file_name: String = row.get(3)?;
    Ok(Video {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        url: Video::url_for(&file_name),
        content_type: row.get(4)?,
        size: row.get::<_, i64>(5)? as u64,
        created_at: row.get(6)?,
    })
}

fn bill_exists(conn: &rusqlite::Connection, bill_id: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT COUNT(*) > 0 FROM bills WHERE id = ?1",
        params![bill_id],
        |r| r.get(0),
    )
}

fn tally_for(conn: &rusqlite::Connection, bill_id: &str) -> rusqlite::Result<VoteTally> {
    conn.query_row(
        "SELECT COALESCE(SUM(value = 'UP'), 0), COALESCE(SUM(value = 'DOWN'), 0)
         FROM votes WHERE bill_id = ?1",
        params![bill_id],
        |r| Ok(VoteTally::new(r.get(0)?, r.get(1)?)),
    )
}

#[async_trait]
impl Repository for SqliteRepository {
    async fn create_bill(&self, author: &Identity, bill: &NewBill) -> AppResult<String> {
        let conn = self.pool.get()?;
        let id = uuid::Uuid::now_v7().to_string();

        conn.execute(
            "INSERT INTO bills (id, title, text, benefit, author_kind, author_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![id, bill.title, bill.text, bill.benefit, author.kind(), author.id()],
        )?;

        Ok(id)
    }

    async fn list_bills(&self) -> AppResult<Vec<BillSummary>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {BILL_COLUMNS} FROM bills b ORDER BY b.created_at DESC, b.id DESC"
        ))?;
        let bills = stmt
            .query_map([], bill_summary_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(bills)
    }

    async fn get_bill(&self, id: &str) -> AppResult<Option<BillSummary>> {
        let conn = self.pool.get()?;
        let bill = conn
            .query_row(
                &format!("SELECT {BILL_COLUMNS} FROM bills b WHERE b.id = ?1"),
                params![id],
                bill_summary_from_row,
            )
            .optional()?;
        Ok(bill)
    }

    async fn bills_by_user(&self, user_id: &str) -> AppResult<Vec<BillSummary>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {BILL_COLUMNS} FROM bills b
             WHERE b.author_kind = 'user' AND b.author_id = ?1
             ORDER BY b.created_at DESC, b.id DESC"
        ))?;
        let bills = stmt
            .query_map(params![user_id], bill_summary_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(bills)
    }

    async fn upsert_vote(
        &self,
        voter: &Identity,
        bill_id: &str,
        value: VoteValue,
    ) -> AppResult<VoteTally> {
        let mut conn = self.pool.get()?;
        // IMMEDIATE takes the write lock up front so the recount below sees
        // exactly the state this upsert produced.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if !bill_exists(&tx, bill_id)? {
            return Err(AppError::NotFound);
        }

        tx.execute(
            "INSERT INTO votes (voter_kind, voter_id, bill_id, value) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(voter_kind, voter_id, bill_id) DO UPDATE SET
               value = excluded.value,
               updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
            params![voter.kind(), voter.id(), bill_id, value.as_str()],
        )?;

        let tally = tally_for(&tx, bill_id)?;
        tx.commit()?;

        tracing::debug!(bill_id, %value, up = tally.up, down = tally.down, "vote recorded");
        Ok(tally)
    }

    async fn add_comment(
        &self,
        user_id: &str,
        bill_id: &str,
        content: &str,
    ) -> AppResult<Comment> {
        let conn = self.pool.get()?;

        if !bill_exists(&conn, bill_id)? {
            return Err(AppError::NotFound);
        }

        let id = uuid::Uuid::now_v7().to_string();
        let comment = conn.query_row(
            "INSERT INTO comments (id, bill_id, user_id, content) VALUES (?1, ?2, ?3, ?4)
             RETURNING id, bill_id, content, user_id, created_at",
            params![id, bill_id, user_id, content],
            comment_from_row,
        )?;

        Ok(comment)
    }

    async fn list_comments(&self, bill_id: &str) -> AppResult<Vec<Comment>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, bill_id, content, user_id, created_at
             FROM comments
             WHERE bill_id = ?1
             ORDER BY created_at DESC, id DESC",
        )?;
        let comments = stmt
            .query_map(params![bill_id], comment_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(comments)
    }

    async fn upsert_ballot(&self, voter: &Voter, kind: BallotKind, value: &str) -> AppResult<()> {
        let conn = self.pool.get()?;

        conn.execute(
            "INSERT INTO election_ballots (voter_kind, voter_id, kind, value)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(voter_kind, voter_id, kind) DO UPDATE SET
               value = excluded.value,
               updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
            params![voter.kind(), voter.id(), kind.as_str(), value],
        )?;

        Ok(())
    }

    async fn ballot_counts(&self, kind: BallotKind) -> AppResult<Vec<(String, i64)>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT value, COUNT(*) FROM election_ballots WHERE kind = ?1 GROUP BY value",
        )?;
        let counts = stmt
            .query_map(params![kind.as_str()], |r| Ok((r.get(0)?, r.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(counts)
    }

    async fn record_video(&self, video: &NewVideo) -> AppResult<Video> {
        let conn = self.pool.get()?;
        let id = uuid::Uuid::now_v7().to_string();

        let record = conn.query_row(
            "INSERT INTO videos (id, title, description, file_name, content_type, size, uploader_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id, title, description, file_name, content_type, size, created_at",
            params![
                id,
                video.title,
                video.description,
                video.file_name,
                video.content_type,
                video.size as i64,
                video.uploader_id,
            ],
            video_from_row,
        )?;

        Ok(record)
    }

    async fn list_videos(&self) -> AppResult<Vec<Video>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, title, description, file_name, content_type, size, created_at
             FROM videos
             ORDER BY created_at DESC, id DESC",
        )?;
        let videos = stmt
            .query_map([], video_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(videos)
    }
}
