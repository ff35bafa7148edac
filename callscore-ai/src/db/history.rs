//! Transcript history paired with scores

use callscore_common::db::TranscriptWithScore;
use callscore_common::Result;
use futures::future::try_join_all;
use sqlx::SqlitePool;

use super::{scores, transcripts};

/// Newest-first transcripts of a meeting with their scores
///
/// Score lookups run concurrently; `try_join_all` yields results in input
/// order, so each score stays with its transcript.
pub async fn recent_with_scores(
    db: &SqlitePool,
    meeting_id: &str,
    limit: u32,
) -> Result<Vec<TranscriptWithScore>> {
    let transcripts = transcripts::recent_for_meeting(db, meeting_id, limit).await?;

    let lookups = transcripts
        .iter()
        .map(|transcript| scores::find_by_transcript(db, &transcript.id));
    let found = try_join_all(lookups).await?;

    Ok(transcripts
        .into_iter()
        .zip(found)
        .map(|(transcript, score)| TranscriptWithScore { transcript, score })
        .collect())
}
