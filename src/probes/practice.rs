//! Practice mode endpoints: stats, history and saving a result.
//!
//! All three treat 404 as a missing feature rather than tolerating it.

use anyhow::Result;

use super::{expect_implemented, ProbeContext, ProbeError};
use crate::client::ProbeResponse;

pub fn stats_path(user_id: &str) -> String {
    format!("/api/practice/{}/stats", user_id)
}

pub fn history_path(user_id: &str) -> String {
    format!("/api/practice/{}/history", user_id)
}

pub fn save_path(user_id: &str) -> String {
    format!("/api/practice/{}/save", user_id)
}

pub async fn run(ctx: &mut ProbeContext<'_>) -> Result<bool> {
    let Some(student_id) = ctx.student_id("Practice Mode APIs") else {
        return Ok(false);
    };

    let mut success = true;

    let stats = ctx.backend.get(&stats_path(&student_id), None).await;
    success &= check(ctx, "Practice Stats API", "Practice stats", stats);

    let history = ctx.backend.get(&history_path(&student_id), None).await;
    success &= check(ctx, "Practice History API", "Practice history", history);

    let payload = serde_json::to_value(&ctx.config.practice_result)?;
    let saved = ctx.backend.post(&save_path(&student_id), &payload, None).await;
    success &= check(ctx, "Practice Save API", "Practice save", saved);

    Ok(success)
}

fn check(
    ctx: &mut ProbeContext<'_>,
    name: &str,
    subject: &str,
    response: Result<ProbeResponse, crate::client::TransportError>,
) -> bool {
    match response.map_err(ProbeError::from).and_then(expect_implemented) {
        Ok(_) => ctx.pass(name, &format!("{} endpoint working", subject)),
        Err(e) => ctx.fail(name, subject, &e),
    }
}
