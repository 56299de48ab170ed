use anyhow::Result;

use super::{expect_ok, ProbeContext, ProbeError};
use crate::client::types::PlayerRecord;

pub fn player_path(user_id: &str) -> String {
    format!("/api/player/{}", user_id)
}

/// Fetch the student's player record
pub async fn run(ctx: &mut ProbeContext<'_>) -> Result<bool> {
    let Some(student_id) = ctx.student_id("Player Data APIs") else {
        return Ok(false);
    };

    const NAME: &str = "Get Player Data";
    let fetched = match ctx.backend.get(&player_path(&student_id), None).await {
        Ok(response) => expect_ok(response).and_then(|r| {
            r.decode::<PlayerRecord>()
                .map_err(|e| ProbeError::MalformedResponse(format!("player record: {}", e)))
        }),
        Err(e) => Err(e.into()),
    };

    match fetched {
        Ok(player) => {
            let username = player.username.as_deref().unwrap_or("Unknown");
            Ok(ctx.pass(NAME, &format!("Player data retrieved: {}", username)))
        }
        Err(e) => Ok(ctx.fail(NAME, "Get player data", &e)),
    }
}
