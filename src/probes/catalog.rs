//! Collection listings: question sets and slimes

use anyhow::Result;

use super::{expect_ok, ProbeContext, ProbeError};
use crate::client::ProbeResponse;

pub const QUESTION_SETS_PATH: &str = "/api/question-sets";
pub const SLIMES_PATH: &str = "/api/slimes";

async fn fetch_collection(ctx: &mut ProbeContext<'_>, path: &str) -> Result<usize, ProbeError> {
    let response = expect_ok(ctx.backend.get(path, None).await?)?;
    collection_len(&response)
}

fn collection_len(response: &ProbeResponse) -> Result<usize, ProbeError> {
    response
        .array_len()
        .ok_or_else(|| ProbeError::MalformedResponse(format!("expected a JSON array, got {}", response.body)))
}

/// Question sets must be listed and the listing must not be empty
pub async fn run_question_sets(ctx: &mut ProbeContext<'_>) -> Result<bool> {
    const NAME: &str = "Get Question Sets";

    match fetch_collection(ctx, QUESTION_SETS_PATH).await {
        Ok(count) => {
            ctx.pass(NAME, &format!("Retrieved {} question sets", count));
            if count == 0 {
                log::warn!("{}: {}", NAME, ProbeError::EmptyCollection);
            }
            Ok(count > 0)
        }
        Err(e) => Ok(ctx.fail(NAME, "Get question sets", &e)),
    }
}

/// Slimes only need to be listed, an empty catalogue still passes
pub async fn run_slimes(ctx: &mut ProbeContext<'_>) -> Result<bool> {
    const NAME: &str = "Get Slimes";

    match fetch_collection(ctx, SLIMES_PATH).await {
        Ok(count) => Ok(ctx.pass(NAME, &format!("Retrieved {} slimes", count))),
        Err(e) => Ok(ctx.fail(NAME, "Get slimes", &e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probes::testing::{refused, Harness, ScriptedBackend};
    use serde_json::json;

    #[tokio::test]
    async fn test_question_sets_listed() {
        let mut h = Harness::new(ScriptedBackend::new().on_get(
            QUESTION_SETS_PATH,
            200,
            json!([{ "id": "qs1", "title": "Math" }, { "id": "qs2", "title": "Science" }]),
        ));

        assert!(run_question_sets(&mut h.ctx()).await.unwrap());
        assert_eq!(
            h.outcomes(),
            vec![(
                "Get Question Sets".to_string(),
                true,
                "Retrieved 2 question sets".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_empty_question_sets_fail_the_probe() {
        let mut h = Harness::new(ScriptedBackend::new().on_get(QUESTION_SETS_PATH, 200, json!([])));

        assert!(!run_question_sets(&mut h.ctx()).await.unwrap());
        // The HTTP call itself succeeded
        assert!(h.outcomes()[0].1);
        assert_eq!(h.outcomes()[0].2, "Retrieved 0 question sets");
    }

    #[tokio::test]
    async fn test_question_sets_error_status() {
        let mut h = Harness::new(ScriptedBackend::new().on_get(
            QUESTION_SETS_PATH,
            500,
            json!({ "error": "db" }),
        ));

        assert!(!run_question_sets(&mut h.ctx()).await.unwrap());
        assert_eq!(h.outcomes()[0].2, "Get question sets returned status 500");
    }

    #[tokio::test]
    async fn test_question_sets_not_an_array() {
        let mut h = Harness::new(ScriptedBackend::new().on_get(
            QUESTION_SETS_PATH,
            200,
            json!({ "sets": [] }),
        ));

        assert!(!run_question_sets(&mut h.ctx()).await.unwrap());
        assert!(h.outcomes()[0].2.contains("malformed body"));
    }

    #[tokio::test]
    async fn test_empty_slimes_still_pass() {
        let mut h = Harness::new(ScriptedBackend::new().on_get(SLIMES_PATH, 200, json!([])));

        assert!(run_slimes(&mut h.ctx()).await.unwrap());
        assert_eq!(h.outcomes()[0].2, "Retrieved 0 slimes");
    }

    #[tokio::test]
    async fn test_slimes_transport_error() {
        let mut h = Harness::new(ScriptedBackend::new().reply("GET", SLIMES_PATH, refused(SLIMES_PATH)));

        assert!(!run_slimes(&mut h.ctx()).await.unwrap());
        let (_, success, message) = &h.outcomes()[0];
        assert!(!success);
        assert!(message.starts_with("Get slimes error: cannot connect"));
    }
}
