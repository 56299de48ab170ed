use anyhow::Result;

use super::catalog::SLIMES_PATH;
use super::{ProbeContext, ProbeError};

pub const TEST_NAME: &str = "Server Health";

/// Liveness: the slime listing must answer 200 within the health timeout
pub async fn run(ctx: &mut ProbeContext<'_>) -> Result<bool> {
    let timeout = ctx.config.health_timeout();

    match ctx.backend.get(SLIMES_PATH, Some(timeout)).await {
        Ok(response) if response.is_ok() => {
            Ok(ctx.pass(TEST_NAME, "Server is running and responding"))
        }
        Ok(response) => Ok(ctx.fail(TEST_NAME, "Server", &ProbeError::unexpected(response))),
        Err(e) => {
            ctx.recorder
                .record(TEST_NAME, false, &format!("Cannot connect to server: {}", e), None);
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probes::testing::{refused, Harness, ScriptedBackend};
    use serde_json::json;
    use std::time::Duration;

    #[tokio::test]
    async fn test_healthy_server() {
        let mut h = Harness::new(ScriptedBackend::new().on_get(SLIMES_PATH, 200, json!([])));

        assert!(run(&mut h.ctx()).await.unwrap());
        assert_eq!(
            h.outcomes(),
            vec![(
                TEST_NAME.to_string(),
                true,
                "Server is running and responding".to_string()
            )]
        );
        assert_eq!(
            h.backend.requests()[0].timeout,
            Some(Duration::from_secs(5))
        );
    }

    #[tokio::test]
    async fn test_bad_status() {
        let mut h = Harness::new(ScriptedBackend::new().on_get(
            SLIMES_PATH,
            503,
            json!({ "error": "starting" }),
        ));

        assert!(!run(&mut h.ctx()).await.unwrap());
        let outcome = &h.recorder.outcomes()[0];
        assert_eq!(outcome.message, "Server returned status 503");
        assert_eq!(outcome.detail.as_ref().unwrap()["status"], json!(503));
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        let mut h = Harness::new(ScriptedBackend::new().reply("GET", SLIMES_PATH, refused(SLIMES_PATH)));

        assert!(!run(&mut h.ctx()).await.unwrap());
        let (_, success, message) = &h.outcomes()[0];
        assert!(!success);
        assert!(message.starts_with("Cannot connect to server:"));
    }
}
