use anyhow::Result;

use super::{ProbeContext, ProbeError};

const NAME: &str = "Socket.IO Setup";

/// Statuses showing the handshake path is served. 400 and 404 are what
/// a socket.io server answers to a plain GET, so they count as reachable.
pub const REACHABLE_STATUSES: [u16; 3] = [200, 400, 404];

/// Reachability only, the realtime protocol itself is not exercised
pub async fn run(ctx: &mut ProbeContext<'_>) -> Result<bool> {
    let path = ctx.config.handshake_path.clone();

    match ctx.backend.get(&path, None).await {
        Ok(response) if REACHABLE_STATUSES.contains(&response.status) => Ok(ctx.pass(
            NAME,
            &format!("Socket.IO endpoint is accessible (status {})", response.status),
        )),
        Ok(response) => Ok(ctx.fail(
            NAME,
            "Socket.IO endpoint",
            &ProbeError::unexpected(response),
        )),
        Err(e) => Ok(ctx.fail(NAME, "Socket.IO endpoint", &e.into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probes::testing::{refused, Harness, ScriptedBackend};
    use serde_json::json;

    #[tokio::test]
    async fn test_tolerated_statuses() {
        for status in REACHABLE_STATUSES {
            let backend = ScriptedBackend::new().on_get(
                "/socket.io/",
                status,
                json!({ "code": 0, "message": "Transport unknown" }),
            );
            let mut h = Harness::new(backend);

            assert!(run(&mut h.ctx()).await.unwrap(), "status {}", status);
            assert!(h.outcomes()[0].1);
        }
    }

    #[tokio::test]
    async fn test_unscripted_404_is_reachable() {
        let mut h = Harness::new(ScriptedBackend::new());
        assert!(run(&mut h.ctx()).await.unwrap());
    }

    #[tokio::test]
    async fn test_server_error_fails() {
        let backend = ScriptedBackend::new().on_get("/socket.io/", 502, json!(null));
        let mut h = Harness::new(backend);

        assert!(!run(&mut h.ctx()).await.unwrap());
        assert_eq!(h.outcomes()[0].2, "Socket.IO endpoint returned status 502");
    }

    #[tokio::test]
    async fn test_no_response_fails() {
        let backend = ScriptedBackend::new().reply("GET", "/socket.io/", refused("/socket.io/"));
        let mut h = Harness::new(backend);

        assert!(!run(&mut h.ctx()).await.unwrap());
        assert!(h.outcomes()[0].2.starts_with("Socket.IO endpoint error:"));
    }
}
