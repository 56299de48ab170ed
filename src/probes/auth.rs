//! Registration with login fallback for the student and teacher fixtures

use anyhow::Result;

use super::{expect_ok, ProbeContext, ProbeError};
use crate::client::types::{Credentials, Identity, RegisterRequest};
use crate::client::ProbeResponse;
use crate::runner::fixtures::Role;

pub const REGISTER_PATH: &str = "/api/auth/register";
pub const LOGIN_PATH: &str = "/api/auth/login";

/// How a fixture identity was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enrollment {
    Registered,
    LoggedIn,
}

/// Register both fixtures, every role is attempted even if one fails
pub async fn run(ctx: &mut ProbeContext<'_>) -> Result<bool> {
    let mut success = true;
    for role in Role::ALL {
        success &= register_role(ctx, role).await?;
    }
    Ok(success)
}

/// Register `role`; a 400 means the user exists and login is tried instead
pub async fn register_role(ctx: &mut ProbeContext<'_>, role: Role) -> Result<bool> {
    let name = format!("{} Registration", role.title());
    let credentials = ctx.config.credentials(role).clone();

    let body = serde_json::to_value(RegisterRequest {
        username: &credentials.username,
        password: &credentials.password,
        role: role.as_str(),
    })?;

    let result: Result<(Identity, Enrollment), (&str, ProbeError)> =
        match ctx.backend.post(REGISTER_PATH, &body, None).await {
            Err(e) => Err(("Registration", e.into())),
            Ok(response) => match response.status {
                200 => identity_from(&response)
                    .map(|identity| (identity, Enrollment::Registered))
                    .map_err(|e| ("Registration", e)),
                400 => {
                    log::debug!(
                        "{} already registered ({}), falling back to login",
                        credentials.username,
                        response.body
                    );
                    login(ctx, &credentials)
                        .await?
                        .map(|identity| (identity, Enrollment::LoggedIn))
                        .map_err(|e| ("Login fallback", e))
                }
                _ => Err(("Registration", ProbeError::unexpected(response))),
            },
        };

    match result {
        Ok((identity, enrollment)) => {
            ctx.fixtures.set(role, identity);
            let message = match enrollment {
                Enrollment::Registered => format!("{} registered successfully", role.title()),
                Enrollment::LoggedIn => {
                    format!("{} already exists, logged in successfully", role.title())
                }
            };
            Ok(ctx.pass(&name, &message))
        }
        Err((stage, e)) => Ok(ctx.fail(&name, stage, &e)),
    }
}

async fn login(
    ctx: &mut ProbeContext<'_>,
    credentials: &Credentials,
) -> Result<Result<Identity, ProbeError>> {
    let body = serde_json::to_value(credentials)?;
    let identity = match ctx.backend.post(LOGIN_PATH, &body, None).await {
        Ok(response) => expect_ok(response).and_then(|r| identity_from(&r)),
        Err(e) => Err(e.into()),
    };
    Ok(identity)
}

fn identity_from(response: &ProbeResponse) -> Result<Identity, ProbeError> {
    let identity: Identity = response
        .decode()
        .map_err(|e| ProbeError::MalformedResponse(format!("identity record: {}", e)))?;

    if identity.id.trim().is_empty() {
        return Err(ProbeError::MalformedResponse(
            "identity record has an empty id".to_string(),
        ));
    }
    Ok(identity)
}
