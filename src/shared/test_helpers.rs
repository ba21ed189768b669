#[cfg(test)]
use crate::features::auth::model::AuthenticatedUser;
#[cfg(test)]
use crate::shared::constants::{ROLE_ADMIN, ROLE_CLIENT};

#[cfg(test)]
use axum::{extract::Request, middleware::Next, response::Response, Router};

#[cfg(test)]
pub fn admin_user() -> AuthenticatedUser {
    AuthenticatedUser {
        id: 1,
        email: Some("admin@example.com".to_string()),
        role: ROLE_ADMIN.to_string(),
    }
}

#[cfg(test)]
pub fn client_user(id: i64) -> AuthenticatedUser {
    AuthenticatedUser {
        id,
        email: Some(format!("client{}@example.com", id)),
        role: ROLE_CLIENT.to_string(),
    }
}

/// Wrap a router so every request carries the given identity, bypassing the
/// header-based identity middleware.
#[cfg(test)]
pub fn with_identity(router: Router, user: AuthenticatedUser) -> Router {
    router.layer(axum::middleware::from_fn(
        move |mut request: Request, next: Next| {
            let user = user.clone();
            async move {
                request.extensions_mut().insert(user);
                let response: Response = next.run(request).await;
                response
            }
        },
    ))
}
