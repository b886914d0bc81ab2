use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, Debug, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: Option<String>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Sign-in payload for an identity already verified by the OAuth provider.
/// Provider wiring lives outside this service; we only find-or-create the
/// account for the verified email.
#[derive(Deserialize, Debug, ToSchema)]
pub struct OAuthLoginRequest {
    pub email: String,
    pub name: String,
    pub image: Option<String>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct CompleteResetRequest {
    pub token: String,
    pub new_password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}
