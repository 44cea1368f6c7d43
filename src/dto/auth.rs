use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    dto::non_blank,
    error::{AppError, AppResult},
    models::{Role, User},
};

#[derive(Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

pub struct NewUser {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl RegisterRequest {
    pub fn validate(self) -> AppResult<NewUser> {
        match (non_blank(self.email), self.password.filter(|p| !p.is_empty()), non_blank(self.name)) {
            (Some(email), Some(password), Some(name)) => Ok(NewUser {
                email: email.to_lowercase(),
                password,
                name,
                phone: non_blank(self.phone),
                address: non_blank(self.address),
            }),
            _ => Err(AppError::InvalidArgument(
                "Email, password, and name are required".into(),
            )),
        }
    }
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    pub fn validate(self) -> AppResult<(String, String)> {
        match (non_blank(self.email), self.password.filter(|p| !p.is_empty())) {
            (Some(email), Some(password)) => Ok((email.to_lowercase(), password)),
            _ => Err(AppError::InvalidArgument(
                "Email and password are required".into(),
            )),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthPayload {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub exp: usize,
}
