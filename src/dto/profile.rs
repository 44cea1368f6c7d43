use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    dto::non_blank,
    error::{AppError, AppResult},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

pub struct ProfileChanges {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl UpdateProfileRequest {
    pub fn validate(self) -> AppResult<ProfileChanges> {
        match (non_blank(self.name), non_blank(self.email)) {
            (Some(name), Some(email)) => Ok(ProfileChanges {
                name,
                email: email.to_lowercase(),
                phone: non_blank(self.phone),
                address: non_blank(self.address),
            }),
            _ => Err(AppError::InvalidArgument(
                "Name and email are required".into(),
            )),
        }
    }
}
