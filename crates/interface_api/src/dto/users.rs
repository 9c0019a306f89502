//! User administration DTOs

use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email(message = "Email address is not valid"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    pub phone: Option<String>,
    /// customer, agent, or admin
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub active: bool,
}

/// Filter parameters; pagination is extracted separately
#[derive(Debug, Deserialize, Default)]
pub struct ListUsersQuery {
    pub role: Option<String>,
}
