//! Request and response types of the CareerPath API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Credentials for the token endpoint; the email travels as `username`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Token pair issued at sign-in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    /// Present for Google sign-in, absent for password sign-in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

/// Short user description returned alongside a token pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// Google ID token exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleLoginRequest {
    pub token: String,
}

/// Token refresh request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// Token refresh response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
    /// Rotated refresh token, when the server rotates them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
}

/// Logout request; the refresh token is blacklisted server-side
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogoutRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
}

/// Account registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Account created by registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredUser {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
}

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    #[default]
    User,
}

/// Profile of the signed-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default = "default_true")]
    pub email_notifications_enabled: bool,
    #[serde(default)]
    pub privacy_mode_enabled: bool,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

fn default_true() -> bool {
    true
}

/// Partial profile update; only set fields are sent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_notifications_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privacy_mode_enabled: Option<bool>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.email_notifications_enabled.is_none()
            && self.privacy_mode_enabled.is_none()
    }
}

/// Password change for the signed-in user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

/// How a password reset code is delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResetMethod {
    /// Emailed link carrying a reset token
    #[default]
    Token,
    /// Emailed six digit one-time password
    Otp,
}

/// Password reset request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
    pub method: ResetMethod,
}

/// Reset with the token from an emailed link
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetWithTokenRequest {
    pub token: String,
    pub new_password: String,
}

/// Reset with an emailed one-time password
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetWithOtpRequest {
    pub email: String,
    pub otp: String,
    pub new_password: String,
}

/// Skills submitted for a prediction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillsRequest {
    pub skills: Vec<String>,
}

/// A stored role prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub id: i64,
    /// Skills list for skill predictions, empty for resume predictions
    #[serde(default)]
    pub input_skills: JsonValue,
    pub predicted_role: String,
    #[serde(default)]
    pub role_category: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub resume_file: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Prediction {
    /// Skills the prediction was made from, if it was a skill prediction
    pub fn skills(&self) -> Vec<&str> {
        self.input_skills
            .as_array()
            .map(|skills| skills.iter().filter_map(JsonValue::as_str).collect())
            .unwrap_or_default()
    }
}

/// Analytics totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsOverview {
    pub total_users: u64,
    pub total_predictions: u64,
    #[serde(default)]
    pub most_predicted_role: Option<String>,
    #[serde(default)]
    pub most_predicted_role_count: u64,
}

/// Predictions per role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleDistribution {
    pub distribution: Vec<RoleCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleCount {
    pub predicted_role: String,
    pub count: u64,
}

/// Predictions per calendar month, as parallel label and count lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyCounts {
    /// `YYYY-MM` labels in ascending order
    pub months: Vec<String>,
    pub counts: Vec<u64>,
}

impl MonthlyCounts {
    /// Pair each month label with its count
    pub fn entries(&self) -> impl Iterator<Item = (&str, u64)> {
        self.months
            .iter()
            .map(String::as_str)
            .zip(self.counts.iter().copied())
    }
}

/// Users with the most predictions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    pub top_users: Vec<TopUser>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopUser {
    pub user_id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub prediction_count: u64,
}

/// In-app notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}
