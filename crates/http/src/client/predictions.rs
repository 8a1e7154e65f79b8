//! Prediction API client methods

use super::request::{ApiRequest, FilePart};
use super::{ApiClient, ClientError};
use crate::types::{Prediction, SkillsRequest};
use std::path::Path;

/// Multipart field the resume is uploaded under
const RESUME_FIELD: &str = "resume";

impl ApiClient {
    /// Predict a role from a list of skills
    ///
    /// Skills are trimmed and blank entries dropped; at least one must remain.
    pub async fn predict_from_skills<I, S>(&self, skills: I) -> Result<Prediction, ClientError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let skills: Vec<String> = skills
            .into_iter()
            .map(|skill| skill.as_ref().trim().to_string())
            .filter(|skill| !skill.is_empty())
            .collect();
        if skills.is_empty() {
            return Err(ClientError::Validation(
                "at least one skill is required".into(),
            ));
        }

        let req = ApiRequest::post("/predictions/skills/").json(&SkillsRequest { skills })?;
        self.execute(req).await
    }

    /// Predict a role from resume contents
    pub async fn predict_from_resume(
        &self,
        file_name: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Prediction, ClientError> {
        let file_name = file_name.into();
        let mime = resume_mime(&file_name).map(str::to_string);
        let req = ApiRequest::post("/predictions/resume/").file(FilePart {
            field: RESUME_FIELD.to_string(),
            file_name,
            mime,
            bytes,
        });
        self.execute(req).await
    }

    /// Predict a role from a resume file on disk
    pub async fn predict_from_resume_file(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<Prediction, ClientError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "resume".to_string());
        self.predict_from_resume(file_name, bytes).await
    }

    /// The signed-in user's predictions, newest first
    pub async fn history(&self) -> Result<Vec<Prediction>, ClientError> {
        self.execute(ApiRequest::get("/predictions/history/")).await
    }

    /// Every user's predictions, newest first
    pub async fn all_history(&self) -> Result<Vec<Prediction>, ClientError> {
        self.execute(ApiRequest::get("/predictions/all-history/")).await
    }
}

fn resume_mime(file_name: &str) -> Option<&'static str> {
    let extension = Path::new(file_name)
        .extension()?
        .to_str()?
        .to_ascii_lowercase();
    match extension.as_str() {
        "pdf" => Some("application/pdf"),
        "txt" => Some("text/plain"),
        "doc" => Some("application/msword"),
        "docx" => Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
        _ => None,
    }
}
