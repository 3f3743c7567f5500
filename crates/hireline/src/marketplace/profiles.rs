//! Profile edits and the object-storage collaborator used for resumes, avatars and logos.

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use base64::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::{Role, User, UserId};
use super::error::MarketplaceError;
use super::store::MarketplaceStore;

pub const RESUME_FOLDER: &str = "hireline/resumes";
pub const AVATAR_FOLDER: &str = "hireline/avatars";
pub const LOGO_FOLDER: &str = "hireline/logos";

/// File content handed to the media provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaPayload {
    Bytes(Vec<u8>),
    /// Base64 text, optionally prefixed with a `data:<mime>;base64,` header.
    Base64(String),
}

impl MediaPayload {
    pub fn decode(&self) -> Result<Vec<u8>, MediaUploadError> {
        match self {
            Self::Bytes(bytes) => Ok(bytes.clone()),
            Self::Base64(text) => {
                let body = text
                    .split_once(";base64,")
                    .map_or(text.as_str(), |(_, body)| body);
                BASE64_STANDARD
                    .decode(body.trim())
                    .map_err(|err| MediaUploadError::InvalidPayload(err.to_string()))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUpload {
    pub payload: MediaPayload,
    pub file_name: String,
    pub folder: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedMedia {
    pub url: String,
    pub public_id: String,
    pub format: String,
    pub size: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum MediaUploadError {
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    #[error("{0}")]
    Provider(String),
}

impl From<MediaUploadError> for MarketplaceError {
    fn from(value: MediaUploadError) -> Self {
        Self::Upload(value.to_string())
    }
}

/// Object-storage collaborator. Implementations return a public URL and an opaque id.
pub trait MediaUploader: Debug + Send + Sync {
    fn upload(&self, upload: MediaUpload) -> Result<UploadedMedia, MediaUploadError>;
}

/// Keeps uploads in memory and hands out stable fake URLs.
#[derive(Debug)]
pub struct InMemoryUploader {
    base_url: String,
    sequence: AtomicU64,
}

impl InMemoryUploader {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            sequence: AtomicU64::new(1),
        }
    }
}

impl Default for InMemoryUploader {
    fn default() -> Self {
        Self::new("memory://media")
    }
}

impl MediaUploader for InMemoryUploader {
    fn upload(&self, upload: MediaUpload) -> Result<UploadedMedia, MediaUploadError> {
        let bytes = upload.payload.decode()?;
        if bytes.is_empty() {
            return Err(MediaUploadError::InvalidPayload("file is empty".to_string()));
        }
        let format = upload
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        let public_id = format!("{}/{id:06}", upload.folder);

        Ok(UploadedMedia {
            url: format!("{}/{public_id}", self.base_url),
            public_id,
            format,
            size: bytes.len() as u64,
        })
    }
}

/// Partial profile edit. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub resume: Option<String>,
    #[serde(alias = "userDesc")]
    pub description: Option<String>,
    #[serde(alias = "userSkills")]
    pub skills: Option<Vec<String>>,
    pub company_name: Option<String>,
    pub company_description: Option<String>,
    pub company_logo: Option<String>,
}

pub struct ProfileService<S> {
    store: Arc<S>,
    uploader: Arc<dyn MediaUploader>,
}

impl<S> ProfileService<S>
where
    S: MarketplaceStore + 'static,
{
    pub fn new(store: Arc<S>, uploader: Arc<dyn MediaUploader>) -> Self {
        Self { store, uploader }
    }

    /// Name and resume only change when a non-empty value is sent; avatar, description and
    /// skills change whenever present; company fields apply to employers and only when
    /// non-empty.
    pub fn update_profile(
        &self,
        user_id: &UserId,
        update: ProfileUpdate,
    ) -> Result<User, MarketplaceError> {
        let mut user = self.user(user_id)?;

        if let Some(name) = non_empty(update.name) {
            user.name = name;
        }
        if let Some(avatar) = update.avatar {
            user.avatar = avatar;
        }
        if let Some(resume) = non_empty(update.resume) {
            user.resume = resume;
        }
        if let Some(description) = update.description {
            user.description = description;
        }
        if let Some(skills) = update.skills {
            user.skills = skills;
        }
        if user.role == Role::Employer {
            if let Some(company_name) = non_empty(update.company_name) {
                user.company_name = Some(company_name);
            }
            if let Some(company_description) = non_empty(update.company_description) {
                user.company_description = Some(company_description);
            }
            if let Some(company_logo) = non_empty(update.company_logo) {
                user.company_logo = Some(company_logo);
            }
        }

        self.store.update_user(user.clone())?;
        info!(user_id = %user_id, "profile updated");
        Ok(user)
    }

    /// Clears the resume link. The stored object stays with the media provider.
    pub fn delete_resume(&self, user_id: &UserId) -> Result<User, MarketplaceError> {
        let mut user = self.user(user_id)?;
        if user.role != Role::Jobseeker {
            return Err(MarketplaceError::Forbidden("only jobseekers can delete a resume"));
        }
        user.resume.clear();
        self.store.update_user(user.clone())?;
        info!(user_id = %user_id, "resume removed");
        Ok(user)
    }

    pub fn public_profile(&self, user_id: &UserId) -> Result<User, MarketplaceError> {
        self.user(user_id)
    }

    pub fn upload_resume(
        &self,
        user_id: &UserId,
        payload: MediaPayload,
        file_name: &str,
    ) -> Result<UploadedMedia, MarketplaceError> {
        let mut user = self.user(user_id)?;
        if user.role != Role::Jobseeker {
            return Err(MarketplaceError::Forbidden("only jobseekers can upload a resume"));
        }
        let media = self.upload(payload, file_name, RESUME_FOLDER)?;
        user.resume = media.url.clone();
        self.store.update_user(user)?;
        info!(user_id = %user_id, public_id = %media.public_id, "resume uploaded");
        Ok(media)
    }

    pub fn upload_avatar(
        &self,
        user_id: &UserId,
        payload: MediaPayload,
        file_name: &str,
    ) -> Result<UploadedMedia, MarketplaceError> {
        let mut user = self.user(user_id)?;
        let media = self.upload(payload, file_name, AVATAR_FOLDER)?;
        user.avatar = media.url.clone();
        self.store.update_user(user)?;
        info!(user_id = %user_id, public_id = %media.public_id, "avatar uploaded");
        Ok(media)
    }

    pub fn upload_company_logo(
        &self,
        user_id: &UserId,
        payload: MediaPayload,
        file_name: &str,
    ) -> Result<UploadedMedia, MarketplaceError> {
        let mut user = self.user(user_id)?;
        if user.role != Role::Employer {
            return Err(MarketplaceError::Forbidden("only employers can upload a company logo"));
        }
        let media = self.upload(payload, file_name, LOGO_FOLDER)?;
        user.company_logo = Some(media.url.clone());
        self.store.update_user(user)?;
        info!(user_id = %user_id, public_id = %media.public_id, "company logo uploaded");
        Ok(media)
    }

    fn upload(
        &self,
        payload: MediaPayload,
        file_name: &str,
        folder: &str,
    ) -> Result<UploadedMedia, MarketplaceError> {
        let media = self.uploader.upload(MediaUpload {
            payload,
            file_name: file_name.to_string(),
            folder: folder.to_string(),
        })?;
        Ok(media)
    }

    fn user(&self, user_id: &UserId) -> Result<User, MarketplaceError> {
        self.store
            .fetch_user(user_id)?
            .ok_or(MarketplaceError::NotFound("user"))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}
