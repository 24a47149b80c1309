//! REST client for the requirements backend
//!
//! The backend is a conventional resource CRUD API: `GET /requirements`
//! returns the collection most-recent-first, mutations go through POST, PUT
//! and DELETE. Non-2xx responses collapse into one undifferentiated failure;
//! there is no retry and no cancellation.

use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

use crate::models::RequirementRecord;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from talking to the backend
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Requirement not found: {0}")]
    NotFound(i64),
}

/// Seam between the record engine and the persistence collaborator
///
/// The engine only ever needs these four operations; tests substitute an
/// in-memory implementation so the workflow and form logic can be exercised
/// without a running backend.
pub trait RequirementApi {
    /// Full collection, backend order preserved (most-recent-first)
    fn fetch(&self) -> Result<Vec<RequirementRecord>, ApiError>;

    /// Creates a record from a full field map
    fn create(&self, fields: &HashMap<String, String>) -> Result<RequirementRecord, ApiError>;

    /// Replaces a record's field map, refreshing `updated_at` server-side
    fn update(&self, id: i64, fields: &HashMap<String, String>)
        -> Result<RequirementRecord, ApiError>;

    /// Removes a record
    fn delete(&self, id: i64) -> Result<(), ApiError>;
}

/// Blocking HTTP implementation of [`RequirementApi`]
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn check(response: reqwest::blocking::Response) -> Result<reqwest::blocking::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().unwrap_or_default();
        log::error!("Backend returned {}: {}", status, message);
        Err(ApiError::Server {
            status: status.as_u16(),
            message,
        })
    }
}

impl RequirementApi for ApiClient {
    fn fetch(&self) -> Result<Vec<RequirementRecord>, ApiError> {
        let url = format!("{}/requirements", self.base_url);
        let response = Self::check(self.client.get(&url).send()?)?;
        Ok(response.json()?)
    }

    fn create(&self, fields: &HashMap<String, String>) -> Result<RequirementRecord, ApiError> {
        let url = format!("{}/requirements", self.base_url);
        let response = Self::check(self.client.post(&url).json(fields).send()?)?;
        Ok(response.json()?)
    }

    fn update(
        &self,
        id: i64,
        fields: &HashMap<String, String>,
    ) -> Result<RequirementRecord, ApiError> {
        let url = format!("{}/requirements/{}", self.base_url, id);
        let response = self.client.put(&url).json(fields).send()?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(id));
        }
        let response = Self::check(response)?;
        Ok(response.json()?)
    }

    fn delete(&self, id: i64) -> Result<(), ApiError> {
        let url = format!("{}/requirements/{}", self.base_url, id);
        let response = self.client.delete(&url).send()?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(id));
        }
        Self::check(response)?;
        Ok(())
    }
}

/// In-memory stand-in for the backend, call-recording, optionally failing
#[cfg(test)]
#[derive(Default)]
pub(crate) struct StubApi {
    pub records: Vec<RequirementRecord>,
    pub created: std::cell::RefCell<Vec<HashMap<String, String>>>,
    pub updated: std::cell::RefCell<Vec<(i64, HashMap<String, String>)>>,
    pub deleted: std::cell::RefCell<Vec<i64>>,
    pub fail: bool,
}

#[cfg(test)]
impl StubApi {
    fn outage(&self) -> Result<(), ApiError> {
        if self.fail {
            Err(ApiError::Server {
                status: 500,
                message: "backend down".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
impl RequirementApi for StubApi {
    fn fetch(&self) -> Result<Vec<RequirementRecord>, ApiError> {
        self.outage()?;
        Ok(self.records.clone())
    }

    fn create(&self, fields: &HashMap<String, String>) -> Result<RequirementRecord, ApiError> {
        self.outage()?;
        self.created.borrow_mut().push(fields.clone());
        Ok(RequirementRecord {
            id: 1,
            created_at: chrono::Utc::now(),
            updated_at: None,
            fields: fields.clone(),
        })
    }

    fn update(
        &self,
        id: i64,
        fields: &HashMap<String, String>,
    ) -> Result<RequirementRecord, ApiError> {
        self.outage()?;
        self.updated.borrow_mut().push((id, fields.clone()));
        Ok(RequirementRecord {
            id,
            created_at: chrono::Utc::now(),
            updated_at: Some(chrono::Utc::now()),
            fields: fields.clone(),
        })
    }

    fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.outage()?;
        self.deleted.borrow_mut().push(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let client = ApiClient::new("http://localhost:8000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }
}
