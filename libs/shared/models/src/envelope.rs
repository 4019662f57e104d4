use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Uniform response envelope returned by every backend endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<HashMap<String, Vec<String>>>,
}

impl<T> ApiEnvelope<T> {
    /// Consume the envelope, yielding its payload or the server message as an error.
    pub fn into_data(self) -> Result<T, crate::error::ClientError> {
        match self.data {
            Some(data) if self.success => Ok(data),
            _ => Err(crate::error::ClientError::Api(self.message)),
        }
    }
}

/// Query parameters accepted by the paginated listing endpoints.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub per_page: Option<u32>,
    pub search: Option<String>,
    pub role: Option<String>,
    pub specialty: Option<String>,
    pub status: Option<String>,
}

impl ListQuery {
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(per_page) = self.per_page {
            pairs.push(("per_page", per_page.to_string()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(role) = &self.role {
            pairs.push(("role", role.clone()));
        }
        if let Some(specialty) = &self.specialty {
            pairs.push(("specialty", specialty.clone()));
        }
        if let Some(status) = &self.status {
            pairs.push(("status", status.clone()));
        }
        pairs
    }
}
