use std::sync::RwLock;

use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method, StatusCode,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use shared_config::AppConfig;
use shared_models::{
    AdminUserUpsert, ApiEnvelope, Appointment, BookAppointmentRequest, ChangePasswordRequest,
    ClientError, ListQuery, LoginResponse, PatientProfileUpdate, ProfileUpdate, RefreshResponse,
    RegisterData, SpecialtyUpsert, UpdateAppointmentRequest, WhoAmI,
};

use crate::token::{FileTokenStore, TokenStore};

/// `POST /upload-avatar` and `POST /patient/avatar` response payload.
#[derive(Debug, Clone, Deserialize)]
pub struct AvatarResponse {
    pub avatar_url: String,
}

/// Single choke point for all backend calls. Holds the bearer token in memory
/// and mirrors it to the token store so it survives restarts.
pub struct ApiGateway {
    client: Client,
    base_url: String,
    token: RwLock<Option<String>>,
    store: Box<dyn TokenStore>,
}

impl ApiGateway {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_store(config, Box::new(FileTokenStore::new(&config.token_path)))
    }

    pub fn with_store(config: &AppConfig, store: Box<dyn TokenStore>) -> Self {
        let token = store.load();
        Self {
            client: Client::new(),
            base_url: config.api_base_url.clone(),
            token: RwLock::new(token),
            store,
        }
    }

    /// Replace the current token in memory and in persistent storage. A store
    /// failure is logged, never surfaced: the in-memory session must not be
    /// blocked by a storage problem.
    pub fn set_token(&self, token: Option<&str>) {
        let result = match token {
            Some(token) => self.store.save(token),
            None => self.store.clear(),
        };
        if let Err(err) = result {
            warn!("Failed to persist token change: {}", err);
        }
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = token.map(str::to_string);
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    fn headers(&self, json: bool) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if json {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        if let Some(token) = self.token() {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
                headers.insert(AUTHORIZATION, value);
            }
        }
        headers
    }

    async fn execute<T>(&self, request: reqwest::RequestBuilder) -> Result<ApiEnvelope<T>, ClientError>
    where
        T: DeserializeOwned,
    {
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| "API request failed".to_string());
            error!("API error ({}): {}", status, message);

            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ClientError::Auth(message),
                StatusCode::NOT_FOUND => ClientError::NotFound(message),
                StatusCode::UNPROCESSABLE_ENTITY => ClientError::Validation(message),
                _ => ClientError::Api(message),
            });
        }

        Ok(response.json::<ApiEnvelope<T>>().await?)
    }

    async fn request<T>(
        &self,
        method: Method,
        path: &str,
        query: Option<&ListQuery>,
        body: Option<Value>,
    ) -> Result<ApiEnvelope<T>, ClientError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let mut req = self.client.request(method, &url).headers(self.headers(true));
        if let Some(query) = query {
            req = req.query(&query.to_pairs());
        }
        if let Some(body) = body {
            req = req.json(&body);
        }

        self.execute(req).await
    }

    /// Multipart upload. The JSON content type is deliberately omitted so the
    /// transport sets the multipart boundary itself.
    async fn upload<T>(
        &self,
        path: &str,
        field: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<ApiEnvelope<T>, ClientError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Uploading {} to {}", file_name, url);

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part(field.to_string(), part);

        let req = self
            .client
            .post(&url)
            .headers(self.headers(false))
            .multipart(form);

        self.execute(req).await
    }

    // ==== Auth ====

    pub async fn login(&self, email: &str, password: &str) -> Result<ApiEnvelope<LoginResponse>, ClientError> {
        let body = serde_json::json!({ "email": email, "password": password });
        let envelope: ApiEnvelope<LoginResponse> =
            self.request(Method::POST, "/login", None, Some(body)).await?;

        if envelope.success {
            if let Some(data) = &envelope.data {
                self.set_token(Some(&data.token));
            }
        }
        Ok(envelope)
    }

    pub async fn register(&self, data: &RegisterData) -> Result<ApiEnvelope<LoginResponse>, ClientError> {
        let body = serde_json::to_value(data)?;
        let envelope: ApiEnvelope<LoginResponse> =
            self.request(Method::POST, "/register", None, Some(body)).await?;

        if envelope.success {
            if let Some(data) = &envelope.data {
                self.set_token(Some(&data.token));
            }
        }
        Ok(envelope)
    }

    pub async fn logout(&self) -> Result<ApiEnvelope<Value>, ClientError> {
        self.request(Method::POST, "/logout", None, None).await
    }

    pub async fn me(&self) -> Result<ApiEnvelope<WhoAmI>, ClientError> {
        self.request(Method::GET, "/me", None, None).await
    }

    pub async fn refresh_token(&self) -> Result<ApiEnvelope<RefreshResponse>, ClientError> {
        let envelope: ApiEnvelope<RefreshResponse> =
            self.request(Method::POST, "/refresh", None, None).await?;

        if envelope.success {
            if let Some(data) = &envelope.data {
                self.set_token(Some(&data.token));
            }
        }
        Ok(envelope)
    }

    pub async fn update_profile(&self, data: &ProfileUpdate) -> Result<ApiEnvelope<Value>, ClientError> {
        let body = serde_json::to_value(data)?;
        self.request(Method::PUT, "/profile", None, Some(body)).await
    }

    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<ApiEnvelope<Value>, ClientError> {
        let body = serde_json::to_value(ChangePasswordRequest {
            current_password: current_password.to_string(),
            new_password: new_password.to_string(),
            new_password_confirmation: new_password.to_string(),
        })?;
        self.request(Method::PUT, "/change-password", None, Some(body)).await
    }

    pub async fn upload_avatar(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<ApiEnvelope<AvatarResponse>, ClientError> {
        self.upload("/upload-avatar", "avatar", file_name, bytes).await
    }

    // ==== Admin ====

    pub async fn admin_dashboard(&self) -> Result<ApiEnvelope<Value>, ClientError> {
        self.request(Method::GET, "/admin/dashboard", None, None).await
    }

    pub async fn admin_users(&self, query: &ListQuery) -> Result<ApiEnvelope<Value>, ClientError> {
        self.request(Method::GET, "/admin/users", Some(query), None).await
    }

    pub async fn admin_doctors(&self, query: &ListQuery) -> Result<ApiEnvelope<Value>, ClientError> {
        self.request(Method::GET, "/admin/doctors", Some(query), None).await
    }

    pub async fn admin_patients(&self, query: &ListQuery) -> Result<ApiEnvelope<Value>, ClientError> {
        self.request(Method::GET, "/admin/patients", Some(query), None).await
    }

    pub async fn create_user(&self, user: &AdminUserUpsert) -> Result<ApiEnvelope<Value>, ClientError> {
        let body = serde_json::to_value(user)?;
        self.request(Method::POST, "/admin/users", None, Some(body)).await
    }

    pub async fn update_user(
        &self,
        user_id: &str,
        user: &AdminUserUpsert,
    ) -> Result<ApiEnvelope<Value>, ClientError> {
        let body = serde_json::to_value(user)?;
        let path = format!("/admin/users/{}", user_id);
        self.request(Method::PUT, &path, None, Some(body)).await
    }

    pub async fn delete_user(&self, user_id: &str) -> Result<ApiEnvelope<Value>, ClientError> {
        let path = format!("/admin/users/{}", user_id);
        self.request(Method::DELETE, &path, None, None).await
    }

    pub async fn admin_appointments(&self, query: &ListQuery) -> Result<ApiEnvelope<Value>, ClientError> {
        self.request(Method::GET, "/admin/appointments", Some(query), None).await
    }

    // ==== Specialties ====

    pub async fn specialties(&self, query: &ListQuery) -> Result<ApiEnvelope<Value>, ClientError> {
        self.request(Method::GET, "/specialties", Some(query), None).await
    }

    pub async fn specialty(&self, id: &str) -> Result<ApiEnvelope<Value>, ClientError> {
        let path = format!("/specialties/{}", id);
        self.request(Method::GET, &path, None, None).await
    }

    pub async fn create_specialty(&self, data: &SpecialtyUpsert) -> Result<ApiEnvelope<Value>, ClientError> {
        let body = serde_json::to_value(data)?;
        self.request(Method::POST, "/specialties", None, Some(body)).await
    }

    pub async fn update_specialty(
        &self,
        id: &str,
        data: &SpecialtyUpsert,
    ) -> Result<ApiEnvelope<Value>, ClientError> {
        let body = serde_json::to_value(data)?;
        let path = format!("/specialties/{}", id);
        self.request(Method::PUT, &path, None, Some(body)).await
    }

    pub async fn delete_specialty(&self, id: &str) -> Result<ApiEnvelope<Value>, ClientError> {
        let path = format!("/specialties/{}", id);
        self.request(Method::DELETE, &path, None, None).await
    }

    pub async fn doctors_by_specialty(
        &self,
        id: &str,
        query: &ListQuery,
    ) -> Result<ApiEnvelope<Value>, ClientError> {
        let path = format!("/specialties/{}/doctors", id);
        self.request(Method::GET, &path, Some(query), None).await
    }

    // ==== Patient ====

    pub async fn patient_profile(&self) -> Result<ApiEnvelope<Value>, ClientError> {
        self.request(Method::GET, "/patient/profile", None, None).await
    }

    pub async fn update_patient_profile(
        &self,
        data: &PatientProfileUpdate,
    ) -> Result<ApiEnvelope<Value>, ClientError> {
        let body = serde_json::to_value(data)?;
        self.request(Method::PUT, "/patient/profile", None, Some(body)).await
    }

    pub async fn upload_patient_avatar(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<ApiEnvelope<AvatarResponse>, ClientError> {
        self.upload("/patient/avatar", "avatar", file_name, bytes).await
    }

    pub async fn patient_medical_history(&self) -> Result<ApiEnvelope<Value>, ClientError> {
        self.request(Method::GET, "/patient/medical-history", None, None).await
    }

    pub async fn patient_appointments(&self) -> Result<ApiEnvelope<Vec<Appointment>>, ClientError> {
        self.request(Method::GET, "/patient/appointments", None, None).await
    }

    // ==== Appointments ====

    pub async fn book_appointment(
        &self,
        request: &BookAppointmentRequest,
    ) -> Result<ApiEnvelope<Value>, ClientError> {
        let body = serde_json::to_value(request)?;
        self.request(Method::POST, "/appointments", None, Some(body)).await
    }

    pub async fn update_appointment(
        &self,
        id: &str,
        request: &UpdateAppointmentRequest,
    ) -> Result<ApiEnvelope<Value>, ClientError> {
        let body = serde_json::to_value(request)?;
        let path = format!("/appointments/{}", id);
        self.request(Method::PUT, &path, None, Some(body)).await
    }

    pub async fn cancel_appointment(&self, id: &str) -> Result<ApiEnvelope<Value>, ClientError> {
        let path = format!("/appointments/{}/cancel", id);
        self.request(Method::POST, &path, None, None).await
    }

    // ==== Health ====

    pub async fn health(&self) -> Result<ApiEnvelope<Value>, ClientError> {
        self.request(Method::GET, "/health", None, None).await
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
