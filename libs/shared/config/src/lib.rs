use std::env;
use std::path::PathBuf;

use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub token_path: PathBuf,
    pub home_path: String,
    pub patient_dashboard_path: String,
    pub doctor_dashboard_path: String,
    pub admin_dashboard_path: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            api_base_url: env::var("MEDBOOK_API_URL").unwrap_or_else(|_| {
                warn!("MEDBOOK_API_URL not set, using default");
                "http://localhost:8000/api".to_string()
            }),
            token_path: env::var("MEDBOOK_TOKEN_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    warn!("MEDBOOK_TOKEN_FILE not set, using default");
                    PathBuf::from(".medbook_token")
                }),
            home_path: env::var("MEDBOOK_HOME_PATH").unwrap_or_else(|_| "/".to_string()),
            patient_dashboard_path: env::var("MEDBOOK_PATIENT_DASHBOARD_PATH")
                .unwrap_or_else(|_| "/patient-dashboard".to_string()),
            doctor_dashboard_path: env::var("MEDBOOK_DOCTOR_DASHBOARD_PATH")
                .unwrap_or_else(|_| "/doctor-dashboard".to_string()),
            admin_dashboard_path: env::var("MEDBOOK_ADMIN_DASHBOARD_PATH")
                .unwrap_or_else(|_| "/admin".to_string()),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.api_base_url.is_empty()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000/api".to_string(),
            token_path: PathBuf::from(".medbook_token"),
            home_path: "/".to_string(),
            patient_dashboard_path: "/patient-dashboard".to_string(),
            doctor_dashboard_path: "/doctor-dashboard".to_string(),
            admin_dashboard_path: "/admin".to_string(),
        }
    }
}
