//! Configuration for the reelpress backend.
//!
//! All settings come from the process environment, read exactly once at
//! startup into an explicit [`Config`] value. Components receive the values
//! they need through their constructors; nothing in the business logic
//! performs ambient environment lookups.

use anyhow::{Context, Result, bail};
use url::Url;

/// Runtime configuration, fixed at process start and read-only thereafter.
#[derive(Debug, Clone)]
pub struct Config {
    /// Administrator login name.
    pub admin_username: String,
    /// Administrator password (compared verbatim; see DESIGN.md).
    pub admin_password: String,
    /// HMAC key for session tokens.
    pub session_secret: String,
    /// Bearer token for the Git content store.
    pub github_token: String,
    /// Owner of the asset repository.
    pub github_owner: String,
    /// Name of the asset repository.
    pub github_repo: String,
    /// Apps Script web endpoint fronting the post sheet.
    pub sheet_url: String,
    /// Shared key sent as a query parameter on every sheet call.
    pub sheet_key: String,
    /// Hostname allowed to call the admin surface.
    pub allowed_domain: String,
    /// Hostname allowed to call the public read surface.
    pub allowed_public_domain: String,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first missing variable.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            admin_username: require("ADMIN_USERNAME")?,
            admin_password: require("ADMIN_PASSWORD")?,
            session_secret: require("SESSION_SECRET")?,
            github_token: require("GITHUB_TOKEN")?,
            github_owner: require("GITHUB_USERNAME")?,
            github_repo: require("GITHUB_REPO")?,
            sheet_url: require("GOOGLE_SCRIPT_URL")?,
            sheet_key: require("GOOGLE_SECRET_KEY")?,
            allowed_domain: require("ALLOWED_DOMAIN")?,
            allowed_public_domain: require("ALLOWED_PUBLIC_DOMAIN")?,
        })
    }

    /// Validate configuration beyond mere presence.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Any field is empty
    /// - The sheet URL does not parse as an absolute URL
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("ADMIN_USERNAME", &self.admin_username),
            ("ADMIN_PASSWORD", &self.admin_password),
            ("SESSION_SECRET", &self.session_secret),
            ("GITHUB_TOKEN", &self.github_token),
            ("GITHUB_USERNAME", &self.github_owner),
            ("GITHUB_REPO", &self.github_repo),
            ("GOOGLE_SCRIPT_URL", &self.sheet_url),
            ("GOOGLE_SECRET_KEY", &self.sheet_key),
            ("ALLOWED_DOMAIN", &self.allowed_domain),
            ("ALLOWED_PUBLIC_DOMAIN", &self.allowed_public_domain),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                bail!("{name} cannot be empty");
            }
        }

        Url::parse(&self.sheet_url)
            .with_context(|| format!("GOOGLE_SCRIPT_URL is not a valid URL: {}", self.sheet_url))?;

        Ok(())
    }
}

fn require(name: &str) -> Result<String> {
    std::env::var(name).with_context(|| format!("Missing required environment variable: {name}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            admin_username: "admin".into(),
            admin_password: "hunter2".into(),
            session_secret: "secret".into(),
            github_token: "ghp_test".into(),
            github_owner: "someone".into(),
            github_repo: "media".into(),
            sheet_url: "https://script.google.com/macros/s/abc/exec".into(),
            sheet_key: "k".into(),
            allowed_domain: "admin.example.com".into(),
            allowed_public_domain: "blog.example.com".into(),
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_empty_field_rejected() {
        let mut config = sample();
        config.session_secret = String::new();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("SESSION_SECRET"));
    }

    #[test]
    fn test_invalid_sheet_url_rejected() {
        let mut config = sample();
        config.sheet_url = "not a url".into();
        assert!(config.validate().is_err());
    }
}
