// src/services/oauth.rs
//
// Authorization-code flow against Google and GitHub over plain HTTPS.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::{
    config::{Config, OAuthClientConfig},
    error::AppError,
    repository::users::ProviderColumn,
};

const USER_AGENT: &str = concat!("forum/", env!("CARGO_PKG_VERSION"));

/// Supported identity providers, as they appear in `/api/auth/{provider}/...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Google,
    GitHub,
}

impl ProviderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::Google => "google",
            ProviderKind::GitHub => "github",
        }
    }

    pub fn column(self) -> ProviderColumn {
        match self {
            ProviderKind::Google => ProviderColumn::Google,
            ProviderKind::GitHub => ProviderColumn::GitHub,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google" => Ok(ProviderKind::Google),
            "github" => Ok(ProviderKind::GitHub),
            other => Err(AppError::NotFound(format!("Unknown provider '{}'", other))),
        }
    }
}

/// What a provider tells us about the person who signed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthIdentity {
    pub provider: ProviderKind,
    /// Stable account id at the provider.
    pub provider_id: String,
    pub email: String,
    /// Display name or login, used to derive a username.
    pub login: String,
}

#[async_trait]
pub trait OAuthProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// URL to send the browser to.
    fn authorize_url(&self, state: &str, redirect_uri: &str) -> Result<String, AppError>;

    /// Trades the callback `code` for the signed-in identity.
    async fn exchange(
        &self,
        http: &reqwest::Client,
        code: &str,
        redirect_uri: &str,
    ) -> Result<OAuthIdentity, AppError>;
}

/// The configured provider for `kind`, or 404 when its credentials are absent.
pub fn provider(kind: ProviderKind, config: &Config) -> Result<Box<dyn OAuthProvider>, AppError> {
    let not_configured = || AppError::NotFound(format!("{} login is not enabled", kind));
    match kind {
        ProviderKind::Google => {
            let client = config.google.clone().ok_or_else(not_configured)?;
            Ok(Box::new(Google { client }))
        }
        ProviderKind::GitHub => {
            let client = config.github.clone().ok_or_else(not_configured)?;
            Ok(Box::new(GitHub { client }))
        }
    }
}

/// `{PUBLIC_BASE_URL}/api/auth/{provider}/callback`
pub fn redirect_uri(config: &Config, kind: ProviderKind) -> String {
    format!(
        "{}/api/auth/{}/callback",
        config.public_base_url.trim_end_matches('/'),
        kind
    )
}

fn build_authorize_url(
    base: &str,
    client_id: &str,
    redirect_uri: &str,
    scope: &str,
    state: &str,
) -> Result<String, AppError> {
    let mut url = Url::parse(base).map_err(|e| AppError::InternalServerError(e.to_string()))?;
    url.query_pairs_mut()
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("response_type", "code")
        .append_pair("scope", scope)
        .append_pair("state", state);
    Ok(url.into())
}

fn upstream_error(provider: ProviderKind, e: impl fmt::Display) -> AppError {
    tracing::warn!("{} OAuth call failed: {}", provider, e);
    AppError::AuthError(format!("{} sign-in failed", provider))
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

async fn exchange_code(
    http: &reqwest::Client,
    kind: ProviderKind,
    token_url: &str,
    client: &OAuthClientConfig,
    code: &str,
    redirect_uri: &str,
) -> Result<String, AppError> {
    let params = [
        ("client_id", client.client_id.as_str()),
        ("client_secret", client.client_secret.as_str()),
        ("code", code),
        ("redirect_uri", redirect_uri),
        ("grant_type", "authorization_code"),
    ];

    let token: TokenResponse = http
        .post(token_url)
        .header(reqwest::header::ACCEPT, "application/json")
        .form(&params)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| upstream_error(kind, e))?
        .json()
        .await
        .map_err(|e| upstream_error(kind, e))?;

    Ok(token.access_token)
}

async fn get_json<T: for<'de> Deserialize<'de>>(
    http: &reqwest::Client,
    kind: ProviderKind,
    url: &str,
    access_token: &str,
) -> Result<T, AppError> {
    http.get(url)
        .bearer_auth(access_token)
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| upstream_error(kind, e))?
        .json()
        .await
        .map_err(|e| upstream_error(kind, e))
}

// --- Google ---

pub struct Google {
    client: OAuthClientConfig,
}

#[derive(Debug, Deserialize)]
struct GoogleUser {
    id: String,
    email: Option<String>,
    #[serde(default)]
    verified_email: bool,
    name: Option<String>,
}

impl GoogleUser {
    /// Only a verified address may stand in for an identity; it can link to an existing account.
    fn into_identity(self) -> Result<OAuthIdentity, AppError> {
        let email = self
            .email
            .filter(|e| !e.is_empty())
            .ok_or_else(|| AppError::AuthError("Google did not share an email address".to_string()))?;
        if !self.verified_email {
            return Err(AppError::AuthError(
                "Google account email is not verified".to_string(),
            ));
        }
        let login = self
            .name
            .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());

        Ok(OAuthIdentity {
            provider: ProviderKind::Google,
            provider_id: self.id,
            email,
            login,
        })
    }
}

#[async_trait]
impl OAuthProvider for Google {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Google
    }

    fn authorize_url(&self, state: &str, redirect_uri: &str) -> Result<String, AppError> {
        build_authorize_url(
            "https://accounts.google.com/o/oauth2/v2/auth",
            &self.client.client_id,
            redirect_uri,
            "email profile",
            state,
        )
    }

    async fn exchange(
        &self,
        http: &reqwest::Client,
        code: &str,
        redirect_uri: &str,
    ) -> Result<OAuthIdentity, AppError> {
        let kind = self.kind();
        let token = exchange_code(
            http,
            kind,
            "https://oauth2.googleapis.com/token",
            &self.client,
            code,
            redirect_uri,
        )
        .await?;

        let user: GoogleUser =
            get_json(http, kind, "https://www.googleapis.com/oauth2/v2/userinfo", &token).await?;
        user.into_identity()
    }
}

// --- GitHub ---

pub struct GitHub {
    client: OAuthClientConfig,
}

#[derive(Debug, Deserialize)]
struct GitHubUser {
    id: i64,
    login: String,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubEmail {
    email: String,
    primary: bool,
    verified: bool,
}

#[async_trait]
impl OAuthProvider for GitHub {
    fn kind(&self) -> ProviderKind {
        ProviderKind::GitHub
    }

    fn authorize_url(&self, state: &str, redirect_uri: &str) -> Result<String, AppError> {
        build_authorize_url(
            "https://github.com/login/oauth/authorize",
            &self.client.client_id,
            redirect_uri,
            "user:email",
            state,
        )
    }

    async fn exchange(
        &self,
        http: &reqwest::Client,
        code: &str,
        redirect_uri: &str,
    ) -> Result<OAuthIdentity, AppError> {
        let kind = self.kind();
        let token = exchange_code(
            http,
            kind,
            "https://github.com/login/oauth/access_token",
            &self.client,
            code,
            redirect_uri,
        )
        .await?;

        let user: GitHubUser = get_json(http, kind, "https://api.github.com/user", &token).await?;

        // Private emails are missing from /user; fall back to the primary verified one.
        let email = match user.email.filter(|e| !e.is_empty()) {
            Some(email) => email,
            None => {
                let emails: Vec<GitHubEmail> =
                    get_json(http, kind, "https://api.github.com/user/emails", &token).await?;
                emails
                    .into_iter()
                    .find(|e| e.primary && e.verified)
                    .map(|e| e.email)
                    .ok_or_else(|| {
                        AppError::AuthError("GitHub account has no verified email".to_string())
                    })?
            }
        };

        Ok(OAuthIdentity {
            provider: kind,
            provider_id: user.id.to_string(),
            email,
            login: user.login,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OAuthClientConfig {
        OAuthClientConfig {
            client_id: "abc".into(),
            client_secret: "shh".into(),
        }
    }

    #[test]
    fn provider_names_parse() {
        assert_eq!("google".parse::<ProviderKind>().unwrap(), ProviderKind::Google);
        assert_eq!("github".parse::<ProviderKind>().unwrap(), ProviderKind::GitHub);
        assert!("facebook".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn github_authorize_url_carries_state_and_redirect() {
        let github = GitHub { client: client() };
        let url = github
            .authorize_url("xyz", "http://localhost:8081/api/auth/github/callback")
            .unwrap();
        let parsed = Url::parse(&url).unwrap();
        let pairs: Vec<(String, String)> = parsed.query_pairs().into_owned().collect();

        assert_eq!(parsed.host_str(), Some("github.com"));
        assert!(pairs.contains(&("client_id".into(), "abc".into())));
        assert!(pairs.contains(&("state".into(), "xyz".into())));
        assert!(pairs.contains(&("scope".into(), "user:email".into())));
        assert!(pairs.contains(&(
            "redirect_uri".into(),
            "http://localhost:8081/api/auth/github/callback".into()
        )));
        assert!(!url.contains("shh"));
    }

    #[test]
    fn google_authorize_url_requests_code() {
        let google = Google { client: client() };
        let url = google.authorize_url("s", "http://x/cb").unwrap();
        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("response_type=code"));
    }

    fn google_user(json: &str) -> GoogleUser {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn google_verified_email_becomes_identity() {
        let user = google_user(
            r#"{"id": "1089", "email": "ann@forum.test", "verified_email": true, "name": "Ann"}"#,
        );

        let identity = user.into_identity().unwrap();
        assert_eq!(identity.provider, ProviderKind::Google);
        assert_eq!(identity.provider_id, "1089");
        assert_eq!(identity.email, "ann@forum.test");
        assert_eq!(identity.login, "Ann");
    }

    #[test]
    fn google_unverified_email_is_refused() {
        let unverified = google_user(
            r#"{"id": "1089", "email": "ann@forum.test", "verified_email": false}"#,
        );
        assert!(matches!(unverified.into_identity(), Err(AppError::AuthError(_))));

        // Missing flag counts as unverified
        let silent = google_user(r#"{"id": "1089", "email": "ann@forum.test"}"#);
        assert!(matches!(silent.into_identity(), Err(AppError::AuthError(_))));
    }

    #[test]
    fn google_login_falls_back_to_email_local_part() {
        let user = google_user(r#"{"id": "7", "email": "bob@forum.test", "verified_email": true}"#);
        assert_eq!(user.into_identity().unwrap().login, "bob");
    }
}
