//! Authentication gateway client and local session
//!
//! The gateway is a remote HTTP service; only its request/response contract
//! matters here. Responses are translated into [`UserProfile`] by
//! [`user_from_payload`], and the resulting session is persisted in the
//! entity store under the `user` and `token` keys.

use miette::Diagnostic;
use reqwest::blocking::{Client, Response};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::core::store::{EntityStore, KeyValueBackend, StoreError};
use crate::core::validation::{validate_login_form, validate_register_form, FormError};
use crate::entities::UserProfile;

/// Store key of the signed-in profile
pub const USER_KEY: &str = "user";

/// Store key of the bearer token
pub const TOKEN_KEY: &str = "token";

/// Code accepted by account verification
pub const VERIFICATION_CODE: &str = "123456";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Gateway response that does not have the expected shape
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum PayloadError {
    #[error("user payload is not a JSON object")]
    #[diagnostic(code(telconova::auth::payload))]
    NotAnObject,

    #[error("user payload is missing '{0}'")]
    #[diagnostic(code(telconova::auth::payload))]
    Missing(&'static str),

    #[error("user payload field '{0}' has the wrong type")]
    #[diagnostic(code(telconova::auth::payload))]
    WrongType(&'static str),
}

/// Errors from talking to the authentication gateway
#[derive(Debug, Error, Diagnostic)]
pub enum AuthError {
    #[error("gateway rejected the credentials")]
    #[diagnostic(code(telconova::auth::credentials))]
    InvalidCredentials,

    #[error("gateway rejected the request: {message}")]
    #[diagnostic(code(telconova::auth::rejected))]
    Rejected { message: String },

    #[error("could not reach the gateway: {0}")]
    #[diagnostic(
        code(telconova::auth::connection),
        help("check api_url in .telconova/config.yaml or TELCONOVA_API_URL")
    )]
    Connection(#[source] reqwest::Error),

    #[error("unexpected gateway response: {0}")]
    #[diagnostic(code(telconova::auth::malformed))]
    Malformed(#[from] PayloadError),
}

impl AuthError {
    /// Message shown to the agent
    pub fn user_message(&self) -> &str {
        match self {
            AuthError::InvalidCredentials => "Credenciales inválidas",
            AuthError::Rejected { message } => message.as_str(),
            AuthError::Connection(_) => "Error de conexión con el servidor",
            AuthError::Malformed(_) => "Respuesta inválida del servidor",
        }
    }
}

/// Registration request as the gateway expects it
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    #[serde(rename = "nombre")]
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "numero_iden")]
    pub identification: String,
}

/// Result of a successful login or registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthGrant {
    pub user: UserProfile,
    /// Registration may not issue a token
    pub token: Option<String>,
}

/// Operations offered by the authentication gateway
pub trait AuthGateway {
    fn login(&self, email: &str, password: &str) -> Result<AuthGrant, AuthError>;

    fn register(&self, registration: &Registration) -> Result<AuthGrant, AuthError>;

    /// Current profile for a bearer token
    fn me(&self, token: &str) -> Result<UserProfile, AuthError>;
}

/// Build a [`UserProfile`] from a gateway user object
///
/// Accepts `id` as a string or a number, and both the Spanish (`nombre`,
/// `rol`) and English (`name`, `role`) field spellings. A missing role is
/// stored as an empty string.
pub fn user_from_payload(payload: &Value) -> Result<UserProfile, PayloadError> {
    let object = payload.as_object().ok_or(PayloadError::NotAnObject)?;

    let id = match object.get("id") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(_)) | None | Some(Value::Null) => return Err(PayloadError::Missing("id")),
        Some(_) => return Err(PayloadError::WrongType("id")),
    };

    let text = |keys: &[&'static str]| -> Result<Option<String>, PayloadError> {
        for &key in keys {
            match object.get(key) {
                Some(Value::String(s)) => return Ok(Some(s.clone())),
                Some(Value::Null) | None => continue,
                Some(_) => return Err(PayloadError::WrongType(key)),
            }
        }
        Ok(None)
    };

    let name = text(&["nombre", "name"])?.ok_or(PayloadError::Missing("nombre"))?;
    let email = text(&["email"])?.ok_or(PayloadError::Missing("email"))?;
    let role = text(&["rol", "role"])?.unwrap_or_default();

    Ok(UserProfile {
        id,
        name,
        email,
        role,
    })
}

fn token_from_payload(payload: &Value) -> Result<Option<String>, PayloadError> {
    match payload.get("accessToken") {
        Some(Value::String(token)) => Ok(Some(token.clone())),
        Some(Value::Null) | None => Ok(None),
        Some(_) => Err(PayloadError::WrongType("accessToken")),
    }
}

fn server_message(body: &Value) -> Option<String> {
    body.get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string)
}

/// Gateway reached over HTTP with a blocking client
#[derive(Debug, Clone)]
pub struct HttpAuthGateway {
    http: Client,
    base_url: String,
}

impl HttpAuthGateway {
    pub fn new(base_url: impl Into<String>) -> Result<Self, AuthError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("telconova/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(AuthError::Connection)?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Read the status and JSON body; an empty or non-JSON body becomes `null`
    fn read(response: Response) -> Result<(bool, u16, Value), AuthError> {
        let status = response.status();
        let text = response.text().map_err(AuthError::Connection)?;
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        tracing::debug!(status = status.as_u16(), "gateway responded");
        Ok((status.is_success(), status.as_u16(), body))
    }
}

impl AuthGateway for HttpAuthGateway {
    fn login(&self, email: &str, password: &str) -> Result<AuthGrant, AuthError> {
        let url = self.url("auth/login");
        tracing::debug!(%url, "login request");

        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .map_err(AuthError::Connection)?;

        let (ok, _, body) = Self::read(response)?;
        if !ok {
            return Err(match server_message(&body) {
                Some(message) => AuthError::Rejected { message },
                None => AuthError::InvalidCredentials,
            });
        }

        let token = token_from_payload(&body)?.ok_or(PayloadError::Missing("accessToken"))?;
        let user = user_from_payload(body.get("user").unwrap_or(&Value::Null))?;
        Ok(AuthGrant {
            user,
            token: Some(token),
        })
    }

    fn register(&self, registration: &Registration) -> Result<AuthGrant, AuthError> {
        let url = self.url("auth/register");
        tracing::debug!(%url, "register request");

        let response = self
            .http
            .post(&url)
            .json(registration)
            .send()
            .map_err(AuthError::Connection)?;

        let (ok, _, body) = Self::read(response)?;
        if !ok {
            return Err(AuthError::Rejected {
                message: server_message(&body)
                    .unwrap_or_else(|| "No se pudo completar el registro".to_string()),
            });
        }

        // Either `{accessToken, user}` or the bare user object
        let user_payload = body.get("user").unwrap_or(&body);
        Ok(AuthGrant {
            user: user_from_payload(user_payload)?,
            token: token_from_payload(&body)?,
        })
    }

    fn me(&self, token: &str) -> Result<UserProfile, AuthError> {
        let url = self.url("auth/me");
        tracing::debug!(%url, "profile request");

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .map_err(AuthError::Connection)?;

        let (ok, status, body) = Self::read(response)?;
        if !ok {
            return Err(match server_message(&body) {
                Some(message) => AuthError::Rejected { message },
                None if status == 401 => AuthError::InvalidCredentials,
                None => AuthError::Rejected {
                    message: "Sesión inválida o expirada".to_string(),
                },
            });
        }

        let user_payload = body.get("user").unwrap_or(&body);
        Ok(user_from_payload(user_payload)?)
    }
}

/// Errors from session operations
#[derive(Debug, Error, Diagnostic)]
pub enum SessionError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Invalid(#[from] FormError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("no active session")]
    #[diagnostic(code(telconova::auth::signed_out), help("run 'telconova auth login' first"))]
    SignedOut,
}

/// The locally persisted authentication state
pub struct Session<'s, B: KeyValueBackend> {
    store: &'s mut EntityStore<B>,
}

impl<'s, B: KeyValueBackend> Session<'s, B> {
    pub fn open(store: &'s mut EntityStore<B>) -> Self {
        Self { store }
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.store.read_opt(USER_KEY)
    }

    pub fn token(&self) -> Option<String> {
        self.store.read_opt(TOKEN_KEY)
    }

    fn persist(&mut self, grant: &AuthGrant) -> Result<(), StoreError> {
        self.store.write(USER_KEY, &grant.user)?;
        match &grant.token {
            Some(token) => self.store.write(TOKEN_KEY, token),
            None => self.store.remove(TOKEN_KEY),
        }
    }

    /// Validate, authenticate and persist the resulting session
    pub fn login(
        &mut self,
        gateway: &impl AuthGateway,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, SessionError> {
        validate_login_form(email, password).into_result("login")?;

        let grant = gateway.login(email.trim(), password)?;
        self.persist(&grant)?;
        tracing::info!(user = %grant.user.id, "signed in");
        Ok(grant.user)
    }

    /// Validate, register and persist the new account's session
    pub fn register(
        &mut self,
        gateway: &impl AuthGateway,
        registration: &Registration,
    ) -> Result<UserProfile, SessionError> {
        validate_register_form(
            &registration.name,
            &registration.identification,
            &registration.email,
            &registration.password,
        )
        .into_result("register")?;

        let grant = gateway.register(registration)?;
        self.persist(&grant)?;
        tracing::info!(user = %grant.user.id, "registered");
        Ok(grant.user)
    }

    /// Refresh the stored profile from the gateway
    pub fn refresh(&mut self, gateway: &impl AuthGateway) -> Result<UserProfile, SessionError> {
        let token = self.token().ok_or(SessionError::SignedOut)?;
        let user = gateway.me(&token)?;
        self.store.write(USER_KEY, &user)?;
        Ok(user)
    }

    /// Forget the session; signing out twice is fine
    pub fn logout(&mut self) -> Result<(), StoreError> {
        self.store.remove(USER_KEY)?;
        self.store.remove(TOKEN_KEY)
    }
}

/// Check an account verification code
pub fn verify_code(code: &str) -> bool {
    code.trim() == VERIFICATION_CODE
}
