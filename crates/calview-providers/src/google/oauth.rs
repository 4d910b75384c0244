//! OAuth 2.0 authorization code flow with PKCE and a loopback redirect.
//!
//! 1. Generate a code verifier, its SHA-256 challenge and a random state
//! 2. Bind a local HTTP listener on the first free port in the range
//! 3. Open the browser on Google's consent page
//! 4. Receive the redirect carrying the authorization code
//! 5. Exchange the code (with the verifier) for an access token
//!
//! Only the access token is kept, in memory, for the current session.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::time::{Duration, Instant};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng as _;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ProviderError, ProviderResult};
use crate::provider::{AccessToken, Authorizer, BoxFuture};

use super::config::{GoogleConfig, OAuthCredentials};

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Verifier length in bytes, before base64 encoding.
const CODE_VERIFIER_LENGTH: usize = 32;

/// How long the user has to complete the consent screen.
const CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

const SUCCESS_PAGE: &str = "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n\
    <html><body><h1>Signed in</h1>\
    <p>You can close this window and return to the terminal.</p></body></html>";

const FAILURE_PAGE: &str = "HTTP/1.1 400 Bad Request\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n\
    <html><body><h1>Sign-in failed</h1>\
    <p>You can close this window.</p></body></html>";

/// Interactive Google authorizer.
#[derive(Debug)]
pub struct OAuthClient {
    credentials: OAuthCredentials,
    scopes: Vec<String>,
    port_range: (u16, u16),
    token_url: String,
    open_browser: bool,
    http_client: reqwest::Client,
}

impl OAuthClient {
    /// Creates a client from the provider configuration.
    ///
    /// # Errors
    ///
    /// Fails when the configuration carries no OAuth credentials.
    pub fn new(config: &GoogleConfig) -> ProviderResult<Self> {
        let credentials = config.credentials.clone().ok_or_else(|| {
            ProviderError::configuration(
                "no Google OAuth client id configured (set [google] client_id or pass --token)",
            )
        })?;
        credentials.validate()?;

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                ProviderError::configuration(format!("failed to create HTTP client: {}", e))
                    .with_source(e)
            })?;

        Ok(Self {
            credentials,
            scopes: config.scopes.clone(),
            port_range: config.loopback_port_range,
            token_url: GOOGLE_TOKEN_URL.to_string(),
            open_browser: true,
            http_client,
        })
    }

    /// Overrides the token endpoint.
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// Prints the consent URL instead of launching a browser.
    pub fn without_browser(mut self) -> Self {
        self.open_browser = false;
        self
    }

    async fn run(&self) -> ProviderResult<AccessToken> {
        let pkce = PkceFlow::new();
        let (listener, port) = bind_loopback(self.port_range)?;
        let redirect_uri = format!("http://127.0.0.1:{}/callback", port);

        let auth_url = pkce.build_auth_url(&self.credentials.client_id, &redirect_uri, &self.scopes)?;
        info!("starting Google sign-in");
        debug!(%auth_url, "authorization URL");

        if !self.open_browser || open::that(auth_url.as_str()).is_err() {
            if self.open_browser {
                warn!("failed to open browser");
            }
            eprintln!("\nOpen this URL in your browser to sign in:\n\n{}\n", auth_url);
        }

        let callback = tokio::task::spawn_blocking(move || wait_for_callback(listener))
            .await
            .map_err(|e| {
                ProviderError::internal(format!("callback listener failed: {}", e)).with_source(e)
            })??;

        if callback.state != pkce.state {
            return Err(ProviderError::authentication("OAuth state mismatch"));
        }

        info!("received authorization code");
        self.exchange_code(&callback.code, &pkce.verifier, &redirect_uri)
            .await
    }

    /// Exchanges an authorization code for an access token.
    pub async fn exchange_code(
        &self,
        code: &str,
        verifier: &str,
        redirect_uri: &str,
    ) -> ProviderResult<AccessToken> {
        let mut params = vec![
            ("client_id", self.credentials.client_id.as_str()),
            ("code", code),
            ("code_verifier", verifier),
            ("grant_type", "authorization_code"),
            ("redirect_uri", redirect_uri),
        ];
        if let Some(secret) = &self.credentials.client_secret {
            params.push(("client_secret", secret.as_str()));
        }

        let response = self
            .http_client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                ProviderError::network(format!("token exchange request failed: {}", e))
                    .with_source(e)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            ProviderError::network(format!("failed to read response: {}", e)).with_source(e)
        })?;

        if !status.is_success() {
            return Err(ProviderError::authentication(format!(
                "token exchange failed ({}): {}",
                status,
                body.trim()
            )));
        }

        let token: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("invalid token response: {}", e))
                .with_source(e)
        })?;

        debug!(expires_in = ?token.expires_in, "obtained access token");
        AccessToken::new(token.access_token)
    }
}

impl Authorizer for OAuthClient {
    fn authorize(&self) -> BoxFuture<'_, ProviderResult<AccessToken>> {
        Box::pin(async move { self.run().await.map_err(|e| e.with_provider("google")) })
    }
}

fn bind_loopback(port_range: (u16, u16)) -> ProviderResult<(TcpListener, u16)> {
    for port in port_range.0..=port_range.1 {
        if let Ok(listener) = TcpListener::bind(("127.0.0.1", port)) {
            debug!(port, "bound loopback listener");
            return Ok((listener, port));
        }
    }
    Err(ProviderError::configuration(format!(
        "no available port in range {}-{}",
        port_range.0, port_range.1
    )))
}

/// What the redirect carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callback {
    /// Authorization code.
    pub code: String,
    /// Echoed CSRF state.
    pub state: String,
}

fn wait_for_callback(listener: TcpListener) -> ProviderResult<Callback> {
    listener.set_nonblocking(true).map_err(|e| {
        ProviderError::internal(format!("failed to configure listener: {}", e)).with_source(e)
    })?;

    let deadline = Instant::now() + CALLBACK_TIMEOUT;
    while Instant::now() < deadline {
        match listener.accept() {
            Ok((stream, _)) => {
                if let Some(result) = handle_connection(stream) {
                    return result;
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                std::thread::sleep(Duration::from_millis(100));
            }
            Err(e) => warn!(error = %e, "failed to accept connection"),
        }
    }
    Err(ProviderError::authentication("timed out waiting for sign-in"))
}

fn handle_connection(mut stream: TcpStream) -> Option<ProviderResult<Callback>> {
    // Accepted sockets may inherit non-blocking mode.
    stream.set_nonblocking(false).ok()?;
    stream.set_read_timeout(Some(Duration::from_secs(5))).ok()?;

    let mut request_line = String::new();
    BufReader::new(&stream).read_line(&mut request_line).ok()?;

    let target = match request_line.split_whitespace().collect::<Vec<_>>().as_slice() {
        ["GET", target, ..] if target.starts_with("/callback") => target.to_string(),
        _ => return None,
    };

    let result = parse_callback(&target);
    let page = if result.is_ok() { SUCCESS_PAGE } else { FAILURE_PAGE };
    let _ = stream.write_all(page.as_bytes());
    let _ = stream.flush();
    Some(result)
}

/// Extracts the code and state from a redirect target such as
/// `/callback?code=...&state=...`.
pub fn parse_callback(target: &str) -> ProviderResult<Callback> {
    let url = Url::parse("http://127.0.0.1")
        .and_then(|base| base.join(target))
        .map_err(|e| ProviderError::authentication(format!("malformed callback: {}", e)))?;

    let mut code = None;
    let mut state = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => {
                return Err(ProviderError::authentication(format!(
                    "authorization denied: {}",
                    value
                )));
            }
            _ => {}
        }
    }

    match code {
        Some(code) if !code.is_empty() => Ok(Callback {
            code,
            state: state.unwrap_or_default(),
        }),
        _ => Err(ProviderError::authentication(
            "missing authorization code in callback",
        )),
    }
}

/// PKCE parameters for one authorization attempt (RFC 7636).
#[derive(Debug)]
pub struct PkceFlow {
    /// The code verifier.
    pub verifier: String,
    /// base64url(SHA-256(verifier)).
    pub challenge: String,
    /// Random CSRF state.
    pub state: String,
}

impl PkceFlow {
    /// Creates a flow with a random verifier and state.
    pub fn new() -> Self {
        let verifier = random_token(CODE_VERIFIER_LENGTH);
        let challenge = Self::compute_challenge(&verifier);
        Self {
            verifier,
            challenge,
            state: random_token(16),
        }
    }

    fn compute_challenge(verifier: &str) -> String {
        URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
    }

    /// Builds Google's consent URL.
    pub fn build_auth_url(
        &self,
        client_id: &str,
        redirect_uri: &str,
        scopes: &[String],
    ) -> ProviderResult<Url> {
        let scope = scopes.join(" ");
        Url::parse_with_params(
            GOOGLE_AUTH_URL,
            &[
                ("client_id", client_id),
                ("redirect_uri", redirect_uri),
                ("response_type", "code"),
                ("scope", scope.as_str()),
                ("code_challenge", self.challenge.as_str()),
                ("code_challenge_method", "S256"),
                ("state", self.state.as_str()),
            ],
        )
        .map_err(|e| ProviderError::internal(format!("failed to build auth URL: {}", e)))
    }
}

impl Default for PkceFlow {
    fn default() -> Self {
        Self::new()
    }
}

fn random_token(len: usize) -> String {
    let mut rng = rand::rng();
    let bytes: Vec<u8> = (0..len).map(|_| rng.random()).collect();
    URL_SAFE_NO_PAD.encode(&bytes)
}

#[derive(Debug, serde::Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CLIENT_ID: &str = "123.apps.googleusercontent.com";

    fn client(token_url: String) -> OAuthClient {
        OAuthClient::new(&GoogleConfig::new(OAuthCredentials::new(CLIENT_ID)))
            .unwrap()
            .with_token_url(token_url)
            .without_browser()
    }

    #[test]
    fn pkce_verifier_length() {
        // 32 bytes base64url without padding
        assert_eq!(PkceFlow::new().verifier.len(), 43);
    }

    #[test]
    fn pkce_challenge_is_deterministic() {
        assert_eq!(
            PkceFlow::compute_challenge("test-verifier"),
            PkceFlow::compute_challenge("test-verifier")
        );
        // RFC 7636 appendix B
        assert_eq!(
            PkceFlow::compute_challenge("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk"),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    #[test]
    fn pkce_state_is_random() {
        assert_ne!(PkceFlow::new().state, PkceFlow::new().state);
    }

    #[test]
    fn auth_url_requests_scopes_and_challenge() {
        let flow = PkceFlow::new();
        let scopes: Vec<String> = GoogleConfig::DEFAULT_SCOPES
            .iter()
            .map(|s| s.to_string())
            .collect();
        let url = flow
            .build_auth_url(CLIENT_ID, "http://127.0.0.1:8080/callback", &scopes)
            .unwrap();

        assert!(url.as_str().starts_with(GOOGLE_AUTH_URL));
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let get = |k: &str| pairs.iter().find(|(key, _)| key == k).map(|(_, v)| v.as_str());

        assert_eq!(get("client_id"), Some(CLIENT_ID));
        assert_eq!(get("code_challenge_method"), Some("S256"));
        assert_eq!(get("code_challenge"), Some(flow.challenge.as_str()));
        assert_eq!(get("state"), Some(flow.state.as_str()));
        assert!(get("scope").unwrap().contains("userinfo.email"));
    }

    #[test]
    fn parses_callback_code_and_state() {
        let callback = parse_callback("/callback?code=4%2F0Abc&state=xyz&scope=a").unwrap();
        assert_eq!(callback.code, "4/0Abc");
        assert_eq!(callback.state, "xyz");
    }

    #[test]
    fn callback_error_is_authentication_failure() {
        let err = parse_callback("/callback?error=access_denied&state=xyz").unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::AuthenticationFailed);
        assert!(err.message().contains("access_denied"));
    }

    #[test]
    fn callback_without_code_fails() {
        assert!(parse_callback("/callback?state=xyz").is_err());
        assert!(parse_callback("/callback").is_err());
    }

    #[test]
    fn requires_credentials() {
        let err = OAuthClient::new(&GoogleConfig::default()).unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::ConfigurationError);
    }

    #[tokio::test]
    async fn exchanges_code_for_access_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code_verifier=verifier"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.fresh",
                "expires_in": 3599,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let token = client(format!("{}/token", server.uri()))
            .exchange_code("code", "verifier", "http://127.0.0.1:8080/callback")
            .await
            .unwrap();
        assert_eq!(token.secret(), "ya29.fresh");
    }

    #[tokio::test]
    async fn rejected_exchange_is_authentication_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string(r#"{"error":"invalid_grant"}"#))
            .mount(&server)
            .await;

        let err = client(format!("{}/token", server.uri()))
            .exchange_code("code", "verifier", "http://127.0.0.1:8080/callback")
            .await
            .unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::AuthenticationFailed);
        assert!(err.message().contains("invalid_grant"));
    }
}
