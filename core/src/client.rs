//! The Mediative API client: credentials, session, and the CRUD operations.
//!
//! # Design
//! `ApiClient` holds the developer key pair, the working domain, the session
//! token, and a transport handle it recreates before every logical request
//! (one transport configuration per call, no connection reuse). Each
//! operation shapes a `HttpRequest`, hands it to the transport, and unwraps
//! the service's `{response: {...}}` envelope. Methods take `&mut self` and
//! the type is not safe for concurrent use; callers wanting parallel
//! requests use one client per caller.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportFactory};
use crate::params::{encode_query, merge_options, value_segment, Options, Params};
use crate::transport::UreqFactory;

/// Where the authentication endpoint lives.
pub const API_BASE: &str = "https://api.omi.tv/";

/// Protocol version announced in the `X-Requested-Version` header.
pub const VERSION: u32 = 1;

const EXT: &str = ".json";
const CLIENT_NAME: &str = "MediativeApi";

/// Dotted hostname labels plus a 2-5 letter TLD; no scheme, port, or path.
static DOMAIN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-zA-Z0-9_-]+\.)*[a-zA-Z0-9_-]+\.[a-zA-Z]{2,5}$").expect("valid regex")
});

/// A resource path that already carries an id segment, like `medias/42`.
static RESOURCE_WITH_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\w+/\d+$").expect("valid regex"));

/// Captures the bare resource name, dropping an optional `/id` suffix.
static RESOURCE_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\w+)(/\d+)?$").expect("valid regex"));

/// Client for the Mediative REST API.
///
/// Construct with [`ApiClient::new`], call [`auth`](ApiClient::auth) to
/// obtain a session token, then issue `get`/`post`/`put`/`delete` calls
/// against named resources. Setters are chainable.
pub struct ApiClient {
    public_key: String,
    secret_key: String,
    domain: String,
    token: Option<String>,
    secure: bool,
    transport: Option<Box<dyn Transport>>,
    factory: Box<dyn TransportFactory>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("public_key", &self.public_key)
            .field("secret_key", &self.secret_key)
            .field("domain", &self.domain)
            .field("token", &self.token)
            .field("secure", &self.secure)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default, Deserialize)]
struct AuthEnvelope {
    auth: Option<AuthSection>,
}

#[derive(Debug, Default, Deserialize)]
struct AuthSection {
    token: Option<AuthTokenHolder>,
}

#[derive(Debug, Default, Deserialize)]
struct AuthTokenHolder {
    token: Option<String>,
}

impl ApiClient {
    /// Create a client from a developer key pair and a working domain.
    ///
    /// The domain is the bare hostname requests are made against, without
    /// protocol or path (like `demo.omi.tv`).
    pub fn new(public: &str, secret: &str, domain: &str) -> Result<Self, ApiError> {
        let mut client = Self {
            public_key: String::new(),
            secret_key: String::new(),
            domain: String::new(),
            token: None,
            secure: true,
            transport: None,
            factory: Box::new(UreqFactory),
        };
        client.set_public(public)?;
        client.set_secret(secret)?;
        client.set_domain(domain)?;
        Ok(client)
    }

    /// Replace the transport factory.
    ///
    /// This is how an embedder supplies its own HTTP stack, and how tests
    /// substitute a scripted transport. Any held transport handle is
    /// dropped so the next operation goes through the new factory.
    pub fn with_transport_factory(mut self, factory: Box<dyn TransportFactory>) -> Self {
        self.factory = factory;
        self.transport = None;
        self
    }

    /// Set the public developer key.
    pub fn set_public(&mut self, public: &str) -> Result<&mut Self, ApiError> {
        if public.is_empty() {
            return Err(ApiError::Config("provide your public developer key".into()));
        }
        self.public_key = public.to_string();
        Ok(self)
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// Set the secret developer key.
    pub fn set_secret(&mut self, secret: &str) -> Result<&mut Self, ApiError> {
        if secret.is_empty() {
            return Err(ApiError::Config("provide your secret developer key".into()));
        }
        self.secret_key = secret.to_string();
        Ok(self)
    }

    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    /// Set the working domain (bare hostname, no protocol or path).
    pub fn set_domain(&mut self, domain: &str) -> Result<&mut Self, ApiError> {
        if domain.is_empty() {
            return Err(ApiError::Config("provide the domain to work on".into()));
        }
        if !DOMAIN_RE.is_match(domain) {
            return Err(ApiError::Config(
                "provide the domain without path and protocol".into(),
            ));
        }
        self.domain = domain.to_string();
        Ok(self)
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Inject a session token obtained elsewhere.
    pub fn set_token(&mut self, token: &str) -> Result<&mut Self, ApiError> {
        if token.is_empty() {
            return Err(ApiError::Config("provide the token given by the API".into()));
        }
        self.token = Some(token.to_string());
        Ok(self)
    }

    /// The current session token; fails until `auth()` or `set_token()` has
    /// set one.
    pub fn token(&self) -> Result<&str, ApiError> {
        self.token.as_deref().ok_or(ApiError::Session)
    }

    /// Re-enable TLS peer verification for future transports (the default).
    pub fn enable_secure(&mut self) -> &mut Self {
        self.secure = true;
        self
    }

    /// Disable TLS peer verification for future transports, allowing
    /// self-signed certificates. Takes effect on the next operation.
    pub fn disable_secure(&mut self) -> &mut Self {
        self.secure = false;
        self
    }

    /// Drop the transport handle. Idempotent.
    pub fn close(&mut self) -> &mut Self {
        self.transport = None;
        self
    }

    /// Replace the transport handle with a freshly configured one.
    ///
    /// Called at the top of every network operation, so each logical
    /// request gets its own transport carrying the current secure flag.
    pub fn reset(&mut self) -> &mut Self {
        self.close();
        self.transport = Some(self.factory.create(self.secure));
        self
    }

    /// Log in against the central API and store the session token.
    ///
    /// Sends the developer key pair as HTTP Basic auth to
    /// `{API_BASE}api/login.json?domain={domain}`. A response without the
    /// `auth.token.token` path (or an unparseable body) is an invalid
    /// developer login.
    pub fn auth(&mut self) -> Result<&mut Self, ApiError> {
        self.reset();
        let mut query = Options::new();
        query.insert("domain".to_string(), Value::String(self.domain.clone()));
        let url = format!(
            "{}/api/login{EXT}?{}",
            API_BASE.trim_end_matches('/'),
            encode_query(&query)
        );
        let request = HttpRequest {
            method: HttpMethod::Get,
            url,
            headers: vec![
                ("X-Requested-With".to_string(), CLIENT_NAME.to_string()),
                ("X-Requested-Version".to_string(), VERSION.to_string()),
            ],
            body: None,
            basic_auth: Some((self.public_key.clone(), self.secret_key.clone())),
        };
        let response = self.execute(&request)?;
        let envelope: AuthEnvelope = serde_json::from_str(&response.body).unwrap_or_default();
        match envelope
            .auth
            .and_then(|auth| auth.token)
            .and_then(|holder| holder.token)
        {
            Some(token) if !token.is_empty() => {
                log::debug!("session token acquired for {}", self.domain);
                self.set_token(&token)?;
            }
            _ => return Err(ApiError::Auth),
        }
        Ok(self)
    }

    /// GET a resource, with id auto-mapping and shortcut unwrap enabled.
    pub fn get(&mut self, resource: &str, params: Params) -> Result<Value, ApiError> {
        self.get_with(resource, params, true, true)
    }

    /// GET a resource.
    ///
    /// With `auto_map`, a bare id or an `id` key in the options moves onto
    /// the URL path (`medias` + id 42 becomes `medias/42`). With
    /// `shortcut`, a `response` field named after the resource is returned
    /// directly instead of the whole envelope payload.
    pub fn get_with(
        &mut self,
        resource: &str,
        params: Params,
        auto_map: bool,
        shortcut: bool,
    ) -> Result<Value, ApiError> {
        self.reset();
        let session = self.session_options()?;
        let (id_segment, options) = params.split_id(auto_map);
        let path = match id_segment {
            Some(id) => format!("{resource}/{id}"),
            None => resource.to_string(),
        };
        let options = merge_options(options, session);
        self.request_resource(HttpMethod::Get, &path, &options, None, shortcut)
    }

    /// POST `data` to a resource, with `options` on the query string.
    pub fn post(
        &mut self,
        resource: &str,
        data: Options,
        options: Options,
    ) -> Result<Value, ApiError> {
        self.reset();
        let session = self.session_options()?;
        let options = merge_options(options, session);
        let body = Value::Object(data).to_string();
        self.request_resource(HttpMethod::Post, resource, &options, Some(body), true)
    }

    /// PUT `data` to a resource, requiring a resolvable id.
    pub fn put(&mut self, resource: &str, data: Options) -> Result<Value, ApiError> {
        self.put_with(resource, data, Options::new(), true, true)
    }

    /// PUT `data` to a resource.
    ///
    /// Unless the resource path already carries an id segment, `check`
    /// demands an `id` key in `data` and `auto_map` moves it onto the path.
    pub fn put_with(
        &mut self,
        resource: &str,
        data: Options,
        options: Options,
        check: bool,
        auto_map: bool,
    ) -> Result<Value, ApiError> {
        self.reset();
        let session = self.session_options()?;
        let has_id_segment = RESOURCE_WITH_ID_RE.is_match(resource);
        if !has_id_segment && !data.contains_key("id") && check {
            return Err(ApiError::Validation);
        }
        let path = match data.get("id") {
            Some(id) if !has_id_segment && auto_map => {
                format!("{resource}/{}", value_segment(id))
            }
            _ => resource.to_string(),
        };
        let options = merge_options(options, session);
        let body = Value::Object(data).to_string();
        self.request_resource(HttpMethod::Put, &path, &options, Some(body), true)
    }

    /// DELETE a resource, with id auto-mapping enabled.
    pub fn delete(&mut self, resource: &str, params: Params) -> Result<Value, ApiError> {
        self.delete_with(resource, params, true)
    }

    /// DELETE a resource, mapping ids onto the path like `get` does.
    pub fn delete_with(
        &mut self,
        resource: &str,
        params: Params,
        auto_map: bool,
    ) -> Result<Value, ApiError> {
        self.reset();
        let session = self.session_options()?;
        let (id_segment, options) = params.split_id(auto_map);
        let path = match id_segment {
            Some(id) => format!("{resource}/{id}"),
            None => resource.to_string(),
        };
        let options = merge_options(options, session);
        self.request_resource(HttpMethod::Delete, &path, &options, None, true)
    }

    /// The `{token, d}` pair appended to every resource request; the
    /// session gate for all data operations.
    fn session_options(&self) -> Result<Options, ApiError> {
        let token = self.token()?;
        let mut options = Options::new();
        options.insert("token".to_string(), Value::String(token.to_string()));
        options.insert("d".to_string(), Value::String(self.domain.clone()));
        Ok(options)
    }

    fn resource_url(&self, path: &str, options: &Options) -> String {
        let mut url = format!("https://{}/{path}{EXT}", self.domain);
        if !options.is_empty() {
            url.push('?');
            url.push_str(&encode_query(options));
        }
        url
    }

    fn request_resource(
        &mut self,
        method: HttpMethod,
        path: &str,
        options: &Options,
        body: Option<String>,
        shortcut: bool,
    ) -> Result<Value, ApiError> {
        let request = HttpRequest {
            method,
            url: self.resource_url(path, options),
            headers: Vec::new(),
            body,
            basic_auth: None,
        };
        let response = self.execute(&request)?;
        unwrap_envelope(path, response, shortcut)
    }

    fn execute(&mut self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        log::debug!("{:?} {}", request.method, request.url);
        let secure = self.secure;
        let factory = &self.factory;
        let transport = self
            .transport
            .get_or_insert_with(|| factory.create(secure));
        Ok(transport.execute(request)?)
    }
}

/// Unwrap the `{response: {...}}` envelope of a resource call.
///
/// A body without the `response` field (including non-JSON bodies) cannot
/// be parsed. When the envelope payload carries a field named exactly after
/// the resource (id segment stripped) and the shortcut applies, that field
/// is returned instead of the whole payload.
fn unwrap_envelope(path: &str, response: HttpResponse, shortcut: bool) -> Result<Value, ApiError> {
    let body: Value = serde_json::from_str(&response.body).unwrap_or(Value::Null);
    let payload = match body.get("response") {
        Some(payload) => payload.clone(),
        None => return Err(ApiError::Parse),
    };
    if shortcut {
        if let Some(named) = payload.get(resource_name(path)) {
            return Ok(named.clone());
        }
    }
    Ok(payload)
}

/// Strip an optional `/id` suffix: `medias/42` names the `medias` resource.
///
/// Paths that do not fit the `name` or `name/id` shape keep their full
/// spelling.
fn resource_name(path: &str) -> &str {
    match RESOURCE_NAME_RE.captures(path) {
        Some(captures) => captures.get(1).map_or(path, |m| m.as_str()),
        None => path,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use super::*;
    use crate::http::TransportFailure;

    #[derive(Default)]
    struct ScriptState {
        requests: Vec<HttpRequest>,
        responses: Vec<Result<HttpResponse, TransportFailure>>,
        created: usize,
        last_secure: Option<bool>,
    }

    struct ScriptedTransport {
        state: Arc<Mutex<ScriptState>>,
    }

    impl Transport for ScriptedTransport {
        fn execute(&mut self, request: &HttpRequest) -> Result<HttpResponse, TransportFailure> {
            let mut state = self.state.lock().unwrap();
            state.requests.push(request.clone());
            if state.responses.is_empty() {
                Ok(HttpResponse {
                    status: 200,
                    body: "{}".to_string(),
                })
            } else {
                state.responses.remove(0)
            }
        }
    }

    struct ScriptedFactory {
        state: Arc<Mutex<ScriptState>>,
    }

    impl TransportFactory for ScriptedFactory {
        fn create(&self, secure: bool) -> Box<dyn Transport> {
            let mut state = self.state.lock().unwrap();
            state.created += 1;
            state.last_secure = Some(secure);
            Box::new(ScriptedTransport {
                state: self.state.clone(),
            })
        }
    }

    fn ok(body: &str) -> Result<HttpResponse, TransportFailure> {
        Ok(HttpResponse {
            status: 200,
            body: body.to_string(),
        })
    }

    fn scripted(
        responses: Vec<Result<HttpResponse, TransportFailure>>,
    ) -> (ApiClient, Arc<Mutex<ScriptState>>) {
        let state = Arc::new(Mutex::new(ScriptState {
            responses,
            ..ScriptState::default()
        }));
        let client = ApiClient::new("pub-key", "secret-key", "demo.omi.tv")
            .unwrap()
            .with_transport_factory(Box::new(ScriptedFactory {
                state: state.clone(),
            }));
        (client, state)
    }

    fn authed(
        responses: Vec<Result<HttpResponse, TransportFailure>>,
    ) -> (ApiClient, Arc<Mutex<ScriptState>>) {
        let (mut client, state) = scripted(responses);
        client.set_token("abc").unwrap();
        (client, state)
    }

    fn options(value: Value) -> Options {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    // --- construction and setters ---

    #[test]
    fn new_accepts_valid_credentials() {
        let client = ApiClient::new("pub", "secret", "demo.omi.tv").unwrap();
        assert_eq!(client.public_key(), "pub");
        assert_eq!(client.secret_key(), "secret");
        assert_eq!(client.domain(), "demo.omi.tv");
    }

    #[test]
    fn new_rejects_empty_arguments() {
        assert!(matches!(
            ApiClient::new("", "secret", "demo.omi.tv"),
            Err(ApiError::Config(_))
        ));
        assert!(matches!(
            ApiClient::new("pub", "", "demo.omi.tv"),
            Err(ApiError::Config(_))
        ));
        assert!(matches!(
            ApiClient::new("pub", "secret", ""),
            Err(ApiError::Config(_))
        ));
    }

    #[test]
    fn new_rejects_domains_with_protocol_or_path() {
        for domain in ["https://demo.omi.tv", "demo.omi.tv/path", "localhost", "demo.omi.television"] {
            assert!(
                matches!(
                    ApiClient::new("pub", "secret", domain),
                    Err(ApiError::Config(_))
                ),
                "{domain} should be rejected"
            );
        }
    }

    #[test]
    fn set_domain_accepts_dashed_subdomains() {
        let mut client = ApiClient::new("pub", "secret", "demo.omi.tv").unwrap();
        client.set_domain("my-site.staging.omi.tv").unwrap();
        assert_eq!(client.domain(), "my-site.staging.omi.tv");
    }

    #[test]
    fn setters_chain() {
        let mut client = ApiClient::new("pub", "secret", "demo.omi.tv").unwrap();
        client
            .set_public("p2")
            .unwrap()
            .set_secret("s2")
            .unwrap()
            .set_token("t2")
            .unwrap();
        assert_eq!(client.public_key(), "p2");
        assert_eq!(client.token().unwrap(), "t2");
    }

    // --- session token ---

    #[test]
    fn token_fails_before_auth() {
        let client = ApiClient::new("pub", "secret", "demo.omi.tv").unwrap();
        assert!(matches!(client.token(), Err(ApiError::Session)));
    }

    #[test]
    fn set_token_rejects_empty() {
        let mut client = ApiClient::new("pub", "secret", "demo.omi.tv").unwrap();
        assert!(matches!(client.set_token(""), Err(ApiError::Config(_))));
    }

    #[test]
    fn data_operations_fail_without_token() {
        let (mut client, state) = scripted(vec![]);
        let err = client.get("medias", Params::None).unwrap_err();
        assert!(matches!(err, ApiError::Session));
        assert!(state.lock().unwrap().requests.is_empty());
    }

    // --- auth ---

    #[test]
    fn auth_stores_token_and_shapes_login_request() {
        let (mut client, state) = scripted(vec![ok(r#"{"auth":{"token":{"token":"abc"}}}"#)]);
        client.auth().unwrap();
        assert_eq!(client.token().unwrap(), "abc");

        let state = state.lock().unwrap();
        let request = &state.requests[0];
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.url, "https://api.omi.tv/api/login.json?domain=demo.omi.tv");
        assert_eq!(
            request.basic_auth,
            Some(("pub-key".to_string(), "secret-key".to_string()))
        );
        assert!(request
            .headers
            .contains(&("X-Requested-With".to_string(), "MediativeApi".to_string())));
        assert!(request
            .headers
            .contains(&("X-Requested-Version".to_string(), "1".to_string())));
    }

    #[test]
    fn auth_fails_without_token_path() {
        let (mut client, _) = scripted(vec![ok(r#"{"error":"nope"}"#)]);
        assert!(matches!(client.auth(), Err(ApiError::Auth)));
    }

    #[test]
    fn auth_fails_on_unparseable_body() {
        let (mut client, _) = scripted(vec![ok("not json")]);
        assert!(matches!(client.auth(), Err(ApiError::Auth)));
    }

    #[test]
    fn auth_fails_on_empty_token() {
        let (mut client, _) = scripted(vec![ok(r#"{"auth":{"token":{"token":""}}}"#)]);
        assert!(matches!(client.auth(), Err(ApiError::Auth)));
    }

    #[test]
    fn auth_propagates_transport_failure() {
        let (mut client, _) = scripted(vec![Err(TransportFailure {
            message: "connection refused".to_string(),
            code: 7,
        })]);
        let err = client.auth().unwrap_err();
        assert!(matches!(err, ApiError::Transport { code: 7, .. }));
    }

    // --- get ---

    #[test]
    fn get_maps_bare_id_onto_path() {
        let (mut client, state) = authed(vec![ok(r#"{"response":{}}"#)]);
        client.get("medias", Params::Id(42)).unwrap();
        let state = state.lock().unwrap();
        assert_eq!(
            state.requests[0].url,
            "https://demo.omi.tv/medias/42.json?d=demo.omi.tv&token=abc"
        );
    }

    #[test]
    fn get_maps_id_key_and_keeps_other_options() {
        let (mut client, state) = authed(vec![ok(r#"{"response":{}}"#)]);
        client
            .get("medias", Params::Options(options(json!({"id": 42, "foo": "bar"}))))
            .unwrap();
        let state = state.lock().unwrap();
        assert_eq!(
            state.requests[0].url,
            "https://demo.omi.tv/medias/42.json?d=demo.omi.tv&foo=bar&token=abc"
        );
    }

    #[test]
    fn get_without_auto_map_keeps_id_key_in_query() {
        let (mut client, state) = authed(vec![ok(r#"{"response":{}}"#)]);
        client
            .get_with("medias", Params::Options(options(json!({"id": 42}))), false, true)
            .unwrap();
        let state = state.lock().unwrap();
        assert_eq!(
            state.requests[0].url,
            "https://demo.omi.tv/medias.json?d=demo.omi.tv&id=42&token=abc"
        );
    }

    #[test]
    fn get_shortcut_unwraps_named_field() {
        let (mut client, _) = authed(vec![ok(r#"{"response":{"Media":{"id":1}}}"#)]);
        let value = client.get("Media", Params::None).unwrap();
        assert_eq!(value, json!({"id": 1}));
    }

    #[test]
    fn get_shortcut_strips_id_segment_for_name() {
        let (mut client, _) = authed(vec![ok(r#"{"response":{"Media":{"id":7}}}"#)]);
        let value = client.get("Media", Params::Id(7)).unwrap();
        assert_eq!(value, json!({"id": 7}));
    }

    #[test]
    fn get_without_shortcut_returns_whole_payload() {
        let (mut client, _) = authed(vec![ok(r#"{"response":{"Media":{"id":1}}}"#)]);
        let value = client
            .get_with("Media", Params::None, true, false)
            .unwrap();
        assert_eq!(value, json!({"Media": {"id": 1}}));
    }

    #[test]
    fn get_falls_back_on_name_mismatch() {
        let (mut client, _) = authed(vec![ok(r#"{"response":{"other":1}}"#)]);
        let value = client.get("medias", Params::None).unwrap();
        assert_eq!(value, json!({"other": 1}));
    }

    #[test]
    fn get_fails_without_response_envelope() {
        let (mut client, _) = authed(vec![ok(r#"{"status":"ok"}"#)]);
        assert!(matches!(
            client.get("medias", Params::None),
            Err(ApiError::Parse)
        ));
    }

    #[test]
    fn get_fails_on_non_json_body() {
        let (mut client, _) = authed(vec![ok("<html>busy</html>")]);
        assert!(matches!(
            client.get("medias", Params::None),
            Err(ApiError::Parse)
        ));
    }

    #[test]
    fn transport_failure_skips_body_parsing() {
        let (mut client, state) = authed(vec![
            Err(TransportFailure {
                message: "tls handshake failed".to_string(),
                code: 35,
            }),
            ok(r#"{"response":{}}"#),
        ]);
        let err = client.get("medias", Params::None).unwrap_err();
        assert!(matches!(err, ApiError::Transport { code: 35, .. }));
        // The scripted success response was never consumed.
        assert_eq!(state.lock().unwrap().responses.len(), 1);
    }

    // --- post ---

    #[test]
    fn post_sends_data_as_json_body() {
        let (mut client, state) = authed(vec![ok(r#"{"response":{"Media":{"id":9}}}"#)]);
        let value = client
            .post("medias", options(json!({"title": "test api"})), Options::new())
            .unwrap();
        assert_eq!(value, json!({"Media": {"id": 9}}));

        let state = state.lock().unwrap();
        let request = &state.requests[0];
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(
            request.url,
            "https://demo.omi.tv/medias.json?d=demo.omi.tv&token=abc"
        );
        let body: Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"title": "test api"}));
    }

    #[test]
    fn post_unwraps_matching_resource_name() {
        let (mut client, _) = authed(vec![ok(r#"{"response":{"Media":{"id":1}}}"#)]);
        let value = client.post("Media", Options::new(), Options::new()).unwrap();
        assert_eq!(value, json!({"id": 1}));
    }

    #[test]
    fn post_keeps_options_on_query_string() {
        let (mut client, state) = authed(vec![ok(r#"{"response":{}}"#)]);
        client
            .post(
                "medias",
                Options::new(),
                options(json!({"notify": true})),
            )
            .unwrap();
        let state = state.lock().unwrap();
        assert_eq!(
            state.requests[0].url,
            "https://demo.omi.tv/medias.json?d=demo.omi.tv&notify=true&token=abc"
        );
    }

    // --- put ---

    #[test]
    fn put_requires_an_id() {
        let (mut client, state) = authed(vec![]);
        let err = client
            .put("medias", options(json!({"title": "x"})))
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation));
        assert!(state.lock().unwrap().requests.is_empty());
    }

    #[test]
    fn put_maps_data_id_onto_path() {
        let (mut client, state) = authed(vec![ok(r#"{"response":{}}"#)]);
        client
            .put("medias", options(json!({"id": 7, "title": "x"})))
            .unwrap();
        let state = state.lock().unwrap();
        let request = &state.requests[0];
        assert_eq!(request.method, HttpMethod::Put);
        assert_eq!(
            request.url,
            "https://demo.omi.tv/medias/7.json?d=demo.omi.tv&token=abc"
        );
        let body: Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"id": 7, "title": "x"}));
    }

    #[test]
    fn put_accepts_resource_with_id_segment() {
        let (mut client, state) = authed(vec![ok(r#"{"response":{}}"#)]);
        client
            .put("medias/7", options(json!({"title": "x"})))
            .unwrap();
        let state = state.lock().unwrap();
        assert_eq!(
            state.requests[0].url,
            "https://demo.omi.tv/medias/7.json?d=demo.omi.tv&token=abc"
        );
    }

    #[test]
    fn put_without_check_skips_id_requirement() {
        let (mut client, state) = authed(vec![ok(r#"{"response":{}}"#)]);
        client
            .put_with(
                "medias",
                options(json!({"title": "x"})),
                Options::new(),
                false,
                true,
            )
            .unwrap();
        let state = state.lock().unwrap();
        assert_eq!(
            state.requests[0].url,
            "https://demo.omi.tv/medias.json?d=demo.omi.tv&token=abc"
        );
    }

    #[test]
    fn put_without_auto_map_keeps_path() {
        let (mut client, state) = authed(vec![ok(r#"{"response":{}}"#)]);
        client
            .put_with(
                "medias",
                options(json!({"id": 7})),
                Options::new(),
                true,
                false,
            )
            .unwrap();
        let state = state.lock().unwrap();
        assert_eq!(
            state.requests[0].url,
            "https://demo.omi.tv/medias.json?d=demo.omi.tv&token=abc"
        );
    }

    // --- delete ---

    #[test]
    fn delete_maps_bare_id_onto_path() {
        let (mut client, state) = authed(vec![ok(r#"{"response":{}}"#)]);
        client.delete("medias", Params::Id(42)).unwrap();
        let state = state.lock().unwrap();
        let request = &state.requests[0];
        assert_eq!(request.method, HttpMethod::Delete);
        assert_eq!(
            request.url,
            "https://demo.omi.tv/medias/42.json?d=demo.omi.tv&token=abc"
        );
        assert!(request.body.is_none());
    }

    #[test]
    fn delete_maps_id_key_onto_path() {
        let (mut client, state) = authed(vec![ok(r#"{"response":{}}"#)]);
        client
            .delete("medias", Params::Options(options(json!({"id": 3}))))
            .unwrap();
        let state = state.lock().unwrap();
        assert_eq!(
            state.requests[0].url,
            "https://demo.omi.tv/medias/3.json?d=demo.omi.tv&token=abc"
        );
    }

    // --- transport lifecycle ---

    #[test]
    fn every_operation_gets_a_fresh_transport() {
        let (mut client, state) = authed(vec![
            ok(r#"{"response":{}}"#),
            ok(r#"{"response":{}}"#),
        ]);
        client.get("medias", Params::None).unwrap();
        client.get("medias", Params::None).unwrap();
        assert_eq!(state.lock().unwrap().created, 2);
    }

    #[test]
    fn disable_secure_reaches_the_factory() {
        let (mut client, state) = authed(vec![ok(r#"{"response":{}}"#)]);
        client.disable_secure();
        client.get("medias", Params::None).unwrap();
        assert_eq!(state.lock().unwrap().last_secure, Some(false));
    }

    #[test]
    fn enable_secure_restores_verification() {
        let (mut client, state) = authed(vec![
            ok(r#"{"response":{}}"#),
            ok(r#"{"response":{}}"#),
        ]);
        client.disable_secure();
        client.get("medias", Params::None).unwrap();
        client.enable_secure();
        client.get("medias", Params::None).unwrap();
        assert_eq!(state.lock().unwrap().last_secure, Some(true));
    }

    #[test]
    fn close_is_idempotent() {
        let mut client = ApiClient::new("pub", "secret", "demo.omi.tv").unwrap();
        client.close().close();
    }

    // --- resource name ---

    #[test]
    fn resource_name_strips_id_segment() {
        assert_eq!(resource_name("medias"), "medias");
        assert_eq!(resource_name("medias/42"), "medias");
        assert_eq!(resource_name("a/b"), "a/b");
    }
}
