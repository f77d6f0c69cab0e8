use failure::Fail;
use hawk_auth::{
    AuthConfig, AuthError, Authenticator, Challenge, Credentials, Payload, RequestBuilder,
    ServerAuthorization, SHA256,
};
use std::collections::HashMap;
use std::time::{Duration, SystemTime};

#[derive(Fail, Debug)]
pub enum TestError {
    #[fail(display = "Test failure: {}", _0)]
    Failure(String),

    #[fail(display = "{}", _0)]
    HawkError(hawk_auth::Error),

    #[fail(display = "{}", _0)]
    Auth(AuthError),
}

impl From<hawk_auth::Error> for TestError {
    fn from(e: hawk_auth::Error) -> Self {
        TestError::HawkError(e)
    }
}

impl From<AuthError> for TestError {
    fn from(e: AuthError) -> Self {
        TestError::Auth(e)
    }
}

/// A credential store, standing in for a database.
struct Store(HashMap<String, Credentials>);

impl Store {
    fn new() -> Store {
        let mut map = HashMap::new();
        map.insert(
            "dh37fgj492je".to_string(),
            Credentials::new(
                "dh37fgj492je",
                "werxhqb98rpaxn39848xrunpaw3489ruxnpa98w4rxn",
                SHA256,
                "steve",
            )
            .claim("scope", "read"),
        );
        Store(map)
    }

    fn lookup(&self, id: &str) -> Result<Option<Credentials>, TestError> {
        if id == "offline" {
            return Err(TestError::Failure("store offline".to_string()));
        }
        Ok(self.0.get(id).cloned())
    }

    fn client(&self) -> Credentials {
        self.0["dh37fgj492je"].clone()
    }
}

/// Handle a request the way an HTTP adapter would: returning the status, and either the
/// `Server-Authorization` value or the `WWW-Authenticate` challenge.
fn serve(
    store: &Store,
    method: &str,
    host: &str,
    path: &str,
    authorization: &str,
    body: Option<&str>,
) -> (u16, String) {
    let authenticator = Authenticator::default();
    let mut builder = RequestBuilder::from_uri(method, host, path).unwrap();
    if let Some(body) = body {
        builder = builder.payload(Payload::new("text/plain", body));
    }
    let request = builder.request();
    match authenticator.authenticate(&request, authorization, |id| store.lookup(id)) {
        Ok(identity) => {
            let header = request
                .make_response_builder(&identity.state)
                .payload(Payload::new("text/plain", "welcome"))
                .ext("server-ext")
                .response()
                .make_header(&identity.credentials)
                .unwrap();
            (200, header.to_string())
        }
        Err(e) => {
            let challenge = Challenge::for_error(&e, SystemTime::now());
            (e.status_code(), challenge.to_string())
        }
    }
}

#[test]
fn client_server_round_trip() -> Result<(), TestError> {
    let store = Store::new();
    let credentials = store.client();

    let request = RequestBuilder::from_uri("POST", "localhost:9988", "/resource?a=1")?
        .payload(Payload::new("text/plain", "hello"))
        .request();
    let header = request.make_header(&credentials, Some("client-ext"))?;

    let (status, server_auth) = serve(
        &store,
        "POST",
        "localhost:9988",
        "/resource?a=1",
        &header.header_value(),
        Some("hello"),
    );
    if status != 200 {
        return Err(TestError::Failure(format!("got {}: {}", status, server_auth)));
    }

    // the client checks the server's response
    let server_auth: ServerAuthorization = server_auth.parse()?;
    assert_eq!(server_auth.ext.as_deref(), Some("server-ext"));
    let state = hawk_auth::RequestState {
        ts: header.ts.clone(),
        nonce: header.nonce.clone(),
    };
    let response = request
        .make_response_builder(&state)
        .payload(Payload::new("text/plain", "welcome"))
        .response();
    assert!(response.validate_header(&server_auth, &credentials));

    let response = request
        .make_response_builder(&state)
        .payload(Payload::new("text/plain", "forged"))
        .response();
    assert!(!response.validate_header(&server_auth, &credentials));
    Ok(())
}

#[test]
fn tampered_body_rejected() -> Result<(), TestError> {
    let store = Store::new();
    let request = RequestBuilder::new("PUT", "localhost", 80, "/resource")
        .payload(Payload::new("text/plain", "hello"))
        .request();
    let header = request.make_header(&store.client(), None)?;

    let (status, challenge) = serve(
        &store,
        "PUT",
        "localhost",
        "/resource",
        &header.header_value(),
        Some("goodbye"),
    );
    assert_eq!(status, 401);
    assert!(challenge.starts_with("Hawk ts=\""));
    assert!(challenge.ends_with(" ntp=\"pool.ntp.org\" error=\"Bad mac\""));
    Ok(())
}

#[test]
fn stale_client_clock() -> Result<(), TestError> {
    let store = Store::new();
    let request = RequestBuilder::new("GET", "localhost", 80, "/").request();
    let header = request.make_header_full(
        &store.client(),
        None,
        Some(SystemTime::now() - Duration::from_secs(3600)),
        None,
    )?;

    let (status, challenge) = serve(&store, "GET", "localhost", "/", &header.header_value(), None);
    assert_eq!(status, 401);
    assert!(challenge.contains("error=\"Stale timestamp\""));
    Ok(())
}

#[test]
fn malformed_and_unknown() {
    let store = Store::new();
    let (status, _) = serve(&store, "GET", "localhost", "/", "Hawk    ", None);
    assert_eq!(status, 400);

    let (status, challenge) = serve(
        &store,
        "GET",
        "localhost",
        "/",
        "Hawk id=\"nobody\", ts=\"1\", nonce=\"x\", mac=\"y\"",
        None,
    );
    assert_eq!(status, 401);
    assert!(challenge.contains("error=\"Missing credentials\""));

    let (status, challenge) = serve(
        &store,
        "GET",
        "localhost",
        "/",
        "Hawk id=\"offline\", ts=\"1\", nonce=\"x\", mac=\"y\"",
        None,
    );
    assert_eq!(status, 401);
    assert!(challenge.contains("error=\"Unknown user\""));
}

#[test]
fn async_lookup() -> Result<(), TestError> {
    let store = Store::new();
    let request = RequestBuilder::new("GET", "localhost", 80, "/async").request();
    let header = request.make_header(&store.client(), None)?.header_value();

    let authenticator = Authenticator::new(AuthConfig::new().skew(Duration::from_secs(5)));
    let identity = futures::executor::block_on(authenticator.authenticate_async(
        &request,
        &header,
        |id| {
            let found = store.lookup(id);
            async move { found }
        },
    ))?;
    assert_eq!(identity.name, "steve");
    assert_eq!(
        identity.additional_claims,
        vec![("scope".to_string(), "read".to_string())]
    );
    Ok(())
}

#[test]
fn payload_read_after_lookup() -> Result<(), TestError> {
    let store = Store::new();
    let body = "streamed body";
    let header = RequestBuilder::new("POST", "localhost", 80, "/upload")
        .payload(Payload::new("text/plain; charset=utf-8", body))
        .request()
        .make_header(&store.client(), None)?
        .header_value();

    // the server reads the body only once it knows the request is worth reading
    let request = RequestBuilder::new("POST", "localhost", 80, "/upload").request();
    let authenticator = Authenticator::default();
    let pending = authenticator.begin(&request, &header)?;
    assert!(pending.wants_payload());
    let found = store.lookup(pending.id());
    let identity =
        pending.complete_with_payload(found, Some(Payload::new("text/plain", body)))?;
    assert_eq!(identity.name, "steve");
    Ok(())
}
