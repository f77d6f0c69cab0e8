use crate::authenticator::RequestState;
use crate::bewit::Bewit;
use crate::clock;
use crate::credentials::Credentials;
use crate::error::*;
use crate::header::Header;
use crate::mac::mac_for;
use crate::normalized::{split_host, MacType, Normalized};
use crate::payload::Payload;
use crate::response::ResponseBuilder;
use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::Rng;
use std::borrow::Cow;
use std::time::{Duration, SystemTime};
use url::Url;

const NONCE_LEN: usize = 6;

/// Request represents a single HTTP request, as seen by Hawk.
///
/// The structure is created using a RequestBuilder.  Most uses of this library will hold
/// several of the fields fixed.  Cloning the builder with these fields applied is a convenient
/// way to avoid repeating those fields.
#[derive(Debug, Clone)]
pub struct Request<'a> {
    method: &'a str,
    host: &'a str,
    port: u16,
    path: Cow<'a, str>,
    payload: Option<Payload<'a>>,
}

impl<'a> Request<'a> {
    pub fn method(&self) -> &str {
        self.method
    }

    /// The host as given, possibly including a `:port` suffix.
    pub fn host(&self) -> &str {
        self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// The path and query string.
    pub fn path(&self) -> &str {
        self.path.as_ref()
    }

    pub fn payload(&self) -> Option<&Payload<'a>> {
        self.payload.as_ref()
    }

    pub(crate) fn normalized<'n>(
        &'n self,
        mac_type: MacType,
        ts: &'n str,
        nonce: &'n str,
        hash: Option<&'n str>,
        ext: Option<&'n str>,
    ) -> Normalized<'n> {
        Normalized {
            mac_type,
            ts,
            nonce,
            method: self.method,
            path: self.path(),
            host: self.host,
            port: self.port,
            hash,
            ext,
        }
    }

    fn check_input(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::InvalidInput("host must not be empty".to_string()));
        }
        if self.method.trim().is_empty() {
            return Err(Error::InvalidInput("method must not be empty".to_string()));
        }
        Ok(())
    }

    /// Create a new Header for this request, inventing a new nonce and setting the
    /// timestamp to the current time.
    pub fn make_header(&self, credentials: &Credentials, ext: Option<&str>) -> Result<Header> {
        self.make_header_full(credentials, ext, None, None)
    }

    /// Similar to `make_header`, but allowing the caller to fix the timestamp and nonce.
    /// Either is generated when `None`.
    pub fn make_header_full(
        &self,
        credentials: &Credentials,
        ext: Option<&str>,
        ts: Option<SystemTime>,
        nonce: Option<&str>,
    ) -> Result<Header> {
        self.check_input()?;
        if credentials.id.is_empty() {
            return Err(Error::InvalidInput("credentials id must not be empty".to_string()));
        }
        let algorithm = credentials.digest_algorithm()?;
        let key = credentials.hmac_key()?;

        let ts = clock::unix_secs(ts.unwrap_or_else(SystemTime::now)).to_string();
        let nonce = match nonce {
            Some(n) => n.to_string(),
            None => random_nonce(),
        };
        let hash = match self.payload {
            Some(ref p) => Some(p.hash(algorithm)?),
            None => None,
        };

        let normalized = self.normalized(
            MacType::Header,
            &ts,
            &nonce,
            hash.as_deref(),
            ext,
        );
        let mac = mac_for(&key, &normalized)?;

        Header::new(
            credentials.id.clone(),
            ts,
            nonce,
            mac,
            ext.map(String::from),
            hash,
        )
    }

    /// Make a "bewit" that can be attached to a GET request to authorize it until `exp`.
    ///
    /// The bewit MAC always covers method `GET`, whatever this request's method.
    pub fn make_bewit(
        &self,
        credentials: &Credentials,
        exp: SystemTime,
        ext: Option<&str>,
    ) -> Result<Bewit<'static>> {
        self.check_input()?;
        if credentials.id.is_empty() {
            return Err(Error::InvalidInput("credentials id must not be empty".to_string()));
        }
        let key = credentials.hmac_key()?;
        let exp_str = clock::unix_secs(exp).to_string();
        let normalized = Normalized {
            method: "GET",
            ..self.normalized(MacType::Bewit, &exp_str, "", None, ext)
        };
        let mac = mac_for(&key, &normalized)?;
        Ok(Bewit::new(
            credentials.id.clone(),
            exp,
            mac,
            ext.map(String::from),
        ))
    }

    /// Variant of `make_bewit` that takes a TTL from the current time.
    pub fn make_bewit_with_ttl(
        &self,
        credentials: &Credentials,
        ttl: Duration,
        ext: Option<&str>,
    ) -> Result<Bewit<'static>> {
        let exp = SystemTime::now()
            .checked_add(ttl)
            .ok_or_else(|| Error::InvalidInput(format!("bewit ttl {:?} is too large", ttl)))?;
        self.make_bewit(credentials, exp, ext)
    }

    /// Begin a response to this request, which was authenticated with the given state.
    pub fn make_response_builder(&'a self, state: &'a RequestState) -> ResponseBuilder<'a> {
        ResponseBuilder::from_request(self, state)
    }
}

#[derive(Debug, Clone)]
pub struct RequestBuilder<'a>(Request<'a>);

impl<'a> RequestBuilder<'a> {
    /// Create a new request with the given method, host, port, and path (with query).
    pub fn new(method: &'a str, host: &'a str, port: u16, path: &'a str) -> Self {
        RequestBuilder::with_path(method, host, port, Cow::Borrowed(path))
    }

    fn with_path(method: &'a str, host: &'a str, port: u16, path: Cow<'a, str>) -> Self {
        RequestBuilder(Request {
            method,
            host,
            port,
            path,
            payload: None,
        })
    }

    /// Create a new request from a `Host` value and a request URI.
    ///
    /// The URI may be absolute (`http://example.com:8080/x?y=z`) or just a path and query.
    /// The port is the first of: the URI's explicit port, a `:port` suffix on `host`, the
    /// URI scheme's default port, and finally 80.
    pub fn from_uri(method: &'a str, host: &'a str, uri: &'a str) -> Result<Self> {
        let (_, host_port) = split_host(host);
        let (port, path) = if uri.starts_with('/') {
            (host_port.unwrap_or(80), Cow::Borrowed(uri))
        } else {
            let url = Url::parse(uri)?;
            if !url.has_host() {
                return Err(Error::InvalidUrl(format!("url {} has no host", uri)));
            }
            let port = url
                .port()
                .or(host_port)
                .or_else(|| url.port_or_known_default())
                .unwrap_or(80);
            (port, raw_path_and_query(uri))
        };
        Ok(RequestBuilder::with_path(method, host, port, path))
    }

    /// Create a new request from an absolute URL, taking the host from the URL.
    pub fn from_url(method: &'a str, url: &'a Url) -> Result<Self> {
        let host = url
            .host_str()
            .ok_or_else(|| Error::InvalidUrl(format!("url {} has no host", url)))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| Error::InvalidUrl(format!("url {} has no port", url)))?;
        let path = raw_path_and_query(url.as_str());
        Ok(RequestBuilder::with_path(method, host, port, path))
    }

    pub fn method(mut self, method: &'a str) -> Self {
        self.0.method = method;
        self
    }

    pub fn host(mut self, host: &'a str) -> Self {
        self.0.host = host;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.0.port = port;
        self
    }

    pub fn path(mut self, path: &'a str) -> Self {
        self.0.path = Cow::Borrowed(path);
        self
    }

    /// Set the payload; its hash is then included in headers made for this request, and
    /// checked against the `hash` attribute of headers validated for it.
    pub fn payload<P: Into<Option<Payload<'a>>>>(mut self, payload: P) -> Self {
        self.0.payload = payload.into();
        self
    }

    /// Remove a `bewit=` query component from the path, storing the decoded bewit in
    /// `bewit`.  A path without a bewit leaves `bewit` unchanged.
    pub fn extract_bewit(
        mut self,
        bewit: &mut Option<Bewit<'a>>,
    ) -> std::result::Result<Self, crate::AuthError> {
        if let Some(b) = Bewit::from_path(&mut self.0.path)? {
            *bewit = Some(b);
        }
        Ok(self)
    }

    pub fn request(self) -> Request<'a> {
        self.0
    }
}

/// Build a Hawk `Authorization` parameter string (without the `Hawk ` scheme).
///
/// `ts` defaults to now and `nonce` to a fresh random value.
pub fn build_header(
    host: &str,
    method: &str,
    uri: &str,
    credentials: &Credentials,
    ext: Option<&str>,
    ts: Option<SystemTime>,
    nonce: Option<&str>,
) -> Result<String> {
    let request = RequestBuilder::from_uri(method, host, uri)?.request();
    let header = request.make_header_full(credentials, ext, ts, nonce)?;
    Ok(header.to_string())
}

/// The path and query of an absolute URI string, exactly as written.
fn raw_path_and_query(uri: &str) -> Cow<'_, str> {
    let uri = match uri.find('#') {
        Some(i) => &uri[..i],
        None => uri,
    };
    let rest = match uri.find("://") {
        Some(i) => &uri[i + 3..],
        None => uri,
    };
    match rest.find(|c: char| c == '/' || c == '?') {
        Some(i) if rest[i..].starts_with('/') => Cow::Borrowed(&rest[i..]),
        Some(i) => Cow::Owned(format!("/{}", &rest[i..])),
        None => Cow::Borrowed("/"),
    }
}

/// A random alphanumeric nonce, from the operating system's CSPRNG.
fn random_nonce() -> String {
    OsRng.sample_iter(&Alphanumeric).take(NONCE_LEN).collect()
}

#[cfg(all(test, any(feature = "use_ring", feature = "use_openssl")))]
mod test {
    use super::*;
    use crate::credentials::DigestAlgorithm;
    use pretty_assertions::assert_eq;
    use std::time::UNIX_EPOCH;

    fn credentials() -> Credentials {
        Credentials::new(
            "123456",
            "werxhqb98rpaxn39848xrunpaw3489ruxnpa98w4rxn",
            DigestAlgorithm::Sha1,
            "steve",
        )
    }

    #[test]
    fn test_builder() {
        let req = RequestBuilder::new("GET", "example.com", 443, "/foo").request();
        assert_eq!(req.method(), "GET");
        assert_eq!(req.path(), "/foo");
        assert_eq!(req.host(), "example.com");
        assert_eq!(req.port(), 443);
        assert_eq!(req.payload(), None);
    }

    #[test]
    fn test_builder_clone() {
        let rb = RequestBuilder::new("GET", "example.com", 443, "/foo");
        let req = rb.clone().request();
        let req2 = rb.path("/bar").request();
        assert_eq!(req.path(), "/foo");
        assert_eq!(req2.path(), "/bar");
    }

    #[test]
    fn test_from_uri_absolute() {
        let req = RequestBuilder::from_uri(
            "GET",
            "example.com",
            "http://example.com:8080/resource/4?filter=a",
        )
        .unwrap()
        .request();
        assert_eq!(req.path(), "/resource/4?filter=a");
        assert_eq!(req.port(), 8080);
    }

    #[test]
    fn test_from_uri_default_port() {
        let req = RequestBuilder::from_uri("GET", "example.com", "https://example.com/foo#frag")
            .unwrap()
            .request();
        assert_eq!(req.path(), "/foo");
        assert_eq!(req.port(), 443);
    }

    #[test]
    fn test_from_uri_host_port() {
        let req = RequestBuilder::from_uri("GET", "example.com:9090", "/foo?x=1")
            .unwrap()
            .request();
        assert_eq!(req.path(), "/foo?x=1");
        assert_eq!(req.port(), 9090);

        let req = RequestBuilder::from_uri("GET", "example.com", "/foo")
            .unwrap()
            .request();
        assert_eq!(req.port(), 80);
    }

    #[test]
    fn test_from_uri_no_path() {
        let req = RequestBuilder::from_uri("GET", "example.com", "http://example.com")
            .unwrap()
            .request();
        assert_eq!(req.path(), "/");
        let req = RequestBuilder::from_uri("GET", "example.com", "http://example.com?a=b")
            .unwrap()
            .request();
        assert_eq!(req.path(), "/?a=b");
    }

    #[test]
    fn test_from_uri_invalid() {
        assert!(RequestBuilder::from_uri("GET", "example.com", "not a uri").is_err());
    }

    #[test]
    fn test_from_url() {
        let url = Url::parse("https://example.com/foo?a=b").unwrap();
        let req = RequestBuilder::from_url("GET", &url).unwrap().request();
        assert_eq!(req.path(), "/foo?a=b");
        assert_eq!(req.host(), "example.com");
        assert_eq!(req.port(), 443);
    }

    #[test]
    fn test_random_nonce() {
        let a = random_nonce();
        let b = random_nonce();
        assert_eq!(a.len(), NONCE_LEN);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_make_header_full() {
        let req = RequestBuilder::from_uri(
            "GET",
            "example.com",
            "http://example.com:8080/resource/4?filter=a",
        )
        .unwrap()
        .request();
        let header = req
            .make_header_full(
                &credentials(),
                Some("hello"),
                Some(UNIX_EPOCH + Duration::from_secs(1353788437)),
                Some("abcde"),
            )
            .unwrap();
        assert_eq!(header.id, "123456");
        assert_eq!(header.ts, "1353788437");
        assert_eq!(header.nonce, "abcde");
        assert_eq!(header.mac, "wA0+3ewq39fEvDl9+tm8PF8fpbM=");
        assert_eq!(header.ext, Some("hello".to_string()));
        assert_eq!(header.hash, None);
    }

    #[test]
    fn test_build_header() {
        let header = build_header(
            "example.com",
            "GET",
            "http://example.com:8080/resource/4?filter=a",
            &credentials(),
            None,
            Some(UNIX_EPOCH + Duration::from_secs(1353788437)),
            Some("123456"),
        )
        .unwrap();
        assert_eq!(
            header,
            "id=\"123456\", ts=\"1353788437\", nonce=\"123456\", \
             mac=\"xzewml0eeTU60IbA45JAj/9GbuY=\", ext=\"\""
        );
    }

    #[test]
    fn test_build_header_generates_nonce_and_ts() {
        let header = RequestBuilder::new("GET", "example.com", 80, "/")
            .request()
            .make_header(&credentials(), None)
            .unwrap();
        assert_eq!(header.nonce.len(), NONCE_LEN);
        let now = clock::unix_secs(SystemTime::now());
        let ts = header.timestamp().unwrap();
        assert!((now - ts).abs() <= 1);
    }

    #[test]
    fn test_build_header_with_payload() {
        let req = RequestBuilder::new("POST", "example.com", 80, "/")
            .payload(Payload::new("text/plain", "Thank you for flying Hawk"))
            .request();
        let mut creds = credentials();
        creds.algorithm = "sha256".to_string();
        let header = req.make_header(&creds, None).unwrap();
        assert_eq!(
            header.hash,
            Some("Yi9LfIIFRtBEPt74PVmbTF/xVAwPn7ub15ePICfgnuY=".to_string())
        );
        assert!(header.to_string().ends_with(
            ", ext=\"\", hash=\"Yi9LfIIFRtBEPt74PVmbTF/xVAwPn7ub15ePICfgnuY=\""
        ));
    }

    #[test]
    fn test_build_header_empty_host() {
        let res = build_header("", "GET", "/", &credentials(), None, None, None);
        match res {
            Err(Error::InvalidInput(_)) => {}
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_build_header_empty_method() {
        let res = build_header("example.com", "", "/", &credentials(), None, None, None);
        match res {
            Err(Error::InvalidInput(_)) => {}
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_build_header_unknown_algorithm() {
        let mut creds = credentials();
        creds.algorithm = "md5".to_string();
        let res = build_header("example.com", "GET", "/", &creds, None, None, None);
        match res {
            Err(Error::Auth(crate::AuthError::UnknownAlgorithm)) => {}
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_make_bewit_huge_ttl() {
        let req = RequestBuilder::new("GET", "example.com", 80, "/").request();
        match req.make_bewit_with_ttl(&credentials(), Duration::from_secs(u64::MAX), None) {
            Err(Error::InvalidInput(_)) => {}
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_build_header_quote_in_ext() {
        let res = build_header("example.com", "GET", "/", &credentials(), Some("a\"b"), None, None);
        assert!(res.is_err());
    }
}
