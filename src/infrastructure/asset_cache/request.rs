use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    Navigate,
    SameOrigin,
    Cors,
    NoCors,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestDestination {
    Document,
    Script,
    Style,
    Image,
    Font,
    Manifest,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    pub method: String,
    pub url: String,
    pub mode: RequestMode,
    pub destination: RequestDestination,
}

impl AssetRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            url: url.into(),
            mode: RequestMode::SameOrigin,
            destination: RequestDestination::Other,
        }
    }

    pub fn navigate(url: impl Into<String>) -> Self {
        Self {
            mode: RequestMode::Navigate,
            destination: RequestDestination::Document,
            ..Self::get(url)
        }
    }

    pub fn with_destination(mut self, destination: RequestDestination) -> Self {
        self.destination = destination;
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn is_get(&self) -> bool {
        self.method.eq_ignore_ascii_case("GET")
    }

    /// Key used for cache lookups: the url without its fragment.
    pub fn cache_key(&self) -> &str {
        match self.url.split_once('#') {
            Some((key, _)) => key,
            None => &self.url,
        }
    }

    fn path_extension(&self) -> Option<&str> {
        let path = self.cache_key().split('?').next().unwrap_or_default();
        let file = path.rsplit('/').next().unwrap_or_default();
        file.rsplit_once('.').map(|(_, ext)| ext)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// Same-origin response with readable body and headers.
    Basic,
    Cors,
    Opaque,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
    pub kind: ResponseKind,
}

impl AssetResponse {
    pub fn ok(content_type: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            status: 200,
            content_type: Some(content_type.into()),
            body: body.into(),
            kind: ResponseKind::Basic,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Only plain 200 same-origin responses are worth keeping offline.
    pub fn is_cacheable(&self) -> bool {
        self.status == 200 && self.kind == ResponseKind::Basic
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Network unavailable: {0}")]
    Network(String),

    #[error("No cached response for {0}")]
    NotCached(String),
}

/// Fetch strategy bucket for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    Navigation,
    ScriptOrStyle,
    Static,
}

impl RequestClass {
    pub fn classify(request: &AssetRequest) -> Self {
        if request.mode == RequestMode::Navigate {
            return RequestClass::Navigation;
        }
        match request.destination {
            RequestDestination::Script | RequestDestination::Style => RequestClass::ScriptOrStyle,
            RequestDestination::Other => match request.path_extension() {
                Some("js" | "mjs" | "css") => RequestClass::ScriptOrStyle,
                _ => RequestClass::Static,
            },
            _ => RequestClass::Static,
        }
    }
}
