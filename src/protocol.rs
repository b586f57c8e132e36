//! `view://` resource loader.
//!
//! Rendered view documents are registered here keyed by their absolute path;
//! requests for them get the rendered bytes, every other request under the
//! app root is served from disk. Requests escaping the root are refused.

use dashmap::DashMap;
use std::path::{Component, Path, PathBuf};
use tauri::http::header::{CONTENT_TYPE, HeaderValue};
use tauri::http::{Response, StatusCode};
use url::Url;

use crate::error::{Result, ShellError};

pub const VIEW_SCHEME: &str = "view";

pub struct ResourceInterceptor {
    root: PathBuf,
    documents: DashMap<PathBuf, Vec<u8>>,
}

impl ResourceInterceptor {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            documents: DashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Serve `contents` for requests to `path` instead of the file on disk.
    pub fn intercept(&self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        self.documents.insert(path.into(), contents.into());
    }

    pub fn is_intercepted(&self, path: &Path) -> bool {
        self.documents.contains_key(path)
    }

    /// Bytes for a request path (percent-encoded, as it appears in the URL).
    pub fn load(&self, request_path: &str) -> Result<Vec<u8>> {
        let path = decode_request_path(request_path)
            .filter(|p| is_within(&self.root, p))
            .ok_or_else(|| ShellError::InvalidViewPath(PathBuf::from(request_path)))?;
        if let Some(doc) = self.documents.get(&path) {
            return Ok(doc.value().clone());
        }
        std::fs::read(&path).map_err(|e| ShellError::io(&path, e))
    }

    /// Protocol response for `request_path`.
    pub fn respond(&self, request_path: &str) -> Response<Vec<u8>> {
        match self.load(request_path) {
            Ok(body) => {
                let mime = mime_guess::from_path(request_path)
                    .first_or_octet_stream()
                    .to_string();
                reply(StatusCode::OK, &mime, body)
            }
            Err(ShellError::InvalidViewPath(_)) => {
                tracing::warn!(path = request_path, "view request outside app root refused");
                reply(StatusCode::FORBIDDEN, "text/plain", b"Forbidden".to_vec())
            }
            Err(e) => {
                tracing::debug!(path = request_path, "view resource not served: {e}");
                reply(StatusCode::NOT_FOUND, "text/plain", b"Not found".to_vec())
            }
        }
    }
}

fn reply(status: StatusCode, mime: &str, body: Vec<u8>) -> Response<Vec<u8>> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    let content_type = HeaderValue::from_str(mime)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    response.headers_mut().insert(CONTENT_TYPE, content_type);
    response
}

/// Decode a URL path into an absolute filesystem path.
pub fn decode_request_path(request_path: &str) -> Option<PathBuf> {
    let path = if request_path.starts_with('/') {
        request_path.to_string()
    } else {
        format!("/{request_path}")
    };
    let url = Url::parse(&format!("file://{path}")).ok()?;
    url.to_file_path().ok()
}

/// URL under the view scheme for an absolute file path.
pub fn view_url(path: &Path) -> Result<Url> {
    let file_url = Url::from_file_path(path).map_err(|_| ShellError::InvalidViewPath(path.to_path_buf()))?;
    // Windows and Android webviews reach custom schemes through http://<scheme>.localhost
    let base = if cfg!(any(windows, target_os = "android")) {
        format!("http://{VIEW_SCHEME}.localhost")
    } else {
        format!("{VIEW_SCHEME}://localhost")
    };
    Url::parse(&format!("{base}{}", file_url.path())).map_err(|_| ShellError::InvalidViewPath(path.to_path_buf()))
}

/// Whether `path` stays under `root` without `..` hops.
fn is_within(root: &Path, path: &Path) -> bool {
    if path.components().any(|c| matches!(c, Component::ParentDir)) {
        return false;
    }
    path.starts_with(root)
}

/// Register the `view://` protocol on the Tauri builder.
pub fn register_view_protocol(
    builder: tauri::Builder<tauri::Wry>,
    interceptor: std::sync::Arc<ResourceInterceptor>,
) -> tauri::Builder<tauri::Wry> {
    builder.register_uri_scheme_protocol(VIEW_SCHEME, move |_ctx, request| {
        interceptor.respond(request.uri().path())
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn decodes_percent_encoded_paths() {
        assert_eq!(
            decode_request_path("/tmp/my%20app/index.html"),
            Some(PathBuf::from("/tmp/my app/index.html"))
        );
    }

    #[test]
    fn view_url_round_trips_through_decode() {
        let path = Path::new("/srv/app/views/main page/index.html");
        let url = view_url(path).unwrap();
        assert_eq!(url.scheme(), VIEW_SCHEME);
        assert_eq!(decode_request_path(url.path()), Some(path.to_path_buf()));
    }

    #[test]
    fn relative_paths_have_no_url() {
        assert!(view_url(Path::new("views/index.html")).is_err());
    }

    #[test]
    fn intercepted_documents_win_over_disk() {
        let dir = TempDir::new().unwrap();
        let doc = dir.path().join("index.html");
        fs::write(&doc, "raw {{title}}").unwrap();

        let interceptor = ResourceInterceptor::new(dir.path());
        interceptor.intercept(doc.clone(), "rendered");
        assert!(interceptor.is_intercepted(&doc));

        let url = view_url(&doc).unwrap();
        assert_eq!(interceptor.load(url.path()).unwrap(), b"rendered");
    }

    #[test]
    fn falls_back_to_disk() {
        let dir = TempDir::new().unwrap();
        let css = dir.path().join("style.css");
        fs::write(&css, "body {}").unwrap();

        let interceptor = ResourceInterceptor::new(dir.path());
        let response = interceptor.respond(view_url(&css).unwrap().path());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/css");
        assert_eq!(response.body(), b"body {}");
    }

    #[test]
    fn refuses_paths_outside_root() {
        let dir = TempDir::new().unwrap();
        let interceptor = ResourceInterceptor::new(dir.path().join("app"));
        let outside = format!("{}/secret.txt", dir.path().display());
        assert_eq!(interceptor.respond(&outside).status(), StatusCode::FORBIDDEN);

        let sneaky = format!("{}/app/../secret.txt", dir.path().display());
        assert_eq!(interceptor.respond(&sneaky).status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let interceptor = ResourceInterceptor::new(dir.path());
        let missing = view_url(&dir.path().join("nope.js")).unwrap();
        assert_eq!(interceptor.respond(missing.path()).status(), StatusCode::NOT_FOUND);
    }
}
