//! HTTP surface shared by `folio dev` and `folio serve`.

use crate::templates::{ArticleTemplate, IndexTemplate, NotFoundTemplate};
use askama::Template;
use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use folio_core::feed::{generate_rss, FeedChannel};
use folio_core::listing::{all_posts, article_metadata, recent_posts, RECENT_POSTS_LIMIT};
use folio_core::markdown::highlight::Highlighter;
use folio_core::url::route_table;
use folio_core::{render_post, LookupService, Manifest, ManifestProvider};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Path the feed is served from.
pub const FEED_PATH: &str = "/rss.xml";

#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<ManifestProvider>,
    pub highlighter: Arc<dyn Highlighter>,
    pub channel: Arc<FeedChannel>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/manifest", get(api_manifest))
        .route("/api/routes", get(api_routes))
        .route("/api/posts", get(api_posts))
        .route(FEED_PATH, get(rss))
        .route("/__folio/generation", get(generation))
        .route("/", get(index))
        .route("/{*path}", get(page))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Current manifest, or a 500 response when generation fails.
///
/// Live providers may rescan the content roots, so that work runs on the
/// blocking pool.
async fn current_manifest(state: &AppState) -> Result<Arc<Manifest>, Response> {
    let result = if state.provider.is_live() {
        let provider = Arc::clone(&state.provider);
        match tokio::task::spawn_blocking(move || provider.manifest()).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("Manifest task failed: {}", e);
                return Err(StatusCode::INTERNAL_SERVER_ERROR.into_response());
            }
        }
    } else {
        state.provider.manifest()
    };

    result.map_err(|e| {
        tracing::error!("Manifest generation failed: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
    })
}

async fn api_manifest(State(state): State<AppState>) -> Response {
    match current_manifest(&state).await {
        Ok(manifest) => Json(manifest.as_ref()).into_response(),
        Err(resp) => resp,
    }
}

async fn api_routes(State(state): State<AppState>) -> Response {
    match current_manifest(&state).await {
        Ok(manifest) => Json(route_table(&manifest)).into_response(),
        Err(resp) => resp,
    }
}

async fn api_posts(State(state): State<AppState>) -> Response {
    match current_manifest(&state).await {
        Ok(manifest) => Json(all_posts(&manifest)).into_response(),
        Err(resp) => resp,
    }
}

async fn rss(State(state): State<AppState>) -> Response {
    match current_manifest(&state).await {
        Ok(manifest) => (
            [
                (header::CONTENT_TYPE, "application/xml; charset=utf-8"),
                (header::CACHE_CONTROL, "public, max-age=3600"),
            ],
            generate_rss(&state.channel, &manifest, Utc::now()),
        )
            .into_response(),
        Err(resp) => resp,
    }
}

async fn generation(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "generation": state.provider.generation(),
        "live": state.provider.is_live(),
    }))
}

async fn index(State(state): State<AppState>) -> Response {
    let manifest = match current_manifest(&state).await {
        Ok(manifest) => manifest,
        Err(resp) => return resp,
    };

    let template = IndexTemplate {
        site_title: &state.channel.title,
        posts: recent_posts(&manifest, RECENT_POSTS_LIMIT),
        feed_path: FEED_PATH,
        live: state.provider.is_live(),
    };
    render_page(&template, StatusCode::OK)
}

async fn page(State(state): State<AppState>, uri: Uri) -> Response {
    let manifest = match current_manifest(&state).await {
        Ok(manifest) => manifest,
        Err(resp) => return resp,
    };

    let lookup = LookupService::new(&manifest);
    let Some(file) = lookup.get_by_url_path(uri.path()) else {
        tracing::debug!("No content at {}", uri.path());
        let template = NotFoundTemplate {
            path: uri.path(),
            feed_path: FEED_PATH,
            live: false,
        };
        return render_page(&template, StatusCode::NOT_FOUND);
    };

    let meta = article_metadata(&file.attributes, Utc::now().date_naive());
    let rendered = render_post(file, state.highlighter.as_ref());

    let template = ArticleTemplate {
        title: file.attributes.display_title(),
        metadata: meta.entries,
        is_stale: meta.is_stale,
        content: rendered.html,
        feed_path: FEED_PATH,
        live: state.provider.is_live(),
    };
    render_page(&template, StatusCode::OK)
}

fn render_page<T: Template>(template: &T, status: StatusCode) -> Response {
    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render page: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use folio_core::markdown::highlight::HighlightError;
    use folio_core::{Attributes, ChangeKind, ContentFile, ContentRoot, ManifestOptions};
    use std::fs;
    use std::path::PathBuf;
    use tower::ServiceExt;

    struct Plain;

    impl Highlighter for Plain {
        fn highlight(&self, code: &str, lang: &str) -> Result<String, HighlightError> {
            Ok(format!("<pre data-lang=\"{}\">{}</pre>", lang, code.trim_end()))
        }
    }

    fn channel() -> Arc<FeedChannel> {
        Arc::new(FeedChannel {
            title: "Test Site".into(),
            description: "Testing".into(),
            site_url: "https://example.com".into(),
            feed_path: FEED_PATH.into(),
        })
    }

    fn state_with(provider: ManifestProvider) -> AppState {
        AppState {
            provider: Arc::new(provider),
            highlighter: Arc::new(Plain),
            channel: channel(),
        }
    }

    fn static_state() -> AppState {
        let file = ContentFile {
            path: PathBuf::from("/site/posts/hello.md"),
            slug: "hello".into(),
            url_path: "/hello".into(),
            attributes: Attributes {
                title: Some("Hello".into()),
                date: Some("2024-03-05T00:00:00.000Z".into()),
                ..Attributes::default()
            },
            raw_body: "Hi there\n\n```rust\nfn main() {}\n```\n".into(),
        };
        state_with(ManifestProvider::from_manifest(Manifest::new(vec![file])))
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn page_resolves_with_and_without_trailing_slash() {
        let (status, body) = get(router(static_state()), "/hello").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<h1>Hello</h1>"));
        assert!(body.contains("<pre data-lang=\"rust\">fn main() {}</pre>"));
        assert!(body.contains("<dt>Last Updated</dt><dd>05/03/2024</dd>"));

        let (status, _) = get(router(static_state()), "/hello/").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_path_is_404() {
        let (status, _) = get(router(static_state()), "/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn manifest_endpoint_matches_export_contract() {
        let (status, body) = get(router(static_state()), "/api/manifest").await;
        assert_eq!(status, StatusCode::OK);

        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["files"][0]["urlPath"], "/hello");
        assert!(value.get("diagnostics").is_none());
    }

    #[tokio::test]
    async fn routes_and_feed() {
        let (_, routes) = get(router(static_state()), "/api/routes").await;
        assert_eq!(routes, r#"[{"path":"/hello","id":"hello"}]"#);

        let (status, rss) = get(router(static_state()), "/rss.xml").await;
        assert_eq!(status, StatusCode::OK);
        assert!(rss.contains("<link>https://example.com/hello</link>"));
    }

    #[tokio::test]
    async fn live_provider_picks_up_new_files() {
        let dir = tempfile::tempdir().unwrap();
        let posts = dir.path().join("posts");
        fs::create_dir_all(&posts).unwrap();
        fs::write(posts.join("first.md"), "First\n").unwrap();
        let options = ManifestOptions::new(vec![ContentRoot::new(&posts)]);
        let state = state_with(ManifestProvider::live(options));

        let (status, _) = get(router(state.clone()), "/first").await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = get(router(state.clone()), "/second").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        fs::write(posts.join("second.md"), "Second\n").unwrap();
        state.provider.invalidate(ChangeKind::Structural);

        let (status, body) = get(router(state.clone()), "/second").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("/__folio/generation"));

        let (_, generation) = get(router(state), "/__folio/generation").await;
        assert_eq!(generation, r#"{"generation":1,"live":true}"#);
    }

    #[tokio::test]
    async fn pages_escape_titles_and_list_recent_posts() {
        let file = ContentFile {
            path: PathBuf::from("/site/posts/fish.md"),
            slug: "fish".into(),
            url_path: "/fish".into(),
            attributes: Attributes {
                title: Some("Fish & <Chips>".into()),
                date: Some("2024-03-05T00:00:00.000Z".into()),
                ..Attributes::default()
            },
            raw_body: "*Tasty*\n".into(),
        };
        let state = state_with(ManifestProvider::from_manifest(Manifest::new(vec![file])));

        let (status, body) = get(router(state.clone()), "/fish").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<h1>Fish &amp; &lt;Chips&gt;</h1>"));
        assert!(body.contains("<em>Tasty</em>"));
        assert!(!body.contains("/__folio/generation"));

        let (status, index) = get(router(state), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(index.contains("<title>Test Site</title>"));
        assert!(index.contains(r#"<li><a href="/fish">Fish &amp; &lt;Chips&gt;</a></li>"#));
    }

    #[tokio::test]
    async fn generation_failure_is_500() {
        let state = state_with(ManifestProvider::live(ManifestOptions::new(Vec::new())));
        let (status, body) = get(router(state), "/api/manifest").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("No content roots configured"));
    }
}
