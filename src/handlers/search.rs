use actix_web::{web, HttpResponse, Result};
use tracing::error;

use crate::models::{ErrorResponse, SearchRequest, SearchResponse};
use crate::services::DEFAULT_RESULT_COUNT;
use crate::AppState;

pub async fn web_search(state: web::Data<AppState>, body: web::Bytes) -> Result<HttpResponse> {
    // The raw payload is parsed by hand so that an absent or malformed body
    // maps to the documented error message instead of the extractor's.
    let request = match parse_body(&body) {
        Some(request) => request,
        None => {
            return Ok(HttpResponse::BadRequest()
                .json(ErrorResponse::new("Request body is required")));
        }
    };

    let query = request.query.as_deref().unwrap_or("").trim().to_string();
    if query.is_empty() {
        return Ok(
            HttpResponse::BadRequest().json(ErrorResponse::new("Query parameter is required"))
        );
    }

    let num_results = request.num_results.unwrap_or(DEFAULT_RESULT_COUNT);

    match state.search_service.search(&query, num_results).await {
        Ok(results) => Ok(HttpResponse::Ok().json(SearchResponse::new(query, results))),
        Err(e) => {
            error!("Web search error: {:?}", e);
            Ok(HttpResponse::InternalServerError().json(ErrorResponse::new(e.to_string())))
        }
    }
}

fn parse_body(body: &[u8]) -> Option<SearchRequest> {
    if body.is_empty() {
        return None;
    }
    serde_json::from_slice(body).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchSettings;
    use crate::models::SearchResult;
    use crate::services::{SearchProvider, SearchProviderError, SearchService};
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Arc;

    struct FixedProvider {
        results: Vec<SearchResult>,
    }

    #[async_trait]
    impl SearchProvider for FixedProvider {
        async fn search(
            &self,
            _query: &str,
            _num_results: u32,
        ) -> Result<Vec<SearchResult>, SearchProviderError> {
            Ok(self.results.clone())
        }
    }

    struct BrokenProvider;

    #[async_trait]
    impl SearchProvider for BrokenProvider {
        async fn search(
            &self,
            _query: &str,
            _num_results: u32,
        ) -> Result<Vec<SearchResult>, SearchProviderError> {
            Err(SearchProviderError::Status {
                status: reqwest::StatusCode::BAD_GATEWAY,
                body: "upstream outage".to_string(),
            })
        }
    }

    fn state_with(provider: Arc<dyn SearchProvider>) -> web::Data<AppState> {
        let settings = SearchSettings {
            api_key: "test-key".to_string(),
            ..SearchSettings::default()
        };
        web::Data::new(AppState {
            search_service: SearchService::with_provider(settings, provider),
        })
    }

    async fn post_websearch(
        state: web::Data<AppState>,
        request: test::TestRequest,
    ) -> (StatusCode, Value) {
        let app = test::init_service(
            App::new()
                .app_data(state)
                .route("/websearch", web::post().to(web_search)),
        )
        .await;

        let response = test::call_service(&app, request.uri("/websearch").to_request()).await;
        let status = response.status();
        let body = test::read_body_json(response).await;
        (status, body)
    }

    #[actix_web::test]
    async fn missing_body_is_rejected() {
        let state = state_with(Arc::new(FixedProvider { results: vec![] }));
        let (status, body) = post_websearch(state, test::TestRequest::post()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Request body is required");
    }

    #[actix_web::test]
    async fn malformed_body_is_rejected() {
        let state = state_with(Arc::new(FixedProvider { results: vec![] }));
        let request = test::TestRequest::post().set_payload("not json");
        let (status, body) = post_websearch(state, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Request body is required");
    }

    #[actix_web::test]
    async fn missing_query_is_rejected() {
        let state = state_with(Arc::new(FixedProvider { results: vec![] }));
        let request = test::TestRequest::post().set_json(json!({"num_results": 3}));
        let (status, body) = post_websearch(state, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Query parameter is required");
    }

    #[actix_web::test]
    async fn whitespace_query_is_rejected() {
        let state = state_with(Arc::new(FixedProvider { results: vec![] }));
        let request = test::TestRequest::post().set_json(json!({"query": "   "}));
        let (status, body) = post_websearch(state, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Query parameter is required");
    }

    #[actix_web::test]
    async fn successful_search_returns_envelope_in_provider_order() {
        let results = vec![
            SearchResult {
                title: "Understanding Ownership".to_string(),
                snippet: "Ownership is a set of rules.".to_string(),
                url: "https://doc.rust-lang.org/book/ch04-00.html".to_string(),
                display_url: "doc.rust-lang.org".to_string(),
            },
            SearchResult {
                title: "References and Borrowing".to_string(),
                snippet: "A reference is like a pointer.".to_string(),
                url: "https://doc.rust-lang.org/book/ch04-02.html".to_string(),
                display_url: "doc.rust-lang.org".to_string(),
            },
        ];
        let state = state_with(Arc::new(FixedProvider { results }));
        let request = test::TestRequest::post()
            .set_json(json!({"query": "rust ownership", "num_results": 3}));
        let (status, body) = post_websearch(state, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["query"], "rust ownership");
        assert_eq!(body["count"], 2);
        assert_eq!(body["source"], "web_search");
        assert_eq!(body["results"][0]["title"], "Understanding Ownership");
        assert_eq!(body["results"][0]["displayUrl"], "doc.rust-lang.org");
        assert_eq!(body["results"][1]["title"], "References and Borrowing");
        assert_eq!(
            body["results"][1]["url"],
            "https://doc.rust-lang.org/book/ch04-02.html"
        );
    }

    #[actix_web::test]
    async fn query_is_trimmed_in_the_echo() {
        let state = state_with(Arc::new(FixedProvider { results: vec![] }));
        let request = test::TestRequest::post().set_json(json!({"query": "  rust  "}));
        let (status, body) = post_websearch(state, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["query"], "rust");
    }

    #[actix_web::test]
    async fn provider_outage_is_a_successful_empty_response() {
        let state = state_with(Arc::new(BrokenProvider));
        let request = test::TestRequest::post().set_json(json!({"query": "rust"}));
        let (status, body) = post_websearch(state, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 0);
        assert_eq!(body["results"], json!([]));
        assert_eq!(body["source"], "web_search");
    }
}
