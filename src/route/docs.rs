use std::sync::Arc;

use aide::{
	axum::{routing::get, ApiRouter, IntoApiResponse},
	openapi::OpenApi,
};
use axum::{response::IntoResponse, Extension};

use crate::{extract::Json, AppState};

pub fn routes() -> ApiRouter<AppState> {
	ApiRouter::new().route("/api.json", get(serve_docs))
}

async fn serve_docs(Extension(api): Extension<Arc<OpenApi>>) -> impl IntoApiResponse {
	Json(&*api).into_response()
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[tokio::test]
	async fn test_docs_list_routes() {
		let app = app().await;

		let response = app.get("/docs/api.json").await;

		assert_eq!(response.status_code(), StatusCode::OK);

		let api = response.json::<Value>();

		assert!(api["paths"]["/accounts/register"]["post"].is_object());
		assert!(api["paths"]["/accounts/follow/{id}"]["post"].is_object());
		assert!(api["paths"]["/posts/{id}/comments"]["get"].is_object());
	}
}
