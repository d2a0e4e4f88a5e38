// 🌐 Gallery API - JSON routes over a shared Gallery
//
// Unknown categories are reported as 404 here even though the gallery
// itself treats them as no-ops.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::fetch::ImageSource;
use crate::gallery::Gallery;

/// API Response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddCategoryRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct WeightRequest {
    pub weight: f64,
}

fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ApiResponse::<()>::error(message))).into_response()
}

fn unknown_category(name: &str) -> Response {
    failure(StatusCode::NOT_FOUND, format!("Unknown category: {name}"))
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/categories - Weights and image counts
async fn list_categories<S: ImageSource>(State(gallery): State<Gallery<S>>) -> impl IntoResponse {
    Json(ApiResponse::ok(gallery.summaries()))
}

/// POST /api/categories - Add a category and fetch its images
async fn add_category<S: ImageSource>(
    State(gallery): State<Gallery<S>>,
    Json(request): Json<AddCategoryRequest>,
) -> Response {
    if gallery.add_category(&request.name).is_none() {
        return failure(StatusCode::BAD_REQUEST, "Category name must not be blank");
    }

    (StatusCode::CREATED, Json(ApiResponse::ok(gallery.summaries()))).into_response()
}

/// DELETE /api/categories/:name
async fn remove_category<S: ImageSource>(
    State(gallery): State<Gallery<S>>,
    Path(name): Path<String>,
) -> Response {
    if !gallery.contains(&name) {
        return unknown_category(&name);
    }

    gallery.remove_category(&name);
    Json(ApiResponse::ok(gallery.summaries())).into_response()
}

/// PUT /api/categories/:name/weight - Pin a weight, rescale the rest
async fn set_weight<S: ImageSource>(
    State(gallery): State<Gallery<S>>,
    Path(name): Path<String>,
    Json(request): Json<WeightRequest>,
) -> Response {
    if !(0.0..=1.0).contains(&request.weight) {
        return failure(StatusCode::BAD_REQUEST, "Weight must be within [0, 1]");
    }
    if !gallery.contains(&name) {
        return unknown_category(&name);
    }

    gallery.set_weight(&name, request.weight);
    Json(ApiResponse::ok(gallery.summaries())).into_response()
}

/// POST /api/categories/:name/refresh - Re-fetch images in the background
async fn refresh_category<S: ImageSource>(
    State(gallery): State<Gallery<S>>,
    Path(name): Path<String>,
) -> Response {
    if !gallery.contains(&name) {
        return unknown_category(&name);
    }

    gallery.refresh(&name);
    (StatusCode::ACCEPTED, Json(ApiResponse::ok(name))).into_response()
}

/// GET /api/categories/:name/random - Uniform image from one category
async fn random_from_category<S: ImageSource>(
    State(gallery): State<Gallery<S>>,
    Path(name): Path<String>,
) -> Response {
    match gallery.image_from(&name) {
        Some(url) => Json(ApiResponse::ok(url)).into_response(),
        None => failure(StatusCode::NOT_FOUND, format!("No images for category: {name}")),
    }
}

/// GET /api/random - Weighted category, then uniform image
async fn random_image<S: ImageSource>(State(gallery): State<Gallery<S>>) -> Response {
    match gallery.next_image() {
        Some(pick) => Json(ApiResponse::ok(pick)).into_response(),
        None => failure(StatusCode::NOT_FOUND, "No image available"),
    }
}

// ============================================================================
// Router
// ============================================================================

/// Build the `/api` router around a gallery
pub fn router<S: ImageSource>(gallery: Gallery<S>) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route(
            "/categories",
            get(list_categories::<S>).post(add_category::<S>),
        )
        .route("/categories/:name", delete(remove_category::<S>))
        .route("/categories/:name/weight", put(set_weight::<S>))
        .route("/categories/:name/refresh", post(refresh_category::<S>))
        .route("/categories/:name/random", get(random_from_category::<S>))
        .route("/random", get(random_image::<S>))
        .with_state(gallery);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

// ============================================================================
// TESTS
// ============================================================================
