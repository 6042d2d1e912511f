//! Category lookup and image decision endpoints

use std::collections::BTreeSet;

use axum::{
    extract::{Path, RawQuery, State},
    Json,
};
use tracing::{debug, info};

use super::state::AppState;
use super::types::{ApiError, ImageResponse};
use crate::domain::{
    CategoryKey, Decision, DecisionRequest, DomainError, ImageIdentity, DEFAULT_THRESHOLD,
};

/// Query of `GET /image/{id}`, after validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageQuery {
    pub category: CategoryKey,
    pub threshold: i32,
    pub cached_images: BTreeSet<ImageIdentity>,
}

impl ImageQuery {
    /// Parses a raw query string
    ///
    /// `cached_images` may repeat; unknown keys are ignored.
    pub fn parse(raw: Option<&str>) -> Result<Self, ApiError> {
        let mut category = None;
        let mut threshold = None;
        let mut cached_images = BTreeSet::new();

        for (key, value) in url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
            match &*key {
                "category" => category = Some(value.into_owned()),
                "threshold" => threshold = Some(value.into_owned()),
                "cached_images" => {
                    let id = ImageIdentity::new(value.into_owned()).map_err(|e| {
                        ApiError::bad_request(e.to_string()).with_param("cached_images")
                    })?;
                    cached_images.insert(id);
                }
                _ => {}
            }
        }

        let category = category
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ApiError::bad_request("Category not provided").with_param("category"))?;
        let category = CategoryKey::parse(&category)
            .map_err(|e| ApiError::bad_request(e.to_string()).with_param("category"))?;

        let threshold = match threshold {
            None => DEFAULT_THRESHOLD,
            Some(raw) => raw.trim().parse::<i32>().map_err(|_| {
                ApiError::bad_request(format!("Threshold must be an integer, got '{}'", raw))
                    .with_param("threshold")
            })?,
        };

        Ok(Self {
            category,
            threshold,
            cached_images,
        })
    }
}

fn parse_image_id(raw: &str) -> Result<ImageIdentity, ApiError> {
    ImageIdentity::new(raw).map_err(|e| ApiError::bad_request(e.to_string()).with_param("image_id"))
}

/// GET /category/{image_id}
pub async fn get_category(
    State(state): State<AppState>,
    Path(image_id): Path<String>,
) -> Result<String, ApiError> {
    let id = parse_image_id(&image_id)?;

    let category = state
        .catalog
        .category_of(&id)
        .await?
        .ok_or_else(|| DomainError::category_not_found(id.to_string()))?;

    debug!(image_id = %id, category = %category, "Resolved category");
    Ok(category.to_string())
}

/// GET /image/{image_id}
pub async fn get_image(
    State(state): State<AppState>,
    Path(image_id): Path<String>,
    RawQuery(raw): RawQuery,
) -> Result<Json<ImageResponse>, ApiError> {
    let id = parse_image_id(&image_id)?;
    let query = ImageQuery::parse(raw.as_deref())?;

    let request = DecisionRequest::new(id, query.category)
        .with_threshold(query.threshold)
        .with_cached(query.cached_images);

    let decision = state.decision_service.decide(&request).await?;

    match &decision {
        Decision::Reuse { existing } => info!(
            image_id = %request.requested,
            reuse = %existing,
            threshold = request.threshold,
            "Suggesting cached image"
        ),
        Decision::Fetch(payload) => info!(
            image_id = %request.requested,
            bytes = payload.byte_size(),
            "Sending image"
        ),
    }

    Ok(Json(ImageResponse::from_domain(&decision)))
}
