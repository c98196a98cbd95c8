use crate::error::{ApiError, Result};
use crate::model::{CountQuery, CreateChirpResponse, TagFilter};
use crate::state::AppState;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use chirper_core::{Chirp, NewChirp};
use tracing::info;

fn bad_query(rejection: QueryRejection) -> ApiError {
    ApiError::BadRequest(rejection.body_text())
}

/// `GET /chirps?tags=..&tags=..`
pub async fn list_chirps_handler(
    State(state): State<AppState>,
    params: std::result::Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<Vec<Chirp>>> {
    let Query(params) = params.map_err(bad_query)?;
    let filter: TagFilter = params.into_iter().collect();
    let chirps = state.chirps().get_chirps(&filter.tags).await?;
    Ok(Json(chirps))
}

/// `POST /chirps` with a `{"message", "tags", "author"}` body.
///
/// A body that does not decode into a chirp is rejected before the
/// repository is involved.
pub async fn create_chirp_handler(
    State(state): State<AppState>,
    body: std::result::Result<Json<NewChirp>, JsonRejection>,
) -> Result<Json<CreateChirpResponse>> {
    let Json(chirp) = body.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    let author = chirp.author.clone();
    let chirp_id = state.chirps().create_chirp(chirp).await?;
    info!(chirp_id, author = %author, "chirp created");

    Ok(Json(CreateChirpResponse::default()))
}

/// `GET /admin/chirps/count?startingDate=..&endingDate=..&tags=..`
pub async fn count_chirps_handler(
    State(state): State<AppState>,
    params: std::result::Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<i64>> {
    let Query(params) = params.map_err(bad_query)?;
    let query: CountQuery = params.into_iter().collect();
    let (Some(starting_date), Some(ending_date)) = (query.starting_date, query.ending_date) else {
        return Err(ApiError::BadRequest(
            "startingDate and endingDate are required".to_string(),
        ));
    };

    let count = state
        .chirps()
        .count_chirps(&starting_date, &ending_date, &query.tags)
        .await?;
    Ok(Json(count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::{StatusCode, Uri};
    use axum::response::IntoResponse;

    #[tokio::test]
    async fn query_rejection_becomes_json_bad_request() {
        let uri: Uri = "/v1/api/chirps?value=not-a-number".parse().unwrap();
        let rejection = Query::<std::collections::HashMap<String, u8>>::try_from_uri(&uri)
            .err()
            .unwrap();

        let response = bad_query(rejection).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({"error": "Bad Request"}));
    }
}
