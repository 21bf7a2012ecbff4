// src/handlers/product_codes.rs

use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        extract::JsonBody,
        response::{ApiStatus, ErrorResponse, MessageResponse},
    },
    config::AppState,
    models::product_code::{AddProdCodePayload, ProdCodesResponse},
};

#[utoipa::path(
    get,
    path = "/api/fetchProdCodes",
    tag = "Product codes",
    responses((status = 200, description = "Known raw product types", body = ProdCodesResponse))
)]
pub async fn fetch_prod_codes(
    State(app_state): State<AppState>,
) -> Result<Json<ProdCodesResponse>, AppError> {
    let prod_codes = app_state.product_code_service.prod_types().await?;
    Ok(Json(ProdCodesResponse {
        status: ApiStatus::Success,
        prod_codes,
    }))
}

#[utoipa::path(
    post,
    path = "/api/addProdCode",
    tag = "Product codes",
    request_body = AddProdCodePayload,
    responses(
        (status = 200, description = "Mapping stored", body = MessageResponse),
        (status = 400, description = "Missing prodType or worksheetRef", body = ErrorResponse)
    )
)]
pub async fn add_prod_code(
    State(app_state): State<AppState>,
    JsonBody(payload): JsonBody<AddProdCodePayload>,
) -> Result<Json<MessageResponse>, AppError> {
    payload.validate()?;
    let prod_type = payload.prod_type.unwrap_or_default();
    let worksheet_ref = payload.worksheet_ref.unwrap_or_default();

    app_state
        .product_code_service
        .map(&prod_type, &worksheet_ref)
        .await?;
    Ok(Json(MessageResponse::success(format!(
        "prodType '{prod_type}' mapped to '{worksheet_ref}'"
    ))))
}
