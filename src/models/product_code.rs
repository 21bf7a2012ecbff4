// src/models/product_code.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::common::response::ApiStatus;

#[derive(Debug, Serialize, ToSchema)]
pub struct ProdCodesResponse {
    pub status: ApiStatus,
    #[serde(rename = "prodCodes")]
    #[schema(example = json!(["poster 18x24", "canvas wrap"]))]
    pub prod_codes: Vec<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddProdCodePayload {
    #[validate(
        required(message = "prodType and worksheetRef are required"),
        length(min = 1, message = "prodType and worksheetRef are required")
    )]
    #[schema(example = "poster 18x24")]
    pub prod_type: Option<String>,

    #[validate(
        required(message = "prodType and worksheetRef are required"),
        length(min = 1, message = "prodType and worksheetRef are required")
    )]
    #[schema(example = "POSTER")]
    pub worksheet_ref: Option<String>,
}
