//! Endpoint handlers.

use serde::Serialize;

use super::params::ListTransformationsParams;
use super::ApiResponse;
use crate::error::TransformationError;
use crate::model::{
    FileKind, StatusDetails, TransformationInput, TransformationList, UploadedFile,
};
use crate::service::{NewTransformation, TransformationService};

/// Multipart submission: the two files plus the `data` JSON field.
#[derive(Debug, Clone)]
pub struct CreateTransformationRequest {
    pub excel_file: UploadedFile,
    pub word_file: UploadedFile,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceInfo {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// `POST /transformations` → 201.
pub async fn create_transformation(
    service: &TransformationService,
    request: CreateTransformationRequest,
) -> ApiResponse<TransformationList> {
    let CreateTransformationRequest {
        excel_file,
        word_file,
        data,
    } = request;

    let checked = FileKind::Spreadsheet
        .validate_name(excel_file.filename.as_deref())
        .and_then(|_| FileKind::Document.validate_name(word_file.filename.as_deref()))
        .and_then(|_| TransformationInput::from_json(&data));
    let input = match checked {
        Ok(input) => input,
        Err(e) => return ApiResponse::from_error(&TransformationError::from(e)),
    };

    let submission = NewTransformation {
        excel_file,
        word_file,
        input,
    };
    match service.create(submission).await {
        Ok(list) => ApiResponse::created(list),
        Err(e) => ApiResponse::from_error(&e),
    }
}

/// `GET /transformations`.
pub fn list_transformations(
    service: &TransformationService,
    params: &ListTransformationsParams,
) -> ApiResponse<TransformationList> {
    let result = params
        .to_query(service.default_page_size())
        .map_err(TransformationError::from)
        .and_then(|query| service.list(&query));
    respond(result)
}

/// `GET /transformations/{id}/status-details`.
pub fn get_status_details(service: &TransformationService, id: &str) -> ApiResponse<StatusDetails> {
    respond(service.get_status_details(id))
}

/// `GET /transformations/trade-lanes`.
pub fn get_trade_lanes(service: &TransformationService) -> ApiResponse<Vec<String>> {
    respond(service.get_trade_lanes())
}

/// `GET /`.
pub fn service_info(service_name: &str) -> ApiResponse<ServiceInfo> {
    ApiResponse::ok(ServiceInfo {
        status: "ok".to_string(),
        service: service_name.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn respond<T>(result: Result<T, TransformationError>) -> ApiResponse<T> {
    match result {
        Ok(data) => ApiResponse::ok(data),
        Err(e) => ApiResponse::from_error(&e),
    }
}
