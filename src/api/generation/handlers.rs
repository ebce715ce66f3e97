use actix_web::{
    HttpResponse, get, post,
    web::{Data, Form, Path, ServiceConfig},
};
use validator::Validate;

use super::dto::{GenerateResponse, HistoryResponse, StatusResponse};
use super::models::GenerateForm;
use super::service::{GenerationService, ServiceError};
use crate::api::validation::validation_message;

#[post("/generate")]
async fn generate(
    service: Data<GenerationService>,
    form: Form<GenerateForm>,
) -> Result<HttpResponse, ServiceError> {
    form.validate()
        .map_err(|e| ServiceError::InvalidInput(validation_message(&e)))?;

    let job = service.request_generation(&form.prompt).await?;
    Ok(HttpResponse::Ok().json(GenerateResponse::from(job)))
}

#[get("/check-status/{generation_id}")]
async fn check_status(
    service: Data<GenerationService>,
    generation_id: Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let outcome = service.poll_generation(&generation_id).await?;
    Ok(HttpResponse::Ok().json(StatusResponse::from(outcome)))
}

#[get("/history")]
async fn history(service: Data<GenerationService>) -> Result<HttpResponse, ServiceError> {
    let animations = service.list_history().await?;
    Ok(HttpResponse::Ok().json(HistoryResponse::new(animations)))
}

pub fn generation_config(config: &mut ServiceConfig) {
    config
        .service(generate)
        .service(check_status)
        .service(history);
}
