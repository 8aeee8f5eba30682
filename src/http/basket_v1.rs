use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::etf::basket_v1::BasketError;
use crate::input::prices::PriceTable;

/// Shared state handed to every worker. The price table is loaded before the server starts
/// and never mutated, so it is stored without a lock.
pub struct AppState {
    pub prices: PriceTable,
}

impl AppState {
    pub fn new(prices: PriceTable) -> Self {
        Self { prices }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct StatusResponse {
    #[serde(rename = "BackendStatus")]
    pub backend_status: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub detail: String,
}

#[derive(Debug, Display)]
#[display("{_0}")]
pub struct ServerError(BasketError);

impl std::error::Error for ServerError {}

impl From<BasketError> for ServerError {
    fn from(e: BasketError) -> Self {
        Self(e)
    }
}

impl actix_web::ResponseError for ServerError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        if self.0.is_internal() {
            actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
        } else {
            actix_web::http::StatusCode::BAD_REQUEST
        }
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        actix_web::HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.0.kind().to_string(),
            detail: self.0.to_string(),
        })
    }
}

pub mod server {
    use actix_web::{get, post, web};
    use log::info;

    use crate::etf::basket_v1::{evaluate, BasketReport};

    use super::{AppState, ServerError, StatusResponse};

    #[get("/status")]
    pub async fn status() -> web::Json<StatusResponse> {
        web::Json(StatusResponse {
            backend_status: true,
        })
    }

    #[post("/process")]
    pub async fn process(
        app: web::Data<AppState>,
        body: web::Bytes,
    ) -> Result<web::Json<BasketReport>, ServerError> {
        match evaluate(&app.prices, &body) {
            Ok(report) => {
                info!(
                    "evaluated basket: {} constituents over {} dates",
                    report.constituents.len(),
                    report.etf_series.len()
                );
                Ok(web::Json(report))
            }
            Err(e) => {
                info!("rejected basket: {e}");
                Err(ServerError::from(e))
            }
        }
    }
}
