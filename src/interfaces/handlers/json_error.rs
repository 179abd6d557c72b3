use actix_web::{error::{JsonPayloadError, QueryPayloadError}, web};

use crate::errors::AppError;

const JSON_LIMIT: usize = 256 * 1024;
/// Raw body limit for JSON content bodies; multipart parts are capped separately.
const PAYLOAD_LIMIT: usize = 2 * 1024 * 1024;

/// Extractor errors answer with the same `{msg}` body as every other failure.
pub fn config_extractors(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(JSON_LIMIT)
            .error_handler(|err, _req| json_error(err).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| query_error(err).into()),
    )
    .app_data(web::PayloadConfig::new(PAYLOAD_LIMIT));
}

fn json_error(err: JsonPayloadError) -> AppError {
    match err {
        JsonPayloadError::ContentType => {
            AppError::BadRequest("Content-Type must be application/json".to_string())
        }
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
            AppError::BadRequest("Request body is too large".to_string())
        }
        other => AppError::BadRequest(format!("Malformed JSON body: {}", other)),
    }
}

fn query_error(err: QueryPayloadError) -> AppError {
    AppError::BadRequest(format!("Invalid query string: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_error_has_a_readable_message() {
        assert_eq!(
            json_error(JsonPayloadError::ContentType).message(),
            "Content-Type must be application/json"
        );
    }
}
