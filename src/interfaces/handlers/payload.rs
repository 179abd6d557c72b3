//! Request bodies for the content endpoints.
//!
//! Every write accepts either `application/json` or `multipart/form-data`. In the
//! multipart case non-file parts are plain strings, except for the parts a type
//! declares as JSON-encoded (arrays, nested objects), which are decoded through
//! [`decode_field`].

use std::collections::HashMap;

use actix_multipart::Multipart;
use actix_web::{dev::Payload, web, FromRequest, HttpMessage, HttpRequest};
use futures_util::{future::LocalBoxFuture, StreamExt, TryStreamExt};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::entities::upload::UploadedFile;
use crate::errors::AppError;

const MIB: usize = 1024 * 1024;
/// Largest file any upload destination accepts; the per-destination policy is stricter.
const MAX_FILE_PART: usize = 10 * MIB;
const MAX_TEXT_PART: usize = 256 * 1024;

/// Decodes one JSON-encoded form part into `T`.
pub fn decode_field<T: DeserializeOwned>(name: &str, raw: &str) -> Result<T, AppError> {
    serde_json::from_str(raw).map_err(|e| {
        tracing::debug!(field = name, error = %e, "Rejected JSON form field");
        AppError::BadRequest(format!("Invalid JSON in {}", name))
    })
}

/// Text and file parts of a multipart body.
#[derive(Debug, Default)]
pub struct FormParts {
    texts: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl FormParts {
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut parts = FormParts::default();

        while let Some(field) = multipart.next().await {
            let mut field = field?;
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            let file_name = field
                .content_disposition()
                .and_then(|cd| cd.get_filename())
                .map(str::to_string);
            let content_type = field.content_type().map(|m| m.essence_str().to_string());
            let limit = if file_name.is_some() { MAX_FILE_PART } else { MAX_TEXT_PART };

            let mut bytes = Vec::new();
            while let Some(chunk) = field.try_next().await? {
                if bytes.len() + chunk.len() > limit {
                    return Err(AppError::BadRequest(format!(
                        "Part '{}' is too large: maximum size is {} KB",
                        name,
                        limit / 1024
                    )));
                }
                bytes.extend_from_slice(&chunk);
            }

            match file_name {
                // Browsers send an unnamed empty part for an untouched file input
                Some(fname) if fname.is_empty() && bytes.is_empty() => {}
                Some(fname) => {
                    parts.files.insert(
                        name,
                        UploadedFile { file_name: Some(fname), content_type, bytes },
                    );
                }
                None => {
                    let text = String::from_utf8(bytes)
                        .map_err(|_| AppError::BadRequest(format!("Invalid UTF-8 in {}", name)))?;
                    parts.texts.insert(name, text);
                }
            }
        }

        Ok(parts)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.texts.get(name).map(String::as_str)
    }

    /// Starts building a typed body from the text parts.
    pub fn body(&self) -> FormBody<'_> {
        let values = self
            .texts
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        FormBody { form: self, values }
    }
}

/// Text parts on their way into a request type. Plain parts stay strings and are
/// coerced by the type's own deserializers.
pub struct FormBody<'a> {
    form: &'a FormParts,
    values: Map<String, Value>,
}

impl FormBody<'_> {
    /// Marks `name` as a JSON-encoded part that must decode as `T`. A blank part
    /// counts as absent.
    pub fn json<T: DeserializeOwned>(mut self, name: &str) -> Result<Self, AppError> {
        match self.form.text(name).map(str::trim) {
            None => {}
            Some("") => {
                self.values.remove(name);
            }
            Some(raw) => {
                let value: Value = decode_field(name, raw)?;
                T::deserialize(&value)
                    .map_err(|_| AppError::BadRequest(format!("Invalid JSON in {}", name)))?;
                self.values.insert(name.to_string(), value);
            }
        }
        Ok(self)
    }

    pub fn parse<T: DeserializeOwned>(self) -> Result<T, AppError> {
        T::deserialize(Value::Object(self.values))
            .map_err(|e| AppError::BadRequest(format!("Invalid form data: {}", e)))
    }
}

/// Maps multipart text parts onto a request type.
pub trait FromForm: Sized {
    fn from_form(form: &FormParts) -> Result<Self, AppError>;
}

/// A create or update body with any files that came with it. JSON bodies never carry files.
#[derive(Debug)]
pub struct EntityPayload<T> {
    pub data: T,
    files: HashMap<String, UploadedFile>,
}

impl<T> EntityPayload<T> {
    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }
}

fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    let body = if body.iter().all(u8::is_ascii_whitespace) { b"{}".as_slice() } else { body };
    serde_json::from_slice(body).map_err(|e| AppError::BadRequest(format!("Malformed JSON body: {}", e)))
}

impl<T> FromRequest for EntityPayload<T>
where
    T: DeserializeOwned + FromForm + 'static,
{
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let content_type = req.content_type().to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::new(req.headers(), payload.take());
            return Box::pin(async move {
                let mut form = FormParts::read(multipart).await?;
                let data = T::from_form(&form)?;
                Ok(EntityPayload { data, files: std::mem::take(&mut form.files) })
            });
        }

        if !content_type.is_empty() && content_type != "application/json" {
            return Box::pin(async {
                Err(AppError::BadRequest(
                    "Content-Type must be application/json or multipart/form-data".to_string(),
                )
                .into())
            });
        }

        let body = web::Bytes::from_request(req, payload);
        Box::pin(async move {
            let bytes = body.await?;
            let data = parse_json::<T>(&bytes)?;
            Ok(EntityPayload { data, files: HashMap::new() })
        })
    }
}
