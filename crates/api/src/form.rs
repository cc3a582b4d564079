//! Submitted form input: a JSON object or a multipart form, validated as one.
//!
//! Handlers for file-backed entities accept either encoding. Multipart text
//! fields arrive as strings, which the validator coerces the same way as
//! their JSON equivalents.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::Json;
use buildtrack_core::error::CoreError;
use buildtrack_core::uploads::{mime_for_extension, UploadPolicy};
use buildtrack_core::validation::rules::label;
use buildtrack_core::validation::{validate, FieldErrors, FieldRule, Mode, Reference, Validated};
use buildtrack_db::models::attachment::FileAttachment;
use buildtrack_db::repositories::ReferenceRepo;
use buildtrack_db::DbPool;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};
use crate::storage::FileStore;

/// A file part of a multipart submission.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Decoded request body.
#[derive(Debug, Default)]
pub struct FormInput {
    pub fields: Map<String, Value>,
    pub files: HashMap<String, UploadedFile>,
}

impl<S: Send + Sync> FromRequest<S> for FormInput {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            return read_multipart(multipart).await;
        }

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(FormInput::default());
        }

        match serde_json::from_slice::<Value>(&body) {
            Ok(Value::Object(fields)) => Ok(FormInput {
                fields,
                files: HashMap::new(),
            }),
            Ok(_) => Err(AppError::BadRequest(
                "Request body must be a JSON object".into(),
            )),
            Err(e) => Err(AppError::BadRequest(format!("Invalid JSON body: {e}"))),
        }
    }
}

/// A JSON body that rejects malformed input with the JSON error envelope
/// rather than axum's plain-text rejection.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        Ok(JsonBody(value))
    }
}

async fn read_multipart(mut multipart: Multipart) -> AppResult<FormInput> {
    let mut form = FormInput::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name.is_empty() {
            continue;
        }

        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                // Browsers send an empty part for an untouched file input.
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                form.files.insert(
                    name,
                    UploadedFile {
                        file_name,
                        content_type,
                        bytes,
                    },
                );
            }
            None => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                form.fields.insert(name, Value::String(text));
            }
        }
    }

    Ok(form)
}

/// File expectations for one upload field.
#[derive(Debug, Clone, Copy)]
pub struct UploadRule {
    pub field: &'static str,
    pub policy: &'static UploadPolicy,
    /// Must be present on create. Never required on update.
    pub required: bool,
}

/// A file that passed its upload policy.
#[derive(Debug, Clone)]
pub struct AcceptedFile {
    pub ext: String,
    pub mime_type: Option<String>,
    pub bytes: Bytes,
}

impl AcceptedFile {
    /// Write the file under the policy's directory.
    pub async fn save(&self, files: &FileStore, policy: &UploadPolicy) -> AppResult<FileAttachment> {
        let path = files
            .store(policy.directory, &self.ext, &self.bytes)
            .await
            .map_err(|e| AppError::InternalError(format!("Failed to store upload: {e}")))?;
        Ok(FileAttachment {
            path,
            size: self.bytes.len() as i64,
            mime_type: self.mime_type.clone(),
        })
    }
}

/// Fully validated submission.
#[derive(Debug)]
pub struct Submission {
    pub validated: Validated,
    pub file: Option<AcceptedFile>,
}

/// Validate field values, the optional upload and every referenced id.
///
/// Field and upload errors are reported together. Reference checks only run
/// once the input is otherwise valid.
pub async fn validate_submission(
    pool: &DbPool,
    rules: &[FieldRule],
    mut form: FormInput,
    mode: Mode,
    current: Option<&Map<String, Value>>,
    upload: Option<UploadRule>,
) -> AppResult<Submission> {
    let mut errors = FieldErrors::default();

    let validated = match validate(rules, &form.fields, mode, current) {
        Ok(validated) => Some(validated),
        Err(field_errors) => {
            errors.merge(field_errors);
            None
        }
    };

    let mut file = None;
    if let Some(rule) = upload {
        match form.files.remove(rule.field) {
            Some(uploaded) => {
                match rule.policy.check(
                    rule.field,
                    &uploaded.file_name,
                    uploaded.content_type.as_deref(),
                    uploaded.bytes.len() as u64,
                ) {
                    Ok(ext) => {
                        let mime_type = uploaded
                            .content_type
                            .filter(|ct| !ct.is_empty() && ct != "application/octet-stream")
                            .or_else(|| mime_for_extension(&ext).map(str::to_string));
                        file = Some(AcceptedFile {
                            ext,
                            mime_type,
                            bytes: uploaded.bytes,
                        })
                    }
                    Err(msg) => errors.add(rule.field, msg),
                }
            }
            None if rule.required && mode == Mode::Create => {
                errors.add(
                    rule.field,
                    format!("The {} field is required.", label(rule.field)),
                );
            }
            None => {}
        }
    }

    let validated = match validated {
        Some(validated) if errors.is_empty() => validated,
        _ => return Err(CoreError::Validation(errors).into()),
    };

    check_references(pool, &validated.references).await?;

    Ok(Submission { validated, file })
}

/// Validate a plain JSON body that carries no files.
pub async fn validate_input(
    pool: &DbPool,
    rules: &[FieldRule],
    input: &Map<String, Value>,
    mode: Mode,
    current: Option<&Map<String, Value>>,
) -> AppResult<Validated> {
    let validated = validate(rules, input, mode, current).map_err(CoreError::Validation)?;
    check_references(pool, &validated.references).await?;
    Ok(validated)
}

/// Verify each referenced id exists, collecting one error per missing id.
pub async fn check_references(pool: &DbPool, references: &[Reference]) -> AppResult<()> {
    let mut errors = FieldErrors::default();
    for reference in references {
        if !ReferenceRepo::exists(pool, reference.table, reference.id).await? {
            errors.add(
                reference.field,
                format!("The selected {} is invalid.", label(reference.field)),
            );
        }
    }
    errors
        .into_result()
        .map_err(|e| AppError::Core(CoreError::Validation(e)))
}

/// Serialize a stored record so update validation can compare against it.
pub fn as_current<T: Serialize>(record: &T) -> AppResult<Map<String, Value>> {
    match serde_json::to_value(record) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(AppError::InternalError(
            "Record did not serialize to an object".into(),
        )),
        Err(e) => Err(AppError::InternalError(e.to_string())),
    }
}
