//! Request body extractor
//!
//! [`JsonBody`] wraps `axum::Json` so that a malformed body fails the same way
//! a bad form does: 400 with `{ success, message, errors }`. A request that
//! carries no `Content-Type` at all is read as an empty object, which lets the
//! use case report each missing field.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, OptionalFromRequest, Request};
use kernel::validation::FieldErrors;
use serde::de::DeserializeOwned;

use crate::error::AccountsError;

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = AccountsError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match <Json<T> as OptionalFromRequest<S>>::from_request(req, state).await {
            Ok(Some(Json(value))) => Ok(Self(value)),
            Ok(None) => Ok(Self(T::default())),
            Err(rejection) => Err(AccountsError::Validation(body_errors(&rejection))),
        }
    }
}

fn body_errors(rejection: &JsonRejection) -> FieldErrors {
    let message = match rejection {
        JsonRejection::JsonDataError(_) => {
            format!("Invalid data. {}", rejection.body_text())
        }
        JsonRejection::JsonSyntaxError(_) => "JSON parse error.".to_string(),
        JsonRejection::MissingJsonContentType(_) => {
            "Unsupported media type, expected application/json.".to_string()
        }
        _ => "Request body could not be read.".to_string(),
    };

    let mut errors = FieldErrors::new();
    errors.add_non_field(message);
    errors
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{self, header};
    use kernel::validation::NON_FIELD_ERRORS;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Default, Deserialize)]
    struct Form {
        name: Option<String>,
    }

    async fn extract(request: Request) -> Result<Form, AccountsError> {
        JsonBody::<Form>::from_request(request, &())
            .await
            .map(|JsonBody(form)| form)
    }

    fn json_request(body: &'static str) -> Request {
        http::Request::builder()
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    fn non_field_errors(err: AccountsError) -> Vec<String> {
        err.field_errors()
            .and_then(|errors| errors.get(NON_FIELD_ERRORS).map(<[String]>::to_vec))
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_no_content_type_reads_as_empty_object() {
        let form = extract(Request::new(Body::empty())).await.unwrap();
        assert_eq!(form.name, None);
    }

    #[tokio::test]
    async fn test_valid_body() {
        let form = extract(json_request(r#"{"name":"linghu"}"#)).await.unwrap();
        assert_eq!(form.name.as_deref(), Some("linghu"));
    }

    #[tokio::test]
    async fn test_rejections_become_non_field_errors() {
        for body in ["[1,2]", r#"{"name":12345678}"#, "", "{"] {
            let err = extract(json_request(body)).await.unwrap_err();
            assert!(matches!(err, AccountsError::Validation(_)), "body {body:?}");
            assert_eq!(non_field_errors(err).len(), 1, "body {body:?}");
        }

        let request = http::Request::builder()
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("name=linghu"))
            .unwrap();
        let err = extract(request).await.unwrap_err();
        assert_eq!(
            non_field_errors(err),
            vec!["Unsupported media type, expected application/json.".to_string()]
        );
    }
}
