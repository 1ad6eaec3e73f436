//! Response envelope parsing and pagination.
//!
//! Successful API responses wrap their payload as `{"result": ...}`. Failures
//! carry either `{"error": {"code", "message"}}` or a validation report
//! `{"detail": [{"loc", "msg", "type"}]}`.

use futures::stream::{self, Stream, TryStreamExt};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::error::FieldError;
use super::transport::{HttpResponse, Transport};
use super::AutologinClient;
use crate::{ClientError, Result};

const SUCCESS_CODES: [u16; 4] = [200, 201, 202, 204];

#[derive(Deserialize)]
struct Envelope<T> {
    result: T,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

#[derive(Deserialize)]
struct ValidationEnvelope {
    detail: Vec<FieldError>,
}

#[derive(Deserialize)]
struct Page<T> {
    items: Vec<T>,
    pg_size: usize,
}

pub fn is_success(response: &HttpResponse) -> bool {
    SUCCESS_CODES.contains(&response.status.as_u16())
}

/// Parse the `result` member of a successful response.
pub fn parse_result<T: DeserializeOwned>(response: &HttpResponse) -> Result<T> {
    let body = json_object(response)?;
    if !is_success(response) {
        return Err(error_from_body(body));
    }

    let envelope: Envelope<T> = serde_json::from_value(body)
        .map_err(|e| ClientError::internal(format!("unexpected result shape: {}", e)))?;
    Ok(envelope.result)
}

/// Check a response that carries no payload of interest.
pub fn parse_empty(response: &HttpResponse) -> Result<()> {
    if is_success(response) && response.body.is_empty() {
        return Ok(());
    }
    let body = json_object(response)?;
    if !is_success(response) {
        return Err(error_from_body(body));
    }
    Ok(())
}

fn json_object(response: &HttpResponse) -> Result<serde_json::Value> {
    match response.json::<serde_json::Value>() {
        Ok(value) if value.is_object() => Ok(value),
        _ => Err(ClientError::unexpected_body(response.status, &response.body)),
    }
}

fn error_from_body(body: serde_json::Value) -> ClientError {
    if let Ok(ErrorEnvelope { error }) = serde_json::from_value(body.clone()) {
        debug!(code = %error.code, "API error");
        return ClientError::Api {
            code: error.code,
            message: error.message,
        };
    }
    match serde_json::from_value::<ValidationEnvelope>(body) {
        Ok(ValidationEnvelope { detail }) => ClientError::Validation(detail),
        Err(e) => ClientError::internal(format!("unrecognized error response: {}", e)),
    }
}

/// Stream every item of a paginated collection.
///
/// Pages are requested as `pg_num = 0, 1, ...` until a page comes back empty
/// or shorter than its `pg_size`.
pub fn paginate<'a, T, U>(
    client: &'a AutologinClient<U>,
    path: String,
    query: Vec<(String, String)>,
) -> impl Stream<Item = Result<T>> + 'a
where
    T: DeserializeOwned + 'a,
    U: Transport,
{
    stream::try_unfold(Some(0u64), move |cursor| {
        let path = path.clone();
        let query = query.clone();
        async move {
            let pg_num = match cursor {
                Some(pg_num) => pg_num,
                None => return Ok(None),
            };

            let pg_num_text = pg_num.to_string();
            let mut pairs: Vec<(&str, &str)> =
                query.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
            pairs.push(("pg_num", pg_num_text.as_str()));

            let response = client.get_with_query(&path, &pairs).await?;
            let page: Page<T> = parse_result(&response)?;
            debug!(path = %path, pg_num, items = page.items.len(), "Fetched page");

            let next = if page.items.is_empty() || page.items.len() < page.pg_size {
                None
            } else {
                Some(pg_num + 1)
            };
            Ok::<_, ClientError>(Some((page.items, next)))
        }
    })
    .map_ok(|items| stream::iter(items.into_iter().map(Ok::<T, ClientError>)))
    .try_flatten()
}

/// Collect a whole paginated collection.
pub async fn collect_all<'a, T, U>(
    client: &'a AutologinClient<U>,
    path: String,
    query: Vec<(String, String)>,
) -> Result<Vec<T>>
where
    T: DeserializeOwned + 'a,
    U: Transport,
{
    paginate(client, path, query).try_collect().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: String,
    }

    fn response(status: StatusCode, body: serde_json::Value) -> HttpResponse {
        HttpResponse::new(status).with_json(&body)
    }

    #[test]
    fn test_parse_result_success() {
        let ok = response(StatusCode::CREATED, json!({"result": {"id": "5"}}));
        let item: Item = parse_result(&ok).unwrap();
        assert_eq!(item, Item { id: "5".into() });
    }

    #[test]
    fn test_parse_result_api_error() {
        let err = response(
            StatusCode::CONFLICT,
            json!({"error": {"code": "E_PROJECT_EXISTS", "message": "Project already exists"}}),
        );
        match parse_result::<Item>(&err) {
            Err(ClientError::Api { code, message }) => {
                assert_eq!(code, "E_PROJECT_EXISTS");
                assert_eq!(message, "Project already exists");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_parse_result_validation_error() {
        let err = response(
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({"detail": [{"loc": ["body", "name"], "msg": "field required", "type": "value_error.missing"}]}),
        );
        match parse_result::<Item>(&err) {
            Err(ClientError::Validation(errors)) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].location(), "body.name");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_parse_result_malformed_is_internal() {
        let not_object = response(StatusCode::OK, json!([1, 2, 3]));
        assert!(matches!(parse_result::<Item>(&not_object), Err(ClientError::Internal(_))));

        let wrong_shape = response(StatusCode::OK, json!({"result": {"name": "x"}}));
        assert!(matches!(parse_result::<Item>(&wrong_shape), Err(ClientError::Internal(_))));

        let unknown_error = response(StatusCode::INTERNAL_SERVER_ERROR, json!({"oops": true}));
        assert!(matches!(parse_result::<Item>(&unknown_error), Err(ClientError::Internal(_))));

        let mut html = HttpResponse::new(StatusCode::BAD_GATEWAY);
        html.body = b"<html>Bad gateway</html>".to_vec();
        assert!(matches!(parse_result::<Item>(&html), Err(ClientError::Internal(_))));
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse_empty(&HttpResponse::new(StatusCode::NO_CONTENT)).is_ok());
        assert!(parse_empty(&response(StatusCode::OK, json!({"result": null}))).is_ok());
        let err = response(
            StatusCode::NOT_FOUND,
            json!({"error": {"code": "E_NOT_FOUND", "message": "Not found"}}),
        );
        assert!(matches!(parse_empty(&err), Err(ClientError::Api { .. })));
    }
}
