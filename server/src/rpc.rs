//! Procedure dispatch: JSON input in, JSON output out.

use anyhow::Context;
use platform_api::{
    ApiError, ApiResult, Procedure,
    validation::{parse_create, parse_id, parse_search, parse_update},
};
use serde::Serialize;
use serde_json::Value;

use crate::service::EmployeeService;

pub async fn call(
    service: &EmployeeService,
    procedure: Procedure,
    input: &Value,
) -> ApiResult<Value> {
    match procedure {
        Procedure::GetAll => encode(service.list().await?),
        Procedure::GetById => {
            let id = parse_id(input)?.id;
            encode(service.get_by_id(id).await?)
        }
        Procedure::Create => encode(service.create(parse_create(input)?).await?),
        Procedure::Update => encode(service.update(parse_update(input)?).await?),
        Procedure::Delete => {
            let id = parse_id(input)?.id;
            encode(service.delete(id).await?)
        }
        Procedure::Search => {
            let search = parse_search(input)?;
            encode(service.search(&search.query).await?)
        }
    }
}

/// Decodes the `input` query parameter of a GET call. Absent input is `null`.
pub fn decode_query_input(raw: Option<&str>) -> ApiResult<Value> {
    match raw {
        None => Ok(Value::Null),
        Some(raw) => decode_json(raw.as_bytes()),
    }
}

/// Decodes a POST body. An empty body is `null`.
pub fn decode_body(body: &[u8]) -> ApiResult<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    decode_json(body)
}

fn decode_json(bytes: &[u8]) -> ApiResult<Value> {
    serde_json::from_slice(bytes).map_err(|err| ApiError::Parse(err.to_string()))
}

fn encode<T: Serialize>(output: T) -> ApiResult<Value> {
    serde_json::to_value(output)
        .context("failed to encode procedure output")
        .map_err(ApiError::from)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use platform_db::MemoryEmployeeStore;
    use serde_json::json;

    use super::*;

    fn service() -> EmployeeService {
        EmployeeService::new(Arc::new(MemoryEmployeeStore::new()))
    }

    fn ada() -> Value {
        json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@x.com",
            "department": "Engineering",
            "position": "Analyst",
            "salary": 90000
        })
    }

    #[test]
    fn inputs_decode_to_null_when_missing() {
        assert_eq!(decode_query_input(None).unwrap(), Value::Null);
        assert_eq!(decode_body(b"").unwrap(), Value::Null);
        assert_eq!(decode_body(b"  \n").unwrap(), Value::Null);
        assert_eq!(decode_query_input(Some("{\"id\":1}")).unwrap(), json!({"id": 1}));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = decode_query_input(Some("{id:")).unwrap_err();
        assert_eq!(err.code(), "PARSE_ERROR");
        assert_eq!(decode_body(b"nope").unwrap_err().http_status(), 400);
    }

    #[tokio::test]
    async fn ada_scenario_through_dispatch() {
        let service = service();
        let created = call(&service, Procedure::Create, &ada()).await.unwrap();
        assert_eq!(created["isActive"], true);
        let id = created["id"].as_i64().unwrap();

        let all = call(&service, Procedure::GetAll, &Value::Null).await.unwrap();
        assert_eq!(all[0]["firstName"], "Ada");

        let updated = call(&service, Procedure::Update, &json!({"id": id, "salary": 95000}))
            .await
            .unwrap();
        assert_eq!(updated["salary"], 95000.0);
        assert_eq!(updated["firstName"], "Ada");

        let deleted = call(&service, Procedure::Delete, &json!({"id": id})).await.unwrap();
        assert_eq!(deleted["id"], id);
        let err = call(&service, Procedure::GetById, &json!({"id": id}))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn bad_input_is_rejected_before_dispatch() {
        let service = service();
        let err = call(&service, Procedure::GetById, &Value::Null).await.unwrap_err();
        assert_eq!(err.code(), "BAD_REQUEST");
        let err = call(&service, Procedure::Search, &json!({"query": 3}))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "BAD_REQUEST");
    }

    #[tokio::test]
    async fn search_returns_an_array() {
        let service = service();
        call(&service, Procedure::Create, &ada()).await.unwrap();
        let hits = call(&service, Procedure::Search, &json!({"query": "gineer"}))
            .await
            .unwrap();
        assert_eq!(hits.as_array().unwrap().len(), 1);
        let none = call(&service, Procedure::Search, &json!({"query": "zzz"}))
            .await
            .unwrap();
        assert_eq!(none, json!([]));
    }
}
