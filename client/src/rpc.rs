//! HTTP client for the `/trpc` procedures.

use platform_api::{
    CreateEmployeeInput, Employee, EmployeeId, HealthStatus, Procedure, SearchQuery,
    UpdateEmployeeInput,
    rpc::{RPC_PREFIX, RpcFailure, RpcSuccess},
};
use reqwest::Client;
use serde::{Serialize, de::DeserializeOwned};

use crate::{ClientError, ClientResult};

pub const DEFAULT_URL: &str = "http://localhost:3001/trpc";

#[derive(Debug, Clone)]
pub struct RpcClient {
    client: Client,
    base_url: String,
}

impl RpcClient {
    /// `base_url` points at the RPC prefix, e.g. `http://localhost:3001/trpc`.
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, procedure: Procedure) -> String {
        format!("{}/{}", self.base_url, procedure.path())
    }

    /// Server root, where the liveness check lives.
    fn origin(&self) -> &str {
        self.base_url
            .strip_suffix(RPC_PREFIX)
            .unwrap_or(&self.base_url)
    }

    async fn query<I: Serialize, T: DeserializeOwned>(
        &self,
        procedure: Procedure,
        input: Option<&I>,
    ) -> ClientResult<T> {
        let mut request = self.client.get(self.url(procedure));
        if let Some(input) = input {
            request = request.query(&[("input", serde_json::to_string(input)?)]);
        }
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    async fn mutate<I: Serialize, T: DeserializeOwned>(
        &self,
        procedure: Procedure,
        input: &I,
    ) -> ClientResult<T> {
        let response = self
            .client
            .post(self.url(procedure))
            .json(input)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();
        let bytes = response.bytes().await?;

        if status.is_success() {
            let envelope: RpcSuccess<T> = serde_json::from_slice(&bytes)?;
            return Ok(envelope.result.data);
        }

        match serde_json::from_slice::<RpcFailure>(&bytes) {
            Ok(failure) => Err(failure.into()),
            Err(_) => Err(ClientError::InvalidResponse(format!(
                "{status}: {}",
                String::from_utf8_lossy(&bytes)
            ))),
        }
    }

    pub async fn health(&self) -> ClientResult<HealthStatus> {
        let response = self
            .client
            .get(format!("{}/health", self.origin()))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ClientError::InvalidResponse(format!(
                "health check returned {}",
                response.status()
            )));
        }
        response.json().await.map_err(Into::into)
    }

    pub async fn get_all(&self) -> ClientResult<Vec<Employee>> {
        self.query::<(), _>(Procedure::GetAll, None).await
    }

    pub async fn get_by_id(&self, id: i32) -> ClientResult<Employee> {
        self.query(Procedure::GetById, Some(&EmployeeId { id })).await
    }

    pub async fn create(&self, input: &CreateEmployeeInput) -> ClientResult<Employee> {
        self.mutate(Procedure::Create, input).await
    }

    pub async fn update(&self, input: &UpdateEmployeeInput) -> ClientResult<Employee> {
        self.mutate(Procedure::Update, input).await
    }

    pub async fn delete(&self, id: i32) -> ClientResult<Employee> {
        self.mutate(Procedure::Delete, &EmployeeId { id }).await
    }

    pub async fn search(&self, query: &str) -> ClientResult<Vec<Employee>> {
        let input = SearchQuery {
            query: query.to_string(),
        };
        self.query(Procedure::Search, Some(&input)).await
    }
}
