use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use shared::{
    domain::{Machine, MachineDraft, MachineId},
    error::StoreError,
};
use tracing::info;
use url::Url;

use crate::{defaults::default_machines, MachineStore};

/// Hosted-table store: a `machines` table keyed by `id`, reached over HTTP
/// with PostgREST conventions. The anonymous key rides along as both the
/// `apikey` header and a bearer token.
#[derive(Clone)]
pub struct RemoteStore {
    http: Client,
    machines_url: Url,
    api_key: String,
}

impl RemoteStore {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, StoreError> {
        let machines_url = format!("{}/rest/v1/machines", base_url.trim_end_matches('/'));
        let machines_url = Url::parse(&machines_url)
            .map_err(|e| StoreError::unavailable(format!("invalid api url '{base_url}': {e}")))?;

        Ok(Self {
            http: Client::new(),
            machines_url,
            api_key: api_key.to_string(),
        })
    }

    fn request(&self, method: Method) -> RequestBuilder {
        self.http
            .request(method, self.machines_url.clone())
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn select_all(&self) -> Result<Vec<Machine>, StoreError> {
        let response = self
            .request(Method::GET)
            .query(&[("select", "*")])
            .send()
            .await
            .map_err(transport)?;
        let response = expect_success(response, "select").await?;
        response
            .json()
            .await
            .map_err(|e| StoreError::backend(format!("invalid machine rows from backend: {e}")))
    }

    /// Upsert-by-id without touching other rows. Backs empty-table seeding
    /// and the standalone seed tool.
    pub async fn upsert_machines(&self, machines: &[Machine]) -> Result<Vec<Machine>, StoreError> {
        let response = self
            .request(Method::POST)
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(machines)
            .send()
            .await
            .map_err(transport)?;
        let response = expect_success(response, "upsert").await?;
        response
            .json()
            .await
            .map_err(|e| StoreError::backend(format!("invalid machine rows from backend: {e}")))
    }
}

#[async_trait]
impl MachineStore for RemoteStore {
    async fn get_machines(&self) -> Result<Vec<Machine>, StoreError> {
        let machines = self.select_all().await?;
        if !machines.is_empty() {
            return Ok(machines);
        }

        let seeded = default_machines();
        info!(count = seeded.len(), "seeding empty machines table");
        self.upsert_machines(&seeded).await
    }

    async fn create_machine(&self, draft: MachineDraft) -> Result<Machine, StoreError> {
        let machine = draft.into_machine(MachineId::fresh());
        let response = self
            .request(Method::POST)
            .header("Prefer", "return=representation")
            .json(&[machine.clone()])
            .send()
            .await
            .map_err(transport)?;
        let response = expect_success(response, "insert").await?;
        let mut rows: Vec<Machine> = response
            .json()
            .await
            .map_err(|e| StoreError::backend(format!("invalid machine rows from backend: {e}")))?;
        Ok(rows.pop().unwrap_or(machine))
    }

    async fn update_machine(&self, machine: Machine) -> Result<Machine, StoreError> {
        let response = self
            .request(Method::PATCH)
            .query(&[("id", format!("eq.{}", machine.id))])
            .json(&machine)
            .send()
            .await
            .map_err(transport)?;
        // Zero affected rows is still success: a missing id is a no-op.
        expect_success(response, "update").await?;
        Ok(machine)
    }

    async fn delete_machine(&self, id: MachineId) -> Result<MachineId, StoreError> {
        let response = self
            .request(Method::DELETE)
            .query(&[("id", format!("eq.{id}"))])
            .send()
            .await
            .map_err(transport)?;
        expect_success(response, "delete").await?;
        Ok(id)
    }

    async fn save_all_machines(&self, machines: Vec<Machine>) -> Result<Vec<Machine>, StoreError> {
        // Full-replace semantics: clear the table, then upsert the new set.
        let response = self
            .request(Method::DELETE)
            .query(&[("id", "not.is.null")])
            .send()
            .await
            .map_err(transport)?;
        expect_success(response, "clear").await?;

        if machines.is_empty() {
            return Ok(machines);
        }
        self.upsert_machines(&machines).await
    }
}

fn transport(err: reqwest::Error) -> StoreError {
    if err.is_connect() || err.is_timeout() {
        StoreError::unavailable(err.to_string())
    } else {
        StoreError::backend(err.to_string())
    }
}

async fn expect_success(response: Response, what: &str) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::backend(format!(
        "{what} failed with {status}: {body}"
    )))
}

#[cfg(test)]
#[path = "tests/remote_tests.rs"]
mod tests;
