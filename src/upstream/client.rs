use crate::error::Result;
use crate::metrics::metrics;
use serde::Deserialize;
use tokio::task::JoinSet;
use url::Url;

/// One route as served by the backend route API. Missing fields coerce to
/// empty strings; the graph builder keeps such records visible instead of
/// dropping them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct RouteRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub dest: String,
    #[serde(default)]
    pub module: String,
}

/// Client for the upstream route API. Every failure degrades at this
/// boundary: an unreachable list endpoint yields an empty catalog, a failed
/// detail fetch skips that route.
#[derive(Clone)]
pub struct RouteCatalogClient {
    client: reqwest::Client,
    base_url: String,
}

impl RouteCatalogClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Url::parse(base_url)?;

        Ok(Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn list_routes(&self) -> Vec<String> {
        let url = format!("{}/routes", self.base_url);
        match self.get_json::<Vec<String>>(&url).await {
            Ok(names) => names,
            Err(err) => {
                metrics().inc_route_list_failure();
                tracing::warn!(
                    url = url.as_str(),
                    error = %err,
                    "route list fetch failed; continuing with an empty catalog"
                );
                Vec::new()
            }
        }
    }

    pub async fn fetch_route(&self, name: &str) -> Option<RouteRecord> {
        let url = format!("{}/routes/{}", self.base_url, name);
        match self.get_json::<RouteRecord>(&url).await {
            Ok(route) => Some(route),
            Err(err) => {
                metrics().inc_route_detail_skip();
                tracing::warn!(
                    route = name,
                    error = %err,
                    "route detail fetch failed; route skipped"
                );
                None
            }
        }
    }

    /// Fetches all detail records concurrently and re-assembles them in
    /// catalog order, so downstream id assignment stays deterministic. A
    /// failed fetch leaves a gap rather than cancelling its siblings.
    pub async fn fetch_all(&self, names: &[String]) -> Vec<RouteRecord> {
        let mut tasks = JoinSet::new();
        for (index, name) in names.iter().enumerate() {
            let client = self.clone();
            let name = name.clone();
            tasks.spawn(async move { (index, client.fetch_route(&name).await) });
        }

        let mut slots: Vec<Option<RouteRecord>> = vec![None; names.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, route)) => slots[index] = route,
                Err(err) => {
                    tracing::warn!(error = %err, "route detail task failed to join");
                }
            }
        }

        slots.into_iter().flatten().collect()
    }

    /// One full catalog pass: list route names, then fan out detail fetches.
    pub async fn collect(&self) -> Vec<RouteRecord> {
        let names = self.list_routes().await;
        self.fetch_all(&names).await
    }

    async fn get_json<T>(&self, url: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.json::<T>().await?)
    }
}
