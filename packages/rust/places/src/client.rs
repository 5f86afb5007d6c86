//! `reqwest`-backed Google Maps web service client.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use unifind_shared::{AppConfig, Coordinate, DistanceElement, Result, UnifindError};

use crate::wire::{
    DistanceMatrixResponse, GeocodeResponse, NearbySearchResponse, check_status,
};
use crate::{NearbyPage, NearbyQuery, PlaceFilter, PlacesApi};

/// User-Agent string for Maps requests.
const USER_AGENT: &str = concat!("unifind/", env!("CARGO_PKG_VERSION"));

const GEOCODE_PATH: &str = "geocode/json";
const NEARBY_PATH: &str = "place/nearbysearch/json";
const DISTANCE_MATRIX_PATH: &str = "distancematrix/json";

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Settings for building a [`GoogleMapsClient`].
#[derive(Clone)]
pub struct ClientOptions {
    /// Service root, e.g. `https://maps.googleapis.com/maps/api`.
    pub base_url: String,
    /// Maps Platform API key.
    pub api_key: String,
    /// Timeout for each HTTP request in seconds.
    pub timeout_secs: u64,
}

impl ClientOptions {
    /// Take endpoint and timeout from the `[google]` config section.
    pub fn from_config(config: &AppConfig, api_key: impl Into<String>) -> Self {
        Self {
            base_url: config.google.base_url.clone(),
            api_key: api_key.into(),
            timeout_secs: config.google.timeout_secs,
        }
    }
}

impl std::fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientOptions")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Google Maps Geocoding / Places / Distance Matrix client.
pub struct GoogleMapsClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GoogleMapsClient {
    /// Build a client. Fails on an unparsable base URL or TLS setup error.
    pub fn new(opts: ClientOptions) -> Result<Self> {
        let base_url = opts.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url)
            .map_err(|e| UnifindError::config(format!("invalid maps base_url '{base_url}': {e}")))?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(opts.timeout_secs))
            .build()
            .map_err(|e| UnifindError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            api_key: opts.api_key,
        })
    }

    /// Build the full request URL; the key is always the last parameter.
    fn endpoint(&self, path: &str, params: &[(&str, String)]) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/{path}", self.base_url))
            .map_err(|e| UnifindError::config(format!("invalid endpoint {path}: {e}")))?;
        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())))
            .append_pair("key", &self.api_key);
        Ok(url)
    }

    /// GET a Maps endpoint and decode its JSON body.
    ///
    /// Errors never carry the request URL, since it contains the API key.
    async fn get_json<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> Result<T> {
        let url = self.endpoint(path, params)?;
        debug!(endpoint = path, "calling maps api");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| UnifindError::Network(format!("{path}: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UnifindError::Network(format!("{path}: HTTP {status}")));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| UnifindError::parse(format!("{path}: {}", e.without_url())))
    }
}

impl std::fmt::Debug for GoogleMapsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleMapsClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl PlacesApi for GoogleMapsClient {
    async fn geocode(&self, address: &str) -> Result<Vec<Coordinate>> {
        let body: GeocodeResponse = self
            .get_json(GEOCODE_PATH, &[("address", address.to_string())])
            .await?;
        check_status(&body.status, body.error_message)?;

        Ok(body
            .results
            .into_iter()
            .map(|r| r.geometry.location)
            .collect())
    }

    async fn nearby_search(&self, query: &NearbyQuery) -> Result<NearbyPage> {
        let params = match query {
            NearbyQuery::Search {
                location,
                radius_m,
                filter,
            } => {
                let filter_param = match filter {
                    PlaceFilter::Type(t) => ("type", t.clone()),
                    PlaceFilter::Keyword(k) => ("keyword", k.clone()),
                };
                vec![
                    ("location", location.to_string()),
                    ("radius", radius_m.to_string()),
                    filter_param,
                ]
            }
            NearbyQuery::NextPage { page_token } => vec![("pagetoken", page_token.clone())],
        };

        let body: NearbySearchResponse = self.get_json(NEARBY_PATH, &params).await?;
        check_status(&body.status, body.error_message)?;

        Ok(NearbyPage {
            candidates: body.results.into_iter().map(Into::into).collect(),
            next_page_token: body.next_page_token.filter(|t| !t.is_empty()),
        })
    }

    async fn distance_matrix(
        &self,
        origin: Coordinate,
        destinations: &[Coordinate],
    ) -> Result<Vec<DistanceElement>> {
        let joined = destinations
            .iter()
            .map(Coordinate::to_string)
            .collect::<Vec<_>>()
            .join("|");

        let body: DistanceMatrixResponse = self
            .get_json(
                DISTANCE_MATRIX_PATH,
                &[("origins", origin.to_string()), ("destinations", joined)],
            )
            .await?;
        check_status(&body.status, body.error_message)?;

        // One origin, so one row.
        Ok(body
            .rows
            .into_iter()
            .next()
            .map(|row| row.elements.into_iter().map(Into::into).collect())
            .unwrap_or_default())
    }
}
