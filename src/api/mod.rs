pub mod endpoint;
pub mod error;
pub mod response;

use crate::model;
use async_trait::async_trait;
pub use error::Error;
use http::header::{ACCEPT, USER_AGENT};
use reqwest::{StatusCode, Url};
use response::envelope::{self, Payload};
use response::inverter_info::GetInverterInfo;
use response::inverter_realtime_data::{CommonInverterData, ThreePhaseInverterData};
use std::time::Duration;

const CLIENT_IDENTITY: &str = "fronius-exporter";
const CONTENT_TYPE_JSON: &str = "application/json";

/// The three reads the collector needs from an inverter installation.
#[async_trait]
pub trait InverterApi: Send + Sync {
    /// List all inverters, ordered by device id.
    async fn list_inverters(&self) -> Result<Vec<model::InverterInfo>, Error>;

    async fn common_data(&self, device_id: &str) -> Result<model::CommonData, Error>;

    async fn three_phase_data(&self, device_id: &str) -> Result<model::ThreePhaseData, Error>;
}

/// Client of the Fronius Solar API v1 of a single datamanager.
#[derive(Debug, Clone)]
pub struct Fronius {
    endpoint: Url,
    timeout: Duration,
    client: reqwest::Client,
}

/// Turn the device URL into the API endpoint, `{url}/solar_api/v1/`.
fn api_endpoint(base_url: &str) -> Result<Url, Error> {
    let mut url =
        Url::parse(base_url).map_err(|e| Error::InvalidUrl(format!("{}: {}", base_url, e)))?;

    url.path_segments_mut()
        .map_err(|_| Error::InvalidUrl(format!("{}: cannot be a base url", base_url)))?
        .pop_if_empty()
        .extend(endpoint::API_PREFIX.iter().chain(std::iter::once(&"")));

    Ok(url)
}

impl Fronius {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Fronius, Error> {
        let endpoint = api_endpoint(base_url)?;
        let client = reqwest::ClientBuilder::new().build()?;

        Ok(Fronius {
            endpoint,
            timeout,
            client,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn url(&self, endpoint: &endpoint::Endpoint) -> Result<Url, Error> {
        self.endpoint
            .join(endpoint)
            .map_err(|e| Error::InvalidUrl(e.to_string()))
    }

    /// Issue a GET request and return the payload of its envelope.
    async fn get(
        &self,
        endpoint: &endpoint::Endpoint,
        query: &[(&str, &str)],
    ) -> Result<Payload, Error> {
        let url = self.url(endpoint)?;

        let response = self
            .client
            .get(url)
            .query(query)
            .header(ACCEPT, CONTENT_TYPE_JSON)
            .header(USER_AGENT, CLIENT_IDENTITY)
            .timeout(self.timeout)
            .send()
            .await?;

        log::trace!("url: {}, status: {}", response.url(), response.status());

        /* Any other status is an error, the body is not looked at */
        if response.status() != StatusCode::OK {
            return Err(Error::HttpStatus(response.status()));
        }

        let body = response.bytes().await?;
        log::trace!("response: {}", String::from_utf8_lossy(&body));

        envelope::parse(&body)
    }

    async fn realtime_data(
        &self,
        data_collection: &str,
        device_id: &str,
    ) -> Result<Payload, Error> {
        self.get(
            endpoint::INVERTER_REALTIME_DATA,
            &[
                ("Scope", endpoint::SCOPE_DEVICE),
                ("DataCollection", data_collection),
                ("DeviceId", device_id),
            ],
        )
        .await
    }
}

#[async_trait]
impl InverterApi for Fronius {
    async fn list_inverters(&self) -> Result<Vec<model::InverterInfo>, Error> {
        self.get(
            endpoint::INVERTER_INFO,
            &[("DeviceClass", endpoint::DEVICE_CLASS_SYSTEM)],
        )
        .await?
        /* A datamanager without inverters answers with `"Data": null` */
        .decode::<Option<GetInverterInfo>>()
        .map(|info| info.unwrap_or_default().into_inverters())
        .map_err(|e| Error::Decode(format!("unable to parse inverter info: {}", e)))
    }

    async fn common_data(&self, device_id: &str) -> Result<model::CommonData, Error> {
        self.realtime_data(endpoint::COMMON_INVERTER_DATA, device_id)
            .await?
            .decode::<CommonInverterData>()
            .map(model::CommonData::from)
            .map_err(|e| Error::Decode(format!("unable to parse inverter common data: {}", e)))
    }

    async fn three_phase_data(&self, device_id: &str) -> Result<model::ThreePhaseData, Error> {
        self.realtime_data(endpoint::THREE_PHASE_INVERTER_DATA, device_id)
            .await?
            .decode::<ThreePhaseInverterData>()
            .map(model::ThreePhaseData::from)
            .map_err(|e| {
                Error::Decode(format!("unable to parse inverter three phase data: {}", e))
            })
    }
}
