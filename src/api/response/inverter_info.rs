use crate::model::{self, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct Data {
    #[serde(rename = "CustomName")]
    pub custom_name: String,
    #[serde(rename = "DT")]
    pub dt: i64,
    #[serde(rename = "ErrorCode")]
    pub error_code: i64,
    #[serde(rename = "PVPower")]
    pub pv_power: i64,
    #[serde(rename = "Show")]
    pub show: i64,
    #[serde(rename = "StatusCode")]
    pub status_code: StatusCode,
    #[serde(rename = "UniqueID")]
    pub unique_id: String,
}

/// `Body.Data` of `GetInverterInfo.cgi`: inverters keyed by device id.
#[derive(Deserialize, Default)]
#[serde(transparent)]
pub struct GetInverterInfo(pub HashMap<String, Data>);

impl GetInverterInfo {
    /// Move the mapping key onto each record and order the result by it.
    pub fn into_inverters(self) -> Vec<model::InverterInfo> {
        let mut inverters: Vec<model::InverterInfo> = self
            .0
            .into_iter()
            .map(|(id, data)| model::InverterInfo {
                id,
                custom_name: html_escape::decode_html_entities(&data.custom_name).into_owned(),
                device_type: data.dt,
                error_code: data.error_code,
                pv_power: data.pv_power,
                show: data.show,
                status_code: data.status_code,
                unique_id: data.unique_id,
            })
            .collect();

        inverters.sort_by(|a, b| a.id.cmp(&b.id));
        inverters
    }
}
