use crate::model::{self, DataValue, StatusCode};
use serde::Deserialize;

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct DeviceStatus {
    #[serde(rename = "ErrorCode")]
    pub error_code: i64,
    #[serde(rename = "LEDColor")]
    pub led_color: i64,
    #[serde(rename = "LEDState")]
    pub led_state: i64,
    #[serde(rename = "MgmtTimerRemainingTime")]
    pub mgmt_timer_remaining_time: i64,
    #[serde(rename = "StateToReset")]
    pub state_to_reset: bool,
    #[serde(rename = "StatusCode")]
    pub status_code: StatusCode,
}

/// `DataCollection=CommonInverterData`
///
/// While the inverter sleeps it drops the DC and AC readings; those read as zero.
#[derive(Deserialize)]
pub struct CommonInverterData {
    #[serde(rename = "DAY_ENERGY", default)]
    pub day_energy: DataValue,
    #[serde(rename = "YEAR_ENERGY", default)]
    pub year_energy: DataValue,
    #[serde(rename = "TOTAL_ENERGY", default)]
    pub total_energy: Option<DataValue>,
    #[serde(rename = "PAC", default)]
    pub pac: DataValue,
    #[serde(rename = "FAC", default)]
    pub fac: DataValue,
    #[serde(rename = "IAC", default)]
    pub iac: DataValue,
    #[serde(rename = "UAC", default)]
    pub uac: DataValue,
    #[serde(rename = "IDC", default)]
    pub idc: DataValue,
    #[serde(rename = "UDC", default)]
    pub udc: DataValue,
    #[serde(rename = "DeviceStatus", default)]
    pub device_status: DeviceStatus,
}

impl From<CommonInverterData> for model::CommonData {
    fn from(data: CommonInverterData) -> Self {
        let status = data.device_status;
        model::CommonData {
            day_energy: data.day_energy,
            year_energy: data.year_energy,
            total_energy: data.total_energy,
            ac_power: data.pac,
            ac_frequency: data.fac,
            ac_current: data.iac,
            ac_voltage: data.uac,
            dc_current: data.idc,
            dc_voltage: data.udc,
            device_status: model::DeviceStatus {
                error_code: status.error_code,
                led_color: status.led_color,
                led_state: status.led_state,
                mgmt_timer_remaining_time: status.mgmt_timer_remaining_time,
                state_to_reset: status.state_to_reset,
                status_code: status.status_code,
            },
        }
    }
}

/// `DataCollection=3PInverterData`
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct ThreePhaseInverterData {
    #[serde(rename = "IAC_L1")]
    pub iac_l1: DataValue,
    #[serde(rename = "IAC_L2")]
    pub iac_l2: DataValue,
    #[serde(rename = "IAC_L3")]
    pub iac_l3: DataValue,
    #[serde(rename = "UAC_L1")]
    pub uac_l1: DataValue,
    #[serde(rename = "UAC_L2")]
    pub uac_l2: DataValue,
    #[serde(rename = "UAC_L3")]
    pub uac_l3: DataValue,
}

impl From<ThreePhaseInverterData> for model::ThreePhaseData {
    fn from(data: ThreePhaseInverterData) -> Self {
        model::ThreePhaseData {
            ac_current_l1: data.iac_l1,
            ac_current_l2: data.iac_l2,
            ac_current_l3: data.iac_l3,
            ac_voltage_l1: data.uac_l1,
            ac_voltage_l2: data.uac_l2,
            ac_voltage_l3: data.uac_l3,
        }
    }
}
