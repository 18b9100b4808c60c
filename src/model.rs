use num_derive::FromPrimitive;
use serde::{Deserialize, Deserializer};
use std::fmt;

pub type DeviceId = String;

/// Operational state of an inverter as reported by its firmware.
///
/// Discriminants are the device codes matched exactly; `Startup` additionally covers the
/// whole `0..7` range and `Invalid` is the catch-all for everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive)]
pub enum OperationalStatus {
    Startup = 0,
    Running = 7,
    Standby = 8,
    Bootloading = 9,
    Error = 10,
    Idle = 11,
    Ready = 12,
    Sleeping = 13,
    Unknown = 255,
    Invalid = -1,
}

impl OperationalStatus {
    /// Every status in decode-table order. Used to emit one indicator per status.
    pub const ALL: [OperationalStatus; 10] = [
        OperationalStatus::Startup,
        OperationalStatus::Running,
        OperationalStatus::Standby,
        OperationalStatus::Bootloading,
        OperationalStatus::Error,
        OperationalStatus::Idle,
        OperationalStatus::Ready,
        OperationalStatus::Sleeping,
        OperationalStatus::Unknown,
        OperationalStatus::Invalid,
    ];

    pub fn from_code(code: i64) -> OperationalStatus {
        match code {
            0..=6 => OperationalStatus::Startup,
            _ => num::FromPrimitive::from_i64(code).unwrap_or(OperationalStatus::Invalid),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OperationalStatus::Startup => "Startup",
            OperationalStatus::Running => "Running",
            OperationalStatus::Standby => "Standby",
            OperationalStatus::Bootloading => "Bootloading",
            OperationalStatus::Error => "Error",
            OperationalStatus::Idle => "Idle",
            OperationalStatus::Ready => "Ready",
            OperationalStatus::Sleeping => "Sleeping",
            OperationalStatus::Unknown => "Unknown",
            OperationalStatus::Invalid => "INVALID",
        }
    }
}

impl fmt::Display for OperationalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw status code as sent by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(transparent)]
pub struct StatusCode(pub i64);

impl StatusCode {
    pub fn status(&self) -> OperationalStatus {
        OperationalStatus::from_code(self.0)
    }
}

/// A single reading with its unit, e.g. `{"Unit": "Wh", "Value": 234611600}`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct DataValue {
    #[serde(rename = "Unit", deserialize_with = "null_as_default")]
    pub unit: String,
    #[serde(rename = "Value", deserialize_with = "null_as_default")]
    pub value: f64,
}

/* The datamanager sends `null` for readings it has no value for */
fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(d).map(Option::unwrap_or_default)
}

/// One entry of the inverter inventory.
#[derive(Debug, Clone, PartialEq)]
pub struct InverterInfo {
    /// Device key the inventory mapping was indexed by.
    pub id: DeviceId,
    /// Name assigned by the customer, HTML references already unescaped.
    pub custom_name: String,
    pub device_type: i64,
    pub error_code: i64,
    /// PV power connected to this inverter (in watts).
    pub pv_power: i64,
    /// Whether the device is shown in visualizations (0 hidden, 1 shown).
    pub show: i64,
    pub status_code: StatusCode,
    /// Serial number or other unique id of the inverter.
    pub unique_id: String,
}

impl InverterInfo {
    pub fn status(&self) -> OperationalStatus {
        self.status_code.status()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeviceStatus {
    pub error_code: i64,
    pub led_color: i64,
    pub led_state: i64,
    pub mgmt_timer_remaining_time: i64,
    pub state_to_reset: bool,
    pub status_code: StatusCode,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommonData {
    pub day_energy: DataValue,
    pub year_energy: DataValue,
    /// `None` when the device left it out; a defaulted zero would read as a counter reset.
    pub total_energy: Option<DataValue>,
    pub ac_power: DataValue,
    pub ac_frequency: DataValue,
    pub ac_current: DataValue,
    pub ac_voltage: DataValue,
    pub dc_current: DataValue,
    pub dc_voltage: DataValue,
    pub device_status: DeviceStatus,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ThreePhaseData {
    pub ac_current_l1: DataValue,
    pub ac_current_l2: DataValue,
    pub ac_current_l3: DataValue,
    pub ac_voltage_l1: DataValue,
    pub ac_voltage_l2: DataValue,
    pub ac_voltage_l3: DataValue,
}
