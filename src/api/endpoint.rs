pub type Endpoint = str;

/// Path prefix of the Solar API, relative to the configured device URL.
pub const API_PREFIX: [&str; 2] = ["solar_api", "v1"];

pub const INVERTER_INFO: &Endpoint = "GetInverterInfo.cgi";
pub const INVERTER_REALTIME_DATA: &Endpoint = "GetInverterRealtimeData.cgi";

/* `DataCollection` values of `GetInverterRealtimeData.cgi` */
pub const COMMON_INVERTER_DATA: &str = "CommonInverterData";
pub const THREE_PHASE_INVERTER_DATA: &str = "3PInverterData";

pub const SCOPE_DEVICE: &str = "Device";
pub const DEVICE_CLASS_SYSTEM: &str = "System";
