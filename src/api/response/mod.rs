pub mod envelope;
pub mod inverter_info;
pub mod inverter_realtime_data;
