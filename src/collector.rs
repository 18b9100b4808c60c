use crate::api::InverterApi;
use crate::model::{CommonData, DataValue, InverterInfo, OperationalStatus, ThreePhaseData};
use futures::future::join_all;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Gauge,
    Counter,
}

/// Static description of a metric family.
#[derive(Debug, PartialEq, Eq)]
pub struct MetricDesc {
    pub name: &'static str,
    pub help: &'static str,
    pub kind: MetricKind,
    pub labels: &'static [&'static str],
}

pub static INVERTER_INFO: MetricDesc = MetricDesc {
    name: "fronius_inverter_info",
    help: "Information about the inverter",
    kind: MetricKind::Gauge,
    labels: &["device_id", "device_type", "device_name", "serial"],
};

pub static INVERTER_STATUS: MetricDesc = MetricDesc {
    name: "fronius_inverter_status",
    help: "Status of the inverter",
    kind: MetricKind::Gauge,
    labels: &["device_id", "status"],
};

pub static INVERTER_YIELD_TOTAL: MetricDesc = MetricDesc {
    name: "inverter_yield_total",
    help: "Total energy produced by the inverter (in kWh)",
    kind: MetricKind::Counter,
    labels: &["device_id"],
};

pub static INVERTER_DC_VOLTAGE: MetricDesc = MetricDesc {
    name: "inverter_dc_voltage",
    help: "Solar panel (DC) voltage",
    kind: MetricKind::Gauge,
    labels: &["device_id"],
};

pub static INVERTER_DC_CURRENT: MetricDesc = MetricDesc {
    name: "inverter_dc_current",
    help: "Solar panel (DC) current",
    kind: MetricKind::Gauge,
    labels: &["device_id"],
};

pub static INVERTER_GRID_FREQUENCY: MetricDesc = MetricDesc {
    name: "inverter_grid_frequency",
    help: "Grid (AC) frequency",
    kind: MetricKind::Gauge,
    labels: &["device_id"],
};

pub static INVERTER_GRID_VOLTAGE: MetricDesc = MetricDesc {
    name: "inverter_grid_voltage",
    help: "Grid (AC) voltage",
    kind: MetricKind::Gauge,
    labels: &["device_id", "phase"],
};

pub static INVERTER_GRID_CURRENT: MetricDesc = MetricDesc {
    name: "inverter_grid_current",
    help: "Grid (AC) current",
    kind: MetricKind::Gauge,
    labels: &["device_id", "phase"],
};

/// One sample produced during a scrape. `label_values` line up with `desc.labels`.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRecord {
    pub desc: &'static MetricDesc,
    pub label_values: Vec<String>,
    pub value: f64,
}

impl MetricRecord {
    fn new(desc: &'static MetricDesc, label_values: Vec<String>, value: f64) -> Self {
        debug_assert_eq!(desc.labels.len(), label_values.len());
        MetricRecord {
            desc,
            label_values,
            value,
        }
    }

    pub fn labels(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.desc
            .labels
            .iter()
            .copied()
            .zip(self.label_values.iter().map(String::as_str))
    }
}

/// Info record plus one indicator per entry of `OperationalStatus::ALL`.
fn inverter_records(inverter: &InverterInfo) -> Vec<MetricRecord> {
    let mut records = Vec::with_capacity(1 + OperationalStatus::ALL.len());

    records.push(MetricRecord::new(
        &INVERTER_INFO,
        vec![
            inverter.id.clone(),
            inverter.device_type.to_string(),
            inverter.custom_name.clone(),
            inverter.unique_id.clone(),
        ],
        1.0,
    ));

    let current = inverter.status();
    records.extend(OperationalStatus::ALL.iter().map(|status| {
        MetricRecord::new(
            &INVERTER_STATUS,
            vec![inverter.id.clone(), status.name().to_lowercase()],
            if *status == current { 1.0 } else { 0.0 },
        )
    }));

    records
}

fn common_data_records(device_id: &str, data: &CommonData) -> Vec<MetricRecord> {
    let device_label = || vec![device_id.to_string()];

    let mut records = vec![
        MetricRecord::new(&INVERTER_DC_VOLTAGE, device_label(), data.dc_voltage.value),
        MetricRecord::new(&INVERTER_DC_CURRENT, device_label(), data.dc_current.value),
        MetricRecord::new(
            &INVERTER_GRID_FREQUENCY,
            device_label(),
            data.ac_frequency.value,
        ),
    ];

    match &data.total_energy {
        /* Wh to kWh */
        Some(total) => records.push(MetricRecord::new(
            &INVERTER_YIELD_TOTAL,
            device_label(),
            total.value / 1000.0,
        )),
        None => log::warn!("inverter {} reported no total energy", device_id),
    }

    records
}

fn three_phase_records(device_id: &str, data: &ThreePhaseData) -> Vec<MetricRecord> {
    let phases: [(&'static MetricDesc, &DataValue, &str); 6] = [
        (&INVERTER_GRID_VOLTAGE, &data.ac_voltage_l1, "L1"),
        (&INVERTER_GRID_VOLTAGE, &data.ac_voltage_l2, "L2"),
        (&INVERTER_GRID_VOLTAGE, &data.ac_voltage_l3, "L3"),
        (&INVERTER_GRID_CURRENT, &data.ac_current_l1, "L1"),
        (&INVERTER_GRID_CURRENT, &data.ac_current_l2, "L2"),
        (&INVERTER_GRID_CURRENT, &data.ac_current_l3, "L3"),
    ];

    phases
        .iter()
        .map(|(desc, reading, phase)| {
            MetricRecord::new(
                *desc,
                vec![device_id.to_string(), phase.to_string()],
                reading.value,
            )
        })
        .collect()
}

/// Maps one pass over an inverter installation to metric records.
///
/// Holds no state between passes: every call to `collect` starts from the inventory.
pub struct Collector<A> {
    api: A,
}

impl<A: InverterApi> Collector<A> {
    pub fn new(api: A) -> Self {
        Collector { api }
    }

    /// Both realtime reads of one device. A failing read only drops its own records.
    async fn collect_device(&self, device_id: &str) -> Vec<MetricRecord> {
        let (common, three_phase) = futures::join!(
            self.api.common_data(device_id),
            self.api.three_phase_data(device_id)
        );

        let mut records = Vec::new();

        match common {
            Ok(data) => records.extend(common_data_records(device_id, &data)),
            Err(e) => log::error!(
                "unable to get common data for inverter {}: {}",
                device_id,
                e
            ),
        }

        match three_phase {
            Ok(data) => records.extend(three_phase_records(device_id, &data)),
            Err(e) => log::error!(
                "unable to get three phase data for inverter {}: {}",
                device_id,
                e
            ),
        }

        records
    }

    /// Run one scrape cycle. Never fails; devices that cannot be read yield fewer records.
    pub async fn collect(&self) -> Vec<MetricRecord> {
        let inverters = match self.api.list_inverters().await {
            Ok(inverters) => inverters,
            Err(e) => {
                log::error!("unable to get inverter info: {}", e);
                return Vec::new();
            }
        };

        log::debug!("collecting {} inverter(s)", inverters.len());

        let mut records: Vec<MetricRecord> = inverters.iter().flat_map(inverter_records).collect();

        let details = join_all(
            inverters
                .iter()
                .map(|inverter| self.collect_device(&inverter.id)),
        )
        .await;
        records.extend(details.into_iter().flatten());

        records
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::api::Error;
    use crate::model::{DeviceStatus, StatusCode};
    use async_trait::async_trait;
    use std::collections::HashSet;

    fn reading(value: f64, unit: &str) -> DataValue {
        DataValue {
            unit: unit.to_string(),
            value,
        }
    }

    fn inverter(id: &str, status_code: i64) -> InverterInfo {
        InverterInfo {
            id: id.to_string(),
            custom_name: format!("Inverter {}", id),
            device_type: 232,
            error_code: 0,
            pv_power: 8000,
            show: 1,
            status_code: StatusCode(status_code),
            unique_id: format!("serial-{}", id),
        }
    }

    struct FakeApi {
        inverters: Result<Vec<InverterInfo>, Error>,
        failing: Vec<&'static str>,
    }

    #[async_trait]
    impl InverterApi for FakeApi {
        async fn list_inverters(&self) -> Result<Vec<InverterInfo>, Error> {
            self.inverters.clone()
        }

        async fn common_data(&self, device_id: &str) -> Result<CommonData, Error> {
            if self.failing.iter().any(|id| *id == device_id) {
                return Err(Error::Network(String::from("connection refused")));
            }
            Ok(CommonData {
                total_energy: Some(reading(234611600.0, "Wh")),
                dc_voltage: reading(571.2, "V"),
                dc_current: reading(4.51, "A"),
                ac_frequency: reading(50.01, "Hz"),
                device_status: DeviceStatus::default(),
                ..CommonData::default()
            })
        }

        async fn three_phase_data(&self, device_id: &str) -> Result<ThreePhaseData, Error> {
            if self.failing.iter().any(|id| *id == device_id) {
                return Err(Error::Network(String::from("connection refused")));
            }
            Ok(ThreePhaseData {
                ac_voltage_l1: reading(231.4, "V"),
                ac_voltage_l2: reading(232.9, "V"),
                ac_voltage_l3: reading(230.5, "V"),
                ac_current_l1: reading(3.56, "A"),
                ac_current_l2: reading(3.63, "A"),
                ac_current_l3: reading(3.6, "A"),
            })
        }
    }

    fn records_for<'a>(
        records: &'a [MetricRecord],
        name: &str,
        device_id: &str,
    ) -> Vec<&'a MetricRecord> {
        records
            .iter()
            .filter(|r| r.desc.name == name && r.label_values[0] == device_id)
            .collect()
    }

    #[test]
    fn status_sweep_has_exactly_one_active_status() {
        for code in [-1, 0, 3, 7, 8, 9, 10, 11, 12, 13, 14, 255, 256] {
            let records = inverter_records(&inverter("1", code));
            let status: Vec<&MetricRecord> = records
                .iter()
                .filter(|r| r.desc == &INVERTER_STATUS)
                .collect();

            assert_eq!(10, status.len());
            assert_eq!(1, status.iter().filter(|r| r.value == 1.0).count());
            assert_eq!(9, status.iter().filter(|r| r.value == 0.0).count());
        }
    }

    #[test]
    fn status_labels_are_lower_case() {
        let records = inverter_records(&inverter("1", 7));
        let active = records
            .iter()
            .find(|r| r.desc == &INVERTER_STATUS && r.value == 1.0)
            .unwrap();
        assert_eq!(
            vec![("device_id", "1"), ("status", "running")],
            active.labels().collect::<Vec<_>>()
        );

        let invalid = inverter_records(&inverter("1", 300));
        let active = invalid
            .iter()
            .find(|r| r.desc == &INVERTER_STATUS && r.value == 1.0)
            .unwrap();
        assert_eq!("invalid", active.label_values[1]);
    }

    #[test]
    fn info_labels() {
        let mut info = inverter("2", 7);
        info.custom_name = String::from("Roof & Garage");
        let records = inverter_records(&info);
        assert_eq!(&INVERTER_INFO, records[0].desc);
        assert_eq!(1.0, records[0].value);
        assert_eq!(
            vec![
                ("device_id", "2"),
                ("device_type", "232"),
                ("device_name", "Roof & Garage"),
                ("serial", "serial-2"),
            ],
            records[0].labels().collect::<Vec<_>>()
        );
    }

    #[test]
    fn total_energy_in_kwh() {
        let data = CommonData {
            total_energy: Some(reading(234611600.0, "Wh")),
            ..CommonData::default()
        };
        let records = common_data_records("1", &data);
        let total = records
            .iter()
            .find(|r| r.desc == &INVERTER_YIELD_TOTAL)
            .unwrap();
        assert_eq!(MetricKind::Counter, total.desc.kind);
        assert_eq!(234611.6, total.value);
    }

    #[test]
    fn missing_total_energy_keeps_gauges() {
        let data = CommonData {
            dc_voltage: reading(571.2, "V"),
            ..CommonData::default()
        };
        let records = common_data_records("1", &data);

        let names: Vec<&str> = records.iter().map(|r| r.desc.name).collect();
        assert_eq!(
            vec![
                "inverter_dc_voltage",
                "inverter_dc_current",
                "inverter_grid_frequency"
            ],
            names
        );
        assert_eq!(571.2, records[0].value);
    }

    #[test]
    fn three_phase_labels() {
        let records = three_phase_records("1", &ThreePhaseData::default());
        let labels: Vec<(&str, &str)> = records
            .iter()
            .map(|r| (r.desc.name, r.label_values[1].as_str()))
            .collect();
        assert_eq!(
            vec![
                ("inverter_grid_voltage", "L1"),
                ("inverter_grid_voltage", "L2"),
                ("inverter_grid_voltage", "L3"),
                ("inverter_grid_current", "L1"),
                ("inverter_grid_current", "L2"),
                ("inverter_grid_current", "L3"),
            ],
            labels
        );
    }

    #[tokio::test]
    async fn failing_device_is_isolated() {
        let collector = Collector::new(FakeApi {
            inverters: Ok(vec![inverter("1", 7), inverter("2", 10)]),
            failing: vec!["2"],
        });

        let records = collector.collect().await;

        for device in ["1", "2"] {
            assert_eq!(1, records_for(&records, "fronius_inverter_info", device).len());
            assert_eq!(
                10,
                records_for(&records, "fronius_inverter_status", device).len()
            );
        }

        for name in [
            "inverter_yield_total",
            "inverter_dc_voltage",
            "inverter_dc_current",
            "inverter_grid_frequency",
        ] {
            assert_eq!(1, records_for(&records, name, "1").len(), "{}", name);
            assert!(records_for(&records, name, "2").is_empty(), "{}", name);
        }

        for name in ["inverter_grid_voltage", "inverter_grid_current"] {
            assert_eq!(3, records_for(&records, name, "1").len(), "{}", name);
            assert!(records_for(&records, name, "2").is_empty(), "{}", name);
        }

        /* 2 x (info + 10 status) + 4 common + 6 three phase */
        assert_eq!(32, records.len());
    }

    #[tokio::test]
    async fn failing_inventory_yields_no_records() {
        let collector = Collector::new(FakeApi {
            inverters: Err(Error::Protocol {
                code: 8,
                reason: String::from("Transfer timeout."),
                message: String::new(),
            }),
            failing: vec![],
        });

        assert!(collector.collect().await.is_empty());
    }

    #[tokio::test]
    async fn metric_identity_is_unique() {
        let collector = Collector::new(FakeApi {
            inverters: Ok(vec![inverter("1", 7), inverter("2", 13), inverter("3", 255)]),
            failing: vec![],
        });

        let records = collector.collect().await;
        let identities: HashSet<(&str, Vec<String>)> = records
            .iter()
            .map(|r| (r.desc.name, r.label_values.clone()))
            .collect();

        assert_eq!(3 * (1 + 10 + 4 + 6), records.len());
        assert_eq!(records.len(), identities.len());
    }
}
