use crate::error::Error;
use fronius_exporter::collector::{MetricDesc, MetricKind, MetricRecord};
use prometheus::{CounterVec, Encoder, GaugeVec, Registry, TextEncoder};

enum Family {
    Gauge(GaugeVec),
    Counter(CounterVec),
}

impl Family {
    fn new(desc: &MetricDesc) -> Result<Family, prometheus::Error> {
        let opts = opts!(desc.name, desc.help);
        match desc.kind {
            MetricKind::Gauge => GaugeVec::new(opts, desc.labels).map(Family::Gauge),
            MetricKind::Counter => CounterVec::new(opts, desc.labels).map(Family::Counter),
        }
    }

    fn register(&self, registry: &Registry) -> Result<(), prometheus::Error> {
        match self {
            Family::Gauge(vec) => registry.register(Box::new(vec.clone())),
            Family::Counter(vec) => registry.register(Box::new(vec.clone())),
        }
    }

    fn record(&self, record: &MetricRecord) -> Result<(), prometheus::Error> {
        let label_values: Vec<&str> = record.label_values.iter().map(String::as_str).collect();

        match self {
            Family::Gauge(vec) => vec
                .get_metric_with_label_values(&label_values)?
                .set(record.value),
            Family::Counter(vec) => {
                if record.value < 0.0 {
                    log::warn!(
                        "dropping negative counter value {} of {}",
                        record.value,
                        record.desc.name
                    );
                } else {
                    vec.get_metric_with_label_values(&label_values)?
                        .inc_by(record.value);
                }
            }
        }
        Ok(())
    }
}

/// Register `records` in a registry that lives for this scrape only, so a device that
/// could not be read leaves a gap instead of its last known values.
fn registry(records: &[MetricRecord]) -> Result<Registry, prometheus::Error> {
    let registry = Registry::new();
    let mut families: Vec<(&'static str, Family)> = Vec::new();

    for record in records {
        let index = match families.iter().position(|(name, _)| *name == record.desc.name) {
            Some(index) => index,
            None => {
                let family = Family::new(record.desc)?;
                family.register(&registry)?;
                families.push((record.desc.name, family));
                families.len() - 1
            }
        };
        families[index].1.record(record)?;
    }

    #[cfg(target_os = "linux")]
    registry.register(Box::new(
        prometheus::process_collector::ProcessCollector::for_self(),
    ))?;

    Ok(registry)
}

/// Render `records` in the Prometheus text exposition format.
pub fn encode(records: &[MetricRecord]) -> Result<String, Error> {
    let registry = registry(records).map_err(|e| Error::Registry(e.to_string()))?;

    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    encoder
        .encode(&registry.gather(), &mut buffer)
        .map_err(|e| Error::Registry(e.to_string()))?;

    String::from_utf8(buffer).or(Err(Error::Utf8))
}
