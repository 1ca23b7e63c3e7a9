use prometheus::{Counter, Encoder, Histogram, Registry, TextEncoder};

pub struct MetricsRegistry {
    pub registry: Registry,

    // Search metrics
    pub search_duration: Histogram,
    pub search_results_total: Counter,
    pub search_errors_total: Counter,
    pub search_partial_total: Counter,
    pub catalog_unit_failures_total: Counter,

    // Suggest / reference metrics
    pub suggest_duration: Histogram,
    pub reference_cache_refreshes_total: Counter,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        // Search duration histogram (1ms to 10 seconds)
        let search_duration = Histogram::with_opts(
            prometheus::HistogramOpts::new(
                "search_duration_seconds",
                "Search query duration in seconds",
            )
            .buckets(vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ]),
        )?;

        let search_results_total = Counter::new(
            "search_results_total",
            "Total number of search results returned",
        )?;

        let search_errors_total =
            Counter::new("search_errors_total", "Total number of search errors")?;

        let search_partial_total = Counter::new(
            "search_partial_total",
            "Total number of searches cut short by the time budget",
        )?;

        let catalog_unit_failures_total = Counter::new(
            "catalog_unit_failures_total",
            "Total number of failed variant/partition catalog reads",
        )?;

        let suggest_duration = Histogram::with_opts(
            prometheus::HistogramOpts::new(
                "suggest_duration_seconds",
                "Autocomplete duration in seconds",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]),
        )?;

        let reference_cache_refreshes_total = Counter::new(
            "reference_cache_refreshes_total",
            "Total number of reference list cache refreshes",
        )?;

        registry.register(Box::new(search_duration.clone()))?;
        registry.register(Box::new(search_results_total.clone()))?;
        registry.register(Box::new(search_errors_total.clone()))?;
        registry.register(Box::new(search_partial_total.clone()))?;
        registry.register(Box::new(catalog_unit_failures_total.clone()))?;
        registry.register(Box::new(suggest_duration.clone()))?;
        registry.register(Box::new(reference_cache_refreshes_total.clone()))?;

        Ok(Self {
            registry,
            search_duration,
            search_results_total,
            search_errors_total,
            search_partial_total,
            catalog_unit_failures_total,
            suggest_duration,
            reference_cache_refreshes_total,
        })
    }

    /// Prometheus text exposition format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_lists_registered_metrics() {
        let metrics = MetricsRegistry::new().unwrap();
        metrics.search_results_total.inc_by(3.0);
        metrics.search_duration.observe(0.02);
        let text = metrics.render().unwrap();
        assert!(text.contains("search_results_total 3"));
        assert!(text.contains("search_duration_seconds_bucket"));
        assert!(text.contains("catalog_unit_failures_total 0"));
    }
}
