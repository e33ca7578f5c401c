//! Balance metrics for monitored feed accounts.
//!
//! Each sink owns its Prometheus registry, so two clients never share series
//! and a process embedding several clients can expose them separately. The
//! client takes the sink as a trait object and stays unaware of exposition.

use std::collections::HashMap;
use std::sync::Mutex;

#[cfg(test)]
use mockall::automock;
use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

/// Label names carried by every balance gauge, in exposition order.
pub const FEED_LABEL_NAMES: [&str; 9] = [
    "account_address",
    "feed_id",
    "chain_id",
    "contract_status",
    "contract_type",
    "feed_name",
    "feed_path",
    "network_id",
    "network_name",
];

/// Feed accounts whose lamport balances are tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum BalanceAccount {
    Contract,
    State,
    Transmissions,
    TokenVault,
    RequesterAccessController,
    BillingAccessController,
}

/// Values for [`FEED_LABEL_NAMES`], in the same order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedLabels {
    pub account_address: String,
    pub feed_id: String,
    pub chain_id: String,
    pub contract_status: String,
    pub contract_type: String,
    pub feed_name: String,
    pub feed_path: String,
    pub network_id: String,
    pub network_name: String,
}

impl FeedLabels {
    fn values(&self) -> [&str; 9] {
        [
            &self.account_address,
            &self.feed_id,
            &self.chain_id,
            &self.contract_status,
            &self.contract_type,
            &self.feed_name,
            &self.feed_path,
            &self.network_id,
            &self.network_name,
        ]
    }
}

/// Sink for balance observations.
#[cfg_attr(test, automock)]
pub trait BalanceMetrics: Send + Sync {
    /// Records the lamport balance of one feed account.
    fn set_balance(&self, lamports: u64, account: BalanceAccount, labels: &FeedLabels);

    /// Drops every series recorded for the feed identified by
    /// `labels.feed_id`.
    fn cleanup(&self, labels: &FeedLabels);
}

/// Prometheus-backed sink with one gauge per feed account kind.
pub struct PrometheusBalanceMetrics {
    registry: Registry,
    gauges: HashMap<BalanceAccount, GaugeVec>,
    // Label sets seen per (account, feed_id), so cleanup can remove series
    // whose account_address it no longer knows.
    series: Mutex<HashMap<(BalanceAccount, String), FeedLabels>>,
}

impl PrometheusBalanceMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::with_registry(Registry::new())
    }

    pub fn with_registry(registry: Registry) -> Result<Self, prometheus::Error> {
        let mut gauges = HashMap::new();
        for account in BalanceAccount::iter() {
            let opts = Opts::new(
                format!("sol_balance_{account}"),
                format!("Lamports held by the feed's {account} account"),
            );
            let gauge = GaugeVec::new(opts, &FEED_LABEL_NAMES)?;
            registry.register(Box::new(gauge.clone()))?;
            gauges.insert(account, gauge);
        }
        Ok(Self {
            registry,
            gauges,
            series: Mutex::new(HashMap::new()),
        })
    }

    /// Gather all metrics and encode into the text exposition format.
    pub fn gather(&self) -> Result<Vec<u8>, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(buffer)
    }
}

impl BalanceMetrics for PrometheusBalanceMetrics {
    fn set_balance(&self, lamports: u64, account: BalanceAccount, labels: &FeedLabels) {
        let Some(gauge) = self.gauges.get(&account) else {
            return;
        };
        gauge.with_label_values(&labels.values()).set(lamports as f64);
        let mut series = self.series.lock().unwrap();
        let previous = series.insert((account, labels.feed_id.clone()), labels.clone());
        // A label set displaced from the index would otherwise stay exported
        // with its last value.
        if let Some(previous) = previous {
            if previous != *labels {
                let _ = gauge.remove_label_values(&previous.values());
            }
        }
    }

    fn cleanup(&self, labels: &FeedLabels) {
        let mut series = self.series.lock().unwrap();
        series.retain(|(account, feed_id), recorded| {
            if feed_id != &labels.feed_id {
                return true;
            }
            if let Some(gauge) = self.gauges.get(account) {
                let _ = gauge.remove_label_values(&recorded.values());
            }
            false
        });
    }
}

/// Sink that drops every observation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopBalanceMetrics;

impl BalanceMetrics for NoopBalanceMetrics {
    fn set_balance(&self, _lamports: u64, _account: BalanceAccount, _labels: &FeedLabels) {}

    fn cleanup(&self, _labels: &FeedLabels) {}
}
