//! Payment request bookkeeping over a pluggable storage backend.

use crate::error::GatewayError;
use crate::qr::QrEncoder;
use crate::storage::{Storage, GATEWAYS_SLOT, STATS_SLOT};
use crate::types::*;
use chrono::Utc;
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Length of generated gateway ids.
const ID_LENGTH: usize = 9;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Owner of the payment request list and its parallel stats map.
///
/// Every mutation is a read-modify-write of the persisted slots, serialized
/// through a single lock. Reads tolerate missing or malformed data and write
/// failures are logged without reaching the caller.
pub struct GatewayStore {
    storage: Arc<dyn Storage>,
    qr: Arc<dyn QrEncoder>,
    origin: String,
    write_lock: Mutex<()>,
}

impl GatewayStore {
    /// Create a store. `origin` is the scheme and host shareable links start with.
    pub fn new(storage: Arc<dyn Storage>, qr: Arc<dyn QrEncoder>, origin: impl Into<String>) -> Self {
        let origin = origin.into().trim_end_matches('/').to_string();

        info!("Gateway store initialized (origin={})", origin);

        Self {
            storage,
            qr,
            origin,
            write_lock: Mutex::new(()),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Shareable link for an id.
    pub fn link_for(&self, id: &str) -> String {
        format!("{}/pay/{}", self.origin, id)
    }

    /// Read both collections. Each half falls back to empty on its own.
    #[instrument(skip(self))]
    pub async fn load_all(&self) -> GatewaySnapshot {
        let gateways: Vec<PaymentRequest> = self.load_slot(GATEWAYS_SLOT).await;
        let stats: HashMap<GatewayId, GatewayStats> = self.load_slot(STATS_SLOT).await;

        debug!(
            "Loaded {} gateways, {} stats entries",
            gateways.len(),
            stats.len()
        );

        GatewaySnapshot { gateways, stats }
    }

    /// Look up one payment request together with its stats.
    pub async fn get(&self, id: &str) -> Option<(PaymentRequest, GatewayStats)> {
        let snapshot = self.load_all().await;
        let stats = snapshot.stats_for(id);
        snapshot.get(id).cloned().map(|g| (g, stats))
    }

    /// Create a payment request and its zeroed stats entry.
    ///
    /// The form is stored as given; callers validate it. A failed QR encoding
    /// leaves `qr_code` empty.
    #[instrument(skip(self, form), fields(title = %form.title))]
    pub async fn create_gateway(&self, form: GatewayForm) -> PaymentRequest {
        let _guard = self.write_lock.lock().await;
        let mut snapshot = self.load_all().await;

        let id = loop {
            let candidate = generate_id();
            if !snapshot.contains(&candidate) {
                break candidate;
            }
        };
        let link = self.link_for(&id);

        let qr_code = match self.qr.encode(&link).await {
            Ok(data_url) => data_url,
            Err(e) => {
                warn!(gateway_id = %id, "QR code generation failed: {}", e);
                String::new()
            }
        };

        let gateway = PaymentRequest {
            id: id.clone(),
            title: form.title,
            description: form.description,
            amount: form.amount,
            recipient_address: form.recipient_address,
            currency: form.currency,
            qr_code,
            link,
            created_at: Utc::now(),
        };

        snapshot.gateways.push(gateway.clone());
        snapshot.stats.insert(id.clone(), GatewayStats::default());

        self.persist_all(&snapshot).await;

        info!(gateway_id = %id, "Created payment gateway");

        gateway
    }

    /// Add one payment to the stats of an existing gateway.
    ///
    /// Unknown ids and negative or non-finite amounts are rejected, leaving
    /// persisted state untouched.
    #[instrument(skip(self))]
    pub async fn record_payment(&self, id: &str, amount: f64) -> Result<GatewayStats, GatewayError> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(GatewayError::InvalidAmount(amount));
        }

        let _guard = self.write_lock.lock().await;
        let mut snapshot = self.load_all().await;

        if !snapshot.contains(id) {
            warn!(gateway_id = %id, "Payment for unknown gateway ignored");
            return Err(GatewayError::NotFound(id.to_string()));
        }

        let stats = snapshot.stats.entry(id.to_string()).or_default();
        stats.accumulate(amount);
        let updated = *stats;

        self.persist(STATS_SLOT, &snapshot.stats).await;

        info!(
            gateway_id = %id,
            amount,
            total_received = updated.total_received,
            transaction_count = updated.transaction_count,
            "Recorded payment"
        );

        Ok(updated)
    }

    /// Remove a gateway and its stats. Returns whether anything was removed.
    #[instrument(skip(self))]
    pub async fn delete_gateway(&self, id: &str) -> bool {
        let _guard = self.write_lock.lock().await;
        let mut snapshot = self.load_all().await;

        let before = snapshot.gateways.len();
        snapshot.gateways.retain(|g| g.id != id);
        let removed_gateway = snapshot.gateways.len() != before;
        let removed_stats = snapshot.stats.remove(id).is_some();

        self.persist_all(&snapshot).await;

        let removed = removed_gateway || removed_stats;
        if removed {
            info!(gateway_id = %id, "Deleted payment gateway");
        } else {
            debug!(gateway_id = %id, "Delete of unknown gateway");
        }

        removed
    }

    async fn load_slot<T>(&self, slot: &str) -> T
    where
        T: DeserializeOwned + Default,
    {
        let text = match self.storage.load(slot).await {
            Ok(Some(text)) => text,
            Ok(None) => return T::default(),
            Err(e) => {
                warn!("Failed to read {}, using empty collection: {}", slot, e);
                return T::default();
            }
        };

        serde_json::from_str(&text).unwrap_or_else(|e| {
            warn!("Malformed data in {}, using empty collection: {}", slot, e);
            T::default()
        })
    }

    async fn persist<T: Serialize>(&self, slot: &str, value: &T) {
        let result = match serde_json::to_string(value) {
            Ok(text) => self.storage.save(slot, &text).await,
            Err(e) => Err(e.into()),
        };

        if let Err(e) = result {
            warn!("Failed to persist {}: {}", slot, e);
        }
    }

    async fn persist_all(&self, snapshot: &GatewaySnapshot) {
        let encoded = serde_json::to_string(&snapshot.gateways)
            .and_then(|g| serde_json::to_string(&snapshot.stats).map(|s| (g, s)));

        let result = match encoded {
            Ok((gateways, stats)) => {
                self.storage
                    .save_all(&[(GATEWAYS_SLOT, gateways), (STATS_SLOT, stats)])
                    .await
            }
            Err(e) => Err(e.into()),
        };

        if let Err(e) = result {
            warn!("Failed to persist gateway data: {}", e);
        }
    }
}

/// Random lowercase base-36 token.
fn generate_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LENGTH)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Encoder that always succeeds with a fixed payload.
    struct StaticEncoder;

    #[async_trait]
    impl QrEncoder for StaticEncoder {
        async fn encode(&self, text: &str) -> Result<String, GatewayError> {
            Ok(format!("data:test,{}", text))
        }
    }

    /// Encoder that always fails.
    struct FailingEncoder;

    #[async_trait]
    impl QrEncoder for FailingEncoder {
        async fn encode(&self, _text: &str) -> Result<String, GatewayError> {
            Err(GatewayError::QrEncoding("boom".into()))
        }
    }

    /// Storage that reads fine but rejects every write.
    #[derive(Default)]
    struct ReadOnlyStorage {
        inner: MemoryStorage,
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl Storage for ReadOnlyStorage {
        async fn load(&self, slot: &str) -> Result<Option<String>, GatewayError> {
            self.inner.load(slot).await
        }

        async fn save(&self, _slot: &str, _value: &str) -> Result<(), GatewayError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(GatewayError::Storage("disk full".into()))
        }
    }

    fn test_store() -> (GatewayStore, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        let store = GatewayStore::new(
            storage.clone(),
            Arc::new(StaticEncoder),
            "https://orange.example",
        );
        (store, storage)
    }

    fn invoice_form() -> GatewayForm {
        GatewayForm::new("Invoice #1", Currency::Usdc)
    }

    #[test]
    fn test_generate_id_shape() {
        let id = generate_id();
        assert_eq!(id.len(), ID_LENGTH);
        assert!(id
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_link_for_strips_trailing_slash() {
        let store = GatewayStore::new(
            Arc::new(MemoryStorage::new()),
            Arc::new(StaticEncoder),
            "https://orange.example/",
        );
        assert_eq!(store.link_for("abc"), "https://orange.example/pay/abc");
    }

    #[tokio::test]
    async fn test_load_all_first_run_is_empty() {
        let (store, _) = test_store();
        let snapshot = store.load_all().await;

        assert!(snapshot.is_empty());
        assert!(snapshot.stats.is_empty());
    }

    #[tokio::test]
    async fn test_load_all_malformed_halves_independent() {
        let storage = Arc::new(MemoryStorage::with_slots([
            (GATEWAYS_SLOT, "not json"),
            (STATS_SLOT, r#"{"abc":{"totalReceived":5,"transactionCount":1}}"#),
        ]));
        let store = GatewayStore::new(storage, Arc::new(StaticEncoder), "https://orange.example");

        let snapshot = store.load_all().await;
        assert!(snapshot.gateways.is_empty());
        assert_eq!(snapshot.stats_for("abc").transaction_count, 1);
    }

    #[tokio::test]
    async fn test_create_gateway_fields() {
        let (store, _) = test_store();
        let mut form = invoice_form();
        form.description = "Consulting".into();
        form.amount = "25".into();
        form.recipient_address = "0xabc".into();

        let gateway = store.create_gateway(form).await;

        assert_eq!(gateway.id.len(), ID_LENGTH);
        assert_eq!(gateway.title, "Invoice #1");
        assert_eq!(gateway.description, "Consulting");
        assert_eq!(gateway.recipient_address, "0xabc");
        assert_eq!(gateway.currency, Currency::Usdc);
        assert_eq!(gateway.requested_amount(), Some(25.0));
        assert_eq!(gateway.link, format!("https://orange.example/pay/{}", gateway.id));
        assert!(gateway.link.ends_with(&gateway.id));
        assert_eq!(gateway.qr_code, format!("data:test,{}", gateway.link));
    }

    #[tokio::test]
    async fn test_create_gateway_initializes_zero_stats() {
        let (store, _) = test_store();
        let gateway = store.create_gateway(invoice_form()).await;

        let snapshot = store.load_all().await;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get(&gateway.id), Some(&gateway));
        assert_eq!(snapshot.stats.get(&gateway.id), Some(&GatewayStats::default()));
    }

    #[tokio::test]
    async fn test_create_gateway_unique_ids() {
        let (store, _) = test_store();

        for _ in 0..25 {
            store.create_gateway(invoice_form()).await;
        }

        let snapshot = store.load_all().await;
        let ids: HashSet<_> = snapshot.gateways.iter().map(|g| g.id.clone()).collect();
        assert_eq!(snapshot.len(), 25);
        assert_eq!(ids.len(), 25);
        assert_eq!(snapshot.stats.len(), 25);
    }

    #[tokio::test]
    async fn test_create_gateway_preserves_order() {
        let (store, _) = test_store();
        let first = store.create_gateway(GatewayForm::new("First", Currency::Usd)).await;
        let second = store.create_gateway(GatewayForm::new("Second", Currency::Eth)).await;

        let snapshot = store.load_all().await;
        assert_eq!(snapshot.gateways[0].id, first.id);
        assert_eq!(snapshot.gateways[1].id, second.id);
    }

    #[tokio::test]
    async fn test_create_gateway_qr_failure_is_not_fatal() {
        let store = GatewayStore::new(
            Arc::new(MemoryStorage::new()),
            Arc::new(FailingEncoder),
            "https://orange.example",
        );

        let gateway = store.create_gateway(invoice_form()).await;
        assert!(!gateway.has_qr_code());
        assert!(store.load_all().await.contains(&gateway.id));
    }

    #[tokio::test]
    async fn test_record_payment_accumulates() {
        let (store, _) = test_store();
        let gateway = store.create_gateway(invoice_form()).await;

        store.record_payment(&gateway.id, 25.0).await.unwrap();
        let stats = store.record_payment(&gateway.id, 25.0).await.unwrap();

        assert_eq!(stats.total_received, 50.0);
        assert_eq!(stats.transaction_count, 2);
        assert_eq!(store.load_all().await.stats_for(&gateway.id), stats);
    }

    #[tokio::test]
    async fn test_record_payment_no_cross_id_interference() {
        let (store, _) = test_store();
        let a = store.create_gateway(GatewayForm::new("A", Currency::Usd)).await;
        let b = store.create_gateway(GatewayForm::new("B", Currency::Usd)).await;

        store.record_payment(&a.id, 10.0).await.unwrap();
        store.record_payment(&b.id, 1.5).await.unwrap();
        store.record_payment(&a.id, 2.0).await.unwrap();

        let snapshot = store.load_all().await;
        assert_eq!(snapshot.stats_for(&a.id).total_received, 12.0);
        assert_eq!(snapshot.stats_for(&a.id).transaction_count, 2);
        assert_eq!(snapshot.stats_for(&b.id).total_received, 1.5);
        assert_eq!(snapshot.stats_for(&b.id).transaction_count, 1);
        assert_eq!(snapshot.total_received(), 13.5);
        assert_eq!(snapshot.total_transactions(), 3);
    }

    #[tokio::test]
    async fn test_record_payment_zero_amount_counts() {
        let (store, _) = test_store();
        let gateway = store.create_gateway(invoice_form()).await;

        let stats = store.record_payment(&gateway.id, 0.0).await.unwrap();
        assert_eq!(stats.total_received, 0.0);
        assert_eq!(stats.transaction_count, 1);
    }

    #[tokio::test]
    async fn test_record_payment_unknown_id_rejected() {
        let (store, _) = test_store();

        let result = store.record_payment("missing", 10.0).await;
        assert!(matches!(result, Err(GatewayError::NotFound(id)) if id == "missing"));

        let snapshot = store.load_all().await;
        assert!(snapshot.is_empty());
        assert!(snapshot.stats.is_empty());
    }

    #[tokio::test]
    async fn test_record_payment_invalid_amounts_rejected() {
        let (store, _) = test_store();
        let gateway = store.create_gateway(invoice_form()).await;

        for amount in [-1.0, f64::NAN, f64::INFINITY] {
            let result = store.record_payment(&gateway.id, amount).await;
            assert!(matches!(result, Err(GatewayError::InvalidAmount(_))));
        }

        assert_eq!(
            store.load_all().await.stats_for(&gateway.id),
            GatewayStats::default()
        );
    }

    #[tokio::test]
    async fn test_record_payment_defaults_missing_stats_entry() {
        let (store, storage) = test_store();
        let gateway = store.create_gateway(invoice_form()).await;

        // Stats slot lost independently of the gateway list
        storage.save(STATS_SLOT, "garbage").await.unwrap();

        let stats = store.record_payment(&gateway.id, 7.0).await.unwrap();
        assert_eq!(stats.total_received, 7.0);
        assert_eq!(stats.transaction_count, 1);
    }

    #[tokio::test]
    async fn test_delete_gateway_removes_both() {
        let (store, _) = test_store();
        let keep = store.create_gateway(GatewayForm::new("Keep", Currency::Usd)).await;
        let gone = store.create_gateway(GatewayForm::new("Gone", Currency::Usd)).await;
        store.record_payment(&gone.id, 3.0).await.unwrap();

        assert!(store.delete_gateway(&gone.id).await);

        let snapshot = store.load_all().await;
        assert!(!snapshot.contains(&gone.id));
        assert!(!snapshot.stats.contains_key(&gone.id));
        assert!(snapshot.contains(&keep.id));
        assert!(snapshot.stats.contains_key(&keep.id));
    }

    #[tokio::test]
    async fn test_delete_gateway_unknown_is_noop() {
        let (store, _) = test_store();
        store.create_gateway(invoice_form()).await;

        assert!(!store.delete_gateway("missing").await);
        assert_eq!(store.load_all().await.len(), 1);
    }

    #[tokio::test]
    async fn test_get_returns_gateway_and_stats() {
        let (store, _) = test_store();
        let gateway = store.create_gateway(invoice_form()).await;
        store.record_payment(&gateway.id, 4.0).await.unwrap();

        let (found, stats) = store.get(&gateway.id).await.unwrap();
        assert_eq!(found.id, gateway.id);
        assert_eq!(stats.total_received, 4.0);

        assert!(store.get("missing").await.is_none());
    }

    #[tokio::test]
    async fn test_write_failure_is_silent() {
        let storage = Arc::new(ReadOnlyStorage::default());
        let store = GatewayStore::new(storage.clone(), Arc::new(StaticEncoder), "https://orange.example");

        let gateway = store.create_gateway(invoice_form()).await;
        assert!(!gateway.id.is_empty());
        assert!(storage.attempts.load(Ordering::SeqCst) > 0);

        // Nothing reached storage
        assert!(store.load_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_persisted_layout() {
        let (store, storage) = test_store();
        let gateway = store.create_gateway(invoice_form()).await;

        let gateways = storage.load(GATEWAYS_SLOT).await.unwrap().unwrap();
        let stats = storage.load(STATS_SLOT).await.unwrap().unwrap();

        assert!(gateways.contains("\"recipientAddress\""));
        assert!(gateways.contains("\"qrCode\""));
        assert!(gateways.contains("\"createdAt\""));
        assert!(gateways.contains("\"currency\":\"USDC\""));
        assert!(stats.contains(&format!(
            "\"{}\":{{\"totalReceived\":0.0,\"transactionCount\":0}}",
            gateway.id
        )));
    }

    #[tokio::test]
    async fn test_invoice_scenario() {
        let (store, _) = test_store();

        let gateway = store.create_gateway(invoice_form()).await;
        assert!(!gateway.id.is_empty());
        assert!(gateway.link.ends_with(&gateway.id));

        store.record_payment(&gateway.id, 25.0).await.unwrap();
        store.record_payment(&gateway.id, 25.0).await.unwrap();
        assert_eq!(
            store.load_all().await.stats_for(&gateway.id),
            GatewayStats {
                total_received: 50.0,
                transaction_count: 2
            }
        );

        store.delete_gateway(&gateway.id).await;
        let snapshot = store.load_all().await;
        assert!(snapshot.gateways.is_empty());
        assert!(!snapshot.stats.contains_key(&gateway.id));
    }

    #[tokio::test]
    async fn test_file_backed_store_survives_restart() {
        use crate::storage::FileStorage;

        let dir = tempfile::tempdir().unwrap();
        let open_store = || {
            GatewayStore::new(
                Arc::new(FileStorage::new(dir.path())),
                Arc::new(StaticEncoder),
                "https://orange.example",
            )
        };

        let first = open_store();
        let gateway = first.create_gateway(invoice_form()).await;
        first.record_payment(&gateway.id, 25.0).await.unwrap();
        drop(first);

        let second = open_store();
        let snapshot = second.load_all().await;

        assert_eq!(snapshot.gateways, vec![gateway.clone()]);
        let stats = snapshot.stats_for(&gateway.id);
        assert_eq!(stats.total_received, 25.0);
        assert_eq!(stats.transaction_count, 1);
        assert!(dir.path().join("OrangeGateways.json").exists());
        assert!(dir.path().join("OrangeGatewayStats.json").exists());
    }
}
