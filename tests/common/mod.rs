#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use order_pdf_server::db::{AppState, RecordStore, StoreError, StoreSession};
use order_pdf_server::order::models::{LineItem, OrderId, OrderMeta, Party};
use order_pdf_server::render::{PageConfig, PdfEngine, RenderError};
use rust_decimal::Decimal;

pub const STUB_PDF: &[u8] = b"%PDF-1.4 stub";

pub fn line_item(order_id: i64, product_id: i64, price: &str, qty: &str) -> LineItem {
    LineItem {
        order_id,
        product_id,
        product_qty: Decimal::from_str(qty).unwrap(),
        price: Decimal::from_str(price).unwrap(),
        customer_id: Some(3),
        vendor_id: Some(4),
    }
}

pub fn party(id: i64, name: &str) -> Party {
    Party {
        id,
        display_name: Some(name.to_string()),
    }
}

/// Rows served by the stub store.
#[derive(Default)]
pub struct Fixture {
    pub items: Vec<LineItem>,
    pub meta: Option<OrderMeta>,
    pub parties: HashMap<i64, Party>,
    pub failing_parties: HashSet<i64>,
    pub fail_meta: bool,
    pub fail_line_items: bool,
    pub fail_open: bool,
}

/// Counters shared between a stub store and its sessions.
#[derive(Default)]
pub struct StoreCalls {
    pub opens: AtomicUsize,
    pub releases: AtomicUsize,
    pub queries: AtomicUsize,
}

impl StoreCalls {
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

pub struct StubStore {
    fixture: Arc<Fixture>,
    pub calls: Arc<StoreCalls>,
}

impl StubStore {
    pub fn new(fixture: Fixture) -> Self {
        Self {
            fixture: Arc::new(fixture),
            calls: Arc::new(StoreCalls::default()),
        }
    }
}

#[async_trait]
impl RecordStore for StubStore {
    async fn open(&self) -> Result<Box<dyn StoreSession>, StoreError> {
        if self.fixture.fail_open {
            return Err(StoreError::Connection("connection refused".to_string()));
        }
        self.calls.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(StubSession {
            fixture: self.fixture.clone(),
            calls: self.calls.clone(),
        }))
    }
}

pub struct StubSession {
    fixture: Arc<Fixture>,
    calls: Arc<StoreCalls>,
}

impl Drop for StubSession {
    fn drop(&mut self) {
        self.calls.releases.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl StoreSession for StubSession {
    async fn line_items(&mut self, order_id: OrderId) -> Result<Vec<LineItem>, StoreError> {
        self.calls.queries.fetch_add(1, Ordering::SeqCst);
        if self.fixture.fail_line_items {
            return Err(StoreError::Query("line items unavailable".to_string()));
        }
        Ok(self
            .fixture
            .items
            .iter()
            .filter(|item| item.order_id == order_id.0)
            .cloned()
            .collect())
    }

    async fn order_meta(&mut self, _order_id: OrderId) -> Result<Option<OrderMeta>, StoreError> {
        self.calls.queries.fetch_add(1, Ordering::SeqCst);
        if self.fixture.fail_meta {
            return Err(StoreError::Query("orders table locked".to_string()));
        }
        Ok(self.fixture.meta.clone())
    }

    async fn party(&mut self, user_id: i64) -> Result<Option<Party>, StoreError> {
        self.calls.queries.fetch_add(1, Ordering::SeqCst);
        if self.fixture.failing_parties.contains(&user_id) {
            return Err(StoreError::Query(format!("user {} unreadable", user_id)));
        }
        Ok(self.fixture.parties.get(&user_id).cloned())
    }
}

/// PDF engine that records its input instead of rendering.
#[derive(Default)]
pub struct StubPdfEngine {
    pub fail: bool,
    pub calls: AtomicUsize,
    pub last_html: Mutex<Option<String>>,
    pub last_page: Mutex<Option<PageConfig>>,
}

impl StubPdfEngine {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn html(&self) -> String {
        self.last_html.lock().unwrap().clone().unwrap_or_default()
    }
}

#[async_trait]
impl PdfEngine for StubPdfEngine {
    async fn html_to_pdf(&self, html: &str, page: &PageConfig) -> Result<Vec<u8>, RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_html.lock().unwrap() = Some(html.to_string());
        *self.last_page.lock().unwrap() = Some(page.clone());
        if self.fail {
            return Err(RenderError::EngineExit(1));
        }
        Ok(STUB_PDF.to_vec())
    }
}

pub struct Harness {
    pub state: AppState,
    pub calls: Arc<StoreCalls>,
    pub engine: Arc<StubPdfEngine>,
}

pub fn harness(fixture: Fixture) -> Harness {
    harness_with_engine(fixture, StubPdfEngine::default())
}

pub fn harness_with_engine(fixture: Fixture, engine: StubPdfEngine) -> Harness {
    let store = StubStore::new(fixture);
    let calls = store.calls.clone();
    let engine = Arc::new(engine);
    let state = AppState::with_parts(Arc::new(store), engine.clone())
        .expect("bundled template should compile");
    Harness {
        state,
        calls,
        engine,
    }
}
