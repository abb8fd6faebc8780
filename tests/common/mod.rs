#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tinylink::api::middleware::cors;
use tinylink::application::admission::AdmissionOptions;
use tinylink::application::services::LinkService;
use tinylink::domain::click_event::ClickEvent;
use tinylink::domain::entities::{Link, NewLink};
use tinylink::domain::repositories::{LinkRepository, StoreError, UniqueField};
use tinylink::infrastructure::network::{
    AddressResolver, AttemptFailure, ProbeError, ProbeMethod, ProbeRequest, Reachable,
    ReachabilityProbe, ResolveError,
};
use tinylink::routes::app_router;
use tinylink::state::AppState;

/// In-memory [`LinkRepository`] enforcing the same unique constraints as PostgreSQL.
#[derive(Default)]
pub struct InMemoryLinkRepository {
    links: Mutex<Vec<Link>>,
    next_id: AtomicUsize,
    unavailable: AtomicBool,
}

impl InMemoryLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every call fail with a backend error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn seed(&self, code: &str, target: &str) -> Link {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i64 + 1;
        let link = Link::new(id, code.to_string(), target.to_string(), 0, None, Utc::now());
        self.links.lock().unwrap().push(link.clone());
        link
    }

    pub fn get(&self, code: &str) -> Option<Link> {
        self.links
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.code == code)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.links.lock().unwrap().len()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::Backend("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl LinkRepository for InMemoryLinkRepository {
    async fn insert(&self, new_link: NewLink) -> Result<Link, StoreError> {
        self.check_available()?;
        let mut links = self.links.lock().unwrap();

        if links.iter().any(|l| l.code == new_link.code) {
            return Err(StoreError::UniqueViolation(UniqueField::Code));
        }
        if links.iter().any(|l| l.target == new_link.target) {
            return Err(StoreError::UniqueViolation(UniqueField::Target));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i64 + 1;
        let link = Link::new(id, new_link.code, new_link.target, 0, None, Utc::now());
        links.push(link.clone());
        Ok(link)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, StoreError> {
        self.check_available()?;
        Ok(self.get(code))
    }

    async fn find_by_target(&self, target: &str) -> Result<Option<Link>, StoreError> {
        self.check_available()?;
        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.target == target)
            .cloned())
    }

    async fn exists(&self, code: &str) -> Result<bool, StoreError> {
        self.check_available()?;
        Ok(self.get(code).is_some())
    }

    async fn list(&self) -> Result<Vec<Link>, StoreError> {
        self.check_available()?;
        let mut links = self.links.lock().unwrap().clone();
        links.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(links)
    }

    async fn delete(&self, code: &str) -> Result<bool, StoreError> {
        self.check_available()?;
        let mut links = self.links.lock().unwrap();
        let before = links.len();
        links.retain(|l| l.code != code);
        Ok(links.len() < before)
    }

    async fn record_click(
        &self,
        code: &str,
        clicked_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        self.check_available()?;
        let mut links = self.links.lock().unwrap();
        match links.iter_mut().find(|l| l.code == code) {
            Some(link) => {
                link.clicks += 1;
                link.last_clicked = Some(link.last_clicked.map_or(clicked_at, |t| t.max(clicked_at)));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_available()
    }
}

/// Resolver answering from a fixed table; unknown hosts fail like NXDOMAIN.
#[derive(Default)]
pub struct StaticResolver {
    hosts: Mutex<HashMap<String, Vec<IpAddr>>>,
    calls: AtomicUsize,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(self, host: &str, addresses: &[&str]) -> Self {
        let ips = addresses.iter().map(|a| a.parse().unwrap()).collect();
        self.hosts.lock().unwrap().insert(host.to_string(), ips);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AddressResolver for StaticResolver {
    async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.hosts
            .lock()
            .unwrap()
            .get(host)
            .cloned()
            .ok_or_else(|| ResolveError("failed to lookup address information".to_string()))
    }
}

/// Prober returning a fixed outcome and counting calls.
pub struct StubProber {
    status: Option<u16>,
    calls: AtomicUsize,
}

impl StubProber {
    /// Every probe succeeds with HEAD 200.
    pub fn reachable() -> Self {
        Self {
            status: Some(200),
            calls: AtomicUsize::new(0),
        }
    }

    /// Every probe fails with HEAD and GET 503.
    pub fn unreachable() -> Self {
        Self {
            status: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReachabilityProbe for StubProber {
    async fn probe(&self, _request: ProbeRequest) -> Result<Reachable, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.status {
            Some(status) => Ok(Reachable {
                method: ProbeMethod::Head,
                status,
            }),
            None => Err(ProbeError::Unreachable {
                head: AttemptFailure::Status(503),
                get: AttemptFailure::Status(503),
            }),
        }
    }
}

/// Everything a handler test needs to drive the app and inspect side effects.
pub struct TestApp {
    pub server: TestServer,
    pub repo: Arc<InMemoryLinkRepository>,
    pub resolver: Arc<StaticResolver>,
    pub prober: Arc<StubProber>,
    pub clicks: mpsc::Receiver<ClickEvent>,
}

/// Public hosts known to the default test resolver.
pub fn default_resolver() -> StaticResolver {
    StaticResolver::new()
        .with_host("example.com", &["93.184.216.34"])
        .with_host("docs.example.org", &["93.184.216.35", "2606:2800:220:1::35"])
        .with_host("localtest.example", &["127.0.0.1"])
        .with_host("split.example", &["93.184.216.36", "10.0.0.5"])
}

pub fn create_test_state(
    repo: Arc<InMemoryLinkRepository>,
    resolver: Arc<StaticResolver>,
    prober: Arc<StubProber>,
    options: AdmissionOptions,
    queue_capacity: usize,
) -> (AppState, mpsc::Receiver<ClickEvent>) {
    let (tx, rx) = mpsc::channel(queue_capacity);

    let link_service = Arc::new(LinkService::new(repo, resolver, prober, options));

    (AppState::new(link_service, tx), rx)
}

pub fn spawn_app_with(
    resolver: StaticResolver,
    prober: StubProber,
    options: AdmissionOptions,
) -> TestApp {
    let repo = Arc::new(InMemoryLinkRepository::new());
    let resolver = Arc::new(resolver);
    let prober = Arc::new(prober);

    let (state, clicks) = create_test_state(
        repo.clone(),
        resolver.clone(),
        prober.clone(),
        options,
        100,
    );

    let server = TestServer::new(app_router(state, cors::layer(&[]))).unwrap();

    TestApp {
        server,
        repo,
        resolver,
        prober,
        clicks,
    }
}

/// App with a reachable prober and default admission options.
pub fn spawn_app() -> TestApp {
    spawn_app_with(
        default_resolver(),
        StubProber::reachable(),
        AdmissionOptions::default(),
    )
}
