//! Landing flow: full cold loads through the public API with fake collaborators.

use std::cell::RefCell;
use std::future::Future;
use std::sync::{Arc, Mutex};

use futures::executor::block_on;
use serde_json::{Value, json};

use landing_gate::app::AppContext;
use landing_gate::bootstrap::{Bootstrap, BootstrapDecision};
use landing_gate::config::BootstrapConfig;
use landing_gate::net::fetch::{Fetch, FetchError, FetchRequest, FetchResponse};
use landing_gate::util::auto_login::{AutoLoginChannel, AutoLoginOutcome, MessageBus, MessageHandler};
use landing_gate::util::i18n::Catalog;
use landing_gate::util::navigation::Navigator;

const ORIGIN: &str = "https://photos.example";

/// Serves fixed responses per path.
struct FakeServer {
    config: Result<FetchResponse, FetchError>,
    user: Option<&'static str>,
}

impl FakeServer {
    fn initialized(flag: bool) -> Self {
        Self { config: Ok(ok(&format!(r#"{{"isInitialized":{flag}}}"#))), user: None }
    }

    fn with_user(mut self, email: &'static str) -> Self {
        self.user = Some(email);
        self
    }
}

fn ok(body: &str) -> FetchResponse {
    FetchResponse { status: 200, location: None, body: body.to_owned() }
}

impl Fetch for FakeServer {
    fn fetch(&self, request: FetchRequest) -> impl Future<Output = Result<FetchResponse, FetchError>> {
        let reply = match request.path.as_str() {
            "/api/server/config" => self.config.clone(),
            "/api/users/me" => Ok(match self.user {
                Some(email) => ok(&format!(r#"{{"email":"{email}"}}"#)),
                None => FetchResponse { status: 401, location: None, body: String::new() },
            }),
            other => Err(FetchError::Transport(format!("unexpected path {other}"))),
        };
        async move { reply }
    }
}

#[derive(Default)]
struct Recorder {
    calls: Mutex<Vec<(u16, String)>>,
}

impl Recorder {
    fn calls(&self) -> Vec<(u16, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Navigator for Recorder {
    fn redirect(&self, status: u16, location: &str) {
        self.calls.lock().unwrap().push((status, location.to_owned()));
    }
}

#[derive(Default)]
struct Bus {
    handlers: RefCell<Vec<Arc<dyn MessageHandler>>>,
}

impl Bus {
    fn post(&self, data: &Value) -> Vec<AutoLoginOutcome> {
        self.handlers.borrow().iter().map(|handler| handler.receive(ORIGIN, data)).collect()
    }
}

impl MessageBus for Bus {
    fn listen(&self, handler: Arc<dyn MessageHandler>) -> bool {
        self.handlers.borrow_mut().push(handler);
        true
    }
}

struct Page {
    ctx: AppContext,
    bus: Bus,
    channel: Arc<AutoLoginChannel<Recorder>>,
}

impl Page {
    fn open() -> Self {
        let ctx = AppContext::new(BootstrapConfig::default());
        let channel = Arc::new(AutoLoginChannel::new(
            ctx.session.clone(),
            ctx.config.auto_login.clone(),
            ctx.config.login_path.as_str(),
            ORIGIN,
            Recorder::default(),
            ctx.handoff.clone(),
        ));
        channel.watch();
        Self { ctx, bus: Bus::default(), channel }
    }

    fn load(&self, server: &FakeServer, navigator: &Recorder) -> BootstrapDecision {
        let boot = Bootstrap::new(&self.ctx.config, &self.ctx.server_config)
            .with_auto_login(&self.bus, self.channel.clone());
        block_on(boot.run(server, &Catalog::english(), navigator))
    }
}

#[test]
fn initialized_server_redirects_once_to_login() {
    let page = Page::open();
    let navigator = Recorder::default();

    let decision = page.load(&FakeServer::initialized(true), &navigator);

    assert!(decision.landing().is_none());
    assert_eq!(navigator.calls(), vec![(302, "/auth/login".to_owned())]);
}

#[test]
fn fresh_server_renders_welcome() {
    let page = Page::open();
    let navigator = Recorder::default();

    let decision = page.load(&FakeServer::initialized(false), &navigator);

    let data = decision.landing().expect("render decision");
    assert!(!data.meta.title.is_empty());
    assert!(!data.meta.description.is_empty());
    assert!(navigator.calls().is_empty());
}

#[test]
fn unreachable_server_still_renders() {
    let page = Page::open();
    let navigator = Recorder::default();
    let server = FakeServer { config: Err(FetchError::Timeout(10_000)), user: None };

    let decision = page.load(&server, &navigator);

    assert!(decision.landing().is_some());
    assert!(navigator.calls().is_empty());
}

#[test]
fn handshake_for_other_user_redirects_with_continue() {
    let page = Page::open();
    let server = FakeServer::initialized(false).with_user("b@x.com");
    block_on(page.ctx.users.load(&server)).unwrap();
    page.load(&server, &Recorder::default());

    let outcomes = page.bus.post(&json!({
        "autoEmail": "a@x.com",
        "autoPassword": "pw",
        "autoUrl": "https://host/album/42?x=1",
    }));

    assert_eq!(outcomes.len(), 1);
    assert_eq!(
        page.channel.navigator().calls(),
        vec![(302, "/auth/login?continue=%2Falbum%2F42%3Fx%3D1".to_owned())]
    );
}

#[test]
fn handshake_for_signed_in_user_is_a_noop() {
    let page = Page::open();
    let server = FakeServer::initialized(true).with_user("a@x.com");
    block_on(page.ctx.users.load(&server)).unwrap();
    page.load(&server, &Recorder::default());

    let message = json!({ "autoEmail": "a@x.com", "autoPassword": "pw", "autoUrl": "https://host/" });
    page.bus.post(&message);
    page.bus.post(&message);

    assert!(page.channel.navigator().calls().is_empty());
}

#[test]
fn handshake_without_password_is_ignored() {
    let page = Page::open();
    page.load(&FakeServer::initialized(false), &Recorder::default());

    let outcomes = page.bus.post(&json!({ "autoEmail": "a@x.com", "autoUrl": "https://host/" }));

    assert_eq!(outcomes, vec![AutoLoginOutcome::Ignored]);
    assert!(page.channel.navigator().calls().is_empty());
}

#[test]
fn early_handshake_waits_for_signed_in_user() {
    let page = Page::open();
    let server = FakeServer::initialized(true).with_user("a@x.com");
    page.load(&server, &Recorder::default());

    let message = json!({ "autoEmail": "a@x.com", "autoPassword": "pw", "autoUrl": "https://host/" });
    assert_eq!(page.bus.post(&message), vec![AutoLoginOutcome::Deferred]);
    block_on(page.ctx.users.load(&server)).unwrap();

    assert!(page.channel.navigator().calls().is_empty());
}

#[test]
fn early_handshake_redirects_once_nobody_is_signed_in() {
    let page = Page::open();
    let server = FakeServer::initialized(false);
    page.load(&server, &Recorder::default());

    page.bus.post(&json!({ "autoEmail": "a@x.com", "autoPassword": "pw", "autoUrl": "https://host/album/7" }));
    assert!(page.channel.navigator().calls().is_empty());
    block_on(page.ctx.users.load(&server)).unwrap();

    assert_eq!(page.channel.navigator().calls(), vec![(302, "/auth/login?continue=%2Falbum%2F7".to_owned())]);
}
