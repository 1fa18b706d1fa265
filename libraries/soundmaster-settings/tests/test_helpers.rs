#![allow(dead_code)]

use async_trait::async_trait;
use soundmaster_core::{Clock, PageMessage, PageResponse};
use soundmaster_engine::simulated::{
    simulated_agent, SimulatedAgent, SimulatedAudio, SimulatedDocument,
};
use soundmaster_settings::{DeliveryError, TabChannel};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Once;
use std::time::Duration;

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

/// Clock that only moves when slept on or advanced by hand
///
/// Sleeping yields to the runtime once, so concurrent tasks interleave at
/// the retry delay the way they do in a browser.
#[derive(Clone)]
pub struct ManualClock {
    now: Rc<Cell<i64>>,
    sleeps: Rc<RefCell<Vec<Duration>>>,
}

impl ManualClock {
    pub fn at(now: i64) -> Self {
        Self {
            now: Rc::new(Cell::new(now)),
            sleeps: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn advance(&self, millis: i64) {
        self.now.set(self.now.get() + millis);
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.borrow().clone()
    }
}

#[async_trait(?Send)]
impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.get()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
        self.advance(duration.as_millis() as i64);
        tokio::task::yield_now().await;
    }
}

struct TabState {
    document: SimulatedDocument,
    agent: Option<SimulatedAgent>,
    injectable: bool,
    closes_channel: bool,
    sent: Vec<PageMessage>,
    injections: usize,
}

/// Tab whose agent is a simulated page agent
///
/// Clones share the tab, so a test can keep a handle after giving one to a
/// control panel.
#[derive(Clone)]
pub struct SimulatedTab(Rc<RefCell<TabState>>);

impl SimulatedTab {
    fn build(document: SimulatedDocument, with_agent: bool, injectable: bool) -> Self {
        let agent = with_agent.then(|| simulated_agent(document.clone(), SimulatedAudio::new()));
        Self(Rc::new(RefCell::new(TabState {
            document,
            agent,
            injectable,
            closes_channel: false,
            sent: Vec::new(),
            injections: 0,
        })))
    }

    /// Tab with an agent already running
    pub fn with_agent(document: SimulatedDocument) -> Self {
        Self::build(document, true, true)
    }

    /// Tab opened before the extension; the agent can be injected
    pub fn without_agent(document: SimulatedDocument) -> Self {
        Self::build(document, false, true)
    }

    /// Protected page that can never host an agent
    pub fn protected() -> Self {
        Self::build(SimulatedDocument::new(), false, false)
    }

    /// Tab whose agent closes the channel before answering
    pub fn closing(document: SimulatedDocument) -> Self {
        let tab = Self::without_agent(document);
        tab.0.borrow_mut().closes_channel = true;
        tab
    }

    pub fn sent(&self) -> Vec<PageMessage> {
        self.0.borrow().sent.clone()
    }

    pub fn injections(&self) -> usize {
        self.0.borrow().injections
    }

    /// Target volume of the agent, if one is running
    pub fn agent_volume(&self) -> Option<u32> {
        self.0.borrow().agent.as_ref().map(SimulatedAgent::current_volume)
    }
}

#[async_trait(?Send)]
impl TabChannel for SimulatedTab {
    async fn send(&self, message: &PageMessage) -> Result<PageResponse, DeliveryError> {
        let mut state = self.0.borrow_mut();
        state.sent.push(message.clone());

        if state.closes_channel {
            return Err(DeliveryError::ChannelClosed);
        }

        match state.agent.as_mut() {
            Some(agent) => Ok(agent.handle_message(message.clone())),
            None => Err(DeliveryError::NoReceiver(
                "Receiving end does not exist".to_string(),
            )),
        }
    }

    async fn inject_agent(&self) -> Result<(), DeliveryError> {
        let mut state = self.0.borrow_mut();
        state.injections += 1;

        if !state.injectable {
            return Err(DeliveryError::Injection(
                "Cannot access contents of the page".to_string(),
            ));
        }

        let agent = simulated_agent(state.document.clone(), SimulatedAudio::new());
        state.agent = Some(agent);
        Ok(())
    }
}
