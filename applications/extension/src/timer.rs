//! Browser wall clock and timers

use async_trait::async_trait;
use soundmaster_core::Clock;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserClock;

#[async_trait(?Send)]
impl Clock for BrowserClock {
    fn now_millis(&self) -> i64 {
        js_sys::Date::now() as i64
    }

    async fn sleep(&self, duration: Duration) {
        gloo_timers::future::sleep(duration).await;
    }
}
