//! Reliable dispatcher retry tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use ride_relay::dispatch::{
    Channel, ChannelId, DeliveryError, DispatchError, ReliableDispatcher, RetryPolicy,
};
use tokio::time::Instant;

/// Channel that replays a fixed script of results, then succeeds.
#[derive(Default)]
struct ScriptedChannel {
    script: Mutex<VecDeque<Result<(), DeliveryError>>>,
    calls: Mutex<Vec<(ChannelId, String)>>,
}

impl ScriptedChannel {
    fn new(script: Vec<Result<(), DeliveryError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<(ChannelId, String)> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl Channel for ScriptedChannel {
    async fn deliver(&self, channel: ChannelId, text: &str) -> Result<(), DeliveryError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push((channel, text.to_owned()));
        self.script
            .lock()
            .expect("script lock")
            .pop_front()
            .unwrap_or(Ok(()))
    }
}

fn rate_limited(secs: u64) -> Result<(), DeliveryError> {
    Err(DeliveryError::RateLimited {
        retry_after: Duration::from_secs(secs),
    })
}

fn policy(padding_secs: u64, max_attempts: Option<u32>) -> RetryPolicy {
    RetryPolicy {
        padding: Duration::from_secs(padding_secs),
        max_attempts,
    }
}

#[tokio::test(start_paused = true)]
async fn rate_limit_waits_at_least_the_hint_then_succeeds() {
    let channel = ScriptedChannel::new(vec![rate_limited(2), Ok(())]);
    let dispatcher = ReliableDispatcher::new(channel.clone(), policy(1, Some(5)));

    let started = Instant::now();
    let result = dispatcher.send(-100, "hello").await;

    assert_eq!(result, Ok(()));
    assert!(started.elapsed() >= Duration::from_secs(2));
    assert!(started.elapsed() >= Duration::from_secs(3), "hint plus padding");
    assert_eq!(
        channel.calls(),
        vec![(-100, "hello".to_owned()), (-100, "hello".to_owned())]
    );
}

#[tokio::test(start_paused = true)]
async fn zero_padding_still_waits_the_full_hint() {
    let channel = ScriptedChannel::new(vec![rate_limited(2), Ok(())]);
    let dispatcher = ReliableDispatcher::new(channel.clone(), policy(0, None));

    let started = Instant::now();
    assert_eq!(dispatcher.send(-100, "hi").await, Ok(()));
    assert!(started.elapsed() >= Duration::from_secs(2));
    assert_eq!(channel.calls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn other_failures_are_not_retried() {
    let channel = ScriptedChannel::new(vec![Err(DeliveryError::Failed(
        "chat not found".to_owned(),
    ))]);
    let dispatcher = ReliableDispatcher::new(channel.clone(), policy(1, None));

    let result = dispatcher.send(-7, "x").await;

    assert_eq!(
        result,
        Err(DispatchError::Delivery {
            channel: -7,
            reason: "chat not found".to_owned(),
        })
    );
    assert_eq!(channel.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn attempt_cap_turns_persistent_rate_limits_terminal() {
    let channel = ScriptedChannel::new(vec![
        rate_limited(1),
        rate_limited(1),
        rate_limited(1),
        Ok(()),
    ]);
    let dispatcher = ReliableDispatcher::new(channel.clone(), policy(0, Some(3)));

    let result = dispatcher.send(-1, "x").await;

    assert_eq!(
        result,
        Err(DispatchError::RetriesExhausted {
            channel: -1,
            attempts: 3,
        })
    );
    assert_eq!(channel.calls().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn unbounded_policy_keeps_retrying() {
    let script = std::iter::repeat_with(|| rate_limited(1)).take(20).collect();
    let channel = ScriptedChannel::new(script);
    let dispatcher = ReliableDispatcher::new(channel.clone(), policy(0, None));

    assert_eq!(dispatcher.send(-1, "x").await, Ok(()));
    assert_eq!(channel.calls().len(), 21);
}
