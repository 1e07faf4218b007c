// Waiting for a provisioning request to finish: re-read the instance
// resource at a fixed interval until its status reaches the terminal value,
// giving up after a maximum wait.

use crate::api::{MediaType, Transport};
use crate::error::{DemoError, Result};
use crate::models::{decode, InstanceStatus};
use crate::ui::log_result;
use std::ops::ControlFlow;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Delay between two status reads.
    pub interval: Duration,
    /// Upper bound on the total time spent waiting between reads.
    pub max_wait: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        PollSettings {
            interval: Duration::from_secs(60),
            max_wait: Duration::from_secs(2 * 60 * 60),
        }
    }
}

/// Blocks between two status reads. Returning `ControlFlow::Break`
/// cancels the wait.
pub trait Sleeper {
    fn sleep(&mut self, interval: Duration) -> ControlFlow<()>;
}

impl<F> Sleeper for F
where
    F: FnMut(Duration) -> ControlFlow<()>,
{
    fn sleep(&mut self, interval: Duration) -> ControlFlow<()> {
        self(interval)
    }
}

/// Final state of a request together with how many intervals were waited.
#[derive(Debug, Clone)]
pub struct Finished {
    pub instance: InstanceStatus,
    pub waits: u32,
}

/// Poll `uri` until its `status` equals `terminal`.
///
/// Only GETs are issued. The time budget counts the intervals slept, so a
/// request that needs more than `max_wait / interval` waits fails with
/// [`DemoError::Timeout`]. A zero interval is refused before any request.
pub fn wait_for_status<T, S>(
    api: &T,
    uri: &str,
    terminal: &str,
    settings: PollSettings,
    sleeper: &mut S,
) -> Result<Finished>
where
    T: Transport + ?Sized,
    S: Sleeper + ?Sized,
{
    if settings.interval.is_zero() {
        return Err(DemoError::InvalidSetting {
            key: "DBAAS_POLL_INTERVAL_SECS",
            value: "0".into(),
        });
    }
    let mut instance = read_status(api, uri)?;
    let mut waits = 0u32;
    let mut waited = Duration::ZERO;

    while instance.status != terminal {
        if waited + settings.interval > settings.max_wait {
            return Err(DemoError::Timeout {
                uri: uri.to_string(),
                last_status: instance.status,
                waited,
            });
        }
        info!("Waiting for {} sec ...", settings.interval.as_secs());
        if sleeper.sleep(settings.interval).is_break() {
            return Err(DemoError::Cancelled { uri: uri.to_string() });
        }
        waited += settings.interval;
        waits += 1;
        instance = read_status(api, uri)?;
    }
    Ok(Finished { instance, waits })
}

fn read_status<T: Transport + ?Sized>(api: &T, uri: &str) -> Result<InstanceStatus> {
    let res = api.get(uri, Some(MediaType::DbPlatformInstance))?;
    log_result(
        &format!("GET on DB Request succeeded. Time taken: {} sec", res.elapsed_secs),
        &res.body,
    );
    decode("DB instance", &res.body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiResponse, HttpVerb};
    use serde_json::{json, Value};
    use std::cell::RefCell;
    use std::collections::VecDeque;

    struct Statuses {
        queue: RefCell<VecDeque<&'static str>>,
        calls: RefCell<Vec<HttpVerb>>,
    }

    impl Statuses {
        fn new(list: &[&'static str]) -> Self {
            Statuses {
                queue: RefCell::new(list.iter().copied().collect()),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl Transport for Statuses {
        fn http_method(
            &self,
            _uri: &str,
            _accept: Option<MediaType>,
            method: HttpVerb,
            _content_type: Option<MediaType>,
            _payload: Option<&Value>,
        ) -> Result<ApiResponse> {
            self.calls.borrow_mut().push(method);
            let status = self.queue.borrow_mut().pop_front().unwrap_or("PENDING");
            Ok(ApiResponse {
                body: json!({"status": status, "uri": "/em/cloud/dbaas/dbplatforminstance/byrequest/7"}),
                elapsed_secs: 0,
            })
        }
    }

    fn settings(max_waits: u32) -> PollSettings {
        PollSettings {
            interval: Duration::from_secs(60),
            max_wait: Duration::from_secs(60 * max_waits as u64),
        }
    }

    #[test]
    fn two_waits_before_running() {
        let api = Statuses::new(&["PENDING", "PENDING", "RUNNING"]);
        let mut slept = Vec::new();
        let mut sleeper = |d: Duration| -> ControlFlow<()> {
            slept.push(d);
            ControlFlow::Continue(())
        };
        let done = wait_for_status(&api, "/req/7", "RUNNING", settings(10), &mut sleeper).unwrap();
        assert_eq!(done.waits, 2);
        assert_eq!(done.instance.status, "RUNNING");
        assert_eq!(slept, vec![Duration::from_secs(60); 2]);
        assert_eq!(*api.calls.borrow(), vec![HttpVerb::Get; 3]);
    }

    #[test]
    fn already_terminal_needs_no_wait() {
        let api = Statuses::new(&["RUNNING"]);
        let mut sleeper = |_: Duration| -> ControlFlow<()> { panic!("should not sleep") };
        let done = wait_for_status(&api, "/req/7", "RUNNING", settings(1), &mut sleeper).unwrap();
        assert_eq!(done.waits, 0);
    }

    #[test]
    fn status_match_is_exact() {
        let api = Statuses::new(&["running", "RUNNING"]);
        let mut sleeper = |_: Duration| -> ControlFlow<()> { ControlFlow::Continue(()) };
        let done = wait_for_status(&api, "/req/7", "RUNNING", settings(5), &mut sleeper).unwrap();
        assert_eq!(done.waits, 1);
    }

    #[test]
    fn gives_up_after_max_wait() {
        let api = Statuses::new(&[]);
        let mut sleeper = |_: Duration| -> ControlFlow<()> { ControlFlow::Continue(()) };
        let err = wait_for_status(&api, "/req/7", "RUNNING", settings(2), &mut sleeper).unwrap_err();
        match err {
            DemoError::Timeout { last_status, waited, .. } => {
                assert_eq!(last_status, "PENDING");
                assert_eq!(waited, Duration::from_secs(120));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(api.calls.borrow().len(), 3);
    }

    #[test]
    fn zero_interval_is_refused() {
        let api = Statuses::new(&[]);
        let mut sleeps = 0u32;
        let mut sleeper = |_: Duration| -> ControlFlow<()> {
            sleeps += 1;
            if sleeps > 5 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        };
        let settings = PollSettings {
            interval: Duration::ZERO,
            max_wait: Duration::from_secs(60),
        };
        let err = wait_for_status(&api, "/req/7", "RUNNING", settings, &mut sleeper).unwrap_err();
        assert!(matches!(
            err,
            DemoError::InvalidSetting { key: "DBAAS_POLL_INTERVAL_SECS", .. }
        ));
        assert_eq!(sleeps, 0);
        assert!(api.calls.borrow().is_empty());
    }

    #[test]
    fn sleeper_can_cancel() {
        let api = Statuses::new(&["PENDING", "RUNNING"]);
        let mut sleeper = |_: Duration| -> ControlFlow<()> { ControlFlow::Break(()) };
        let err = wait_for_status(&api, "/req/7", "RUNNING", settings(5), &mut sleeper).unwrap_err();
        assert!(matches!(err, DemoError::Cancelled { .. }));
        assert_eq!(api.calls.borrow().len(), 1);
    }
}
