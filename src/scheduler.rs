use crate::errors::SiteError;
use std::{future::Future, ops::ControlFlow, time::Duration};
use tokio::{
    runtime::Handle,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};

#[derive(Debug, Clone)]
pub struct Scheduler {
    handle: Handle,
}

#[derive(Debug)]
pub struct TimerHandle {
    task: JoinHandle<()>,
}

impl TimerHandle {
    pub fn cancel(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Scheduler {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    pub fn current() -> Result<Self, SiteError> {
        Handle::try_current()
            .map(Self::new)
            .map_err(SiteError::internal)
    }

    pub fn spawn<F>(&self, future: F) -> TimerHandle
    where
        F: Future<Output = ()> + Send + 'static,
    {
        TimerHandle {
            task: self.handle.spawn(future),
        }
    }

    pub fn set_timeout<F>(&self, delay: Duration, callback: F) -> TimerHandle
    where
        F: FnOnce() + Send + 'static,
    {
        self.spawn(async move {
            time::sleep(delay).await;
            callback();
        })
    }

    /// Runs `tick` every `period`, first after one full period, until it breaks.
    pub fn set_interval<F>(&self, period: Duration, mut tick: F) -> TimerHandle
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        self.spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tick().is_break() {
                    break;
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    #[tokio::test(start_paused = true)]
    async fn timeout_fires_once_after_delay() {
        let scheduler = Scheduler::current().expect("runtime");
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        scheduler.set_timeout(Duration::from_millis(100), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        time::sleep(Duration::from_millis(99)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        time::sleep(Duration::from_millis(2)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_timeout_never_fires() {
        let scheduler = Scheduler::current().expect("runtime");
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let timer = scheduler.set_timeout(Duration::from_millis(10), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        timer.cancel();

        time::sleep(Duration::from_millis(50)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn interval_stops_when_tick_breaks() {
        let scheduler = Scheduler::current().expect("runtime");
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let timer = scheduler.set_interval(Duration::from_millis(16), move || {
            if counter.fetch_add(1, Ordering::SeqCst) + 1 == 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });

        time::sleep(Duration::from_millis(40)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        time::sleep(Duration::from_millis(200)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 3);
        assert!(timer.is_finished());
    }
}
