use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Remaining time below which the clock is shown as a warning.
pub const WARNING_SECS: u32 = 5 * 60;
/// Remaining time at or below which the clock is critical.
pub const CRITICAL_SECS: u32 = 60;

#[derive(Debug, Clone, PartialEq)]
pub enum TimerEvent {
    Tick,
}

/// Owned handle to a background thread that sends one [`TimerEvent::Tick`]
/// per period. Dropping or cancelling the handle stops delivery.
#[derive(Debug)]
pub struct Ticker {
    cancel: Arc<AtomicBool>,
}

impl Ticker {
    pub fn spawn(tx: mpsc::Sender<TimerEvent>, period: Duration) -> Self {
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = cancel.clone();

        thread::spawn(move || loop {
            thread::sleep(period);
            if flag.load(Ordering::SeqCst) {
                break;
            }
            if tx.send(TimerEvent::Tick).is_err() {
                break;
            }
        });

        Self { cancel }
    }

    /// One tick per second.
    pub fn every_second(tx: mpsc::Sender<TimerEvent>) -> Self {
        Self::spawn(tx, Duration::from_secs(1))
    }

    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeLevel {
    Normal,
    Warning,
    Critical,
}

pub fn time_level(remaining_secs: u32) -> TimeLevel {
    if remaining_secs <= CRITICAL_SECS {
        TimeLevel::Critical
    } else if remaining_secs < WARNING_SECS {
        TimeLevel::Warning
    } else {
        TimeLevel::Normal
    }
}

/// `mm:ss`, zero-padded. Minutes are not wrapped into hours.
pub fn format_clock(total_secs: u32) -> String {
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    format!("{:02}:{:02}", minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_formatting() {
        assert_eq!(format_clock(1800), "30:00");
        assert_eq!(format_clock(5), "00:05");
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(61), "01:01");
        assert_eq!(format_clock(6000), "100:00");
    }

    #[test]
    fn levels() {
        assert_eq!(time_level(1800), TimeLevel::Normal);
        assert_eq!(time_level(300), TimeLevel::Normal);
        assert_eq!(time_level(299), TimeLevel::Warning);
        assert_eq!(time_level(60), TimeLevel::Critical);
        assert_eq!(time_level(0), TimeLevel::Critical);
    }

    #[test]
    fn ticker_delivers_and_stops_on_drop() {
        let (tx, rx) = mpsc::channel();
        let ticker = Ticker::spawn(tx, Duration::from_millis(10));

        let first = rx.recv_timeout(Duration::from_secs(2));
        assert_eq!(first, Ok(TimerEvent::Tick));

        drop(ticker);
        // Let the thread observe the flag, then drain anything sent before it did.
        thread::sleep(Duration::from_millis(50));
        while rx.try_recv().is_ok() {}

        thread::sleep(Duration::from_millis(50));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn cancel_marks_handle() {
        let (tx, _rx) = mpsc::channel();
        let ticker = Ticker::spawn(tx, Duration::from_secs(60));
        assert!(!ticker.is_cancelled());
        ticker.cancel();
        assert!(ticker.is_cancelled());
    }
}
