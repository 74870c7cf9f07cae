use std::time::Duration;

/// How long a reader is willing to wait for data before a frame read starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Wait {
    /// Skip the readiness wait and block directly on the read.
    #[default]
    Immediate,
    /// Wait at most this long for the stream to become readable.
    Bounded(Duration),
    /// Wait for readability with no upper bound.
    Forever,
}

impl Wait {
    /// Convert the signed-seconds convention: `0` is immediate, positive
    /// values are a bound in seconds, negative values wait forever.
    pub fn from_secs(secs: i64) -> Self {
        match secs {
            0 => Wait::Immediate,
            s if s > 0 => Wait::Bounded(Duration::from_secs(s.unsigned_abs())),
            _ => Wait::Forever,
        }
    }

    /// The bound to hand to a readiness wait, or `None` for no wait at all.
    ///
    /// `Some(None)` means wait without a bound.
    pub fn readiness_timeout(self) -> Option<Option<Duration>> {
        match self {
            Wait::Immediate => None,
            Wait::Bounded(d) => Some(Some(d)),
            Wait::Forever => Some(None),
        }
    }
}

impl From<Duration> for Wait {
    fn from(d: Duration) -> Self {
        Wait::Bounded(d)
    }
}

/// A stream that can block until it has data to read.
pub trait WaitReadable {
    /// Block until the stream is readable or `timeout` elapses.
    ///
    /// `None` waits without a bound. Returns `Ok(false)` on timeout. A peer
    /// that has closed the connection counts as readable; the following
    /// read observes end-of-stream.
    fn wait_readable(&self, timeout: Option<Duration>) -> std::io::Result<bool>;
}

impl<T: WaitReadable + ?Sized> WaitReadable for &T {
    fn wait_readable(&self, timeout: Option<Duration>) -> std::io::Result<bool> {
        (**self).wait_readable(timeout)
    }
}

impl<T: WaitReadable + ?Sized> WaitReadable for &mut T {
    fn wait_readable(&self, timeout: Option<Duration>) -> std::io::Result<bool> {
        (**self).wait_readable(timeout)
    }
}

impl<T: AsRef<[u8]>> WaitReadable for std::io::Cursor<T> {
    fn wait_readable(&self, _timeout: Option<Duration>) -> std::io::Result<bool> {
        Ok(true)
    }
}
