#[cfg(unix)]
use std::sync::Once;

#[cfg(unix)]
static IGNORE_SIGPIPE: Once = Once::new();

/// Ignore `SIGPIPE` for the whole process.
///
/// Writing to a socket whose peer has gone away then fails with
/// `BrokenPipe` instead of terminating the process. Runs at most once; a
/// no-op on platforms without the signal.
pub fn ignore_sigpipe() {
    #[cfg(unix)]
    IGNORE_SIGPIPE.call_once(|| {
        // SAFETY: SIG_IGN installs no handler code; this only changes the
        // process-wide disposition of SIGPIPE.
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_IGN);
        }
        tracing::debug!("SIGPIPE disposition set to ignore");
    });
}
