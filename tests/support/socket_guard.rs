//! Skip switch for tests that need a localhost mock server.
//!
//! Sandboxed CI runners sometimes forbid binding sockets. Those tests then
//! skip with a note on stderr, unless `WORDCOUNTER_REQUIRE_SOCKET_TESTS` is
//! set to `1`, `true` or `yes`, in which case they fail loudly.

use std::net::TcpListener;
use std::panic::Location;

use wiremock::MockServer;

const REQUIRE_ENV: &str = "WORDCOUNTER_REQUIRE_SOCKET_TESTS";

/// Whether socket-bound tests must run rather than skip.
#[must_use]
pub fn socket_tests_required() -> bool {
    std::env::var(REQUIRE_ENV).is_ok_and(|value| {
        let value = value.trim().to_ascii_lowercase();
        value == "1" || value == "true" || value == "yes"
    })
}

/// Returns `true` when localhost cannot be bound and the caller should return early.
///
/// Panics instead when socket tests are required.
#[track_caller]
#[must_use]
pub fn localhost_unavailable() -> bool {
    let Err(err) = TcpListener::bind("127.0.0.1:0") else {
        return false;
    };

    let caller = Location::caller();
    let note = format!(
        "{}:{}: mock server needs a localhost socket ({err})",
        caller.file(),
        caller.line()
    );
    assert!(
        !socket_tests_required(),
        "{note}; unset {REQUIRE_ENV} to skip instead"
    );
    eprintln!("{note}; skipping (set {REQUIRE_ENV}=1 to fail instead)");
    true
}

/// Starts a wiremock server, or `None` when the test should skip.
pub async fn start_mock_server_or_skip() -> Option<MockServer> {
    if localhost_unavailable() {
        return None;
    }
    Some(MockServer::start().await)
}
