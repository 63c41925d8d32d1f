//! Termination requests.
//!
//! An [`Interrupt`] is a flag the orchestrator checks before each command and
//! races against each running child. It is set once, by an
//! [`InterruptHandle`] or by the signal listener, and never cleared.

use std::io;

use tokio::sync::watch;
use tracing::warn;

/// Sets the flag of the paired [`Interrupt`].
#[derive(Debug, Clone)]
pub struct InterruptHandle {
  tx: watch::Sender<bool>,
}

impl InterruptHandle {
  pub fn trigger(&self) {
    self.tx.send_replace(true);
  }
}

/// Observes a termination request.
#[derive(Debug, Clone)]
pub struct Interrupt {
  rx: watch::Receiver<bool>,
}

impl Interrupt {
  /// A connected handle and flag.
  pub fn new() -> (InterruptHandle, Interrupt) {
    let (tx, rx) = watch::channel(false);
    (InterruptHandle { tx }, Interrupt { rx })
  }

  /// A flag that is never set.
  pub fn never() -> Interrupt {
    let (_, interrupt) = Self::new();
    interrupt
  }

  /// A flag set on SIGINT or SIGTERM.
  ///
  /// Both handlers are installed before this returns, so from then on a
  /// signal sets the flag instead of ending the process. Must be called
  /// inside a Tokio runtime.
  #[cfg(unix)]
  pub fn listen() -> io::Result<Interrupt> {
    use tokio::signal::unix::{SignalKind, signal};

    let (handle, interrupt) = Self::new();
    let mut ctrl_c = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    tokio::spawn(async move {
      let received = tokio::select! {
        received = ctrl_c.recv() => received,
        received = terminate.recv() => received,
      };
      if received.is_some() {
        warn!("termination requested, stopping build");
        handle.trigger();
      }
    });

    Ok(interrupt)
  }

  /// A flag set on Ctrl-C.
  ///
  /// Must be called inside a Tokio runtime.
  #[cfg(not(unix))]
  pub fn listen() -> io::Result<Interrupt> {
    let (handle, interrupt) = Self::new();

    tokio::spawn(async move {
      if tokio::signal::ctrl_c().await.is_ok() {
        warn!("termination requested, stopping build");
        handle.trigger();
      }
    });

    Ok(interrupt)
  }

  pub fn is_triggered(&self) -> bool {
    *self.rx.borrow()
  }

  /// Yield once so a signal received during synchronous work reaches the
  /// listener, then report the flag.
  pub async fn check(&self) -> bool {
    tokio::task::yield_now().await;
    self.is_triggered()
  }

  /// Resolves once the flag is set. Stays pending forever if it never is.
  pub async fn triggered(&mut self) {
    if self.rx.wait_for(|set| *set).await.is_err() {
      std::future::pending::<()>().await;
    }
  }
}
