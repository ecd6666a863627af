// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Terminal progress reporting for long running chores.
///
/// A [`ProgressReporter`] shows a spinner while a chore runs and prints the
/// number of completed mutations exactly once when the chore ends, whether
/// it ends normally, with an error, on a termination signal or on a panic.
use std::{
    io::{self, IsTerminal, Write},
    panic,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use crossterm::{cursor, execute};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tracing::{debug, warn};

use crate::batch::ProgressCounter;

/// Exit status used after a termination signal.
pub const SIGNAL_EXIT_CODE: i32 = 130;

struct ReporterState
{
    spinner:       ProgressBar,
    counter:       ProgressCounter,
    summary:       String,
    resume_offset: AtomicUsize,
    cursor_hidden: bool,
    finished:      AtomicBool,
}

/// Spinner plus final summary line; cheap to clone.
#[derive(Clone,)]
pub struct ProgressReporter
{
    state: Arc<ReporterState,>,
}

impl ProgressReporter
{
    /// Hides the cursor and starts the spinner with `message`.
    ///
    /// Nothing is drawn when stderr is not a terminal.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use calcite_chores::{ProgressCounter, ProgressReporter};
    ///
    /// let counter = ProgressCounter::new();
    /// let reporter = ProgressReporter::start("Creating issues...", counter.clone(), "issues created",);
    /// counter.increment();
    /// reporter.finish();
    /// ```
    pub fn start(
        message: impl Into<String,>,
        counter: ProgressCounter,
        summary: impl Into<String,>,
    ) -> Self
    {
        let interactive = io::stderr().is_terminal();
        let spinner = ProgressBar::new_spinner();
        if interactive {
            spinner.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.yellow} [{elapsed_precise}] {msg}",)
                    .unwrap_or_else(|_| ProgressStyle::default_spinner(),),
            );
            spinner.enable_steady_tick(Duration::from_millis(100,),);
        } else {
            spinner.set_draw_target(ProgressDrawTarget::hidden(),);
        }
        spinner.set_message(message.into(),);

        let cursor_hidden = interactive && execute!(io::stderr(), cursor::Hide).is_ok();

        Self {
            state: Arc::new(ReporterState {
                spinner,
                counter,
                summary: summary.into(),
                resume_offset: AtomicUsize::new(0,),
                cursor_hidden,
                finished: AtomicBool::new(false,),
            },),
        }
    }

    /// Offset the run started from; reported with the next offset.
    pub fn set_resume_offset(&self, offset: usize,)
    {
        self.state.resume_offset.store(offset, Ordering::SeqCst,);
    }

    pub fn count(&self,) -> usize
    {
        self.state.counter.get()
    }

    /// Lines printed by [`ProgressReporter::finish`].
    pub fn summary_lines(&self,) -> Vec<String,>
    {
        let count = self.count();
        let mut lines = vec![format!("{}: {}", self.state.summary, count)];

        let offset = self.state.resume_offset.load(Ordering::SeqCst,);
        if offset > 0 {
            lines.push(format!("next resume offset: {}", offset + count),);
        }
        lines
    }

    /// Clears the spinner, restores the cursor and prints the summary.
    ///
    /// Only the first call prints; returns whether this call did.
    pub fn finish(&self,) -> bool
    {
        self.finish_to(&mut io::stdout(),)
    }

    /// [`ProgressReporter::finish`] for a chore that ended with an error;
    /// the summary goes to stderr next to the diagnostic.
    pub fn fail(&self,) -> bool
    {
        self.finish_to(&mut io::stderr(),)
    }

    /// [`ProgressReporter::finish`] writing the summary to `out`.
    pub fn finish_to<W: Write,>(&self, out: &mut W,) -> bool
    {
        if self.state.cursor_hidden {
            let _ = execute!(io::stderr(), cursor::Show);
        }

        if self.state.finished.swap(true, Ordering::SeqCst,) {
            return false;
        }

        self.state.spinner.finish_and_clear();
        for line in self.summary_lines() {
            if let Err(error,) = writeln!(out, "{line}") {
                warn!("Failed to print progress summary: {}", error);
            }
        }
        let _ = out.flush();
        true
    }

    pub fn is_finished(&self,) -> bool
    {
        self.state.finished.load(Ordering::SeqCst,)
    }
}

static HOOK_INSTALLED: AtomicBool = AtomicBool::new(false,);

/// Prints the summary on SIGINT, SIGTERM, SIGUSR1, SIGUSR2 or a panic.
///
/// On a signal the process exits with [`SIGNAL_EXIT_CODE`]. Installs at most
/// once per process; later calls return `false`. Must be called from within
/// a tokio runtime.
pub fn install_termination_hook(reporter: &ProgressReporter,) -> bool
{
    if !claim_once(&HOOK_INSTALLED,) {
        debug!("Termination hook already installed");
        return false;
    }

    let on_panic = reporter.clone();
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        on_panic.fail();
        previous(info,);
    },),);

    let on_signal = reporter.clone();
    tokio::spawn(async move {
        match wait_for_termination().await {
            Ok((),) => {
                on_signal.finish();
                std::process::exit(SIGNAL_EXIT_CODE,);
            }
            Err(error,) => warn!("Failed to listen for termination signals: {}", error),
        }
    },);

    true
}

/// Sets `flag`; true only for the caller that flipped it.
fn claim_once(flag: &AtomicBool,) -> bool
{
    !flag.swap(true, Ordering::SeqCst,)
}

#[cfg(unix)]
async fn wait_for_termination() -> io::Result<(),>
{
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate(),)?;
    let mut user1 = signal(SignalKind::user_defined1(),)?;
    let mut user2 = signal(SignalKind::user_defined2(),)?;

    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = terminate.recv() => Ok(()),
        _ = user1.recv() => Ok(()),
        _ = user2.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn wait_for_termination() -> io::Result<(),>
{
    tokio::signal::ctrl_c().await
}
