//! Line-oriented chat client
//!
//! Sends one message per input line and prints the transcript as it grows.
//! Input stays buffered while a response is outstanding, so nothing typed
//! ahead is refused by the session.

use crate::runtime::{SessionClosed, SessionHandle, SessionSnapshot, SessionUpdate};
use std::io::Write;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Closed(#[from] SessionClosed),
}

/// Prints only what is new in each snapshot
#[derive(Debug, Default)]
pub struct Renderer {
    printed: usize,
    header_shown: bool,
}

impl Renderer {
    /// Write the mode label and header once, then any entries not yet
    /// printed, then a loading marker while a response is outstanding.
    ///
    /// # Errors
    ///
    /// Returns any error from writing to `out`.
    pub fn render(
        &mut self,
        snapshot: &SessionSnapshot,
        out: &mut impl Write,
    ) -> std::io::Result<()> {
        if !self.header_shown {
            writeln!(out, "Mode: {}", snapshot.label)?;
            if let Some(header) = &snapshot.header {
                writeln!(out, "{header}")?;
            }
            self.header_shown = true;
        }
        for entry in snapshot.transcript.iter().skip(self.printed) {
            writeln!(out, "{entry}")?;
        }
        self.printed = snapshot.transcript.len();
        if snapshot.awaiting_response {
            writeln!(out, "Loading...")?;
        }
        out.flush()
    }
}

/// Drive a session from `input` until the input is exhausted and the last
/// response has landed, or the session stops.
///
/// # Errors
///
/// Fails if reading `input` or writing `out` fails, or if the session stops
/// accepting messages.
pub async fn run<R, W>(
    handle: &mut SessionHandle,
    input: R,
    out: &mut W,
) -> Result<(), ClientError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut renderer = Renderer::default();
    // Busy until a snapshot says otherwise
    let mut awaiting = true;

    loop {
        tokio::select! {
            update = handle.next_update() => match update {
                Some(SessionUpdate::Snapshot(snapshot)) => {
                    renderer.render(&snapshot, out)?;
                    awaiting = snapshot.awaiting_response;
                }
                Some(SessionUpdate::Rejected { reason }) => {
                    tracing::warn!(session_id = %handle.session_id(), %reason, "Message rejected");
                }
                None => break,
            },
            line = lines.next_line(), if !awaiting => match line? {
                // The session would ignore these, so no snapshot would follow
                Some(line) if line.trim().is_empty() => {}
                Some(line) => {
                    handle.submit(line).await?;
                    // Hold input until the snapshot for this dispatch settles
                    awaiting = true;
                }
                None => break,
            },
        }
    }

    Ok(())
}
