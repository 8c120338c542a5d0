//! Line source
//!
//! Reads the upload stream incrementally through a delimiter codec and feeds
//! raw lines into the line queue. Lines stay bytes here; text decoding is the
//! parser's job, so one badly encoded line is rejected on its own instead of
//! ending the read. A read fault ends production; it is recorded in the
//! [`SourceReport`] and never propagated, so downstream stages only see the
//! queue close.

use futures::StreamExt;
use tokio::io::AsyncRead;
use tokio::sync::mpsc;
use tokio_util::codec::{AnyDelimiterCodec, AnyDelimiterCodecError, FramedRead};
use tokio_util::sync::CancellationToken;

use crate::error::SourceReadFault;

/// One line of the upload without its terminator, undecoded
pub type RawLine = Vec<u8>;

/// Lazy sequence of lines over a byte stream
///
/// `\n` and `\r\n` terminators are stripped. A trailing line without a
/// terminator is still yielded. The reader is owned and dropped with the
/// source.
pub struct LineSource<R> {
    lines: FramedRead<R, AnyDelimiterCodec>,
    max_line_length: usize,
}

impl<R: AsyncRead + Unpin> LineSource<R> {
    pub fn new(reader: R, max_line_length: usize) -> Self {
        let codec = AnyDelimiterCodec::new_with_max_length(b"\n".to_vec(), Vec::new(), max_line_length);
        Self {
            lines: FramedRead::new(reader, codec),
            max_line_length,
        }
    }

    /// Next raw line, `Ok(None)` at end of stream
    pub async fn next_line(&mut self) -> Result<Option<RawLine>, SourceReadFault> {
        match self.lines.next().await {
            Some(Ok(chunk)) => {
                let mut line = chunk.to_vec();
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                Ok(Some(line))
            },
            Some(Err(AnyDelimiterCodecError::MaxChunkLengthExceeded)) => {
                Err(SourceReadFault::LineTooLong { max_length: self.max_line_length })
            },
            Some(Err(AnyDelimiterCodecError::Io(e))) => Err(SourceReadFault::Io(e)),
            None => Ok(None),
        }
    }
}

/// Outcome of the line-producing stage
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SourceReport {
    /// Lines handed to the line queue
    pub lines_read: u64,
    /// Description of the read fault that ended production, if any
    pub fault: Option<String>,
    pub cancelled: bool,
}

/// Drain `source` into the line queue until end of stream, a read fault,
/// cancellation, or the queue's receiver going away
///
/// The sender is dropped on return, which closes the line queue.
pub async fn produce_lines<R>(
    mut source: LineSource<R>,
    lines: mpsc::Sender<RawLine>,
    cancel: CancellationToken,
) -> SourceReport
where
    R: AsyncRead + Unpin,
{
    let mut report = SourceReport::default();

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                report.cancelled = true;
                break;
            }
            next = source.next_line() => next,
        };

        let line = match next {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(fault) => {
                tracing::error!(
                    error = %fault,
                    lines_read = report.lines_read,
                    "Error reading upload stream, stopping line production"
                );
                report.fault = Some(fault.to_string());
                break;
            },
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                report.cancelled = true;
                break;
            }
            sent = lines.send(line) => {
                if sent.is_err() {
                    tracing::error!("Line queue closed before end of stream");
                    break;
                }
                report.lines_read += 1;
            }
        }
    }

    if report.cancelled {
        tracing::warn!(lines_read = report.lines_read, "Ingestion cancelled, line source stopped");
    } else {
        tracing::debug!(lines_read = report.lines_read, "Line source finished");
    }

    report
}
