use futures::{stream, StreamExt};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

use super::RecordSource;
use crate::error::{BackupError, TransferError};
use crate::pipeline::Backlog;
use crate::record::Record;

/// Records read from a line-delimited backup stream (stdin in the CLI).
///
/// A line may arrive over any number of reads; it is decoded once the
/// newline (or end of input) is seen. End of input ends the restore.
pub struct LineStream<R> {
    label: String,
    reader: R,
}

impl<R> LineStream<R>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    pub fn new(label: impl Into<String>, reader: R) -> Self {
        Self {
            label: label.into(),
            reader,
        }
    }
}

impl<R> RecordSource for LineStream<R>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    fn label(&self) -> &str {
        &self.label
    }

    fn total(&self) -> Option<usize> {
        None
    }

    fn into_backlog(self) -> Backlog<'static, Record> {
        let lines = BufReader::new(self.reader).lines();

        stream::unfold((lines, 0usize), |(mut lines, mut number)| async move {
            loop {
                number += 1;
                let next = match lines.next_line().await {
                    Ok(Some(line)) if line.trim().is_empty() => continue,
                    Ok(Some(line)) => Record::from_line(&line)
                        .map_err(|source| BackupError::Decode {
                            line: number,
                            source,
                        }),
                    Ok(None) => return None,
                    Err(e) => Err(BackupError::Stream(e)),
                };
                return Some((next.map_err(TransferError::from), (lines, number)));
            }
        })
        .boxed()
    }
}
