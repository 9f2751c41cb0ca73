//! # Relay pumps: verbatim line forwarding between streams.
//!
//! Three small loops move bytes for the lifetime of the process:
//!
//! - [`pump_input`] copies newline-delimited chunks from the external input
//!   into the child-stdin channel.
//! - [`feed_stdin`] is the single owner of the child's stdin handle; it
//!   drains the channel so the input pump and the idle scheduler can both
//!   write without sharing the handle.
//! - [`pump_output`] copies a child output stream to the external output and
//!   hands each decoded line to a watcher callback (the dispatch tap for
//!   stdout, a no-op for stderr).
//!
//! Forwarding preserves byte content exactly; decoding is lossy UTF-8 and is
//! used only to evaluate patterns. A final line with no terminator is still
//! flushed before the pump exits.

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use crate::error::RelayError;

/// Reads newline-delimited chunks from `reader` and sends each verbatim into
/// the stdin channel. Ends at EOF or when the channel closes (the child's
/// stdin is gone and rejects further writes).
pub(crate) async fn pump_input<R>(
    reader: R,
    tx: mpsc::Sender<Vec<u8>>,
) -> Result<(), RelayError>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let n = reader
            .read_until(b'\n', &mut buf)
            .await
            .map_err(|source| RelayError::Read { source })?;
        if n == 0 {
            return Ok(());
        }
        if tx.send(buf.clone()).await.is_err() {
            return Ok(());
        }
    }
}

/// Owns the child's stdin: writes every chunk received on the channel, in
/// order, flushing each. Ends when all senders are dropped, which closes the
/// child's stdin.
pub(crate) async fn feed_stdin<W>(
    mut writer: W,
    mut rx: mpsc::Receiver<Vec<u8>>,
) -> Result<(), RelayError>
where
    W: AsyncWrite + Unpin,
{
    while let Some(chunk) = rx.recv().await {
        writer
            .write_all(&chunk)
            .await
            .map_err(|source| RelayError::Write { source })?;
        writer
            .flush()
            .await
            .map_err(|source| RelayError::Write { source })?;
    }
    Ok(())
}

/// Copies `reader` to `writer` line by line, forwarding bytes verbatim, and
/// calls `watch` with each decoded, newline-trimmed line after forwarding it.
///
/// `watch` must not block; the stdout pump passes the dispatch tap here,
/// which only classifies the line and spawns the reaction.
pub(crate) async fn pump_output<R, W, F>(
    reader: R,
    mut writer: W,
    mut watch: F,
) -> Result<(), RelayError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
    F: FnMut(&str),
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let n = reader
            .read_until(b'\n', &mut buf)
            .await
            .map_err(|source| RelayError::Read { source })?;
        if n == 0 {
            return Ok(());
        }
        writer
            .write_all(&buf)
            .await
            .map_err(|source| RelayError::Write { source })?;
        writer
            .flush()
            .await
            .map_err(|source| RelayError::Write { source })?;
        let text = String::from_utf8_lossy(&buf);
        watch(text.trim_end_matches(['\n', '\r']));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_output_round_trip_is_verbatim() {
        let input: &[u8] = b"one\ntwo\r\n\nbytes \xff here\nno terminator";
        let mut forwarded = Vec::new();
        let mut seen = Vec::new();

        pump_output(input, &mut forwarded, |line| seen.push(line.to_string()))
            .await
            .expect("pump runs to EOF");

        assert_eq!(forwarded, input, "forwarded bytes must be untouched");
        assert_eq!(
            seen,
            vec![
                "one".to_string(),
                "two".to_string(),
                "".to_string(),
                "bytes \u{fffd} here".to_string(),
                "no terminator".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_output_forwarding_independent_of_watcher() {
        let input: &[u8] = b"a\nb\nc\n";
        let mut forwarded = Vec::new();
        // A watcher that "matches" everything changes nothing downstream.
        pump_output(input, &mut forwarded, |_| {})
            .await
            .expect("pump runs to EOF");
        assert_eq!(forwarded, input);
    }

    #[tokio::test]
    async fn test_input_pump_feeds_stdin_in_order() {
        let (tx, rx) = mpsc::channel(8);
        let (stdin_writer, mut stdin_reader) = tokio::io::duplex(1024);

        let source: &[u8] = b"first\nsecond\ntail-no-newline";
        let pump = tokio::spawn(async move { pump_input(source, tx).await });
        let feed = tokio::spawn(async move { feed_stdin(stdin_writer, rx).await });

        pump.await.expect("join").expect("input pump");
        feed.await.expect("join").expect("stdin writer");

        let mut received = Vec::new();
        stdin_reader
            .read_to_end(&mut received)
            .await
            .expect("read child stdin");
        assert_eq!(received, source);
    }

    #[tokio::test]
    async fn test_input_pump_stops_when_stdin_closes() {
        let (tx, rx) = mpsc::channel::<Vec<u8>>(1);
        drop(rx);
        // Receiver already gone: the pump must end cleanly, not error.
        let source: &[u8] = b"line\n";
        pump_input(source, tx).await.expect("clean end");
    }
}
