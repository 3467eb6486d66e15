//! Merged script generation.
//!
//! For every pending change the merger writes, in order:
//!
//! ```text
//! -- <filename>
//! <script body, minus its final character>
//!
//!
//! INSERT INTO <table> (ID, APPLIED_AT, DESCRIPTION) VALUES (<id>, '<timestamp>', '<description>')<delimiter>
//!
//! ```
//!
//! The output is meant for review or for a batch runner that splits on the
//! configured delimiter.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::change::{Change, ChangeId};
use crate::config::MergeConfig;
use crate::error::{MigrateResult, MigrationError};
use crate::loader::MigrationLoader;
use crate::timestamp::applied_timestamp;

/// Size of the blocks script bodies are copied in.
pub const BLOCK_SIZE: usize = 1024;

/// What a merge wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Ids of the merged changes, in output order.
    pub merged: Vec<ChangeId>,
    /// Script body bytes written, excluding comments and generated statements.
    pub body_bytes: u64,
}

impl MergeSummary {
    /// Number of merged changes.
    pub fn count(&self) -> usize {
        self.merged.len()
    }

    /// Whether nothing was pending.
    pub fn is_empty(&self) -> bool {
        self.merged.is_empty()
    }
}

/// Write every pending change and its changelog insert to `sink`.
///
/// Any failure aborts the merge and is returned wrapped as
/// [`MigrationError::Command`]. Output already written stays in the sink.
pub async fn merge<L, W>(
    pending: &[Change],
    loader: &L,
    config: &MergeConfig,
    sink: &mut W,
) -> MigrateResult<MergeSummary>
where
    L: MigrationLoader + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    merge_changes(pending, loader, config, sink)
        .await
        .map_err(MigrationError::command)
}

async fn merge_changes<L, W>(
    pending: &[Change],
    loader: &L,
    config: &MergeConfig,
    sink: &mut W,
) -> MigrateResult<MergeSummary>
where
    L: MigrationLoader + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let delimiter = config.resolved_delimiter();
    let mut summary = MergeSummary::default();

    for change in pending {
        debug!(id = %change.id, filename = %change.filename, "Merging change");

        sink.write_all(format!("-- {}\n", change.filename).as_bytes())
            .await?;

        // The reader is dropped at the end of this block, before the next script is opened.
        {
            let mut reader = loader.script_reader(change, false).await?;
            summary.body_bytes += copy_script_body(&mut reader, sink).await?;
        }

        sink.write_all(b"\n\n").await?;

        let insert = version_insert(change, &config.changelog_table, &applied_timestamp(), &delimiter);
        sink.write_all(insert.as_bytes()).await?;
        sink.write_all(b"\n\n").await?;

        summary.merged.push(change.id.clone());
    }

    sink.flush().await?;
    Ok(summary)
}

/// The changelog insert recording `change` as applied at `timestamp`.
///
/// Single quotes in the description are replaced with spaces rather than
/// escaped.
pub fn version_insert(change: &Change, table: &str, timestamp: &str, delimiter: &str) -> String {
    format!(
        "INSERT INTO {} (ID, APPLIED_AT, DESCRIPTION) VALUES ({}, '{}', '{}'){}",
        table,
        change.id,
        timestamp,
        change.description.replace('\'', " "),
        delimiter
    )
}

/// Copy a script body from `reader` to `sink` in blocks of [`BLOCK_SIZE`]
/// characters.
///
/// The body is decoded as UTF-8; invalid sequences become U+FFFD. Full blocks
/// are written verbatim. The final, partially filled block goes through
/// [`trim_final_block`] first. When the character count is an exact multiple
/// of the block size the final block is empty and nothing is trimmed.
///
/// Returns the number of bytes written.
pub async fn copy_script_body<R, W>(reader: &mut R, sink: &mut W) -> MigrateResult<u64>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut chars = CharBlocks::new(reader);
    let mut block = String::with_capacity(BLOCK_SIZE);
    let mut written = 0u64;

    loop {
        let filled = chars.read_block(&mut block).await?;
        if filled == BLOCK_SIZE {
            sink.write_all(block.as_bytes()).await?;
            written += block.len() as u64;
            continue;
        }

        let tail = trim_final_block(&block);
        sink.write_all(tail.as_bytes()).await?;
        written += tail.len() as u64;
        return Ok(written);
    }
}

/// Trim policy for the last, partial block of a script body: drop its final
/// character, whatever it is.
///
/// Scripts normally end in a newline, which the merger re-adds. A script that
/// does not loses its last real character.
pub fn trim_final_block(block: &str) -> &str {
    let mut chars = block.chars();
    chars.next_back();
    chars.as_str()
}

/// Splits a byte stream into blocks of decoded characters.
///
/// Bytes of a character cut off by a read are carried over to the next read.
struct CharBlocks<'a, R: ?Sized> {
    reader: &'a mut R,
    undecoded: Vec<u8>,
    decoded: String,
    pos: usize,
    eof: bool,
}

impl<'a, R> CharBlocks<'a, R>
where
    R: AsyncRead + Unpin + ?Sized,
{
    fn new(reader: &'a mut R) -> Self {
        Self {
            reader,
            undecoded: Vec::new(),
            decoded: String::new(),
            pos: 0,
            eof: false,
        }
    }

    /// Fill `block` with up to [`BLOCK_SIZE`] characters; short reads do not
    /// end a block early. Returns the number of characters in the block.
    async fn read_block(&mut self, block: &mut String) -> std::io::Result<usize> {
        block.clear();
        let mut count = 0;

        while count < BLOCK_SIZE {
            if self.pos == self.decoded.len() && !self.fill().await? {
                break;
            }

            let mut taken = 0;
            for c in self.decoded[self.pos..].chars().take(BLOCK_SIZE - count) {
                block.push(c);
                taken += c.len_utf8();
                count += 1;
            }
            self.pos += taken;
        }

        Ok(count)
    }

    /// Decode more input. Returns `false` once the stream is exhausted.
    async fn fill(&mut self) -> std::io::Result<bool> {
        self.decoded.clear();
        self.pos = 0;
        let mut buf = [0u8; BLOCK_SIZE];

        while self.decoded.is_empty() {
            if self.eof {
                if self.undecoded.is_empty() {
                    return Ok(false);
                }
                // Truncated sequence at the end of the stream
                self.undecoded.clear();
                self.decoded.push(char::REPLACEMENT_CHARACTER);
                break;
            }

            let n = self.reader.read(&mut buf).await?;
            if n == 0 {
                self.eof = true;
                continue;
            }
            self.undecoded.extend_from_slice(&buf[..n]);
            decode_utf8(&mut self.undecoded, &mut self.decoded);
        }

        Ok(true)
    }
}

/// Move every complete character of `bytes` into `out`, leaving an incomplete
/// trailing sequence in `bytes`.
fn decode_utf8(bytes: &mut Vec<u8>, out: &mut String) {
    let mut start = 0;
    while start < bytes.len() {
        match std::str::from_utf8(&bytes[start..]) {
            Ok(text) => {
                out.push_str(text);
                start = bytes.len();
            }
            Err(e) => {
                let valid = start + e.valid_up_to();
                out.push_str(std::str::from_utf8(&bytes[start..valid]).unwrap_or_default());
                match e.error_len() {
                    Some(len) => {
                        out.push(char::REPLACEMENT_CHARACTER);
                        start = valid + len;
                    }
                    None => {
                        start = valid;
                        break;
                    }
                }
            }
        }
    }
    bytes.drain(..start);
}
