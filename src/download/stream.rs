//! Chunked file body
//!
//! Reads the resolved file in fixed-size chunks and yields each chunk
//! as one body frame, so peak memory for a transfer is bounded by one
//! chunk no matter how large the file is. Chunk N is fully read before
//! chunk N+1 is touched, and the transport flushes each frame as it is
//! yielded. Dropping the stream (client disconnect) releases the file
//! handle without reading further.

use axum::body::Bytes;
use futures::Stream;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

/// Fixed transfer chunk size: 1 MiB
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// Per-transfer bookkeeping; lives inside one streaming body
struct TransferState {
    file: File,
    bytes_sent: u64,
}

/// Turn an open file into a stream of 1 MiB body frames.
pub fn chunked_stream(file: File) -> impl Stream<Item = std::io::Result<Bytes>> {
    let state = TransferState {
        file,
        bytes_sent: 0,
    };

    futures::stream::try_unfold(state, |mut state| async move {
        let mut buffer = vec![0u8; CHUNK_SIZE];
        let mut filled = 0;

        // fill the whole chunk before yielding, so a file of size S is
        // sent in exactly ceil(S / CHUNK_SIZE) frames
        loop {
            let n = state.file.read(&mut buffer[filled..]).await?;
            if n == 0 {
                break;
            }
            filled += n;
            if filled == CHUNK_SIZE {
                break;
            }
        }

        if filled == 0 {
            tracing::debug!(bytes_sent = state.bytes_sent, "Transfer complete");
            return Ok(None);
        }

        buffer.truncate(filled);
        state.bytes_sent += filled as u64;
        Ok(Some((Bytes::from(buffer), state)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    async fn open_with_bytes(len: usize) -> (tempfile::TempDir, File) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.bin");
        let data: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
        std::fs::write(&path, &data).unwrap();
        let file = File::open(&path).await.unwrap();
        (dir, file)
    }

    async fn collect_chunks(file: File) -> Vec<Bytes> {
        let stream = chunked_stream(file);
        futures::pin_mut!(stream);
        let mut chunks = Vec::new();
        while let Some(chunk) = stream.next().await {
            chunks.push(chunk.unwrap());
        }
        chunks
    }

    #[tokio::test]
    async fn two_and_a_half_mib_streams_in_three_chunks() {
        let (_dir, file) = open_with_bytes(CHUNK_SIZE * 5 / 2).await;
        let chunks = collect_chunks(file).await;

        let sizes: Vec<usize> = chunks.iter().map(|c| c.len()).collect();
        assert_eq!(sizes, vec![CHUNK_SIZE, CHUNK_SIZE, CHUNK_SIZE / 2]);
    }

    #[tokio::test]
    async fn exact_multiple_has_no_trailing_empty_chunk() {
        let (_dir, file) = open_with_bytes(CHUNK_SIZE * 2).await;
        let chunks = collect_chunks(file).await;
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.len() == CHUNK_SIZE));
    }

    #[tokio::test]
    async fn empty_file_yields_no_chunks() {
        let (_dir, file) = open_with_bytes(0).await;
        assert!(collect_chunks(file).await.is_empty());
    }

    #[tokio::test]
    async fn chunks_reassemble_to_the_original_bytes() {
        let len = CHUNK_SIZE + 12345;
        let (_dir, file) = open_with_bytes(len).await;
        let chunks = collect_chunks(file).await;

        let body: Vec<u8> = chunks.iter().flat_map(|c| c.iter().copied()).collect();
        let expected: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
        assert_eq!(body, expected);
    }
}
