use axum::body::{Body, Bytes};
use futures::stream::{self, Stream};
use tokio::fs::File;
use tokio::io::AsyncReadExt;

pub const CHUNK_SIZE: usize = 8192;

/// Read `file` as a stream of chunks of at most `CHUNK_SIZE` bytes.
pub fn chunked(file: File) -> impl Stream<Item = std::io::Result<Bytes>> + Send {
    stream::try_unfold(file, |mut file| async move {
        let mut buf = vec![0u8; CHUNK_SIZE];
        let n = file.read(&mut buf).await?;
        if n == 0 {
            return Ok(None);
        }
        buf.truncate(n);
        Ok::<_, std::io::Error>(Some((Bytes::from(buf), file)))
    })
}

pub fn body(file: File) -> Body {
    Body::from_stream(chunked(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;

    #[tokio::test]
    async fn chunks_reassemble_to_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.pdf");
        let data: Vec<u8> = (0..(CHUNK_SIZE * 2 + 123)).map(|i| (i % 251) as u8).collect();
        std::fs::write(&path, &data).unwrap();

        let chunks: Vec<Bytes> = chunked(File::open(&path).await.unwrap())
            .try_collect()
            .await
            .unwrap();

        assert!(chunks.iter().all(|c| !c.is_empty() && c.len() <= CHUNK_SIZE));
        assert_eq!(chunks.concat(), data);
    }

    #[tokio::test]
    async fn empty_file_yields_no_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.pdf");
        std::fs::write(&path, b"").unwrap();

        let chunks: Vec<Bytes> = chunked(File::open(&path).await.unwrap())
            .try_collect()
            .await
            .unwrap();
        assert!(chunks.is_empty());
    }
}
