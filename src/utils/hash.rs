use md5::{Digest, Md5};
use std::io;
use std::path::Path;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Files are hashed in 2 MiB slices, one slice resident at a time.
pub const CHUNK_SIZE: usize = 2 * 1024 * 1024;

/// Digest of a local file together with the facts gathered while reading it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDigest {
    pub hex: String,
    pub size: u64,
    pub chunks: u64,
}

pub fn calculate_md5(data: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Number of chunk reads needed for a file of `size` bytes.
pub fn chunk_count(size: u64) -> u64 {
    size.div_ceil(CHUNK_SIZE as u64)
}

/// Hashes exactly `expected_len` bytes from `reader`, one chunk at a time.
///
/// A reader that ends early fails with `UnexpectedEof` instead of producing a
/// digest of partial content.
pub async fn hash_reader<R: AsyncRead + Unpin>(
    mut reader: R,
    expected_len: u64,
) -> io::Result<FileDigest> {
    let chunks = chunk_count(expected_len);

    let mut hasher = Md5::new();
    let mut buffer = vec![0u8; CHUNK_SIZE.min(expected_len as usize)];
    let mut remaining = expected_len;

    for index in 0..chunks {
        let len = remaining.min(CHUNK_SIZE as u64) as usize;
        reader.read_exact(&mut buffer[..len]).await.map_err(|e| {
            io::Error::new(
                e.kind(),
                format!(
                    "short read at chunk {}/{} ({} of {} bytes left): {}",
                    index + 1,
                    chunks,
                    remaining,
                    expected_len,
                    e
                ),
            )
        })?;
        hasher.update(&buffer[..len]);
        remaining -= len as u64;
        tracing::trace!("Hashed chunk {}/{}", index + 1, chunks);
    }

    Ok(FileDigest {
        hex: hex::encode(hasher.finalize()),
        size: expected_len,
        chunks,
    })
}

/// Hashes a file using the length it has when opened.
pub async fn hash_file(path: &Path) -> io::Result<FileDigest> {
    let file = tokio::fs::File::open(path).await?;
    let size = file.metadata().await?.len();
    hash_reader(file, size)
        .await
        .map_err(|e| io::Error::new(e.kind(), format!("{} changed while hashing: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_calculate_md5() {
        assert_eq!(calculate_md5(b"hello world"), "5eb63bbbe01eeed093cb22bb8f5acdc3");
    }

    #[test]
    fn test_calculate_md5_empty() {
        assert_eq!(calculate_md5(b""), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn test_chunk_count() {
        assert_eq!(chunk_count(0), 0);
        assert_eq!(chunk_count(1), 1);
        assert_eq!(chunk_count(CHUNK_SIZE as u64), 1);
        assert_eq!(chunk_count(CHUNK_SIZE as u64 + 1), 2);
    }

    #[tokio::test]
    async fn test_hash_reader_matches_one_pass() {
        let data = b"hello world";
        let digest = hash_reader(&data[..], data.len() as u64).await.unwrap();
        assert_eq!(digest.hex, "5eb63bbbe01eeed093cb22bb8f5acdc3");
        assert_eq!(digest.size, 11);
        assert_eq!(digest.chunks, 1);
    }

    #[tokio::test]
    async fn test_hash_reader_short_read_fails() {
        let data = vec![3u8; 100];
        let err = hash_reader(&data[..], 4096).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[tokio::test]
    async fn test_hash_reader_short_read_in_later_chunk() {
        let data = vec![3u8; CHUNK_SIZE + 10];
        let err = hash_reader(&data[..], (CHUNK_SIZE * 2) as u64).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert!(err.to_string().contains("chunk 2/2"));
    }

    #[tokio::test]
    async fn test_hash_file_small() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[7u8; 1024]).unwrap();

        let digest = hash_file(file.path()).await.unwrap();
        assert_eq!(digest.hex, calculate_md5(&[7u8; 1024]));
        assert_eq!(digest.size, 1024);
        assert_eq!(digest.chunks, 1);
    }

    #[tokio::test]
    async fn test_hash_file_across_chunk_boundaries() {
        let data: Vec<u8> = (0..(CHUNK_SIZE * 2 + 17)).map(|i| (i % 251) as u8).collect();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&data).unwrap();

        let first = hash_file(file.path()).await.unwrap();
        let second = hash_file(file.path()).await.unwrap();
        assert_eq!(first.hex, calculate_md5(&data));
        assert_eq!(first.chunks, 3);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_hash_file_empty() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let digest = hash_file(file.path()).await.unwrap();
        assert_eq!(digest.hex, "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(digest.chunks, 0);
    }

    #[tokio::test]
    async fn test_hash_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = hash_file(&dir.path().join("gone.bin")).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
