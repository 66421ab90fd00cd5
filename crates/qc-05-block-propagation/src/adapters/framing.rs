//! Length-prefixed stream framing.
//!
//! # Wire format
//!
//! ```text
//! [4-byte big-endian length][message bytes]
//! ```
//!
//! A frame carries exactly one encoded `WireMessage`. Lengths above the
//! configured maximum are rejected before any body byte is read.

use crate::domain::FrameError;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Write `data` as one frame and flush.
pub async fn write_frame<S: AsyncWrite + Unpin>(stream: &mut S, data: &[u8]) -> Result<(), FrameError> {
    let len = u32::try_from(data.len()).map_err(|_| FrameError::TooLarge {
        size: data.len(),
        max: u32::MAX as usize,
    })?;
    stream.write_all(&len.to_be_bytes()).await?;
    stream.write_all(data).await?;
    stream.flush().await?;
    Ok(())
}

/// Read one frame. `Ok(None)` means the peer closed the stream cleanly
/// between frames.
pub async fn read_frame<S: AsyncRead + Unpin>(
    stream: &mut S,
    max_size: usize,
) -> Result<Option<Vec<u8>>, FrameError> {
    let Some(len) = read_frame_len(stream, max_size).await? else {
        return Ok(None);
    };

    let mut data = vec![0u8; len];
    stream.read_exact(&mut data).await?;
    Ok(Some(data))
}

/// Read the 4-byte length prefix and validate it against `max_size`.
///
/// EOF before the first header byte is a clean close. EOF inside the header
/// is `TruncatedHeader`.
async fn read_frame_len<S: AsyncRead + Unpin>(
    stream: &mut S,
    max_size: usize,
) -> Result<Option<usize>, FrameError> {
    let mut len_bytes = [0u8; 4];
    let mut filled = 0;
    while filled < len_bytes.len() {
        let n = stream.read(&mut len_bytes[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(FrameError::TruncatedHeader { received: filled });
        }
        filled += n;
    }
    let len = u32::from_be_bytes(len_bytes) as usize;

    if len > max_size {
        return Err(FrameError::TooLarge { size: len, max: max_size });
    }

    Ok(Some(len))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MAX_FRAME_SIZE;

    #[tokio::test]
    async fn test_write_read_frame_roundtrip() {
        let (mut client, mut server) = tokio::io::duplex(1024);
        write_frame(&mut client, b"hello").await.unwrap();
        write_frame(&mut client, b"").await.unwrap();

        let first = read_frame(&mut server, MAX_FRAME_SIZE).await.unwrap();
        assert_eq!(first.as_deref(), Some(&b"hello"[..]));
        let second = read_frame(&mut server, MAX_FRAME_SIZE).await.unwrap();
        assert_eq!(second.as_deref(), Some(&b""[..]));
    }

    #[tokio::test]
    async fn test_clean_close_between_frames() {
        let (mut client, mut server) = tokio::io::duplex(64);
        write_frame(&mut client, b"x").await.unwrap();
        drop(client);

        assert!(read_frame(&mut server, MAX_FRAME_SIZE).await.unwrap().is_some());
        assert!(read_frame(&mut server, MAX_FRAME_SIZE).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_read_frame_too_large() {
        let (mut client, mut server) = tokio::io::duplex(64);
        client.write_all(&(1025u32).to_be_bytes()).await.unwrap();

        let result = read_frame(&mut server, 1024).await;
        assert!(matches!(
            result,
            Err(FrameError::TooLarge { size: 1025, max: 1024 })
        ));
    }

    #[tokio::test]
    async fn test_truncated_body_is_an_error() {
        let (mut client, mut server) = tokio::io::duplex(64);
        client.write_all(&(10u32).to_be_bytes()).await.unwrap();
        client.write_all(b"abc").await.unwrap();
        drop(client);

        assert!(matches!(
            read_frame(&mut server, MAX_FRAME_SIZE).await,
            Err(FrameError::Io(_))
        ));
    }

    #[tokio::test]
    async fn test_eof_inside_header_is_an_error() {
        let (mut client, mut server) = tokio::io::duplex(64);
        client.write_all(&[0, 0]).await.unwrap();
        drop(client);

        assert!(matches!(
            read_frame(&mut server, MAX_FRAME_SIZE).await,
            Err(FrameError::TruncatedHeader { received: 2 })
        ));
    }
}
