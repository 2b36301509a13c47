//! Unix socket client for the persistent session daemon.
//!
//! The daemon speaks a simple framed protocol: every message is a
//! big-endian `u64` payload length followed by the payload. A command
//! request is one `EXEC: `-prefixed frame; the response is three frames
//! carrying status, stdout, and stderr.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use bytes::{BufMut, BytesMut};
use log::{debug, trace};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::time::{Instant, sleep};

use super::{CommandOutput, Transport};
use crate::error::{Result, TransportError};

/// Prefix marking an execute request on the wire.
pub const EXEC_PREFIX: &str = "EXEC: ";

/// Frames carry a big-endian u64 payload length.
const FRAME_HEADER_LEN: usize = 8;

/// Upper bound on a single frame payload.
const MAX_FRAME_LEN: usize = 1024 * 1024;

/// How often to re-check the socket while the daemon is starting.
const SOCKET_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Client side of the session daemon socket.
#[derive(Debug)]
pub struct UnixSocketTransport {
    stream: UnixStream,
    path: PathBuf,
}

impl UnixSocketTransport {
    /// Connect to the session socket at `path`, waiting up to `timeout`
    /// for the daemon to begin listening.
    ///
    /// A freshly spawned daemon binds its socket asynchronously, so the
    /// connection attempt is polled until the deadline instead of
    /// failing on the first miss.
    pub async fn connect(path: impl Into<PathBuf>, timeout: Duration) -> Result<Self> {
        let path = path.into();
        let deadline = Instant::now() + timeout;

        loop {
            match UnixStream::connect(&path).await {
                Ok(stream) => {
                    debug!("connected to session socket {}", path.display());
                    return Ok(Self { stream, path });
                }
                // The daemon may not have bound the socket yet
                Err(err)
                    if matches!(
                        err.kind(),
                        io::ErrorKind::NotFound | io::ErrorKind::ConnectionRefused
                    ) => {}
                Err(err) => {
                    return Err(TransportError::ConnectionFailed { path, source: err }.into());
                }
            }

            if Instant::now() >= deadline {
                return Err(TransportError::SocketWaitTimeout {
                    path,
                    waited: timeout,
                }
                .into());
            }
            sleep(SOCKET_POLL_INTERVAL).await;
        }
    }

    /// Socket path this transport is connected to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn send_frame(&mut self, payload: &[u8]) -> Result<()> {
        if payload.len() > MAX_FRAME_LEN {
            return Err(oversized_frame(payload.len() as u64).into());
        }

        let mut buf = BytesMut::with_capacity(FRAME_HEADER_LEN + payload.len());
        buf.put_u64(payload.len() as u64);
        buf.put_slice(payload);

        self.stream
            .write_all(&buf)
            .await
            .map_err(TransportError::Io)?;
        self.stream.flush().await.map_err(TransportError::Io)?;
        Ok(())
    }

    async fn recv_frame(&mut self) -> Result<Vec<u8>> {
        let mut header = [0u8; FRAME_HEADER_LEN];
        self.stream
            .read_exact(&mut header)
            .await
            .map_err(map_read_err)?;

        // Compare before narrowing so a length beyond u32 cannot wrap
        // to a small read on 32-bit targets
        let len = u64::from_be_bytes(header);
        if len > MAX_FRAME_LEN as u64 {
            return Err(oversized_frame(len).into());
        }

        let mut payload = vec![0u8; len as usize];
        self.stream
            .read_exact(&mut payload)
            .await
            .map_err(map_read_err)?;
        Ok(payload)
    }
}

fn oversized_frame(len: u64) -> TransportError {
    TransportError::Frame {
        message: format!("frame of {len} bytes exceeds the {MAX_FRAME_LEN} byte limit"),
    }
}

fn map_read_err(err: io::Error) -> TransportError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        TransportError::Closed
    } else {
        TransportError::Io(err)
    }
}

#[async_trait]
impl Transport for UnixSocketTransport {
    async fn exec_command(&mut self, command: &str) -> Result<CommandOutput> {
        trace!("EXEC '{command}' over {}", self.path.display());

        self.send_frame(format!("{EXEC_PREFIX}{command}").as_bytes())
            .await?;

        let status_frame = self.recv_frame().await?;
        let status = std::str::from_utf8(&status_frame)
            .ok()
            .and_then(|s| s.trim().parse::<i32>().ok())
            .ok_or_else(|| TransportError::Frame {
                message: format!(
                    "unparseable status frame: {:?}",
                    String::from_utf8_lossy(&status_frame)
                ),
            })?;

        let stdout = String::from_utf8_lossy(&self.recv_frame().await?).into_owned();
        let stderr = String::from_utf8_lossy(&self.recv_frame().await?).into_owned();

        Ok(CommandOutput {
            status,
            stdout,
            stderr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tokio::net::UnixListener;
    use tokio::task::JoinHandle;

    async fn read_frame(stream: &mut UnixStream) -> Vec<u8> {
        let mut header = [0u8; FRAME_HEADER_LEN];
        stream.read_exact(&mut header).await.unwrap();
        let len = u64::from_be_bytes(header) as usize;
        let mut payload = vec![0u8; len];
        stream.read_exact(&mut payload).await.unwrap();
        payload
    }

    async fn write_frame(stream: &mut UnixStream, payload: &[u8]) {
        let mut buf = BytesMut::with_capacity(FRAME_HEADER_LEN + payload.len());
        buf.put_u64(payload.len() as u64);
        buf.put_slice(payload);
        stream.write_all(&buf).await.unwrap();
    }

    /// One-shot daemon: accepts a single connection and answers each
    /// request with the next scripted (status, stdout, stderr) triple.
    /// Returns the raw requests it saw.
    fn spawn_daemon(
        listener: UnixListener,
        responses: Vec<(i32, &'static str, &'static str)>,
    ) -> JoinHandle<Vec<String>> {
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut seen = Vec::new();
            for (status, stdout, stderr) in responses {
                let request = read_frame(&mut stream).await;
                seen.push(String::from_utf8(request).unwrap());
                write_frame(&mut stream, status.to_string().as_bytes()).await;
                write_frame(&mut stream, stdout.as_bytes()).await;
                write_frame(&mut stream, stderr.as_bytes()).await;
            }
            seen
        })
    }

    #[tokio::test]
    async fn test_exec_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.sock");
        let listener = UnixListener::bind(&path).unwrap();
        let daemon = spawn_daemon(listener, vec![(0, "router#", "")]);

        let mut transport = UnixSocketTransport::connect(&path, Duration::from_secs(5))
            .await
            .unwrap();
        let output = transport.exec_command("prompt()").await.unwrap();

        assert!(output.success());
        assert_eq!(output.stdout, "router#");
        assert_eq!(output.stderr, "");

        let seen = daemon.await.unwrap();
        assert_eq!(seen, vec!["EXEC: prompt()".to_string()]);
    }

    #[tokio::test]
    async fn test_non_zero_status_is_reported_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.sock");
        let listener = UnixListener::bind(&path).unwrap();
        let daemon = spawn_daemon(listener, vec![(1, "", "unable to connect")]);

        let mut transport = UnixSocketTransport::connect(&path, Duration::from_secs(5))
            .await
            .unwrap();
        let output = transport.exec_command("open_shell()").await.unwrap();

        assert!(!output.success());
        assert_eq!(output.status, 1);
        assert_eq!(output.stderr, "unable to connect");
        daemon.await.unwrap();
    }

    #[tokio::test]
    async fn test_connect_times_out_without_listener() {
        tokio::time::pause();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.sock");

        let err = UnixSocketTransport::connect(&path, Duration::from_secs(3))
            .await
            .unwrap_err();
        match err {
            Error::Transport(TransportError::SocketWaitTimeout { waited, .. }) => {
                assert_eq!(waited, Duration::from_secs(3));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_connect_waits_for_daemon_to_bind() {
        tokio::time::pause();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("late.sock");

        let bind_path = path.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(1500)).await;
            let _listener = UnixListener::bind(&bind_path).unwrap();
            // Hold the listener until the test finishes
            sleep(Duration::from_secs(60)).await;
        });

        let transport = UnixSocketTransport::connect(&path, Duration::from_secs(10))
            .await
            .unwrap();
        assert_eq!(transport.path(), path.as_path());
    }

    #[tokio::test]
    async fn test_oversized_response_frame_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.sock");
        let listener = UnixListener::bind(&path).unwrap();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let _request = read_frame(&mut stream).await;
            // Advertise a payload twice the permitted size
            let len = (2 * MAX_FRAME_LEN) as u64;
            stream.write_all(&len.to_be_bytes()).await.unwrap();
        });

        let mut transport = UnixSocketTransport::connect(&path, Duration::from_secs(5))
            .await
            .unwrap();
        let err = transport.exec_command("prompt()").await.unwrap_err();
        match err {
            Error::Transport(TransportError::Frame { message }) => {
                assert!(message.contains("exceeds"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_length_prefix_beyond_u32_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.sock");
        let listener = UnixListener::bind(&path).unwrap();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let _request = read_frame(&mut stream).await;
            // A length that would wrap to 100 if narrowed to u32 first
            let len = (1u64 << 32) + 100;
            stream.write_all(&len.to_be_bytes()).await.unwrap();
        });

        let mut transport = UnixSocketTransport::connect(&path, Duration::from_secs(5))
            .await
            .unwrap();
        let err = transport.exec_command("prompt()").await.unwrap_err();
        match err {
            Error::Transport(TransportError::Frame { message }) => {
                assert!(message.contains("exceeds"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_daemon_hangup_maps_to_closed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.sock");
        let listener = UnixListener::bind(&path).unwrap();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let _request = read_frame(&mut stream).await;
            // Drop the stream without answering
        });

        let mut transport = UnixSocketTransport::connect(&path, Duration::from_secs(5))
            .await
            .unwrap();
        let err = transport.exec_command("prompt()").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Transport(TransportError::Closed)
        ));
    }

    #[tokio::test]
    async fn test_unparseable_status_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.sock");
        let listener = UnixListener::bind(&path).unwrap();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let _request = read_frame(&mut stream).await;
            write_frame(&mut stream, b"not-a-number").await;
        });

        let mut transport = UnixSocketTransport::connect(&path, Duration::from_secs(5))
            .await
            .unwrap();
        let err = transport.exec_command("prompt()").await.unwrap_err();
        match err {
            Error::Transport(TransportError::Frame { message }) => {
                assert!(message.contains("status"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
