//! # minilink-adapter-transport-serial
//!
//! Serial transport adapter — the UART link to the microcontroller board.
//!
//! The port is split into a reader task and a writer task; [`SerialTransport`]
//! is a synchronous facade over their channels, which is what lets the bridge
//! stay single-threaded while the IO runs on the tokio reactor.
//!
//! IO errors never cross the [`Transport`] boundary: the affected task logs
//! and exits, and the daemon observes the reader's exit through
//! [`SerialTransport::readable`].
//!
//! ## Dependency rule
//! Depends on `minilink-core` (the [`Transport`] port) only.

mod config;
mod error;

use std::collections::VecDeque;

use minilink_core::Transport;
use tokio::io::{AsyncReadExt, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::sync::mpsc;
use tokio_serial::{SerialPortBuilderExt, SerialStream};
use tracing::{info, warn};

pub use config::SerialConfig;
pub use error::SerialError;

/// Byte transport over a serial port.
pub struct SerialTransport {
    buffer: VecDeque<u8>,
    chunks: mpsc::UnboundedReceiver<Vec<u8>>,
    frames: mpsc::UnboundedSender<Vec<u8>>,
    partial: Vec<u8>,
}

impl SerialTransport {
    /// Open the configured port and spawn the reader and writer tasks.
    ///
    /// # Errors
    ///
    /// Returns [`SerialError::Config`] for an invalid configuration and
    /// [`SerialError::Open`] when the port cannot be opened.
    pub fn open(config: &SerialConfig) -> Result<Self, SerialError> {
        config.validate()?;
        let port = tokio_serial::new(&config.path, config.baud_rate)
            .open_native_async()
            .map_err(|source| SerialError::Open {
                path: config.path.clone(),
                source,
            })?;
        info!(path = %config.path, baud = config.baud_rate, "serial port opened");

        let (reader, writer) = tokio::io::split(port);
        let (chunk_tx, chunk_rx) = mpsc::unbounded_channel();
        let (frame_tx, frame_rx) = mpsc::unbounded_channel();
        tokio::spawn(read_loop(reader, chunk_tx));
        tokio::spawn(write_loop(writer, frame_rx));
        Ok(Self::from_channels(chunk_rx, frame_tx))
    }

    fn from_channels(
        chunks: mpsc::UnboundedReceiver<Vec<u8>>,
        frames: mpsc::UnboundedSender<Vec<u8>>,
    ) -> Self {
        Self {
            buffer: VecDeque::new(),
            chunks,
            frames,
            partial: Vec::new(),
        }
    }

    /// Wait until at least one byte is available to [`Transport::read_byte`].
    ///
    /// # Errors
    ///
    /// Returns [`SerialError::Closed`] once the reader task has exited; no
    /// further bytes will ever arrive and the daemon should shut down.
    pub async fn readable(&mut self) -> Result<(), SerialError> {
        if !self.buffer.is_empty() {
            return Ok(());
        }
        match self.chunks.recv().await {
            Some(chunk) => {
                self.buffer.extend(chunk);
                Ok(())
            }
            None => Err(SerialError::Closed),
        }
    }

    fn send_frame(&self, frame: Vec<u8>) {
        if self.frames.send(frame).is_err() {
            warn!("serial writer is gone, dropping frame");
        }
    }
}

impl Transport for SerialTransport {
    fn read_byte(&mut self) -> Option<u8> {
        if self.buffer.is_empty() {
            while let Ok(chunk) = self.chunks.try_recv() {
                self.buffer.extend(chunk);
            }
        }
        self.buffer.pop_front()
    }

    fn write_byte(&mut self, byte: u8) {
        self.partial.push(byte);
        if byte == b'\n' {
            let frame = std::mem::take(&mut self.partial);
            self.send_frame(frame);
        }
    }

    fn write_frame(&mut self, frame: &[u8]) {
        self.send_frame(frame.to_vec());
    }
}

async fn read_loop(mut port: ReadHalf<SerialStream>, chunks: mpsc::UnboundedSender<Vec<u8>>) {
    let mut buf = vec![0u8; 512];
    loop {
        match port.read(&mut buf).await {
            Ok(0) => {
                warn!("serial port reached end of stream");
                break;
            }
            Ok(n) => {
                if chunks.send(buf[..n].to_vec()).is_err() {
                    break;
                }
            }
            Err(error) => {
                warn!(%error, "serial read failed");
                break;
            }
        }
    }
}

async fn write_loop(mut port: WriteHalf<SerialStream>, mut frames: mpsc::UnboundedReceiver<Vec<u8>>) {
    while let Some(frame) = frames.recv().await {
        if let Err(error) = port.write_all(&frame).await {
            warn!(%error, "serial write failed");
            break;
        }
        if let Err(error) = port.flush().await {
            warn!(%error, "serial flush failed");
            break;
        }
    }
}
