//! Serial adapter error types.

/// Errors specific to the serial transport adapter.
#[derive(Debug, thiserror::Error)]
pub enum SerialError {
    /// Invalid configuration value.
    #[error("invalid serial configuration: {0}")]
    Config(String),

    /// The serial port could not be opened.
    #[error("failed to open serial port {path}")]
    Open {
        /// Device path that was tried.
        path: String,
        #[source]
        source: tokio_serial::Error,
    },

    /// The reader task has exited and no more bytes will arrive.
    #[error("serial link closed")]
    Closed,
}
