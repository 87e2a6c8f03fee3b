/// Endpoint errors.
///
/// One variant per failure point. The message names the failed step,
/// the OS reason follows it.
#[derive(Debug, thiserror::Error)]
pub enum SocketError {
    #[error("error opening socket: {}", errno_to_str(*.errno))]
    Create { errno: i32 },

    #[error("no such host: {host} ({reason})")]
    Resolve { host: String, reason: String },

    #[error("error binding socket to {addr}: {}", errno_to_str(*.errno))]
    Bind { errno: i32, addr: String },

    #[error("error listening on socket (backlog={backlog}): {}", errno_to_str(*.errno))]
    Listen { errno: i32, backlog: i32 },

    #[error("error accepting connection: {}", errno_to_str(*.errno))]
    Accept { errno: i32 },

    #[error("error connecting to {addr}: {}", errno_to_str(*.errno))]
    Connect { errno: i32, addr: String },

    #[error("error reading from socket: {}", errno_to_str(*.errno))]
    Read { errno: i32 },

    #[error("error writing to socket: {}", errno_to_str(*.errno))]
    Write { errno: i32 },

    #[error("setsockopt({option}) failed: {}", errno_to_str(*.errno))]
    SetOption { errno: i32, option: &'static str },

    #[error("getsockopt({option}) failed: {}", errno_to_str(*.errno))]
    GetOption { errno: i32, option: &'static str },

    #[error("invalid address: {reason}")]
    InvalidAddress { reason: &'static str },
}

impl SocketError {
    /// Returns the OS error code behind this error, if any.
    pub fn errno(&self) -> Option<i32> {
        match self {
            SocketError::Create { errno }
            | SocketError::Bind { errno, .. }
            | SocketError::Listen { errno, .. }
            | SocketError::Accept { errno }
            | SocketError::Connect { errno, .. }
            | SocketError::Read { errno }
            | SocketError::Write { errno }
            | SocketError::SetOption { errno, .. }
            | SocketError::GetOption { errno, .. } => Some(*errno),
            SocketError::Resolve { .. } | SocketError::InvalidAddress { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SocketError>;

/// Returns current errno value.
#[inline]
pub fn errno() -> i32 {
    unsafe { *libc::__errno_location() }
}

/// Converts errno to human-readable string.
fn errno_to_str(errno: i32) -> String {
    match errno {
        libc::EACCES => "permission denied".into(),
        libc::EADDRINUSE => "address already in use".into(),
        libc::EADDRNOTAVAIL => "address not available".into(),
        libc::EAFNOSUPPORT => "address family not supported".into(),
        libc::EAGAIN => "resource temporarily unavailable".into(),
        libc::EBADF => "bad file descriptor".into(),
        libc::ECONNREFUSED => "connection refused".into(),
        libc::ECONNRESET => "connection reset by peer".into(),
        libc::EHOSTUNREACH => "host unreachable".into(),
        libc::EINTR => "interrupted by signal".into(),
        libc::EINVAL => "invalid argument".into(),
        libc::EMFILE => "too many open files".into(),
        libc::ENETUNREACH => "network unreachable".into(),
        libc::ENOBUFS => "no buffer space available".into(),
        libc::ENOTCONN => "not connected".into(),
        libc::EOPNOTSUPP => "operation not supported".into(),
        libc::EPIPE => "broken pipe".into(),
        libc::EPROTONOSUPPORT => "protocol not supported".into(),
        libc::ETIMEDOUT => "connection timed out".into(),
        _ => format!("errno {}", errno),
    }
}

/// Maps errno to std::io::ErrorKind.
fn errno_to_kind(errno: i32) -> std::io::ErrorKind {
    match errno {
        libc::EACCES | libc::EPERM => std::io::ErrorKind::PermissionDenied,
        libc::EADDRINUSE => std::io::ErrorKind::AddrInUse,
        libc::EADDRNOTAVAIL => std::io::ErrorKind::AddrNotAvailable,
        libc::EAGAIN => std::io::ErrorKind::WouldBlock,
        libc::ECONNREFUSED => std::io::ErrorKind::ConnectionRefused,
        libc::ECONNRESET => std::io::ErrorKind::ConnectionReset,
        libc::EINTR => std::io::ErrorKind::Interrupted,
        libc::EINVAL => std::io::ErrorKind::InvalidInput,
        libc::ENOTCONN => std::io::ErrorKind::NotConnected,
        libc::EPIPE => std::io::ErrorKind::BrokenPipe,
        libc::ETIMEDOUT => std::io::ErrorKind::TimedOut,
        _ => std::io::ErrorKind::Other,
    }
}

impl From<SocketError> for std::io::Error {
    fn from(err: SocketError) -> Self {
        let kind = match &err {
            SocketError::Resolve { .. } => std::io::ErrorKind::NotFound,
            SocketError::InvalidAddress { .. } => std::io::ErrorKind::InvalidInput,
            other => other.errno().map_or(std::io::ErrorKind::Other, errno_to_kind),
        };
        std::io::Error::new(kind, err)
    }
}
