//! Network printer (raw TCP, port 9100)

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::{lookup_host, TcpStream};
use tracing::{debug, info, instrument, warn};

use super::escpos;
use super::{PrintError, PrintResult, ReceiptPrinter};
use rasoi_core::receipt::Receipt;

/// Most thermal printers accept raw ESC/POS on TCP 9100.
#[derive(Debug, Clone)]
pub struct NetworkPrinter {
    /// `host:port`; the host may be a name, resolved on every connect.
    target: String,
    timeout: Duration,
    check_timeout: Duration,
    width: usize,
}

impl NetworkPrinter {
    /// From `host`, `host:port` or a socket address. A bare host gets
    /// port 9100.
    pub fn from_addr(addr: &str) -> PrintResult<Self> {
        let addr = addr.trim();
        let invalid = || PrintError::InvalidConfig(format!("Invalid address: {}", addr));

        let target = if let Ok(socket) = addr.parse::<SocketAddr>() {
            socket.to_string()
        } else {
            let (host, port) = match addr.rsplit_once(':') {
                Some((host, port)) => (host, port.parse::<u16>().map_err(|_| invalid())?),
                None => (addr, 9100),
            };
            if host.is_empty() || host.contains(char::is_whitespace) || host.contains(':') {
                return Err(invalid());
            }
            format!("{}:{}", host, port)
        };

        Ok(Self {
            target,
            timeout: Duration::from_secs(5),
            check_timeout: Duration::from_millis(1000),
            width: escpos::DEFAULT_WIDTH,
        })
    }

    /// Connect/send timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Upper bound for the connectivity check.
    pub fn with_check_timeout(mut self, timeout: Duration) -> Self {
        self.check_timeout = timeout;
        self
    }

    /// Characters per line.
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Resolves the target and tries each address in turn.
    async fn connect(&self) -> PrintResult<TcpStream> {
        let addrs = lookup_host(self.target.as_str())
            .await
            .map_err(|e| PrintError::Connection(format!("{}: {}", self.target, e)))?;

        let mut last_error = None;
        for addr in addrs {
            match TcpStream::connect(addr).await {
                Ok(stream) => return Ok(stream),
                Err(e) => {
                    debug!(%addr, error = %e, "Printer address refused");
                    last_error = Some(e);
                }
            }
        }

        Err(PrintError::Connection(match last_error {
            Some(e) => format!("{}: {}", self.target, e),
            None => format!("{}: no addresses resolved", self.target),
        }))
    }

    #[instrument(skip(data), fields(printer = %self.target, data_len = data.len()))]
    async fn send(&self, data: &[u8]) -> PrintResult<()> {
        let mut stream = tokio::time::timeout(self.timeout, self.connect())
            .await
            .map_err(|_| PrintError::Timeout(format!("Connection timeout: {}", self.target)))??;

        tokio::time::timeout(self.timeout, async {
            stream.write_all(data).await?;
            stream.flush().await
        })
        .await
        .map_err(|_| PrintError::Timeout(format!("Write timeout: {}", self.target)))??;

        info!("Print job sent");
        Ok(())
    }
}

impl ReceiptPrinter for NetworkPrinter {
    #[instrument(fields(printer = %self.target))]
    async fn is_connected(&self) -> bool {
        match tokio::time::timeout(self.check_timeout, self.connect()).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                warn!(error = %e, "Printer offline");
                false
            }
            Err(_) => {
                warn!("Printer check timeout");
                false
            }
        }
    }

    async fn print(&self, receipt: &Receipt) -> PrintResult<()> {
        let data = escpos::render(receipt, self.width);
        self.send(&data).await
    }
}
