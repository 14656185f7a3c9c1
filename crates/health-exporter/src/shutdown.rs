use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info};

/// 关闭原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownSignal {
    /// SIGTERM - 优雅关闭
    Term,

    /// SIGINT - Ctrl+C
    Interrupt,

    /// 抓取周期失败，进程应以非零状态退出
    CycleFailed(String),
}

impl ShutdownSignal {
    pub fn is_failure(&self) -> bool {
        matches!(self, ShutdownSignal::CycleFailed(_))
    }
}

/// 信号处理器
pub struct SignalHandler {
    shutdown_tx: broadcast::Sender<ShutdownSignal>,
}

impl SignalHandler {
    pub fn new() -> (Self, broadcast::Receiver<ShutdownSignal>) {
        let (tx, rx) = broadcast::channel(16);
        (Self { shutdown_tx: tx }, rx)
    }

    /// 等待系统信号并广播
    #[cfg(unix)]
    pub async fn wait_for_system_signal(&self) -> std::io::Result<ShutdownSignal> {
        use signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;

        let received = tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM");
                ShutdownSignal::Term
            }
            _ = sigint.recv() => {
                info!("Received SIGINT");
                ShutdownSignal::Interrupt
            }
        };

        let _ = self.shutdown_tx.send(received.clone());
        Ok(received)
    }

    #[cfg(not(unix))]
    pub async fn wait_for_system_signal(&self) -> std::io::Result<ShutdownSignal> {
        signal::ctrl_c().await?;
        info!("Received Ctrl+C");
        let _ = self.shutdown_tx.send(ShutdownSignal::Interrupt);
        Ok(ShutdownSignal::Interrupt)
    }

    /// 周期失败时触发关闭
    pub fn trigger_failure(&self, reason: impl Into<String>) {
        let reason = reason.into();
        error!(reason = %reason, "Fatal scrape failure, shutting down");
        let _ = self.shutdown_tx.send(ShutdownSignal::CycleFailed(reason));
    }

    /// 订阅关闭信号
    pub fn subscribe(&self) -> broadcast::Receiver<ShutdownSignal> {
        self.shutdown_tx.subscribe()
    }
}

impl Default for SignalHandler {
    fn default() -> Self {
        Self::new().0
    }
}
