// src/agent.rs
//! Agent main loop.
//!
//! Polls the chat transport, hands each message to the command dispatcher
//! in arrival order and sends the reply back to the originating chat.

use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, error, info, warn};

use crate::command_handler::CommandHandler;
use crate::config::constants::POLL_ERROR_PAUSE;
use crate::config::AgentConfig;
use crate::metrics::MetricsProvider;
use crate::monitor::CriticalEventMonitor;
use crate::transport::{ChatTransport, IncomingMessage};
use crate::types::ChatId;

/// Chat-controlled monitoring agent
pub struct Agent {
    config: AgentConfig,
    transport: Arc<dyn ChatTransport>,
    metrics: Arc<dyn MetricsProvider>,
    handler: CommandHandler,
}

impl Agent {
    pub fn new(
        config: AgentConfig,
        transport: Arc<dyn ChatTransport>,
        metrics: Arc<dyn MetricsProvider>,
    ) -> Self {
        let handler = CommandHandler::new(
            config.handler.clone(),
            config.authorized_id,
            Arc::clone(&metrics),
        );
        Self {
            config,
            transport,
            metrics,
            handler,
        }
    }

    pub fn handler(&self) -> &CommandHandler {
        &self.handler
    }

    /// Run until Ctrl-C
    pub async fn run(&mut self) {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Run until `shutdown` resolves
    pub async fn run_until<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        info!("Agent version {} started", env!("CARGO_PKG_VERSION"));
        let monitor = self.spawn_monitor();

        tokio::pin!(shutdown);
        loop {
            let batch = tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    break;
                }
                batch = self.transport.receive() => batch,
            };

            match batch {
                Ok(messages) => {
                    for message in &messages {
                        self.process(message).await;
                    }
                }
                Err(e) => {
                    warn!(
                        "Polling failed: {}. Retrying in {}s",
                        e,
                        POLL_ERROR_PAUSE.as_secs()
                    );
                    tokio::select! {
                        _ = &mut shutdown => {
                            info!("Shutdown signal received");
                            break;
                        }
                        _ = time::sleep(POLL_ERROR_PAUSE) => {}
                    }
                }
            }
        }

        if let Some(handle) = monitor {
            handle.abort();
        }
        info!("Agent stopped");
    }

    /// Dispatch one message and deliver the reply
    pub async fn process(&mut self, message: &IncomingMessage) {
        let reply = match self
            .handler
            .handle_message(message, self.transport.as_ref())
            .await
        {
            Some(reply) => reply,
            None => return,
        };

        if let Err(e) = self.transport.send_text(message.chat, &reply.text).await {
            error!("Failed to deliver reply to chat {}: {}", message.chat, e);
        } else {
            debug!("Reply delivered to chat {}", message.chat);
        }
    }

    fn spawn_monitor(&self) -> Option<JoinHandle<()>> {
        let interval = self.config.alert_interval?;
        let monitor = CriticalEventMonitor::new(
            Arc::clone(&self.metrics),
            ChatId::from(self.config.authorized_id),
            interval,
            self.config.handler.cpu_sample_interval,
            self.config.handler.thermal_zone_path.clone(),
        );
        Some(tokio::spawn(monitor.run(Arc::clone(&self.transport))))
    }
}
