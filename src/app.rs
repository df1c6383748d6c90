/// Main TUI application

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::io;
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

use bridge_monitor::core::{DashboardState, Network, PollingController};
use crate::screens::Dashboard;

/// Input poll timeout; also bounds how stale a frame can be
const TICK: Duration = Duration::from_millis(100);

pub struct App {
    controller: PollingController,
    state: watch::Receiver<DashboardState>,
    dashboard: Dashboard,
    initial_network: Network,
    show_help: bool,
    should_quit: bool,
}

impl App {
    pub fn new(controller: PollingController, initial_network: Network) -> Self {
        let state = controller.subscribe();
        Self {
            controller,
            state,
            dashboard: Dashboard::new(),
            initial_network,
            show_help: false,
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        self.controller.start(self.initial_network);

        let result = self.run_loop(&mut terminal).await;

        self.controller.stop();

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen
        )?;
        terminal.show_cursor()?;

        result
    }

    async fn run_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            let state = self.state.borrow_and_update().clone();
            let now = chrono::Utc::now();
            terminal.draw(|f| self.dashboard.render(f, &state, self.show_help, now))?;

            if event::poll(TICK)? {
                if let Event::Key(key_event) = event::read()? {
                    if key_event.kind == KeyEventKind::Press {
                        self.handle_key(key_event.code);
                    }
                }
            }

            if self.should_quit {
                break;
            }

            tokio::task::yield_now().await;
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Esc => {
                if self.show_help {
                    self.show_help = false;
                } else {
                    self.should_quit = true;
                }
            }
            KeyCode::Char('?') | KeyCode::F(1) => {
                self.show_help = !self.show_help;
            }
            KeyCode::Char('r') => {
                let controller = self.controller.clone();
                tokio::spawn(async move {
                    let outcome = controller.refresh().await;
                    debug!(?outcome, "manual refresh finished");
                });
            }
            KeyCode::Char('n') | KeyCode::Tab => {
                self.select_network(self.controller.network().next());
            }
            KeyCode::Char('m') => {
                self.select_network(Network::Mainnet);
            }
            KeyCode::Char('t') => {
                self.select_network(Network::Testnet);
            }
            _ => {}
        }
    }

    fn select_network(&mut self, network: Network) {
        if network != self.controller.network() {
            self.controller.switch_network(network);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_monitor::core::{MetricsTransport, PollerOptions, TransportError};
    use std::sync::Arc;

    struct Offline;

    #[async_trait::async_trait]
    impl MetricsTransport for Offline {
        async fn fetch(&self, _network: Network) -> Result<String, TransportError> {
            Err(TransportError::Status { status: 502, detail: None })
        }
    }

    fn app() -> App {
        let controller = PollingController::new(Arc::new(Offline), Network::Mainnet, PollerOptions::default());
        App::new(controller, Network::Mainnet)
    }

    #[tokio::test]
    async fn test_network_keys() {
        let mut app = app();

        app.handle_key(KeyCode::Char('t'));
        assert_eq!(app.controller.network(), Network::Testnet);

        app.handle_key(KeyCode::Tab);
        assert_eq!(app.controller.network(), Network::Mainnet);

        app.handle_key(KeyCode::Char('n'));
        assert_eq!(app.controller.network(), Network::Testnet);

        app.handle_key(KeyCode::Char('m'));
        assert_eq!(app.controller.network(), Network::Mainnet);

        app.controller.stop();
    }

    #[tokio::test]
    async fn test_help_and_quit_keys() {
        let mut app = app();

        app.handle_key(KeyCode::Char('?'));
        assert!(app.show_help);

        // Esc closes help before quitting
        app.handle_key(KeyCode::Esc);
        assert!(!app.show_help);
        assert!(!app.should_quit);

        app.handle_key(KeyCode::Esc);
        assert!(app.should_quit);
    }
}
