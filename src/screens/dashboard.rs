/// Bridge metrics dashboard screen

use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Sparkline, Table, Wrap},
    Frame,
};

use bridge_monitor::core::indicators::{
    active_errors, cache_hit_ratio, cache_ratio_series, format_uptime, gas_balance_sui,
    has_active_errors, overall_cache_hit_ratio, up_since,
};
use bridge_monitor::core::{BridgeSnapshot, DashboardState, History};
use bridge_monitor::utils::{
    format_count, format_date, format_percent, format_sui, format_time, humanize_key,
    truncate_string,
};

pub struct Dashboard {
    title: String,
}

impl Dashboard {
    pub fn new() -> Self {
        Self {
            title: format!("Sui Bridge Monitor v{}", env!("CARGO_PKG_VERSION")),
        }
    }

    pub fn render(&self, frame: &mut Frame, state: &DashboardState, show_help: bool, now: DateTime<Utc>) {
        let alert = state
            .snapshot
            .as_ref()
            .is_some_and(has_active_errors);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),                                       // Header
                Constraint::Length(if state.error.is_some() { 3 } else { 0 }), // Error banner
                Constraint::Length(5),                                       // Summary cards
                Constraint::Length(if alert { 3 } else { 0 }),               // Active errors
                Constraint::Min(0),                                          // Content
                Constraint::Length(1),                                       // Footer
            ])
            .split(frame.size());

        self.render_header(frame, chunks[0], state);

        if let Some(error) = &state.error {
            render_error_banner(frame, chunks[1], error);
        }

        match &state.snapshot {
            Some(snapshot) => {
                render_cards(frame, chunks[2], snapshot, now);
                if alert {
                    render_alert(frame, chunks[3], snapshot);
                }
                render_content(frame, chunks[4], snapshot, &state.history);
            }
            None => {
                let message = if state.loading {
                    "Loading metrics..."
                } else {
                    "No data yet. Press [r] to poll now."
                };
                let placeholder = Paragraph::new(message)
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(Color::Gray))
                    .block(Block::default().borders(Borders::ALL));
                frame.render_widget(placeholder, chunks[2].union(chunks[4]));
            }
        }

        let footer = Paragraph::new(Line::from(vec![
            Span::styled(" [q]", Style::default().fg(Color::Yellow)),
            Span::raw(" Quit  "),
            Span::styled("[r]", Style::default().fg(Color::Yellow)),
            Span::raw(" Refresh  "),
            Span::styled("[n/Tab]", Style::default().fg(Color::Yellow)),
            Span::raw(" Next network  "),
            Span::styled("[m/t]", Style::default().fg(Color::Yellow)),
            Span::raw(" Mainnet/Testnet  "),
            Span::styled("[?]", Style::default().fg(Color::Yellow)),
            Span::raw(" Help"),
        ]))
        .style(Style::default().fg(Color::Gray));
        frame.render_widget(footer, chunks[5]);

        if show_help {
            self.render_help(frame);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect, state: &DashboardState) {
        let (badge, badge_color) = if state.loading && state.snapshot.is_none() {
            ("● CONNECTING", Color::Yellow)
        } else if state.status.is_online {
            ("● ONLINE", Color::Green)
        } else {
            ("● OFFLINE", Color::Red)
        };

        let mut spans = vec![
            Span::styled(
                &self.title,
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                state.network.display_name(),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(badge, Style::default().fg(badge_color).add_modifier(Modifier::BOLD)),
        ];

        if state.status.is_online {
            spans.push(Span::styled(
                format!(" ({}ms)", state.status.response_time_ms),
                Style::default().fg(Color::Gray),
            ));
        }

        if let Some(updated) = state.last_updated {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                format!("Last updated: {}", format_time(updated)),
                Style::default().fg(Color::Gray),
            ));
        }

        if state.loading {
            spans.push(Span::styled("  ⟳", Style::default().fg(Color::Yellow)));
        }

        let header = Paragraph::new(Line::from(spans))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, area);
    }

    fn render_help(&self, frame: &mut Frame) {
        let area = centered_rect(frame.size(), 56, 14);

        let help_text = vec![
            Line::from(Span::styled(
                "Sui Bridge Monitor - Keyboard Shortcuts",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("  [r]            Poll now (retry after an error)"),
            Line::from("  [n] / [Tab]    Switch to the next network"),
            Line::from("  [m]            Mainnet bridge"),
            Line::from("  [t]            Testnet bridge"),
            Line::from("  [?]            Toggle this help screen"),
            Line::from("  [q] / [Esc]    Quit"),
            Line::from(""),
            Line::from(Span::styled(
                "Switching networks clears the charts.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let help = Paragraph::new(help_text)
            .block(
                Block::default()
                    .title(" Help ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .wrap(Wrap { trim: false });

        frame.render_widget(Clear, area);
        frame.render_widget(help, area);
    }
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = area.width.min(width);
    let height = area.height.min(height);
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}

fn render_error_banner(frame: &mut Frame, area: Rect, error: &str) {
    let banner = Paragraph::new(Line::from(vec![
        Span::styled("Error: ", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        Span::raw(truncate_string(error, area.width.saturating_sub(30) as usize)),
        Span::styled("  Press [r] to retry", Style::default().fg(Color::Yellow)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red)),
    );
    frame.render_widget(banner, area);
}

fn card<'a>(title: &'a str, value: String, detail: String, color: Color) -> Paragraph<'a> {
    Paragraph::new(vec![
        Line::from(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(detail, Style::default().fg(Color::Gray))),
    ])
    .block(Block::default().title(title).borders(Borders::ALL))
}

fn render_cards(frame: &mut Frame, area: Rect, snapshot: &BridgeSnapshot, now: DateTime<Utc>) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    let client = if snapshot.client_enabled { "client enabled" } else { "client disabled" };
    let ratio = overall_cache_hit_ratio(&snapshot.cache);

    frame.render_widget(
        card(" Status ", snapshot.status.clone(), format!("v{} · {}", snapshot.version, client), Color::Green),
        columns[0],
    );
    frame.render_widget(
        card(
            " Uptime ",
            format_uptime(snapshot.uptime_ms),
            match up_since(snapshot.uptime_ms, now) {
                Some(since) => format!("Since {}", format_date(since)),
                None => "Since —".to_string(),
            },
            Color::Cyan,
        ),
        columns[1],
    );
    frame.render_widget(
        card(
            " Gas Balance ",
            format_sui(snapshot.client.gas_coin_balance),
            format!("{} MIST", format_count(snapshot.client.gas_coin_balance)),
            Color::Yellow,
        ),
        columns[2],
    );
    frame.render_widget(
        card(
            " Cache Hit Ratio ",
            format_percent(ratio),
            "all verifiers".to_string(),
            ratio_color(ratio),
        ),
        columns[3],
    );
}

fn ratio_color(ratio: f64) -> Color {
    if ratio >= 80.0 {
        Color::Green
    } else if ratio >= 50.0 {
        Color::Yellow
    } else {
        Color::Red
    }
}

fn render_alert(frame: &mut Frame, area: Rect, snapshot: &BridgeSnapshot) {
    let mut spans = vec![Span::styled(
        "⚠ Active errors: ",
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    )];

    for (i, (key, count)) in active_errors(&snapshot.errors).into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(", "));
        }
        spans.push(Span::raw(format!("{} {}", humanize_key(key), format_count(count))));
    }

    let alert = Paragraph::new(Line::from(spans))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        );
    frame.render_widget(alert, area);
}

fn render_content(frame: &mut Frame, area: Rect, snapshot: &BridgeSnapshot, history: &History) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(area);

    // Left: Ethereum and Sui activity
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(0)])
        .split(columns[0]);

    let queries = &snapshot.eth.queries;
    let eth_rows = [
        ("eth_blockNumber", queries.block_number),
        ("eth_call", queries.call),
        ("eth_chainId", queries.chain_id),
        ("eth_getBlockByNumber", queries.get_block_by_number),
        ("eth_getTransactionReceipt", queries.get_transaction_receipt),
    ];
    frame.render_widget(
        counter_table(" Ethereum RPC Queries ", "Method", &eth_rows),
        left[0],
    );

    let requests = &snapshot.sui.handle_add_tokens_on_sui;
    let sui_rows = [
        ("received", requests.received),
        ("ok", requests.ok),
        ("inflight", requests.inflight),
    ];
    frame.render_widget(
        counter_table(" Sui handle_add_tokens_on_sui ", "Requests", &sui_rows),
        left[1],
    );

    // Middle: watchers and verifier caches
    let middle = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(0)])
        .split(columns[1]);

    render_watchers(frame, middle[0], snapshot);
    render_cache_details(frame, middle[1], snapshot);

    // Right: trends
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(columns[2]);

    let gas: Vec<u64> = history
        .series(|s| s.client.gas_coin_balance)
        .into_iter()
        .map(|(_, mist)| (gas_balance_sui(mist) * 100.0).round() as u64)
        .collect();
    let gas_chart = Sparkline::default()
        .block(
            Block::default()
                .title(format!(" Gas Balance ({} pts) ", gas.len()))
                .borders(Borders::ALL),
        )
        .data(&gas)
        .style(Style::default().fg(Color::Yellow));
    frame.render_widget(gas_chart, right[0]);

    let ratios: Vec<u64> = cache_ratio_series(history)
        .into_iter()
        .map(|(_, ratio)| ratio.round() as u64)
        .collect();
    let ratio_chart = Sparkline::default()
        .block(
            Block::default()
                .title(" Cache Hit Ratio % ")
                .borders(Borders::ALL),
        )
        .data(&ratios)
        .max(100)
        .style(Style::default().fg(Color::Green));
    frame.render_widget(ratio_chart, right[1]);
}

fn counter_table<'a>(title: &'a str, label: &'a str, rows: &[(&'a str, f64)]) -> Table<'a> {
    let rows: Vec<Row> = rows
        .iter()
        .map(|(name, value)| {
            Row::new(vec![
                Cell::from(*name),
                Cell::from(format_count(*value)).style(Style::default().fg(Color::White)),
            ])
        })
        .collect();

    Table::new(rows, [Constraint::Percentage(65), Constraint::Percentage(35)])
        .header(
            Row::new(vec![label, "Count"])
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().title(title).borders(Borders::ALL))
}

fn render_watchers(frame: &mut Frame, area: Rect, snapshot: &BridgeSnapshot) {
    let client = &snapshot.client;
    let watcher_row = |name: &'static str, w: &bridge_monitor::core::bridge_metrics::WatcherActivity| {
        Row::new(vec![
            Cell::from(name),
            Cell::from(format_count(w.received_actions)),
            Cell::from(format_count(w.received_events)),
            Cell::from(format_count(w.unrecognized_events)).style(if w.unrecognized_events > 0.0 {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            }),
        ])
    };

    let rows = vec![
        watcher_row("ETH", &client.eth_watcher),
        watcher_row("SUI", &client.sui_watcher),
        Row::new(vec![
            Cell::from("Last ETH block"),
            Cell::from(format_count(client.last_finalized_eth_block)),
            Cell::from(""),
            Cell::from(""),
        ]),
    ];

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(31),
            Constraint::Percentage(23),
            Constraint::Percentage(23),
            Constraint::Percentage(23),
        ],
    )
    .header(
        Row::new(vec!["Watcher", "Actions", "Events", "Unrecog."])
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
    )
    .block(Block::default().title(" Watchers ").borders(Borders::ALL));

    frame.render_widget(table, area);
}

fn render_cache_details(frame: &mut Frame, area: Rect, snapshot: &BridgeSnapshot) {
    let mut rows: Vec<Row> = snapshot
        .cache
        .verifiers()
        .iter()
        .map(|(name, counters)| {
            let ratio = cache_hit_ratio(counters.hits, counters.misses);
            Row::new(vec![
                Cell::from(*name),
                Cell::from(format_count(counters.hits)),
                Cell::from(format_count(counters.misses)),
                Cell::from(format_percent(ratio)).style(Style::default().fg(ratio_color(ratio))),
            ])
        })
        .collect();

    let total = snapshot.cache.total();
    let overall = overall_cache_hit_ratio(&snapshot.cache);
    rows.push(
        Row::new(vec![
            Cell::from("Overall"),
            Cell::from(format_count(total.hits)),
            Cell::from(format_count(total.misses)),
            Cell::from(format_percent(overall)),
        ])
        .style(Style::default().add_modifier(Modifier::BOLD)),
    );

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(34),
            Constraint::Percentage(22),
            Constraint::Percentage(22),
            Constraint::Percentage(22),
        ],
    )
    .header(
        Row::new(vec!["Verifier", "Hits", "Misses", "Ratio"])
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
    )
    .block(Block::default().title(" Signer Cache ").borders(Borders::ALL));

    frame.render_widget(table, area);
}
