//! Widget rendering: navigation bar, tables, charts, graph canvas, and the
//! node inspection panel.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Context, Line as CanvasLine};
use ratatui::widgets::{
    Axis, BarChart, Block, Borders, Cell, Chart, Dataset, GraphType, List, ListItem,
    Paragraph, Row, Table, Wrap,
};

use crate::config::EdgeLabelConfig;
use crate::explore::{ExploreState, ExploreView, related_entities};
use crate::format::{dash_opt, format_amount, format_count, format_millions, format_percent};
use crate::model::{
    Agency, AnomalyEntry, GraphResponse, MarketShareEntry, NewEntrant, NodeType, Paginated,
    SoleSourceFlag, SpendingPoint, Vendor,
};
use crate::pages::ListPage;
use crate::query::{QueryCache, QueryKey, QueryResult, QueryStatus};

use super::layout::Positions;
use super::Screen;

const MUTED: Style = Style::new().fg(Color::DarkGray);
const ERROR: Style = Style::new().fg(Color::Red);

pub fn node_color(node_type: &NodeType) -> Color {
    match node_type {
        NodeType::Vendor => Color::Blue,
        NodeType::Agency => Color::Green,
        NodeType::Contract => Color::Yellow,
        NodeType::Other(_) => Color::Gray,
    }
}

// ---------------------------------------------------------------------------
// Chrome
// ---------------------------------------------------------------------------

pub fn header(frame: &mut Frame, area: Rect, screen: Screen) {
    let tabs = [
        (Screen::Dashboard, "F1 Dashboard"),
        (Screen::Vendors, "F2 Vendors"),
        (Screen::Agencies, "F3 Agencies"),
        (Screen::Graph, "F4 Graph"),
        (Screen::Risk, "F5 Risk"),
    ];
    let mut spans = vec![Span::styled(
        " GovGraph ",
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];
    for (tab, label) in tabs {
        let style = if screen == tab || screen.parent() == tab {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            MUTED
        };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(label, style));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

pub fn status_bar(frame: &mut Frame, area: Rect, hint: &str) {
    frame.render_widget(
        Paragraph::new(Span::styled(format!(" {hint}"), MUTED)),
        area,
    );
}

pub fn loading(frame: &mut Frame, area: Rect, text: &str) {
    frame.render_widget(
        Paragraph::new(Span::styled(text, MUTED)).alignment(Alignment::Center),
        area,
    );
}

pub fn error(frame: &mut Frame, area: Rect, message: &str) {
    frame.render_widget(
        Paragraph::new(Span::styled(message, ERROR)).alignment(Alignment::Center),
        area,
    );
}

/// Login screen shown after the session gate redirects.
pub fn login(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(
            "Not signed in.",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
        Line::raw("Obtain a token from your identity provider and run:"),
        Line::from(Span::styled("  govgraph login --token <JWT>", Style::default().fg(Color::Cyan))),
        Line::raw(""),
        Line::from(Span::styled("Press q to quit.", MUTED)),
    ];
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(" Sign in ")),
        centered(area, 60, 8),
    );
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + (area.height - h) / 2,
        width: w,
        height: h,
    }
}

// ---------------------------------------------------------------------------
// List pages
// ---------------------------------------------------------------------------

fn search_box(frame: &mut Frame, area: Rect, draft: &str, title: &str) {
    frame.render_widget(
        Paragraph::new(draft).block(Block::default().borders(Borders::ALL).title(title)),
        area,
    );
}

fn pager_line(page: &ListPage, total: u64) -> Line<'static> {
    let prev_style = if page.can_prev() {
        Style::default().fg(Color::White)
    } else {
        MUTED
    };
    let next_style = if page.can_next(total) {
        Style::default().fg(Color::White)
    } else {
        MUTED
    };
    Line::from(vec![
        Span::styled("← Previous", prev_style),
        Span::styled(format!("  Page {}  ", page.page), MUTED),
        Span::styled("Next →", next_style),
        Span::styled(format!("   {}", page.count_line(total)), MUTED),
    ])
}

pub fn vendors_page(
    frame: &mut Frame,
    area: Rect,
    page: &ListPage,
    cache: &QueryCache,
    cursor: usize,
) {
    let [search_area, body, pager] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(area);
    search_box(frame, search_area, &page.search_draft, " Search vendors ");

    match cache.status(&page.query_key()) {
        None | Some(QueryStatus::Loading) => loading(frame, body, "Loading…"),
        Some(QueryStatus::Failed(_)) => error(frame, body, page.resource.failure_message()),
        Some(QueryStatus::Ready(QueryResult::Vendors(data))) => {
            vendor_table(frame, body, data, cursor);
            frame.render_widget(Paragraph::new(pager_line(page, data.total)), pager);
        }
        Some(QueryStatus::Ready(_)) => error(frame, body, page.resource.failure_message()),
    }
}

fn vendor_table(frame: &mut Frame, area: Rect, data: &Paginated<Vendor>, cursor: usize) {
    let rows = data.items.iter().enumerate().map(|(i, v)| {
        let style = if i == cursor {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        Row::new(vec![
            Cell::from(v.canonical_name.clone()),
            Cell::from(dash_opt(v.uei.as_deref()).to_string()),
            Cell::from(format_percent(v.resolution_confidence)),
            Cell::from(if v.resolved_by_llm { "LLM" } else { "" }),
        ])
        .style(style)
    });
    let table = Table::new(
        rows,
        [
            Constraint::Fill(2),
            Constraint::Length(14),
            Constraint::Length(12),
            Constraint::Length(6),
        ],
    )
    .header(
        Row::new(vec!["Name", "UEI", "Confidence", "LLM"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(table, area);
}

pub fn agencies_page(
    frame: &mut Frame,
    area: Rect,
    page: &ListPage,
    cache: &QueryCache,
    cursor: usize,
) {
    let [search_area, body, pager] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(area);
    search_box(frame, search_area, &page.search_draft, " Search agencies ");

    match cache.status(&page.query_key()) {
        None | Some(QueryStatus::Loading) => loading(frame, body, "Loading…"),
        Some(QueryStatus::Failed(_)) => error(frame, body, page.resource.failure_message()),
        Some(QueryStatus::Ready(QueryResult::Agencies(data))) => {
            agency_table(frame, body, data, cursor);
            frame.render_widget(Paragraph::new(pager_line(page, data.total)), pager);
        }
        Some(QueryStatus::Ready(_)) => error(frame, body, page.resource.failure_message()),
    }
}

fn agency_table(frame: &mut Frame, area: Rect, data: &Paginated<Agency>, cursor: usize) {
    let rows = data.items.iter().enumerate().map(|(i, a)| {
        let style = if i == cursor {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        Row::new(vec![
            Cell::from(a.agency_name.clone()),
            Cell::from(dash_opt(a.agency_code.as_deref()).to_string()),
        ])
        .style(style)
    });
    let table = Table::new(rows, [Constraint::Fill(1), Constraint::Length(14)])
        .header(
            Row::new(vec!["Name", "Agency Code"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(table, area);
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

pub fn dashboard(frame: &mut Frame, area: Rect, cache: &QueryCache, key: &QueryKey) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Top Vendors by Contract Value ");
    let inner = block.inner(area);
    frame.render_widget(block, area);
    match cache.status(key) {
        None | Some(QueryStatus::Loading) => loading(frame, inner, "Loading…"),
        Some(QueryStatus::Failed(_)) => {
            error(frame, inner, "Failed to load market share data.")
        }
        Some(QueryStatus::Ready(QueryResult::MarketShare(data))) => {
            market_share_chart(frame, inner, data)
        }
        Some(QueryStatus::Ready(_)) => error(frame, inner, "Failed to load market share data."),
    }
}

/// Pure mapping from market-share rows to a bar chart; an empty slice draws
/// an empty frame.
pub fn market_share_chart(frame: &mut Frame, area: Rect, data: &[MarketShareEntry]) {
    let bar_width = 9u16;
    let visible = (area.width / (bar_width + 1)) as usize;
    let labeled: Vec<(String, u64)> = data
        .iter()
        .take(visible.max(1))
        .map(|entry| {
            (
                truncate(&entry.canonical_name, bar_width as usize),
                entry.total_obligated.max(0.0) as u64,
            )
        })
        .collect();
    let bars: Vec<(&str, u64)> = labeled.iter().map(|(l, v)| (l.as_str(), *v)).collect();
    let chart = BarChart::default()
        .data(bars.as_slice())
        .bar_width(bar_width)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Blue))
        .value_style(Style::default().fg(Color::White).bg(Color::Blue));
    frame.render_widget(chart, area);
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max.saturating_sub(1)).collect::<String>() + "…"
    }
}

// ---------------------------------------------------------------------------
// Spending chart
// ---------------------------------------------------------------------------

/// Pure mapping from a spending time series to a line chart.
pub fn spending_chart(frame: &mut Frame, area: Rect, data: &[SpendingPoint]) {
    let points: Vec<(f64, f64)> = data
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.total_obligated))
        .collect();
    let max_y = points.iter().map(|&(_, y)| y).fold(0.0f64, f64::max);
    let x_max = (points.len().saturating_sub(1)).max(1) as f64;

    let x_labels: Vec<Span> = match (data.first(), data.last()) {
        (Some(first), Some(last)) if data.len() > 1 => vec![
            Span::styled(first.period.clone(), MUTED),
            Span::styled(last.period.clone(), MUTED),
        ],
        (Some(only), _) => vec![Span::styled(only.period.clone(), MUTED)],
        _ => vec![],
    };
    let y_labels = vec![
        Span::styled(format_millions(0.0), MUTED),
        Span::styled(format_millions(max_y / 2.0), MUTED),
        Span::styled(format_millions(max_y), MUTED),
    ];

    let datasets = vec![
        Dataset::default()
            .name("Total Obligated")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Blue))
            .data(&points),
    ];
    let chart = Chart::new(datasets)
        .x_axis(Axis::default().bounds([0.0, x_max]).labels(x_labels))
        .y_axis(
            Axis::default()
                .bounds([0.0, max_y.max(1.0)])
                .labels(y_labels),
        );
    frame.render_widget(chart, area);
}

// ---------------------------------------------------------------------------
// Risk page
// ---------------------------------------------------------------------------

pub fn risk_page(
    frame: &mut Frame,
    area: Rect,
    cache: &QueryCache,
    keys: &[QueryKey; 3],
) {
    let [spikes_area, entrants_area, sole_area] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
    ])
    .areas(area);

    risk_region(frame, spikes_area, cache, &keys[0], " Award Spikes ", |f, a, r| {
        if let QueryResult::AwardSpikes(rows) = r {
            spikes_table(f, a, rows)
        }
    });
    risk_region(
        frame,
        entrants_area,
        cache,
        &keys[1],
        " New Entrants (last 90 days) ",
        |f, a, r| {
            if let QueryResult::NewEntrants(rows) = r {
                entrants_table(f, a, rows)
            }
        },
    );
    risk_region(
        frame,
        sole_area,
        cache,
        &keys[2],
        " Sole-Source Agencies ",
        |f, a, r| {
            if let QueryResult::SoleSource(rows) = r {
                sole_source_table(f, a, rows)
            }
        },
    );
}

fn risk_region(
    frame: &mut Frame,
    area: Rect,
    cache: &QueryCache,
    key: &QueryKey,
    title: &str,
    draw: impl Fn(&mut Frame, Rect, &QueryResult),
) {
    let block = Block::default().borders(Borders::ALL).title(title.to_string());
    let inner = block.inner(area);
    frame.render_widget(block, area);
    match cache.status(key) {
        None | Some(QueryStatus::Loading) => loading(frame, inner, "Loading…"),
        Some(QueryStatus::Failed(_)) => error(frame, inner, "Failed to load risk data."),
        Some(QueryStatus::Ready(result)) => draw(frame, inner, result),
    }
}

fn spikes_table(frame: &mut Frame, area: Rect, rows: &[AnomalyEntry]) {
    if rows.is_empty() {
        loading(frame, area, "No anomalies detected.");
        return;
    }
    let table = Table::new(
        rows.iter().map(|s| {
            Row::new(vec![
                Cell::from(s.canonical_name.clone()),
                Cell::from(s.contract_id.clone()),
                Cell::from(format_amount(s.obligated_amount)),
                Cell::from(format_amount(s.avg_amount)),
                Cell::from(format!("{:.2}", s.z_score)),
            ])
        }),
        [
            Constraint::Fill(2),
            Constraint::Fill(1),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(8),
        ],
    )
    .header(
        Row::new(vec!["Vendor", "Contract ID", "Amount", "Avg", "Z-Score"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    );
    frame.render_widget(table, area);
}

fn entrants_table(frame: &mut Frame, area: Rect, rows: &[NewEntrant]) {
    if rows.is_empty() {
        loading(frame, area, "No new entrants.");
        return;
    }
    let table = Table::new(
        rows.iter().map(|e| {
            Row::new(vec![
                Cell::from(e.canonical_name.clone()),
                Cell::from(e.first_award.clone()),
                Cell::from(format_count(e.award_count)),
                Cell::from(format_amount(e.total_value)),
            ])
        }),
        [
            Constraint::Fill(2),
            Constraint::Length(12),
            Constraint::Length(8),
            Constraint::Length(12),
        ],
    )
    .header(
        Row::new(vec!["Vendor", "First Award", "Awards", "Total Value"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    );
    frame.render_widget(table, area);
}

fn sole_source_table(frame: &mut Frame, area: Rect, rows: &[SoleSourceFlag]) {
    if rows.is_empty() {
        loading(frame, area, "No sole-source agencies.");
        return;
    }
    let table = Table::new(
        rows.iter().map(|s| {
            Row::new(vec![
                Cell::from(s.agency_name.clone()),
                Cell::from(s.sole_vendor.clone()),
                Cell::from(format_count(s.contracts)),
                Cell::from(format_amount(s.total_spend)),
            ])
        }),
        [
            Constraint::Fill(2),
            Constraint::Fill(2),
            Constraint::Length(10),
            Constraint::Length(12),
        ],
    )
    .header(
        Row::new(vec!["Agency", "Sole Vendor", "Contracts", "Total Spend"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    );
    frame.render_widget(table, area);
}

// ---------------------------------------------------------------------------
// Graph explorer
// ---------------------------------------------------------------------------

/// Render the graph screen. Returns the canvas rect so mouse clicks can be
/// mapped back to node positions.
pub fn graph_page(
    frame: &mut Frame,
    area: Rect,
    explore: &ExploreState,
    cache: &QueryCache,
    edge_labels: &EdgeLabelConfig,
    positions: Option<&Positions>,
    suggestion_cursor: usize,
) -> Rect {
    let [search_area, body] =
        Layout::vertical([Constraint::Length(3), Constraint::Fill(1)]).areas(area);
    let [canvas_area, panel_area] =
        Layout::horizontal([Constraint::Fill(3), Constraint::Fill(1)]).areas(body);

    search_box(
        frame,
        search_area,
        &explore.search_text,
        &format!(
            " Search {} (F6 mode · F7 layout: {}) ",
            explore.mode.label(),
            explore.layout.as_str()
        ),
    );

    match explore.view(cache) {
        ExploreView::Prompt => loading(
            frame,
            canvas_area,
            "Search for a vendor or agency to explore its graph.",
        ),
        ExploreView::Loading => loading(frame, canvas_area, "Loading graph…"),
        ExploreView::Error => error(frame, canvas_area, "Failed to load graph."),
        ExploreView::Loaded(graph) => {
            if graph.nodes.is_empty() {
                loading(frame, canvas_area, "No nodes found.");
            } else if let Some(positions) = positions {
                graph_canvas(frame, canvas_area, graph, positions, explore);
            }
        }
    }

    inspection_panel(frame, panel_area, explore, cache, edge_labels);

    if explore.suggestions_open {
        suggestion_list(frame, search_area, area, explore, suggestion_cursor);
    }
    canvas_area
}

fn suggestion_list(
    frame: &mut Frame,
    search_area: Rect,
    page_area: Rect,
    explore: &ExploreState,
    cursor: usize,
) {
    let height = (explore.suggestions.len() as u16 + 2).min(10);
    let dropdown = Rect {
        x: search_area.x,
        y: search_area.y + search_area.height,
        width: search_area.width.min(60),
        height: height.min(page_area.height.saturating_sub(search_area.height)),
    };
    let items: Vec<ListItem> = explore
        .suggestions
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let style = if i == cursor {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![
                Span::styled(s.name.clone(), style),
                Span::styled(format!("  {}", s.id), MUTED),
            ]))
        })
        .collect();
    frame.render_widget(ratatui::widgets::Clear, dropdown);
    frame.render_widget(
        List::new(items).block(Block::default().borders(Borders::ALL)),
        dropdown,
    );
}

fn graph_canvas(
    frame: &mut Frame,
    area: Rect,
    graph: &GraphResponse,
    positions: &Positions,
    explore: &ExploreState,
) {
    let legend = legend_line(graph);
    let block = Block::default().borders(Borders::ALL).title_bottom(legend);
    let selected_id = explore.selected_node.as_ref().map(|n| n.id.clone());
    let canvas = Canvas::default()
        .block(block)
        .x_bounds([0.0, 1.0])
        .y_bounds([0.0, 1.0])
        .paint(move |ctx| paint_graph(ctx, graph, positions, selected_id.as_deref()));
    frame.render_widget(canvas, area);
}

fn paint_graph(
    ctx: &mut Context,
    graph: &GraphResponse,
    positions: &Positions,
    selected: Option<&str>,
) {
    for edge in &graph.edges {
        // Dangling edges (endpoint missing from the node set) are skipped.
        let (Some(&(x1, y1)), Some(&(x2, y2))) =
            (positions.get(&edge.source), positions.get(&edge.target))
        else {
            continue;
        };
        ctx.draw(&CanvasLine {
            x1,
            y1,
            x2,
            y2,
            color: Color::DarkGray,
        });
    }
    ctx.layer();
    for node in &graph.nodes {
        let Some(&(x, y)) = positions.get(&node.id) else {
            continue;
        };
        let color = node_color(&node.node_type);
        let marker = if selected == Some(node.id.as_str()) {
            "◉"
        } else {
            "●"
        };
        ctx.print(
            x,
            y,
            Line::from(vec![
                Span::styled(marker.to_string(), Style::default().fg(color)),
                Span::styled(truncate(&node.label, 14), Style::default().fg(color)),
            ]),
        );
    }
}

fn legend_line(graph: &GraphResponse) -> Line<'static> {
    let mut spans = vec![Span::raw(" ")];
    for (node_type, count) in graph.legend_counts() {
        spans.push(Span::styled(
            format!("● {node_type}: {count}  "),
            Style::default().fg(node_color(&node_type)),
        ));
    }
    Line::from(spans)
}

fn inspection_panel(
    frame: &mut Frame,
    area: Rect,
    explore: &ExploreState,
    cache: &QueryCache,
    edge_labels: &EdgeLabelConfig,
) {
    let block = Block::default().borders(Borders::ALL).title(" Node ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(selected) = &explore.selected_node else {
        loading(frame, inner, "Click a node to inspect it.");
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(
            selected.label.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            selected.node_type.to_string(),
            Style::default().fg(node_color(&selected.node_type)),
        )),
        Line::raw(""),
    ];

    if let Some(props) = &selected.properties {
        if let Some(cid) = props.get("contract_id").and_then(|v| v.as_str()) {
            lines.push(Line::from(vec![
                Span::styled("Contract: ", MUTED),
                Span::raw(cid.to_string()),
            ]));
        }
        if let Some(desc) = props.get("description").and_then(|v| v.as_str()) {
            lines.push(Line::from(vec![
                Span::styled("Description: ", MUTED),
                Span::raw(desc.to_string()),
            ]));
        }
        if let Some(amount) = props.get("obligated_amount").and_then(|v| v.as_f64()) {
            lines.push(Line::from(vec![
                Span::styled("Obligated: ", MUTED),
                Span::raw(format_amount(amount)),
            ]));
        }
        if let Some(signed) = props.get("signed_date").and_then(|v| v.as_str()) {
            lines.push(Line::from(vec![
                Span::styled("Signed: ", MUTED),
                Span::raw(signed.to_string()),
            ]));
        }
    }

    if selected.node_type == NodeType::Contract {
        if let ExploreView::Loaded(graph) = explore.view(cache) {
            let related = related_entities(graph, &selected.id, edge_labels);
            lines.push(Line::raw(""));
            for (name, value) in [
                ("Vendor", related.vendor),
                ("Awarding agency", related.awarding_agency),
                ("Funding agency", related.funding_agency),
            ] {
                if let Some(value) = value {
                    lines.push(Line::from(vec![
                        Span::styled(format!("{name}: "), MUTED),
                        Span::raw(value),
                    ]));
                }
            }
        }
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

// ---------------------------------------------------------------------------
// Detail pages
// ---------------------------------------------------------------------------

pub fn vendor_detail(
    frame: &mut Frame,
    area: Rect,
    cache: &QueryCache,
    vendor_key: &QueryKey,
    graph_key: &QueryKey,
    positions: Option<&Positions>,
) {
    let [head, body] =
        Layout::vertical([Constraint::Length(4), Constraint::Fill(1)]).areas(area);

    match cache.status(vendor_key) {
        None | Some(QueryStatus::Loading) => loading(frame, head, "Loading…"),
        Some(QueryStatus::Failed(_)) => error(frame, head, "Vendor not found."),
        Some(QueryStatus::Ready(QueryResult::Vendor(vendor))) => {
            let mut meta = vec![
                Span::styled(
                    format!("UEI: {}  ", dash_opt(vendor.uei.as_deref())),
                    MUTED,
                ),
                Span::styled(
                    format!("DUNS: {}  ", dash_opt(vendor.duns.as_deref())),
                    MUTED,
                ),
                Span::styled(
                    format!(
                        "Confidence: {}  ",
                        format_percent(vendor.resolution_confidence)
                    ),
                    MUTED,
                ),
            ];
            if vendor.resolved_by_llm {
                meta.push(Span::styled(
                    "LLM Resolved",
                    Style::default().fg(Color::Magenta),
                ));
            }
            frame.render_widget(
                Paragraph::new(vec![
                    Line::from(Span::styled(
                        vendor.canonical_name.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Line::from(meta),
                ]),
                head,
            );
        }
        Some(QueryStatus::Ready(_)) => error(frame, head, "Vendor not found."),
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Relationship Graph ");
    let inner = block.inner(body);
    frame.render_widget(block, body);
    match cache.status(graph_key) {
        None | Some(QueryStatus::Loading) => loading(frame, inner, "Loading graph…"),
        Some(QueryStatus::Failed(_)) => error(frame, inner, "Failed to load graph."),
        Some(QueryStatus::Ready(QueryResult::Graph(graph))) => {
            if let Some(positions) = positions {
                let canvas = Canvas::default()
                    .x_bounds([0.0, 1.0])
                    .y_bounds([0.0, 1.0])
                    .paint(move |ctx| paint_graph(ctx, graph, positions, None));
                frame.render_widget(canvas, inner);
            }
        }
        Some(QueryStatus::Ready(_)) => error(frame, inner, "Failed to load graph."),
    }
}

pub fn agency_detail(
    frame: &mut Frame,
    area: Rect,
    cache: &QueryCache,
    agency_key: &QueryKey,
    spending_key: &QueryKey,
    period_label: &str,
) {
    let [head, body] =
        Layout::vertical([Constraint::Length(3), Constraint::Fill(1)]).areas(area);

    match cache.status(agency_key) {
        None | Some(QueryStatus::Loading) => loading(frame, head, "Loading…"),
        Some(QueryStatus::Failed(_)) => error(frame, head, "Agency not found."),
        Some(QueryStatus::Ready(QueryResult::Agency(agency))) => {
            frame.render_widget(
                Paragraph::new(vec![
                    Line::from(Span::styled(
                        agency.agency_name.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(
                        dash_opt(agency.agency_code.as_deref()).to_string(),
                        MUTED,
                    )),
                ]),
                head,
            );
        }
        Some(QueryStatus::Ready(_)) => error(frame, head, "Agency not found."),
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Spending Over Time ({period_label}) — p to switch "));
    let inner = block.inner(body);
    frame.render_widget(block, body);
    match cache.status(spending_key) {
        None | Some(QueryStatus::Loading) => loading(frame, inner, "Loading…"),
        Some(QueryStatus::Failed(_)) => error(frame, inner, "Failed to load spending data."),
        Some(QueryStatus::Ready(QueryResult::Spending(data))) => {
            spending_chart(frame, inner, data)
        }
        Some(QueryStatus::Ready(_)) => error(frame, inner, "Failed to load spending data."),
    }
}
