use anyhow::Context as _;
use gpui::*;
use gpui_component::ActiveTheme;
use gpui_component_assets::Assets;
use graphview::{ConnectionCreated, Graph};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod diagram;
mod rules;

use diagram::{Diagram, parse_diagram};

const EXAMPLE: &str = include_str!("../assets/diagram.kdl");

pub struct Viewer {
    graph: Entity<Graph>,
    _subscriptions: Vec<Subscription>,
}

impl Viewer {
    fn new(diagram: Diagram, cx: &mut Context<Self>) -> Self {
        let Diagram {
            config,
            nodes,
            edges,
        } = diagram;
        let graph = cx.new(|cx| {
            let mut graph = Graph::new(cx, nodes, edges, config);
            graph.set_rule(rules::is_valid_connection);
            graph
        });

        let _subscriptions = vec![cx.subscribe(&graph, |_this, graph, event: &ConnectionCreated, cx| {
            let ConnectionCreated(connection) = event;
            info!(
                source = %connection.source,
                target = %connection.target,
                edges = graph.read(cx).edges.len(),
                "diagram updated"
            );
        })];

        Self {
            graph,
            _subscriptions,
        }
    }
}

impl Render for Viewer {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        div()
            .id("graph")
            .relative()
            .size_full()
            .overflow_hidden()
            .bg(cx.theme().background)
            .child(self.graph.clone())
    }
}

/// Reads the diagram named on the command line, or the bundled example
fn load_diagram() -> anyhow::Result<Diagram> {
    match std::env::args().nth(1) {
        Some(path) => {
            let content =
                std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            parse_diagram(&content).with_context(|| format!("parsing {path}"))
        }
        None => parse_diagram(EXAMPLE).context("parsing bundled diagram"),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,connect=debug")),
        )
        .init();

    let diagram = load_diagram()?;
    info!(
        nodes = diagram.nodes.len(),
        edges = diagram.edges.len(),
        mode = ?diagram.config.connection_mode,
        "diagram loaded"
    );

    let app = Application::new().with_assets(Assets);
    app.run(move |cx| {
        gpui_component::init(cx);
        cx.activate(true);

        let options = WindowOptions {
            app_id: Some("nodewire".to_string()),
            ..Default::default()
        };
        if let Err(err) = cx.open_window(options, |_, cx| cx.new(|cx| Viewer::new(diagram, cx))) {
            error!(%err, "failed to open window");
            cx.quit();
        }
    });
    Ok(())
}
