use std::rc::Rc;

use connect::{
    ConnectParams, Connection, ConnectionConfig, ConnectionController, DocumentScope, FrameToken,
    HandleType, ListenerKind, NodeGeometry, PointerEvent, Ports, ScopeId, StartOutcome,
};
use gpui::*;
use gpui::{Context, IntoElement, ParentElement, Render, Styled, Window, canvas, div};
use gpui_component::ActiveTheme;
use tracing::{info, warn};

use crate::edge::GraphEdge;
use crate::node::GraphNode;
use crate::store::{ConnectionStore, FrameQueue, handle_center};
use crate::surface::HandleSurfaces;
use crate::to_f32;

/// Host rule deciding whether a candidate connection may be made, given the
/// connections that already exist.
pub type ConnectionRule = Rc<dyn Fn(&Connection, &[Connection]) -> bool>;

pub struct Graph {
    pub nodes: Vec<Entity<GraphNode>>,
    pub edges: Vec<GraphEdge>,
    pub zoom: f32,
    pub pan: Point<Pixels>,
    pub container_offset: Point<Pixels>,
    pub container_size: Size<Pixels>,
    controller: ConnectionController,
    store: ConnectionStore,
    surfaces: HandleSurfaces,
    frames: FrameQueue,
    rule: ConnectionRule,
    focus_handle: FocusHandle,
}

/// Event emitted when a dragged connection is committed
#[derive(Clone, Debug)]
pub struct ConnectionCreated(pub Connection);

impl EventEmitter<ConnectionCreated> for Graph {}

impl Graph {
    pub fn new(
        cx: &mut Context<Self>,
        nodes: Vec<GraphNode>,
        edges: Vec<GraphEdge>,
        config: ConnectionConfig,
    ) -> Self {
        let zoom = 1.0;
        let pan = point(px(0.0), px(0.0));
        let mut node_entities: Vec<Entity<GraphNode>> = Vec::with_capacity(nodes.len());

        for mut node in nodes {
            node.zoom = zoom;
            node.pan = pan;
            node_entities.push(cx.new(|_| node));
        }

        Self {
            nodes: node_entities,
            edges,
            zoom,
            pan,
            container_offset: point(px(0.0), px(0.0)),
            container_size: size(px(0.0), px(0.0)),
            controller: ConnectionController::new(),
            store: ConnectionStore::new(config),
            surfaces: HandleSurfaces::new(ScopeId(cx.entity_id().as_u64())),
            frames: FrameQueue::default(),
            rule: Rc::new(|_: &Connection, _: &[Connection]| true),
            focus_handle: cx.focus_handle(),
        }
    }

    pub fn set_rule(&mut self, rule: impl Fn(&Connection, &[Connection]) -> bool + 'static) {
        self.rule = Rc::new(rule);
    }

    pub fn is_connecting(&self) -> bool {
        self.controller.is_dragging()
    }

    fn node_geometry(&self, cx: &App) -> Vec<NodeGeometry> {
        self.nodes.iter().map(|n| n.read(cx).geometry()).collect()
    }

    fn transform(&self) -> connect::Transform {
        connect::Transform::new(to_f32(self.pan.x), to_f32(self.pan.y), self.zoom)
    }

    /// Snapshots node geometry, handle hit areas and container bounds for a new gesture
    fn sync_geometry(&mut self, cx: &App) {
        let geometry = self.node_geometry(cx);
        let transform = self.transform();
        let origin = connect::point(to_f32(self.container_offset.x), to_f32(self.container_offset.y));

        let mut surfaces = Vec::new();
        for node in &geometry {
            let Some(bounds) = &node.handle_bounds else {
                continue;
            };
            for handle_type in [HandleType::Source, HandleType::Target] {
                for bound in bounds.of_type(handle_type) {
                    let corner = node.position + connect::point(bound.x, bound.y);
                    let top_left = origin + transform.to_renderer(corner);
                    let rect = connect::Rect::new(
                        top_left.x,
                        top_left.y,
                        bound.width * self.zoom,
                        bound.height * self.zoom,
                    );
                    let key = connect::HandleKey::new(node.id.clone(), bound.id.as_deref(), handle_type);
                    surfaces.push((key, rect));
                }
            }
        }
        self.surfaces.set_surfaces(surfaces);

        let width = to_f32(self.container_size.width);
        let height = to_f32(self.container_size.height);
        self.store.bounds =
            (width > 0.0 && height > 0.0).then(|| connect::Rect::new(origin.x, origin.y, width, height));
        self.store.transform = transform;
        self.store.set_nodes(geometry);
    }

    fn sync_markers(&self, cx: &mut Context<Self>) {
        for node in &self.nodes {
            let markers: Vec<_> = {
                let n = node.read(cx);
                n.handles
                    .iter()
                    .map(|h| self.surfaces.marker(&n.handle_key(h)))
                    .collect()
            };
            cx.update_entity(node, move |n, _| {
                for (handle, marker) in n.handles.iter_mut().zip(markers) {
                    handle.marker = marker;
                }
            });
        }
    }

    fn apply_pan(&mut self, cx: &mut Context<Self>) {
        let Some(delta) = self.store.take_pan() else {
            return;
        };
        self.pan = point(self.pan.x + px(delta.x), self.pan.y + px(delta.y));
        let pan = self.pan;
        for node in &self.nodes {
            cx.update_entity(node, move |n, _| n.pan = pan);
        }
    }

    fn on_pointer_down(&mut self, position: Point<Pixels>, window: &mut Window, cx: &mut Context<Self>) {
        if self.controller.is_dragging() {
            return;
        }
        self.sync_geometry(cx);

        let at = connect::point(to_f32(position.x), to_f32(position.y));
        let Some(key) = self.surfaces.handle_at(at) else {
            return;
        };

        let existing: Vec<Connection> = self.edges.iter().map(|e| e.connection.clone()).collect();
        let rule = self.rule.clone();
        let params = ConnectParams::new(key.node_id.clone(), key.handle_id.as_deref())
            .target(key.handle_type == HandleType::Target)
            .validator(move |candidate| rule(candidate, &existing));

        let event = PointerEvent::mouse(self.surfaces.scope(), at);
        let mut ports = Ports {
            state: &mut self.store,
            scopes: &mut self.surfaces,
            frames: &mut self.frames,
        };
        match self.controller.pointer_down(&event, params, &mut ports) {
            Ok(StartOutcome::Started) => {
                window.focus(&self.focus_handle);
                cx.stop_propagation();
            }
            Ok(StartOutcome::NotAHandle) => {}
            Err(err) => warn!(%err, "could not start connection"),
        }
        cx.notify();
    }

    fn on_pointer_move(&mut self, position: Point<Pixels>, cx: &mut Context<Self>) {
        if !self.controller.is_dragging() {
            return;
        }
        let event = PointerEvent::mouse(
            self.surfaces.scope(),
            connect::point(to_f32(position.x), to_f32(position.y)),
        );
        let mut ports = Ports {
            state: &mut self.store,
            scopes: &mut self.surfaces,
            frames: &mut self.frames,
        };
        self.controller.pointer_move(&event, &mut ports);
        self.apply_pan(cx);
        self.sync_markers(cx);
        cx.notify();
    }

    fn on_pointer_up(&mut self, position: Point<Pixels>, cx: &mut Context<Self>) {
        if !self.controller.is_dragging() {
            return;
        }
        let event = PointerEvent::mouse(
            self.surfaces.scope(),
            connect::point(to_f32(position.x), to_f32(position.y)),
        );
        let mut ports = Ports {
            state: &mut self.store,
            scopes: &mut self.surfaces,
            frames: &mut self.frames,
        };
        let committed = self.controller.pointer_up(&event, &mut ports);
        self.apply_pan(cx);
        self.sync_markers(cx);

        if let Some(connection) = committed {
            info!(
                source = %connection.source,
                target = %connection.target,
                "connection created"
            );
            self.edges.push(GraphEdge::from(connection.clone()));
            cx.emit(ConnectionCreated(connection));
        }
        cx.notify();
    }

    fn on_frame(&mut self, token: FrameToken, cx: &mut Context<Self>) {
        let mut ports = Ports {
            state: &mut self.store,
            scopes: &mut self.surfaces,
            frames: &mut self.frames,
        };
        if self.controller.frame(token, &mut ports) {
            self.apply_pan(cx);
            cx.notify();
        }
    }

    pub fn cancel_connection(&mut self, cx: &mut Context<Self>) {
        let mut ports = Ports {
            state: &mut self.store,
            scopes: &mut self.surfaces,
            frames: &mut self.frames,
        };
        if self.controller.cancel(&mut ports) {
            self.sync_markers(cx);
            cx.notify();
        }
    }
}

/// Appends a thick line segment as two triangles
fn draw_segment(path: &mut gpui::Path<Pixels>, p1: Point<Pixels>, p2: Point<Pixels>, half_thickness: f32) {
    let dir = point(p2.x - p1.x, p2.y - p1.y);
    let len = dir.magnitude() as f32;
    if len <= 0.0001 {
        return;
    }
    let normal = point(-dir.y, dir.x) * (half_thickness / len);

    let p1a = point(p1.x + normal.x, p1.y + normal.y);
    let p1b = point(p1.x - normal.x, p1.y - normal.y);
    let p2a = point(p2.x + normal.x, p2.y + normal.y);
    let p2b = point(p2.x - normal.x, p2.y - normal.y);

    let st = (point(0., 1.), point(0., 1.), point(0., 1.));
    path.push_triangle((p1a, p1b, p2a), st);
    path.push_triangle((p2a, p1b, p2b), st);
}

impl Render for Graph {
    fn render(&mut self, window: &mut Window, graph_cx: &mut Context<Self>) -> impl IntoElement {
        let graph_entity = graph_cx.entity();

        let tracked = graph_entity.clone();
        let bounds_tracker = canvas(
            |_bounds, _window, _cx| (),
            move |bounds, _state, _window, cx| {
                cx.update_entity(&tracked, |graph, _| {
                    graph.container_offset = bounds.origin;
                    graph.container_size = bounds.size;
                });
            },
        )
        .absolute()
        .size_full();

        // Committed edges and the in-progress connection line
        let transform = self.transform();
        let zoom = self.zoom;
        let geometry = self.node_geometry(graph_cx);
        let edges = self.edges.clone();
        let line = self.store.connection().cloned();
        let line_color = graph_cx.theme().ring;
        let edges_canvas = canvas(
            |_bounds, _window, _cx| (),
            move |bounds, _state, window, _cx| {
                let offset = bounds.origin;
                let half_thickness = (1.0f32 * zoom).max(1.0) / 2.0;
                let to_pixels = |p: connect::Point| point(offset.x + px(p.x), offset.y + px(p.y));

                let mut edge_path = gpui::Path::new(offset);
                for edge in &edges {
                    let (Some(from), Some(to)) = (
                        handle_center(&geometry, &edge.source_key()),
                        handle_center(&geometry, &edge.target_key()),
                    ) else {
                        continue;
                    };
                    draw_segment(
                        &mut edge_path,
                        to_pixels(transform.to_renderer(from)),
                        to_pixels(transform.to_renderer(to)),
                        half_thickness,
                    );
                }
                window.paint_path(edge_path, rgb(0x323232));

                if let Some(line) = &line {
                    if let Some(from) = handle_center(&geometry, &line.from) {
                        let mut line_path = gpui::Path::new(offset);
                        draw_segment(
                            &mut line_path,
                            to_pixels(transform.to_renderer(from)),
                            to_pixels(line.position),
                            half_thickness * 2.0,
                        );
                        window.paint_path(line_path, line_color);
                    }
                }
            },
        )
        .absolute()
        .size_full();

        // Each auto-pan token gets exactly one next-frame callback, however
        // often the view re-renders in between.
        if let Some(token) = self.frames.schedule() {
            graph_cx.on_next_frame(window, move |graph, _window, cx| graph.on_frame(token, cx));
        }

        // Window-level pointer listeners exist only while the gesture holds them
        let listen_move = self.surfaces.is_listening(ListenerKind::MouseMove);
        let listen_up = self.surfaces.is_listening(ListenerKind::MouseUp);
        let pointer_canvas = canvas(
            |_bounds, _window, _cx| (),
            move |_bounds, _state, window, _cx| {
                if listen_move {
                    let graph = graph_entity.clone();
                    window.on_mouse_event(move |e: &MouseMoveEvent, phase, _window, cx| {
                        if phase == DispatchPhase::Bubble {
                            graph.update(cx, |graph, cx| graph.on_pointer_move(e.position, cx));
                        }
                    });
                }
                if listen_up {
                    let graph = graph_entity.clone();
                    window.on_mouse_event(move |e: &MouseUpEvent, phase, _window, cx| {
                        if phase == DispatchPhase::Bubble && e.button == MouseButton::Left {
                            graph.update(cx, |graph, cx| graph.on_pointer_up(e.position, cx));
                        }
                    });
                }
            },
        )
        .absolute()
        .size_full();

        // Node entities render above edges
        let graph_canvas = div()
            .relative()
            .size_full()
            .child(bounds_tracker)
            .child(edges_canvas)
            .children(self.nodes.iter().cloned())
            .child(pointer_canvas);

        div()
            .size_full()
            .track_focus(&self.focus_handle)
            .cursor(gpui::CursorStyle::Arrow)
            .on_mouse_down(
                gpui::MouseButton::Left,
                graph_cx.listener(|this, e: &gpui::MouseDownEvent, window, cx| {
                    this.on_pointer_down(e.position, window, cx);
                }),
            )
            .on_key_down(graph_cx.listener(|this, e: &gpui::KeyDownEvent, _window, cx| {
                if e.keystroke.key == "escape" {
                    this.cancel_connection(cx);
                }
            }))
            .child(graph_canvas)
    }
}
