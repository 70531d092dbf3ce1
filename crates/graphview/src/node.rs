use connect::{HandleBound, HandleBounds, HandleKey, HandleType, NodeGeometry, NodeId};
use gpui::div;
use gpui::*;
use gpui_component::ActiveTheme;

use crate::surface::HandleMarker;
use crate::to_f32;

const HEADER_HEIGHT: f32 = 28.0;
const PORT_SIZE: f32 = 10.0;
const ROW_HEIGHT: f32 = 18.0;

#[derive(Clone, Debug)]
pub struct NodeHandle {
    pub id: String,
    pub handle_type: HandleType,
    pub marker: HandleMarker,
}

/// A diagram node with target handles on its left edge and source handles on its right
pub struct GraphNode {
    pub id: NodeId,
    pub name: String,
    pub node_type: String,
    pub x: Pixels,
    pub y: Pixels,
    pub zoom: f32,
    pub pan: Point<Pixels>,
    pub handles: Vec<NodeHandle>,
}

impl GraphNode {
    pub fn new(id: impl Into<NodeId>, name: impl Into<String>, node_type: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            node_type: node_type.into(),
            x: px(x),
            y: px(y),
            zoom: 1.0,
            pan: point(px(0.0), px(0.0)),
            handles: Vec::new(),
        }
    }

    pub fn with_handle(mut self, id: impl Into<String>, handle_type: HandleType) -> Self {
        self.handles.push(NodeHandle {
            id: id.into(),
            handle_type,
            marker: HandleMarker::default(),
        });
        self
    }

    pub fn handle_key(&self, handle: &NodeHandle) -> HandleKey {
        HandleKey::new(self.id.clone(), Some(&handle.id), handle.handle_type)
    }

    /// Width from the label, height from the longer handle column
    pub fn size(&self) -> (f32, f32) {
        let char_width = 7.2f32;
        let padding = 24.0f32;
        let name_width = self.name.len() as f32 * char_width + padding;
        let type_width = self.node_type.len() as f32 * 6.0 + 40.0;
        let width = name_width.max(type_width).max(120.0);

        let rows = [HandleType::Target, HandleType::Source]
            .iter()
            .map(|t| self.handles.iter().filter(|h| h.handle_type == *t).count())
            .max()
            .unwrap_or(0)
            .max(1);
        let height = HEADER_HEIGHT + (rows - 1) as f32 * ROW_HEIGHT;
        (width, height)
    }

    /// Handle rectangles relative to the node origin, unzoomed
    pub fn handle_bounds(&self) -> HandleBounds {
        let (width, _) = self.size();
        let mut bounds = HandleBounds::default();
        for handle in &self.handles {
            let column = match handle.handle_type {
                HandleType::Source => &mut bounds.source,
                HandleType::Target => &mut bounds.target,
            };
            let x = match handle.handle_type {
                HandleType::Source => width - PORT_SIZE / 2.0,
                HandleType::Target => -PORT_SIZE / 2.0,
            };
            let y = (HEADER_HEIGHT - PORT_SIZE) / 2.0 + column.len() as f32 * ROW_HEIGHT;
            column.push(HandleBound {
                id: Some(handle.id.clone()),
                x,
                y,
                width: PORT_SIZE,
                height: PORT_SIZE,
            });
        }
        bounds
    }

    pub fn geometry(&self) -> NodeGeometry {
        NodeGeometry {
            id: self.id.clone(),
            position: connect::point(to_f32(self.x), to_f32(self.y)),
            handle_bounds: Some(self.handle_bounds()),
        }
    }

    fn port_color(handle: &NodeHandle) -> Rgba {
        match (handle.marker.connecting, handle.marker.valid) {
            (true, Some(true)) => rgb(0x4caf50),
            (true, Some(false)) => rgb(0xe53935),
            _ => match handle.handle_type {
                HandleType::Target => rgb(0x4488ff),
                HandleType::Source => rgb(0xff8844),
            },
        }
    }
}

impl Render for GraphNode {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let zoom = self.zoom;
        let text_color = cx.theme().foreground;
        let border_color = cx.theme().border;
        let bg_color = cx.theme().secondary;

        let (node_width, node_height) = self.size();

        let header = div()
            .w_full()
            .px(px(8.0 * zoom))
            .py(px(4.0 * zoom))
            .flex()
            .items_center()
            .gap(px(8.0 * zoom))
            .child(
                div()
                    .px(px(4.0 * zoom))
                    .py(px(1.0 * zoom))
                    .bg(rgb(0x4a4a4a))
                    .rounded(px(2.0 * zoom))
                    .text_size(px(9.0 * zoom))
                    .text_color(rgb(0xaaaaaa))
                    .child(format!("«{}»", self.node_type)),
            )
            .child(
                div()
                    .text_size(px(11.0 * zoom))
                    .text_color(text_color)
                    .font_weight(FontWeight::MEDIUM)
                    .child(self.name.clone()),
            );

        let node_body = div()
            .w(px(node_width * zoom))
            .h(px(node_height * zoom))
            .bg(bg_color)
            .border(px(2.0))
            .border_color(border_color)
            .rounded(px(4.0 * zoom))
            .shadow_sm()
            .flex()
            .flex_col()
            .child(header);

        let bounds = self.handle_bounds();
        let ports = [HandleType::Target, HandleType::Source]
            .into_iter()
            .flat_map(|handle_type| {
                let handles = self.handles.iter().filter(move |h| h.handle_type == handle_type);
                handles.zip(bounds.of_type(handle_type))
            })
            .map(|(handle, bound)| {
                div()
                    .absolute()
                    .left(px(bound.x * zoom))
                    .top(px(bound.y * zoom))
                    .size(px(bound.width * zoom))
                    .bg(Self::port_color(handle))
                    .border(px(1.0))
                    .border_color(border_color)
                    .rounded(px(2.0 * zoom))
                    .cursor_crosshair()
            })
            .collect::<Vec<_>>();

        div()
            .absolute()
            .left(self.pan.x + self.x * zoom)
            .top(self.pan.y + self.y * zoom)
            .child(div().relative().child(node_body).children(ports))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node() -> GraphNode {
        GraphNode::new("a", "Filter", "op", 100.0, 50.0)
            .with_handle("in", HandleType::Target)
            .with_handle("aux", HandleType::Target)
            .with_handle("out", HandleType::Source)
    }

    #[test]
    fn handles_stack_per_side() {
        let node = node();
        let (width, height) = node.size();
        assert_eq!(height, HEADER_HEIGHT + ROW_HEIGHT);

        let bounds = node.handle_bounds();
        assert_eq!(bounds.target.len(), 2);
        assert_eq!(bounds.source.len(), 1);
        assert_eq!(bounds.target[0].x, -PORT_SIZE / 2.0);
        assert_eq!(bounds.target[1].y - bounds.target[0].y, ROW_HEIGHT);
        assert_eq!(bounds.source[0].x, width - PORT_SIZE / 2.0);
        assert_eq!(bounds.source[0].id.as_deref(), Some("out"));
    }

    #[test]
    fn geometry_carries_position_and_bounds() {
        let geometry = node().geometry();
        assert_eq!(geometry.id, "a");
        assert_eq!(geometry.position, connect::point(100.0, 50.0));
        assert!(geometry.handle_bounds.is_some());
    }

    #[test]
    fn marker_colors_take_precedence() {
        let mut handle = NodeHandle {
            id: "in".into(),
            handle_type: HandleType::Target,
            marker: HandleMarker::default(),
        };
        assert_eq!(GraphNode::port_color(&handle), rgb(0x4488ff));
        handle.marker = HandleMarker {
            connecting: true,
            valid: Some(false),
        };
        assert_eq!(GraphNode::port_color(&handle), rgb(0xe53935));
        handle.marker.valid = Some(true);
        assert_eq!(GraphNode::port_color(&handle), rgb(0x4caf50));
    }
}
