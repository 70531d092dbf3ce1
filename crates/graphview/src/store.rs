use connect::{
    ConnectStartParams, ConnectionConfig, ConnectionStart, DiagramState, FrameScheduler, FrameToken,
    HandleKey, NodeGeometry, Point, PointerEvent, Rect, Transform,
};
use tracing::debug;

/// The in-progress connection line as seen by the renderer
#[derive(Clone, Debug, PartialEq)]
pub struct ConnectionLine {
    pub from: HandleKey,
    /// Container-relative position of the loose end
    pub position: Point,
}

/// Diagram state shared between the graph view and the connection controller
#[derive(Debug, Default)]
pub struct ConnectionStore {
    pub config: ConnectionConfig,
    pub bounds: Option<Rect>,
    pub transform: Transform,
    nodes: Vec<NodeGeometry>,
    connection: Option<ConnectionLine>,
    pending_pan: Option<Point>,
}

impl ConnectionStore {
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn set_nodes(&mut self, nodes: Vec<NodeGeometry>) {
        self.nodes = nodes;
    }

    pub fn connection(&self) -> Option<&ConnectionLine> {
        self.connection.as_ref()
    }

    /// Pan accumulated since the last call
    pub fn take_pan(&mut self) -> Option<Point> {
        self.pending_pan.take()
    }
}

/// Center of a handle in diagram space
pub fn handle_center(nodes: &[NodeGeometry], key: &HandleKey) -> Option<Point> {
    let node = nodes.iter().find(|n| n.id == key.node_id)?;
    let bound = node
        .handle_bounds
        .as_ref()?
        .of_type(key.handle_type)
        .iter()
        .find(|b| b.id == key.handle_id)?;
    Some(node.position + bound.center())
}

impl DiagramState for ConnectionStore {
    fn config(&self) -> ConnectionConfig {
        self.config
    }

    fn container_bounds(&self) -> Option<Rect> {
        self.bounds
    }

    fn transform(&self) -> Transform {
        self.transform
    }

    fn nodes(&self) -> &[NodeGeometry] {
        &self.nodes
    }

    fn start_connection(&mut self, start: ConnectionStart) {
        self.connection = Some(ConnectionLine {
            from: HandleKey {
                node_id: start.node_id,
                handle_id: start.handle_id,
                handle_type: start.handle_type,
            },
            position: start.position,
        });
    }

    fn set_connection_position(&mut self, position: Point) {
        if let Some(line) = self.connection.as_mut() {
            line.position = position;
        }
    }

    fn pan_by(&mut self, delta: Point) {
        self.transform.pan_x += delta.x;
        self.transform.pan_y += delta.y;
        let pending = self.pending_pan.unwrap_or_default();
        self.pending_pan = Some(pending + delta);
    }

    fn cancel_connection(&mut self) {
        self.connection = None;
    }

    fn on_connect_start(&mut self, _event: &PointerEvent, params: &ConnectStartParams) {
        debug!(node_id = %params.node_id, handle_type = %params.handle_type, "connect start");
    }

    fn on_connect_end(&mut self, event: &PointerEvent) {
        debug!(x = event.position.x, y = event.position.y, "connect end");
    }
}

/// Animation-frame tokens for the auto-pan loop
#[derive(Debug, Default)]
pub struct FrameQueue {
    next: u64,
    pending: Option<FrameToken>,
    scheduled: Option<FrameToken>,
}

impl FrameQueue {
    pub fn pending(&self) -> Option<FrameToken> {
        self.pending
    }

    /// The pending token if it has not been handed to the window yet
    pub fn schedule(&mut self) -> Option<FrameToken> {
        let token = self.pending?;
        if self.scheduled == Some(token) {
            return None;
        }
        self.scheduled = Some(token);
        Some(token)
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&mut self) -> FrameToken {
        self.next += 1;
        let token = FrameToken(self.next);
        self.pending = Some(token);
        token
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        if self.pending == Some(token) {
            self.pending = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use connect::{HandleBound, HandleBounds, HandleType, point};

    #[test]
    fn pan_accumulates_until_taken() {
        let mut store = ConnectionStore::default();
        store.pan_by(point(2.0, 0.0));
        store.pan_by(point(3.0, -1.0));
        assert_eq!(store.transform.pan_x, 5.0);
        assert_eq!(store.transform.pan_y, -1.0);
        assert_eq!(store.take_pan(), Some(point(5.0, -1.0)));
        assert_eq!(store.take_pan(), None);
    }

    #[test]
    fn connection_line_lives_from_start_to_cancel() {
        let mut store = ConnectionStore::default();
        store.set_connection_position(point(1.0, 1.0));
        assert!(store.connection().is_none());

        store.start_connection(ConnectionStart {
            position: point(10.0, 10.0),
            node_id: "a".into(),
            handle_id: Some("out".into()),
            handle_type: HandleType::Source,
        });
        store.set_connection_position(point(40.0, 12.0));
        assert_eq!(store.connection().map(|l| l.position), Some(point(40.0, 12.0)));

        store.cancel_connection();
        assert!(store.connection().is_none());
    }

    #[test]
    fn cancelling_a_stale_frame_keeps_the_pending_one() {
        let mut frames = FrameQueue::default();
        let first = frames.request_frame();
        let second = frames.request_frame();
        frames.cancel_frame(first);
        assert_eq!(frames.pending(), Some(second));
        frames.cancel_frame(second);
        assert_eq!(frames.pending(), None);
    }

    #[test]
    fn each_token_is_scheduled_once() {
        let mut frames = FrameQueue::default();
        assert_eq!(frames.schedule(), None);

        let first = frames.request_frame();
        assert_eq!(frames.schedule(), Some(first));
        // re-renders before the frame fires do not tick again
        assert_eq!(frames.schedule(), None);
        assert_eq!(frames.schedule(), None);

        let second = frames.request_frame();
        assert_eq!(frames.schedule(), Some(second));
        frames.cancel_frame(second);
        assert_eq!(frames.schedule(), None);
    }

    #[test]
    fn handle_center_resolves_by_identity() {
        let nodes = vec![NodeGeometry {
            id: "a".into(),
            position: point(100.0, 50.0),
            handle_bounds: Some(HandleBounds {
                source: vec![HandleBound {
                    id: Some("out".into()),
                    x: 115.0,
                    y: 9.0,
                    width: 10.0,
                    height: 10.0,
                }],
                target: Vec::new(),
            }),
        }];
        let key = HandleKey::new("a", Some("out"), HandleType::Source);
        assert_eq!(handle_center(&nodes, &key), Some(point(220.0, 64.0)));
        let missing = HandleKey::new("a", Some("out"), HandleType::Target);
        assert_eq!(handle_center(&nodes, &missing), None);
    }
}
