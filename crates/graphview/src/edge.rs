use connect::{Connection, HandleKey, HandleType};

/// A committed edge between two handles
#[derive(Clone, Debug, PartialEq)]
pub struct GraphEdge {
    pub connection: Connection,
}

impl GraphEdge {
    pub fn new(source: &str, source_handle: Option<&str>, target: &str, target_handle: Option<&str>) -> Self {
        Self {
            connection: Connection {
                source: source.to_string(),
                source_handle: source_handle.map(str::to_string),
                target: target.to_string(),
                target_handle: target_handle.map(str::to_string),
            },
        }
    }

    pub fn source_key(&self) -> HandleKey {
        HandleKey {
            node_id: self.connection.source.clone(),
            handle_id: self.connection.source_handle.clone(),
            handle_type: HandleType::Source,
        }
    }

    pub fn target_key(&self) -> HandleKey {
        HandleKey {
            node_id: self.connection.target.clone(),
            handle_id: self.connection.target_handle.clone(),
            handle_type: HandleType::Target,
        }
    }
}

impl From<Connection> for GraphEdge {
    fn from(connection: Connection) -> Self {
        Self { connection }
    }
}
