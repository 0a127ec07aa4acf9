//! Builds index server topologies from the server listing payload.
//!
//! The listing has one entry per node, so a multi-node index server shows up
//! once per member. Entries are grouped by cloud id in first-seen order.

use serde::Deserialize;
use serde_json::Value;

use crate::error::IndexServerResult;
use crate::topology::{IndexServerTopology, NodeRecord};

const LISTING_KEY: &str = "listOfCIServer";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListingEntry {
    #[serde(rename = "cloudID")]
    cloud_id: i64,
    #[serde(default)]
    cloud_name: Option<String>,
    #[serde(default)]
    engine_name: Option<String>,
    #[serde(default)]
    server_type: Option<i64>,
    client_name: String,
    #[serde(default)]
    host_name: String,
    #[serde(rename = "cIServerURL", default)]
    server_url: String,
    #[serde(default)]
    base_port: u32,
    client_id: i64,
    #[serde(default)]
    version: Option<String>,
}

impl ListingEntry {
    fn node(&self) -> NodeRecord {
        NodeRecord::new(
            &self.client_name,
            &self.host_name,
            &self.server_url,
            self.base_port,
            self.client_id,
        )
    }
}

/// An index server found in the listing
#[derive(Debug, Clone)]
pub struct IndexServerEntry {
    pub topology: IndexServerTopology,
    /// Distinct role versions reported by the members
    pub versions: Vec<String>,
}

/// Group listing entries into one topology per index server.
///
/// A payload without the listing key means no index servers.
pub fn topologies_from_listing(listing: &Value) -> IndexServerResult<Vec<IndexServerEntry>> {
    let raw = match listing.get(LISTING_KEY) {
        Some(raw) => raw.clone(),
        None => return Ok(Vec::new()),
    };
    let entries: Vec<ListingEntry> = serde_json::from_value(raw)?;

    let mut servers: Vec<IndexServerEntry> = Vec::new();
    for entry in entries {
        match servers
            .iter_mut()
            .find(|s| s.topology.cloud_id() == entry.cloud_id)
        {
            Some(server) => {
                if let Some(version) = &entry.version {
                    if !server.versions.contains(version) {
                        server.versions.push(version.clone());
                    }
                }
                if server.topology.node(&entry.client_name).is_none() {
                    server.topology.push_node(entry.node());
                }
            }
            None => {
                let cloud_name = entry
                    .cloud_name
                    .clone()
                    .unwrap_or_else(|| entry.client_name.clone());
                let engine_name = entry.engine_name.clone().unwrap_or_else(|| cloud_name.clone());
                let topology = IndexServerTopology::new(&engine_name, vec![entry.node()])?
                    .with_cloud_name(&cloud_name)
                    .with_cloud_id(entry.cloud_id)
                    .with_server_type(entry.server_type.unwrap_or_default());
                servers.push(IndexServerEntry {
                    topology,
                    versions: entry.version.iter().cloned().collect(),
                });
            }
        }
    }

    crate::log_topology_info!("Found {} index servers in listing", servers.len());
    Ok(servers)
}

/// Find an index server by engine name
pub fn find_by_name<'a>(
    servers: &'a [IndexServerEntry],
    engine_name: &str,
) -> Option<&'a IndexServerEntry> {
    servers
        .iter()
        .find(|s| s.topology.engine_name() == engine_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(cloud_id: i64, client: &str, version: &str) -> Value {
        json!({
            "cloudID": cloud_id,
            "cloudName": format!("cloud{}", cloud_id),
            "engineName": format!("engine{}", cloud_id),
            "serverType": 5,
            "clientName": client,
            "hostName": format!("{}.corp", client),
            "cIServerURL": format!("http://{}.corp:20000", client),
            "basePort": 20000,
            "clientId": 100,
            "version": version
        })
    }

    #[test]
    fn test_groups_members_by_cloud_id() {
        let listing = json!({
            "listOfCIServer": [
                entry(1, "a", "v1"),
                entry(2, "x", "v1"),
                entry(1, "b", "v2"),
                entry(1, "a", "v2"),
            ]
        });
        let servers = topologies_from_listing(&listing).unwrap();
        assert_eq!(servers.len(), 2);

        let first = &servers[0];
        assert_eq!(first.topology.client_names(), vec!["a", "b"]);
        assert_eq!(
            first.topology.server_urls(),
            vec!["http://a.corp:20000", "http://b.corp:20000"]
        );
        assert_eq!(first.versions, vec!["v1".to_string(), "v2".to_string()]);
        assert!(first.topology.is_cloud());

        assert!(find_by_name(&servers, "engine2").is_some());
        assert!(find_by_name(&servers, "engine3").is_none());
    }

    #[test]
    fn test_missing_listing_is_empty() {
        assert!(topologies_from_listing(&json!({})).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_entry_is_serialization_error() {
        let listing = json!({ "listOfCIServer": [{ "cloudID": "nope" }] });
        assert!(topologies_from_listing(&listing).is_err());
    }
}
