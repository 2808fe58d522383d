//! MVP records as returned by the divine-pride monster API and written to
//! the `mvps_data.json` sink.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One place an MVP spawns, and how long it takes to come back.
///
/// The remote API spells the map field `mapname`; the sink uses `mapName`.
/// Both are accepted on input, the canonical form is written on output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnPoint {
    #[serde(rename = "mapName", alias = "mapname")]
    pub map_name: String,
    /// Respawn interval in seconds. Zero means no periodic respawn.
    #[serde(rename = "respawnTime")]
    pub respawn_time: u32,
}

/// One boss monster's detail payload.
///
/// The API returns spawn locations under `spawn`; the sink writes them under
/// `maps`. Stats keep their source key order (serde_json `preserve_order`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mvp {
    pub id: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dbname: Option<String>,
    #[serde(rename = "maps", alias = "spawn", default)]
    pub maps: Vec<SpawnPoint>,
    #[serde(default)]
    pub stats: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_remote_field_names() {
        let json = r#"{
            "id": 1039,
            "name": "Baphomet",
            "dbname": "BAPHOMET",
            "spawn": [{"mapname": "prt_maze03", "respawnTime": 7200}],
            "stats": {"level": 81, "health": 668000}
        }"#;

        let mvp: Mvp = serde_json::from_str(json).unwrap();
        assert_eq!(mvp.id, 1039);
        assert_eq!(mvp.maps.len(), 1);
        assert_eq!(mvp.maps[0].map_name, "prt_maze03");
        assert_eq!(mvp.maps[0].respawn_time, 7200);
        assert_eq!(mvp.stats["level"], 81);
    }

    #[test]
    fn sink_round_trip_is_lossless() {
        let mvps = vec![Mvp {
            id: 1046,
            name: "Doppelganger".to_string(),
            dbname: Some("DOPPELGANGER".to_string()),
            maps: vec![SpawnPoint {
                map_name: "gef_dun02".to_string(),
                respawn_time: 7200,
            }],
            stats: {
                let mut stats = Map::new();
                stats.insert("level".to_string(), 77.into());
                stats.insert("health".to_string(), 249000.into());
                stats
            },
        }];

        let json = serde_json::to_string_pretty(&mvps).unwrap();
        let parsed: Vec<Mvp> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, mvps);
    }

    #[test]
    fn serializes_canonical_field_names() {
        let mvp = Mvp {
            id: 1086,
            name: "Golden Thief Bug".to_string(),
            dbname: None,
            maps: vec![SpawnPoint {
                map_name: "prt_sewb4".to_string(),
                respawn_time: 3600,
            }],
            stats: Map::new(),
        };

        let value = serde_json::to_value(&mvp).unwrap();
        assert!(value.get("dbname").is_none());
        assert_eq!(value["maps"][0]["mapName"], "prt_sewb4");
        assert_eq!(value["maps"][0]["respawnTime"], 3600);
    }
}
