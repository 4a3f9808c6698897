//! Level graph: map definitions and the successor relation between them
//!
//! A campaign owns pristine copies of every map. The simulation never plays
//! these directly; it plays a fresh clone from `instantiate`, so walls broken
//! on one visit are whole again on the next.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::map::{TileMap, default_theme};
use crate::error::CampaignError;

/// Stable name of a map within a campaign
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapId(pub String);

impl MapId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MapId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A map plus the edge to the map that follows it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapDef {
    pub map: TileMap,
    /// `None` marks the last level
    pub next: Option<MapId>,
}

/// Every map of a game and how they chain together
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawCampaign")]
pub struct Campaign {
    maps: BTreeMap<MapId, MapDef>,
    start: MapId,
    /// Map loaded at the midpoint of the ascend sequence
    bonus: Option<MapId>,
    /// Map whose goal ends the game with the ascended flourish
    finale: Option<MapId>,
}

/// Serialized form of a campaign, checked against its own references
#[derive(Deserialize)]
struct RawCampaign {
    maps: BTreeMap<MapId, MapDef>,
    start: MapId,
    #[serde(default)]
    bonus: Option<MapId>,
    #[serde(default)]
    finale: Option<MapId>,
}

impl TryFrom<RawCampaign> for Campaign {
    type Error = CampaignError;

    fn try_from(raw: RawCampaign) -> Result<Self, CampaignError> {
        let mut campaign = Campaign::new(raw.start, raw.maps)?;
        if let Some(bonus) = raw.bonus {
            campaign = campaign.with_bonus(bonus)?;
        }
        if let Some(finale) = raw.finale {
            campaign = campaign.with_finale(finale)?;
        }
        Ok(campaign)
    }
}

impl Campaign {
    /// Build a campaign, checking that every referenced map exists
    pub fn new(
        start: MapId,
        maps: impl IntoIterator<Item = (MapId, MapDef)>,
    ) -> Result<Self, CampaignError> {
        let mut table = BTreeMap::new();
        for (id, def) in maps {
            if table.contains_key(&id) {
                return Err(CampaignError::DuplicateMap(id.0));
            }
            table.insert(id, def);
        }

        let campaign = Self {
            maps: table,
            start,
            bonus: None,
            finale: None,
        };
        campaign.require(&campaign.start)?;
        for def in campaign.maps.values() {
            if let Some(next) = &def.next {
                campaign.require(next)?;
            }
        }
        Ok(campaign)
    }

    /// Set the ascend target
    pub fn with_bonus(mut self, bonus: MapId) -> Result<Self, CampaignError> {
        self.require(&bonus)?;
        self.bonus = Some(bonus);
        Ok(self)
    }

    /// Set the map whose goal triggers the ascended ending
    pub fn with_finale(mut self, finale: MapId) -> Result<Self, CampaignError> {
        self.require(&finale)?;
        self.finale = Some(finale);
        Ok(self)
    }

    fn require(&self, id: &MapId) -> Result<(), CampaignError> {
        if self.maps.contains_key(id) {
            Ok(())
        } else {
            Err(CampaignError::UnknownMap(id.0.clone()))
        }
    }

    pub fn start(&self) -> &MapId {
        &self.start
    }

    pub fn bonus(&self) -> Option<&MapId> {
        self.bonus.as_ref()
    }

    pub fn finale(&self) -> Option<&MapId> {
        self.finale.as_ref()
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    /// Pristine map definition
    pub fn get(&self, id: &MapId) -> Option<&TileMap> {
        self.maps.get(id).map(|def| &def.map)
    }

    /// Next map after `id`, or `None` if `id` is the last level (or unknown)
    pub fn successor(&self, id: &MapId) -> Option<&MapId> {
        self.maps.get(id).and_then(|def| def.next.as_ref())
    }

    /// Position of `id` on the bonus chain: the bonus map, its successors, up
    /// to and including the finale
    pub fn bonus_chain_position(&self, id: &MapId) -> Option<usize> {
        let mut current = self.bonus.as_ref()?;
        for position in 0..self.maps.len() {
            if current == id {
                return Some(position);
            }
            if Some(current) == self.finale.as_ref() {
                return None;
            }
            current = self.successor(current)?;
        }
        None
    }

    /// Fresh, independently mutable copy of a map for play
    pub fn instantiate(&self, id: &MapId) -> Option<TileMap> {
        self.get(id).cloned()
    }

    /// Parse a JSON level pack
    pub fn from_json(json: &str) -> Result<Self, CampaignError> {
        let pack: LevelPack = serde_json::from_str(json)?;
        pack.build()
    }

    /// The shipped campaign
    pub fn builtin() -> Result<Self, CampaignError> {
        let maps = BUILTIN_MAPS
            .iter()
            .map(|m| {
                let map = TileMap::parse(m.width, m.height, m.layers)
                    .map_err(|source| CampaignError::Map {
                        id: m.id.to_string(),
                        source,
                    })?
                    .with_theme(m.theme)
                    .with_status(m.status)
                    .with_music(m.music_track);
                let def = MapDef {
                    map,
                    next: m.next.map(MapId::from),
                };
                Ok((MapId::from(m.id), def))
            })
            .collect::<Result<Vec<_>, CampaignError>>()?;

        Self::new(MapId::from("tutorial"), maps)?
            .with_bonus(MapId::from("egg-1"))?
            .with_finale(MapId::from("egg-end"))
    }
}

/// Text form of a campaign, as stored in level pack JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelPack {
    pub start: String,
    #[serde(default)]
    pub bonus: Option<String>,
    #[serde(default)]
    pub finale: Option<String>,
    pub maps: Vec<MapText>,
}

/// Text form of one map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapText {
    pub id: String,
    pub width: usize,
    pub height: usize,
    #[serde(default = "default_theme")]
    pub theme: u32,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub music_track: Option<u8>,
    #[serde(default)]
    pub next: Option<String>,
    /// Layers of rows, one symbol per cell with a spacer between cells
    pub layers: Vec<Vec<String>>,
}

impl LevelPack {
    pub fn build(self) -> Result<Campaign, CampaignError> {
        let maps = self
            .maps
            .into_iter()
            .map(|m| {
                let map = TileMap::parse(m.width, m.height, m.layers.as_slice())
                    .map_err(|source| CampaignError::Map {
                        id: m.id.clone(),
                        source,
                    })?
                    .with_theme(m.theme)
                    .with_status(m.status)
                    .with_music(m.music_track);
                let def = MapDef {
                    map,
                    next: m.next.map(MapId),
                };
                Ok((MapId(m.id), def))
            })
            .collect::<Result<Vec<_>, CampaignError>>()?;

        let mut campaign = Campaign::new(MapId(self.start), maps)?;
        if let Some(bonus) = self.bonus {
            campaign = campaign.with_bonus(MapId(bonus))?;
        }
        if let Some(finale) = self.finale {
            campaign = campaign.with_finale(MapId(finale))?;
        }
        Ok(campaign)
    }
}

struct BuiltinMap {
    id: &'static str,
    width: usize,
    height: usize,
    theme: u32,
    status: &'static str,
    music_track: Option<u8>,
    next: Option<&'static str>,
    layers: &'static [&'static [&'static str]],
}

const BUILTIN_MAPS: &[BuiltinMap] = &[
    BuiltinMap {
        id: "tutorial",
        width: 13,
        height: 13,
        theme: 0x6B5700,
        status: "Use arrow keys to tilt.",
        music_track: Some(0),
        next: Some("attractor"),
        layers: &[
            &[
                "X X X X X X X X X X X X X",
                "X s                     X",
                "X X X X X X X X X X X   X",
                "X G     X X X X X X X   X",
                "X         X X X X X X   X",
                "X X         X X X X X   X",
                "X X X         X X X X   X",
                "X X X X         X X X   X",
                "X X X X X         X X   X",
                "X X X X X X             X",
                "X X X X X X X           X",
                "X X X X X X X X         X",
                "X X X X X X X X X X X X X",
            ],
        ],
    },
    BuiltinMap {
        id: "attractor",
        width: 19,
        height: 19,
        theme: 0x6B5700,
        status: "Level 2",
        music_track: Some(0),
        next: Some("level-3"),
        layers: &[
            &[
                "X X X X X X X X X X X X X X X X X X X",
                "X                                   X",
                "X                                   X",
                "X                                   X",
                "X                                   X",
                "X                                   X",
                "X           X           X           X",
                "X             X   s   X             X",
                "X               X X X               X",
                "X               X G X               X",
                "X               X   X               X",
                "X             X       X             X",
                "X           X           X           X",
                "X                                   X",
                "X                                   X",
                "X                                   X",
                "X                                   X",
                "X                                   X",
                "X X X X X X X X X X X X X X X X X X X",
            ],
        ],
    },
    BuiltinMap {
        id: "level-3",
        width: 11,
        height: 11,
        theme: 0x6D3600,
        status: "Level 3",
        music_track: Some(1),
        next: Some("level-4"),
        layers: &[
            &[
                "X X X X X X X X X X X",
                "X                   X",
                "X   X X   X X   X   X",
                "X X X     X     X X X",
                "X       X X X   X   X",
                "X   X X X G X       X",
                "X   X   X   X X X   X",
                "X   X         O X   X",
                "X   X X X X X X X   X",
                "X       s X O       X",
                "X X X X X X X X X X X",
            ],
            &[
                "X X X X X X X X X X X",
                "X X X X X           X",
                "X X X X             X",
                "X X X           X   X",
                "X X             X   X",
                "X           X   X   X",
                "X         X X   X   X",
                "X       X X X O X X X",
                "X     X X X X X X X X",
                "X           O X X X X",
                "X X X X X X X X X X X",
            ],
        ],
    },
    BuiltinMap {
        id: "level-4",
        width: 9,
        height: 11,
        theme: 0x6D3600,
        status: "Level 4",
        music_track: Some(1),
        next: Some("level-5"),
        layers: &[
            &[
                "X X X X X X X X X",
                "X X X           X",
                "X       X   X X X",
                "X O X X X   X s X",
                "X X             X",
                "X X   X X X X X X",
                "X X X X         X",
                "X         X X   X",
                "X   X X X X X   X",
                "X       G X X O X",
                "X X X X X X X X X",
            ],
            &[
                "X X X X X X X X X",
                "X           X # X",
                "X X X   X       X",
                "X O X     X X   X",
                "X   X X     X   X",
                "X       X   X   X",
                "X   X X X   X   X",
                "X     X     X   X",
                "X X   X   X X   X",
                "X           X O X",
                "X X X X X X X X X",
            ],
        ],
    },
    BuiltinMap {
        id: "level-5",
        width: 14,
        height: 14,
        theme: 0x700000,
        status: "Level 5",
        music_track: Some(2),
        next: Some("level-6"),
        layers: &[
            &[
                "X X X X X X X X X X X X X X",
                "X X   X X X X     X X X X X",
                "X X               X O X X X",
                "X X s           X X     X X",
                "X X X   X X   X X X X   X X",
                "X X X X X     X           X",
                "X X X   X             X   X",
                "X X     G X X X X X X X   X",
                "X X     X X X X     X X X X",
                "X X     X X X       X X X X",
                "X X                     X X",
                "X X X           X     O X X",
                "X X X X X X X X X X X X X X",
                "X X X X X X X X X X X X X X",
            ],
            &[
                "X X X X X X X X X X X X X X",
                "X X X X X X X X X X X X X X",
                "X X X X         X   O X X X",
                "X X   X     X           X X",
                "X       X   X X       X X X",
                "X           X X     X X X X",
                "X X   X X   X X         X X",
                "X X   X X X X X   X X   X X",
                "X X     X       X X X   X X",
                "X X X         X X X X X X X",
                "X X X X             X X X X",
                "X X X X X X           O X X",
                "X X X X X X X X X X X X X X",
                "X X X X X X X X X X X X X X",
            ],
        ],
    },
    BuiltinMap {
        id: "level-6",
        width: 15,
        height: 15,
        theme: 0x700000,
        status: "Level 6",
        music_track: Some(2),
        next: Some("end"),
        layers: &[
            &[
                "X X X X X X X X X X X X X X X",
                "X X X O     X         X X X X",
                "X   O X X   X   X       X X X",
                "X   X   X   X     X X       X",
                "X   X   X     X   X X   X   X",
                "X   X     X         X   X   X",
                "X     X     X X X X X   X   X",
                "X X   X X     s   X     X X X",
                "X X   X X X X X       X X X X",
                "X       X     X X X X       X",
                "X   X         O X       X   X",
                "X   X X X   X X X X X   X   X",
                "X     X         X X     X G X",
                "X X       X X   X O     X X X",
                "X X X X X X X X X X X X X X X",
            ],
            &[
                "X X X X X X X X X X X X X X X",
                "X X X O         X X X X X X X",
                "X   O X X X X     X     X X X",
                "X     X X         X   X X X X",
                "X   X X X   X     X   X X X X",
                "X   X       X X   X       X X",
                "X   X   X   X X X X   X   X X",
                "X       X X X         X   X X",
                "X X X X X         X   X     X",
                "X X X X     X X X X   X     X",
                "X X X X   X X O X X X X X   X",
                "X X X               X X X   X",
                "X X X       X X X X X       X",
                "X X X X X X X X X O       X X",
                "X X X X X X X X X X X X X X X",
            ],
        ],
    },
    BuiltinMap {
        id: "end",
        width: 16,
        height: 7,
        theme: 0x4A8423,
        status: "",
        music_track: Some(3),
        next: None,
        layers: &[
            &[
                "X X X X X X X X X X X X X X X X",
                "X       X   X X   X     X X X X",
                "X   X X X     X   X   X   X X X",
                "X     X X   X     X   X   X X X",
                "X   X X X   X X   X   X   X X X",
                "X       X   X X   X     X X s X",
                "X X X X X X X X X X X X X X X X",
            ],
        ],
    },
    BuiltinMap {
        id: "egg-1",
        width: 19,
        height: 19,
        theme: 0x550068,
        status: "???",
        music_track: None,
        next: Some("egg-2"),
        layers: &[
            &[
                "                                     ",
                "                                     ",
                "              X X X X X              ",
                "              X       X              ",
                "              X   s   X              ",
                "              X       X              ",
                "              X       X              ",
                "              X       X              ",
                "              X       X              ",
                "              X       X              ",
                "              X       X              ",
                "              X       X              ",
                "              X       X              ",
                "              X   G   X              ",
                "              X       X              ",
                "              X X X X X              ",
                "                                     ",
                "                                     ",
                "                                     ",
            ],
        ],
    },
    BuiltinMap {
        id: "egg-2",
        width: 19,
        height: 19,
        theme: 0x550068,
        status: "???",
        music_track: None,
        next: Some("egg-end"),
        layers: &[
            &[
                "                                     ",
                "                                     ",
                "                                     ",
                "                                     ",
                "                                     ",
                "                                     ",
                "                                     ",
                "  X X X X X X X X X X X X X X X X X  ",
                "  X                               X  ",
                "  X   s                       G   X  ",
                "  X                               X  ",
                "  X X X X X X X X X X X X X X X X X  ",
                "                                     ",
                "                                     ",
                "                                     ",
                "                                     ",
                "                                     ",
                "                                     ",
                "                                     ",
            ],
        ],
    },
    BuiltinMap {
        id: "egg-end",
        width: 19,
        height: 19,
        theme: 0x550068,
        status: "",
        music_track: None,
        next: Some("level-5"),
        layers: &[
            &[
                "X X X X X X X X X X X X X X X X X X X",
                "X                                   X",
                "X               X X X               X",
                "X             X       X             X",
                "X           X           X           X",
                "X           X           X           X",
                "X           X           X           X",
                "X           X           X           X",
                "X             X X X X X             X",
                "X                                   X",
                "X                 G                 X",
                "X                                   X",
                "X                                   X",
                "X                                   X",
                "X                                   X",
                "X                                   X",
                "X                 s                 X",
                "X                                   X",
                "X X X X X X X X X X X X X X X X X X X",
            ],
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::tile::Tile;

    #[test]
    fn test_builtin_campaign_loads() {
        let campaign = Campaign::builtin().unwrap();
        assert_eq!(campaign.len(), 10);
        assert_eq!(campaign.start().as_str(), "tutorial");
        assert_eq!(campaign.bonus(), Some(&MapId::from("egg-1")));
        assert_eq!(campaign.finale(), Some(&MapId::from("egg-end")));
    }

    #[test]
    fn test_builtin_progression() {
        let campaign = Campaign::builtin().unwrap();
        let mut order = vec![campaign.start().clone()];
        while let Some(next) = campaign.successor(order.last().unwrap()) {
            order.push(next.clone());
        }
        let names: Vec<_> = order.iter().map(MapId::as_str).collect();
        assert_eq!(
            names,
            ["tutorial", "attractor", "level-3", "level-4", "level-5", "level-6", "end"]
        );
    }

    #[test]
    fn test_bonus_chain_rejoins_main_path() {
        let campaign = Campaign::builtin().unwrap();
        let egg2 = campaign.successor(&MapId::from("egg-1")).unwrap();
        let egg_end = campaign.successor(egg2).unwrap();
        assert_eq!(campaign.successor(egg_end), Some(&MapId::from("level-5")));
    }

    #[test]
    fn test_bonus_chain_positions() {
        let campaign = Campaign::builtin().unwrap();
        let pos = |id: &str| campaign.bonus_chain_position(&MapId::from(id));
        assert_eq!(pos("egg-1"), Some(0));
        assert_eq!(pos("egg-2"), Some(1));
        assert_eq!(pos("egg-end"), Some(2));
        // The chain stops at the finale even though it links onward
        assert_eq!(pos("level-5"), None);
        assert_eq!(pos("tutorial"), None);
    }

    #[test]
    fn test_level_4_has_secret_wall() {
        let campaign = Campaign::builtin().unwrap();
        let map = campaign.get(&MapId::from("level-4")).unwrap();
        assert_eq!(map.layer_count(), 2);
        assert_eq!(map.tile(1, 7, 1), Tile::BreakableWall);
    }

    #[test]
    fn test_instantiate_is_independent() {
        let campaign = Campaign::builtin().unwrap();
        let id = MapId::from("level-4");
        let mut played = campaign.instantiate(&id).unwrap();
        assert!(played.break_wall(1, 7, 1));
        let fresh = campaign.instantiate(&id).unwrap();
        assert_eq!(fresh.tile(1, 7, 1), Tile::BreakableWall);
    }

    #[test]
    fn test_every_builtin_map_has_a_spawn() {
        let campaign = Campaign::builtin().unwrap();
        let spawn = |id: &str| {
            let s = campaign.get(&MapId::from(id)).unwrap().spawn();
            (s.x, s.y, s.layer)
        };
        assert_eq!(spawn("tutorial"), (1, 1, 0));
        assert_eq!(spawn("egg-1"), (9, 4, 0));
        assert_eq!(spawn("egg-2"), (3, 9, 0));
        assert_eq!(spawn("egg-end"), (9, 16, 0));

        let egg = campaign.get(&MapId::from("egg-1")).unwrap();
        assert_eq!(egg.tile(0, 9, 13), Tile::Goal);
        assert_eq!(egg.tile(0, 7, 2), Tile::Wall);
        assert_eq!(egg.tile(0, 6, 2), Tile::Empty);
    }

    #[test]
    fn test_deserialized_campaign_is_checked() {
        let campaign = Campaign::builtin().unwrap();
        let mut value = serde_json::to_value(&campaign).unwrap();
        let back: Campaign = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(back.len(), campaign.len());
        assert_eq!(back.bonus(), campaign.bonus());

        value["start"] = serde_json::json!("missing");
        assert!(serde_json::from_value::<Campaign>(value).is_err());
    }

    #[test]
    fn test_unknown_successor_rejected() {
        let map = TileMap::parse(2, 1, &[["s G"]]).unwrap();
        let err = Campaign::new(
            MapId::from("a"),
            [(
                MapId::from("a"),
                MapDef {
                    map,
                    next: Some(MapId::from("missing")),
                },
            )],
        )
        .unwrap_err();
        assert!(matches!(err, CampaignError::UnknownMap(id) if id == "missing"));
    }

    #[test]
    fn test_level_pack_json() {
        let json = r#"{
            "start": "one",
            "maps": [
                { "id": "one", "width": 3, "height": 1, "next": "two",
                  "layers": [["s G X"]] },
                { "id": "two", "width": 3, "height": 1, "status": "Last",
                  "music_track": 2, "layers": [["X s G"]] }
            ]
        }"#;
        let campaign = Campaign::from_json(json).unwrap();
        assert_eq!(campaign.successor(&MapId::from("one")), Some(&MapId::from("two")));
        assert_eq!(campaign.successor(&MapId::from("two")), None);
        let two = campaign.get(&MapId::from("two")).unwrap();
        assert_eq!(two.status, "Last");
        assert_eq!(two.music_track, Some(2));
        assert_eq!(campaign.bonus(), None);
    }

    #[test]
    fn test_level_pack_reports_bad_map() {
        let json = r#"{ "start": "one", "maps": [
            { "id": "one", "width": 2, "height": 1, "layers": [["X G"]] } ] }"#;
        let err = Campaign::from_json(json).unwrap_err();
        assert!(matches!(
            err,
            CampaignError::Map { ref id, source: crate::error::MapError::MissingSpawn } if id == "one"
        ));
    }
}
