use crate::Time;

/// Kind of entry on the links page
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum LinkType {
    Friend,
    Collection,
}

impl TryFrom<u8> for LinkType {
    type Error = String;

    fn try_from(v: u8) -> Result<LinkType, String> {
        match v {
            0 => Ok(LinkType::Friend),
            1 => Ok(LinkType::Collection),
            _ => Err(format!("unknown link type {v}")),
        }
    }
}

impl From<LinkType> for u8 {
    fn from(t: LinkType) -> u8 {
        match t {
            LinkType::Friend => 0,
            LinkType::Collection => 1,
        }
    }
}

/// Moderation state of a link
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum LinkState {
    Pass,
    Audit,
    Outdate,
    Banned,
    Reject,
}

impl TryFrom<u8> for LinkState {
    type Error = String;

    fn try_from(v: u8) -> Result<LinkState, String> {
        match v {
            0 => Ok(LinkState::Pass),
            1 => Ok(LinkState::Audit),
            2 => Ok(LinkState::Outdate),
            3 => Ok(LinkState::Banned),
            4 => Ok(LinkState::Reject),
            _ => Err(format!("unknown link state {v}")),
        }
    }
}

impl From<LinkState> for u8 {
    fn from(s: LinkState) -> u8 {
        match s {
            LinkState::Pass => 0,
            LinkState::Audit => 1,
            LinkState::Outdate => 2,
            LinkState::Banned => 3,
            LinkState::Reject => 4,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Link {
    pub id: String,
    pub name: String,
    pub url: String,

    #[serde(default)]
    pub avatar: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(rename = "type")]
    pub link_type: LinkType,
    pub state: LinkState,

    #[serde(default)]
    pub hide: bool,

    #[serde(rename = "created", default)]
    pub created_at: Option<Time>,
}
