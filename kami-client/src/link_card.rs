use std::str::FromStr;

/// Length of descriptions derived from a page's text
pub const DESCRIPTION_LEN: usize = 50;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LinkCardSource {
    /// A page of this site
    SelfHosted,
    GitHub,
}

impl FromStr for LinkCardSource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<LinkCardSource> {
        match s {
            "" | "self" => Ok(LinkCardSource::SelfHosted),
            "gh" => Ok(LinkCardSource::GitHub),
            _ => Err(anyhow::anyhow!("unknown link card source {s:?}")),
        }
    }
}

/// Preview card for a link embedded in a comment or post
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LinkCard {
    Note(u64),
    Post { category: String, slug: String },
    GitHubRepo { owner: String, repo: String },
}

impl LinkCard {
    /// Returns `None` for references that cannot be displayed as a card
    pub fn parse(source: LinkCardSource, id: &str) -> Option<LinkCard> {
        let mut parts = id.split('/');
        let first = parts.next().filter(|s| !s.is_empty())?;
        let second = parts.next().filter(|s| !s.is_empty())?;
        match source {
            LinkCardSource::SelfHosted => match first {
                "notes" => second.parse().ok().map(LinkCard::Note),
                "posts" => {
                    let slug = parts.next().filter(|s| !s.is_empty())?;
                    Some(LinkCard::Post {
                        category: second.to_string(),
                        slug: slug.to_string(),
                    })
                }
                _ => None,
            },
            LinkCardSource::GitHub => match parts.next() {
                Some(_) => None,
                None => Some(LinkCard::GitHubRepo {
                    owner: first.to_string(),
                    repo: second.to_string(),
                }),
            },
        }
    }

    /// Where clicking the card leads
    pub fn href(&self) -> String {
        match self {
            LinkCard::Note(n) => format!("/notes/{n}"),
            LinkCard::Post { category, slug } => format!("/posts/{category}/{slug}"),
            LinkCard::GitHubRepo { owner, repo } => format!("https://github.com/{owner}/{repo}"),
        }
    }

    /// Where the card's title, description and image are fetched from
    pub fn metadata_url(&self, api_host: &str) -> anyhow::Result<url::Url> {
        let url = match self {
            LinkCard::Note(n) => format!("{}/notes/{n}", api_host.trim_end_matches('/')),
            LinkCard::Post { category, slug } => {
                format!("{}/posts/{category}/{slug}", api_host.trim_end_matches('/'))
            }
            LinkCard::GitHubRepo { owner, repo } => {
                format!("https://api.github.com/repos/{owner}/{repo}")
            }
        };
        Ok(url::Url::parse(&url)?)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CardInfo {
    pub title: String,
    pub description: Option<String>,
    pub image: Option<String>,
}

impl CardInfo {
    /// Card for a page of this site, `summary` wins over the derived description
    pub fn from_page(title: String, text: &str, summary: Option<String>, image: Option<String>) -> CardInfo {
        CardInfo {
            title,
            description: Some(summary.unwrap_or_else(|| short_description(text))),
            image,
        }
    }

    /// Card from the GitHub repository API's answer
    pub fn from_github(body: &[u8]) -> anyhow::Result<CardInfo> {
        #[derive(serde::Deserialize)]
        struct Owner {
            avatar_url: String,
        }

        #[derive(serde::Deserialize)]
        struct Repo {
            full_name: String,
            description: Option<String>,
            owner: Owner,
        }

        let repo: Repo = serde_json::from_slice(body)?;
        Ok(CardInfo {
            title: repo.full_name,
            description: repo.description,
            image: Some(repo.owner.avatar_url),
        })
    }
}

pub fn short_description(text: &str) -> String {
    let mut desc = strip_markdown(text)
        .chars()
        .take(DESCRIPTION_LEN)
        .collect::<String>();
    desc.push_str("...");
    desc
}

/// Plain text of some markdown: heading, quote and list markers, emphasis,
/// inline code marks, links and images are reduced to their text
pub fn strip_markdown(text: &str) -> String {
    text.lines()
        .map(|line| strip_inline(strip_block_marker(line.trim())))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_block_marker(line: &str) -> &str {
    let hashes = line.len() - line.trim_start_matches('#').len();
    if (1..=6).contains(&hashes) && line[hashes..].starts_with(' ') {
        return line[hashes..].trim_start();
    }
    for marker in ["> ", "- ", "* ", "+ "] {
        if let Some(rest) = line.strip_prefix(marker) {
            return rest.trim_start();
        }
    }
    if line == ">" || line.chars().all(|c| c == '-' || c == '*' || c == '_') {
        return "";
    }
    line
}

fn strip_inline(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(c) = rest.chars().next() {
        match c {
            '*' | '_' | '`' | '~' => rest = &rest[c.len_utf8()..],
            '!' if rest[1..].starts_with('[') => rest = &rest[1..],
            '[' => match link_text(rest) {
                Some((text, after)) => {
                    out.push_str(&strip_inline(text));
                    rest = after;
                }
                None => {
                    out.push('[');
                    rest = &rest[1..];
                }
            },
            _ => {
                out.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }
    out
}

// `[text](url)` at the start of `s`: the text, and what follows the link
fn link_text(s: &str) -> Option<(&str, &str)> {
    let close = s.find("](")?;
    if s[1..close].contains(']') {
        return None;
    }
    let end = close + 2 + s[close + 2..].find(')')?;
    Some((&s[1..close], &s[end + 1..]))
}
