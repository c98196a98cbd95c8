use crate::chirp::{Chirp, NewChirp, MAX_MESSAGE_LEN, MAX_TAG_LEN, MAX_USERNAME_LEN};
use crate::error::{Result, StorageError};
use crate::repository::ChirpRepository;
use async_trait::async_trait;
use jiff::civil::{Date, DateTime, Time};
use jiff::tz::TimeZone;
use jiff::Timestamp;
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

#[derive(Debug, Clone)]
struct ChirpEntry {
    message: String,
    author_id: i32,
    created_at: DateTime,
}

/// Name table with dense ids starting at 1, as a `SERIAL` column hands out.
#[derive(Debug, Default)]
struct Names {
    ids: HashMap<String, i32>,
    names: Vec<String>,
}

impl Names {
    fn id(&self, name: &str) -> Option<i32> {
        self.ids.get(name).copied()
    }

    fn name(&self, id: i32) -> Option<&str> {
        let index = usize::try_from(id).ok()?.checked_sub(1)?;
        self.names.get(index).map(String::as_str)
    }

    fn next_id(&self, pending: usize) -> i32 {
        (self.names.len() + pending + 1) as i32
    }

    fn push(&mut self, name: String) -> i32 {
        let id = self.next_id(0);
        self.ids.insert(name.clone(), id);
        self.names.push(name);
        id
    }
}

#[derive(Debug, Default)]
struct State {
    users: Names,
    tags: Names,
    chirps: Vec<ChirpEntry>,
    links: BTreeSet<(i32, i32)>,
}

/// Rows a submission would add, held back until every step succeeded.
struct Staged<'a> {
    state: &'a State,
    users: Vec<String>,
    tags: Vec<String>,
    links: Vec<(i32, i32)>,
}

impl<'a> Staged<'a> {
    fn new(state: &'a State) -> Self {
        Self {
            state,
            users: Vec::new(),
            tags: Vec::new(),
            links: Vec::new(),
        }
    }

    fn get_or_create(existing: &Names, pending: &mut Vec<String>, name: &str) -> i32 {
        if let Some(id) = existing.id(name) {
            return id;
        }
        if let Some(index) = pending.iter().position(|p| p == name) {
            return existing.next_id(index);
        }
        pending.push(name.to_owned());
        existing.next_id(pending.len() - 1)
    }

    fn user(&mut self, username: &str) -> Result<i32> {
        check_len("username", username, MAX_USERNAME_LEN)?;
        Ok(Self::get_or_create(
            &self.state.users,
            &mut self.users,
            username,
        ))
    }

    fn tag(&mut self, name: &str) -> Result<i32> {
        check_len("tag name", name, MAX_TAG_LEN)?;
        Ok(Self::get_or_create(&self.state.tags, &mut self.tags, name))
    }
}

fn check_len(column: &str, value: &str, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len > max {
        return Err(StorageError::Query(format!(
            "{column} is {len} characters long, at most {max} allowed"
        )));
    }
    Ok(())
}

/// Parses a `YYYY-MM-DD` date, optionally followed by a time of day.
fn parse_date(value: &str) -> Result<DateTime> {
    if let Ok(datetime) = value.parse::<DateTime>() {
        return Ok(datetime);
    }
    value
        .parse::<Date>()
        .map(|date| date.to_datetime(Time::midnight()))
        .map_err(|e| StorageError::Query(format!("invalid date '{value}': {e}")))
}

fn now() -> DateTime {
    Timestamp::now().to_zoned(TimeZone::UTC).datetime()
}

/// In-memory implementation of [`ChirpRepository`].
///
/// All state sits behind one lock. A submission is staged against a read
/// view of the state and published only after every step succeeded, which
/// gives the same all-or-nothing visibility as a database transaction.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    state: RwLock<State>,
}

impl InMemoryRepository {
    /// Creates an empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a chirp with an explicit creation time.
    pub fn create_chirp_at(&self, chirp: NewChirp, created_at: DateTime) -> Result<i32> {
        let mut state = self.state.write();

        let mut staged = Staged::new(&state);
        let author_id = staged.user(&chirp.author)?;
        check_len("message", &chirp.message, MAX_MESSAGE_LEN)?;
        let chirp_id = (state.chirps.len() + 1) as i32;
        for tag in &chirp.tags {
            let tag_id = staged.tag(tag)?;
            staged.links.push((chirp_id, tag_id));
        }

        let Staged {
            users, tags, links, ..
        } = staged;
        for username in users {
            state.users.push(username);
        }
        for name in tags {
            state.tags.push(name);
        }
        state.chirps.push(ChirpEntry {
            message: chirp.message,
            author_id,
            created_at,
        });
        state.links.extend(links);

        debug!(chirp_id, author_id, "stored chirp");
        Ok(chirp_id)
    }

    /// Number of distinct users stored so far.
    pub fn user_count(&self) -> usize {
        self.state.read().users.names.len()
    }

    /// Number of distinct tags stored so far.
    pub fn tag_count(&self) -> usize {
        self.state.read().tags.names.len()
    }
}

impl State {
    /// Ids of chirps carrying at least one of `tags`, or every chirp when
    /// `tags` is empty.
    fn matching(&self, tags: &[String]) -> BTreeSet<i32> {
        if tags.is_empty() {
            return (1..=self.chirps.len() as i32).collect();
        }
        let wanted: BTreeSet<i32> = tags.iter().filter_map(|t| self.tags.id(t)).collect();
        self.links
            .iter()
            .filter(|(_, tag_id)| wanted.contains(tag_id))
            .map(|(chirp_id, _)| *chirp_id)
            .collect()
    }

    fn entry(&self, id: i32) -> Result<&ChirpEntry> {
        usize::try_from(id)
            .ok()
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| self.chirps.get(i))
            .ok_or_else(|| StorageError::InvalidData(format!("dangling chirp id {id}")))
    }

    fn load(&self, id: i32) -> Result<Chirp> {
        let entry = self.entry(id)?;
        let author = self.users.name(entry.author_id).ok_or_else(|| {
            StorageError::InvalidData(format!("dangling author id {}", entry.author_id))
        })?;
        let mut tags = self
            .links
            .range((id, i32::MIN)..=(id, i32::MAX))
            .map(|(_, tag_id)| {
                self.tags
                    .name(*tag_id)
                    .map(str::to_owned)
                    .ok_or_else(|| StorageError::InvalidData(format!("dangling tag id {tag_id}")))
            })
            .collect::<Result<Vec<_>>>()?;
        tags.sort();

        Ok(Chirp {
            id,
            message: entry.message.clone(),
            tags,
            author: author.to_owned(),
        })
    }
}

#[async_trait]
impl ChirpRepository for InMemoryRepository {
    async fn ensure_schema(&self) -> Result<()> {
        Ok(())
    }

    async fn create_chirp(&self, chirp: NewChirp) -> Result<i32> {
        self.create_chirp_at(chirp, now())
    }

    async fn get_chirps(&self, tags: &[String]) -> Result<Vec<Chirp>> {
        let state = self.state.read();
        state
            .matching(tags)
            .into_iter()
            .map(|id| state.load(id))
            .collect()
    }

    async fn count_chirps(
        &self,
        starting_date: &str,
        ending_date: &str,
        tags: &[String],
    ) -> Result<i64> {
        let start = parse_date(starting_date)?;
        let end = parse_date(ending_date)?;

        let state = self.state.read();
        let mut count = 0;
        for id in state.matching(tags) {
            let created_at = state.entry(id)?.created_at;
            if start <= created_at && created_at < end {
                count += 1;
            }
        }
        Ok(count)
    }
}
