//! Resolving user-typed identifiers: a full UUID or any unique prefix of
//! one.

use thiserror::Error;
use uuid::Uuid;

use crate::models::{EntityId, Event, Note, Task, Titled};
use crate::repository::{EventRepository, NoteRepository, RepoError, RepoResult, TaskRepository};

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("No {kind} found matching '{input}'")]
    NotFound { kind: &'static str, input: String },
    #[error(
        "Ambiguous {kind} ID '{input}' matches {} entries:\n{}\nUse a longer prefix to pick one.",
        .candidates.len(),
        format_candidates(.candidates)
    )]
    Ambiguous {
        kind: &'static str,
        input: String,
        /// `(full id, title)` of every match.
        candidates: Vec<(String, String)>,
    },
    #[error(transparent)]
    Repo(#[from] RepoError),
}

fn format_candidates(candidates: &[(String, String)]) -> String {
    candidates
        .iter()
        .map(|(id, title)| format!("  {id}  {title}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Picks the one item in `items` that `input` identifies.
///
/// A full UUID must match exactly. Anything else is a case-sensitive prefix
/// of the hyphenated id.
pub fn resolve<T>(kind: &'static str, input: &str, items: Vec<T>) -> Result<T, ResolveError>
where
    T: Titled,
{
    let input = input.trim();
    let not_found = || ResolveError::NotFound {
        kind,
        input: input.to_string(),
    };

    if let Ok(full) = Uuid::parse_str(input) {
        return items
            .into_iter()
            .find(|item| item.entity_id() == Some(full))
            .ok_or_else(not_found);
    }
    if input.is_empty() {
        return Err(not_found());
    }

    let mut matches: Vec<T> = items
        .into_iter()
        .filter(|item| {
            item.entity_id()
                .is_some_and(|id| id.to_string().starts_with(input))
        })
        .collect();

    match matches.len() {
        0 => Err(not_found()),
        1 => Ok(matches.remove(0)),
        _ => Err(ResolveError::Ambiguous {
            kind,
            input: input.to_string(),
            candidates: matches
                .iter()
                .map(|item| {
                    let id = item.entity_id().map(|id| id.to_string()).unwrap_or_default();
                    (id, item.title().to_string())
                })
                .collect(),
        }),
    }
}

/// Resolves against a store: direct lookup for a full UUID, otherwise a
/// prefix search over `list()`.
pub fn resolve_with<T, G, L>(
    kind: &'static str,
    input: &str,
    get: G,
    list: L,
) -> Result<T, ResolveError>
where
    T: Titled,
    G: FnOnce(EntityId) -> RepoResult<Option<T>>,
    L: FnOnce() -> RepoResult<Vec<T>>,
{
    let trimmed = input.trim();
    if let Ok(full) = Uuid::parse_str(trimmed) {
        return get(full)?.ok_or_else(|| ResolveError::NotFound {
            kind,
            input: trimmed.to_string(),
        });
    }
    resolve(kind, trimmed, list()?)
}

pub fn resolve_task(repo: &dyn TaskRepository, input: &str) -> Result<Task, ResolveError> {
    resolve_with("task", input, |id| repo.get(id), || repo.list(None))
}

pub fn resolve_note(repo: &dyn NoteRepository, input: &str) -> Result<Note, ResolveError> {
    resolve_with("note", input, |id| repo.get(id), || repo.list())
}

pub fn resolve_event(repo: &dyn EventRepository, input: &str) -> Result<Event, ResolveError> {
    resolve_with("event", input, |id| repo.get(id), || repo.list())
}

/// First eight characters of an id, as shown in listings.
pub fn short(id: Option<EntityId>) -> String {
    id.map(|id| id.to_string()[..8].to_string())
        .unwrap_or_else(|| "--------".to_string())
}
