use super::helpers::{member_views, MemberView};
use super::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::PAGE_SIZE;
use crate::state::{Action, Snapshot};
use chrono::NaiveDate;

/// What the caller asked of the search state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchRequest {
    /// A fresh query resets the visible count to one page.
    Query(String),
    /// Repeat the stored query as-is.
    Repeat,
    /// Repeat the stored query with one more page visible.
    More,
}

/// Filter memberships by name (case-insensitive substring) or phone
/// (substring), page the matches, and record the search state.
pub fn run(snapshot: &Snapshot, request: SearchRequest, today: NaiveDate) -> Result<CmdResult> {
    let (query, count) = match request {
        SearchRequest::Query(q) => (q, PAGE_SIZE),
        SearchRequest::Repeat => (snapshot.search.query.clone(), snapshot.search.count),
        SearchRequest::More => (
            snapshot.search.query.clone(),
            snapshot.search.count + PAGE_SIZE,
        ),
    };

    let matches: Vec<MemberView> = member_views(snapshot, today)
        .into_iter()
        .filter(|view| is_match(view, &query))
        .collect();
    let total = matches.len();
    let visible: Vec<MemberView> = matches.into_iter().take(count).collect();

    let mut result = CmdResult::default()
        .with_actions(vec![Action::SetSearch {
            query: query.clone(),
            count,
        }])
        .with_members(visible);
    if total > count {
        result.add_message(CmdMessage::info(format!(
            "{} of {} matches shown; `frontdesk more` shows another page",
            count, total
        )));
    }
    Ok(result)
}

fn is_match(view: &MemberView, query: &str) -> bool {
    if !view.name.is_empty()
        && view.name.to_lowercase().contains(&query.to_lowercase())
    {
        return true;
    }
    if !view.phone.is_empty() && view.phone.contains(query) {
        return true;
    }
    false
}
