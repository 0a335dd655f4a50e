//! Building member lists by walking a remote folder tree.
//!
//! The walk only needs something that can answer `list(path)`; see
//! [`FolderLister`]. [`PremiumizeLister`] implements it over the
//! Premiumize.me folder API.

mod premiumize;

pub use premiumize::{DEFAULT_API_URL, PremiumizeLister};

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::guard::AllowList;
use crate::member::Member;

/// Kind of a listed item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Folder,
}

/// One item of a folder listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: String,
    pub kind: EntryKind,
    /// Direct download URL; only meaningful for files.
    pub fetch_url: Option<String>,
    pub size: Option<u64>,
}

/// Contents of one folder
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub name: String,
    pub entries: Vec<ListingEntry>,
}

/// Trait for enumerating a remote folder
#[async_trait]
pub trait FolderLister: Send + Sync {
    async fn list(&self, path: &str) -> Result<Listing>;
}

struct Frame {
    path: String,
    zip_dir: String,
    pending: std::vec::IntoIter<ListingEntry>,
}

/// Walk every root and collect the members found, depth first.
///
/// Each root contributes entries under its own last path segment. Folders
/// with no entries become directory markers. A listing failure abandons
/// the rest of that root and the walk continues with the next one.
pub async fn collect_members<L>(lister: &L, roots: &[String], guard: &AllowList) -> Vec<Member>
where
    L: FolderLister + ?Sized,
{
    let mut members = Vec::new();
    for root in roots {
        debug!("walking {root}");
        if let Err(e) = walk_root(lister, root, guard, &mut members).await {
            warn!("error walking {root}: {e:#}");
        }
    }
    members
}

async fn walk_root<L>(
    lister: &L,
    root: &str,
    guard: &AllowList,
    members: &mut Vec<Member>,
) -> Result<()>
where
    L: FolderLister + ?Sized,
{
    let listing = lister.list(root).await?;
    let zip_dir = match root.trim_end_matches('/').rsplit('/').next() {
        Some(base) if !base.is_empty() => base.to_string(),
        _ => listing.name.clone(),
    };

    let mut stack = vec![open_frame(root.to_string(), zip_dir, listing, guard, members)];

    while let Some(frame) = stack.last_mut() {
        let Some(item) = frame.pending.next() else {
            stack.pop();
            continue;
        };

        match item.kind {
            EntryKind::File => {
                let zip_path = join(&frame.zip_dir, &item.name);
                let url = item.fetch_url.as_deref().unwrap_or_default();
                match guard.member(url, &zip_path) {
                    Ok(member) => members.push(match item.size {
                        Some(size) => member.with_size(size),
                        None => member,
                    }),
                    Err(e) => debug!("skipping listed file: {e}"),
                }
            }
            EntryKind::Folder => {
                let path = join(&frame.path, &item.name);
                let listing = lister.list(&path).await?;
                let zip_dir = join(&frame.zip_dir, &listing.name);
                let child = open_frame(path, zip_dir, listing, guard, members);
                stack.push(child);
            }
        }
    }

    Ok(())
}

/// Start a frame; an empty folder is recorded as a directory marker.
fn open_frame(
    path: String,
    zip_dir: String,
    listing: Listing,
    guard: &AllowList,
    members: &mut Vec<Member>,
) -> Frame {
    if listing.entries.is_empty() {
        match guard.directory(&format!("{zip_dir}/")) {
            Ok(marker) => members.push(marker),
            Err(e) => debug!("skipping empty folder: {e}"),
        }
    }
    Frame {
        path,
        zip_dir,
        pending: listing.entries.into_iter(),
    }
}

fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent.trim_end_matches('/'), name)
    }
}
