use serde::{Deserialize, Serialize};

/// A tag or branch that can be hatched. `name` is what users see, `reference`
/// is what git understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    pub name: String,
    pub reference: String,
}

impl Revision {
    pub fn new(name: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reference: reference.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevisionKind {
    Tag,
    Branch,
}

impl RevisionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tag => "tag",
            Self::Branch => "branch",
        }
    }
}

/// Strip the first prefix in `prefixes` that `tag` starts with. Tags matching
/// no prefix are returned unchanged.
pub fn trim_tag<'a, S: AsRef<str>>(prefixes: &[S], tag: &'a str) -> &'a str {
    prefixes
        .iter()
        .find_map(|prefix| tag.strip_prefix(prefix.as_ref()))
        .unwrap_or(tag)
}

/// Parse `git tag` output. The result is sorted by display name in ascending
/// byte order (so `3.0.10` comes before `3.0.9`), with the default branch
/// first.
pub fn parse_tags<S: AsRef<str>>(
    output: &str,
    prefixes: &[S],
    default_branch: &str,
) -> Vec<Revision> {
    let mut tags: Vec<Revision> = output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|tag| Revision::new(trim_tag(prefixes, tag), tag))
        .collect();
    tags.sort_by(|a, b| a.name.cmp(&b.name));

    let mut revisions = Vec::with_capacity(tags.len() + 1);
    revisions.push(Revision::new(default_branch, default_branch));
    revisions.extend(tags);
    revisions
}

/// Parse `git branch -r` output, keeping only branches of `remote`. The
/// symbolic `HEAD -> ...` entry is dropped. The result is sorted by name, with
/// the default branch (if present) moved to the front.
pub fn parse_branches(output: &str, remote: &str, default_branch: &str) -> Vec<Revision> {
    let remote_prefix = format!("{remote}/");
    let mut branches: Vec<Revision> = output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.contains("->"))
        .filter_map(|line| {
            let name = line.strip_prefix(&remote_prefix)?;
            if name.is_empty() {
                return None;
            }
            Some(Revision::new(name, line))
        })
        .collect();
    branches.sort_by(|a, b| a.name.cmp(&b.name));

    if let Some(idx) = branches.iter().position(|b| b.name == default_branch) {
        let default = branches.remove(idx);
        branches.insert(0, default);
    }
    branches
}
