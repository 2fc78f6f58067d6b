use std::cmp::Reverse;

use chrono::{DateTime, Local};

use crate::vault::NoteSummary;

pub const MODIFIED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 一覧に表示する 1 行分
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub title: String,
    pub description: String,
}

/// ノートの要約から表示用の一覧を作る
///
/// 新しい順に並べ、更新日時が同じ場合は名前順。
pub fn project(summaries: &[NoteSummary]) -> Vec<ListEntry> {
    let mut sorted: Vec<&NoteSummary> = summaries.iter().collect();
    sorted.sort_by(|a, b| {
        Reverse(a.modified_at)
            .cmp(&Reverse(b.modified_at))
            .then_with(|| a.name.cmp(&b.name))
    });

    sorted
        .into_iter()
        .map(|summary| ListEntry {
            title: summary.name.clone(),
            description: describe_modified(DateTime::<Local>::from(summary.modified_at)),
        })
        .collect()
}

pub fn describe_modified(modified_at: DateTime<Local>) -> String {
    format!("Modified: {}", modified_at.format(MODIFIED_FORMAT))
}
