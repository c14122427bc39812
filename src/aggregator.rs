//! Merges per-source items for one topic into a single newest-first list.

use crate::feed::{source_label, Article, SourceBatch};

/// Concatenate all batches, tag every article with its source label and
/// order the result by publish time, newest first.
///
/// The sort is stable, so articles with equal timestamps keep their source
/// and document order. Duplicate links across sources are kept.
pub fn aggregate(batches: Vec<SourceBatch>) -> Vec<Article> {
    let mut articles: Vec<Article> = batches
        .into_iter()
        .flat_map(|batch| {
            let label = source_label(&batch.url);
            batch
                .items
                .into_iter()
                .map(move |item| Article::from_item(item, label))
        })
        .collect();

    articles.sort_by(|a, b| b.sort_key().cmp(&a.sort_key()));
    articles
}

/// The article a topic run is interested in.
pub fn newest(articles: &[Article]) -> Option<&Article> {
    articles.first()
}
