//! Reply texts.

use cinedex_core::{Category, IndexError, IndexStatus, MediaRecord, SingleOutcome};

/// Hits shown per category for a title search.
pub const SEARCH_LIMIT: usize = 10;

pub fn welcome() -> &'static str {
    "🎬 Welcome to cinedex!\n\n\
     ✅ This bot indexes movies & TV shows from configured channels.\n\
     📡 Admins: forward a message from a channel, or use /index <channel> <last id>.\n\
     🔍 Just type a title to search the catalog!"
}

pub fn not_admin() -> &'static str {
    "⛔ Only administrators can do that."
}

pub fn request_noted() -> &'static str {
    "📝 Your request has been noted for the admins."
}

pub fn already_running() -> &'static str {
    "⏳ An indexing run is already in progress. Use /cancel to stop it."
}

pub fn index_error(e: &IndexError) -> String {
    match e {
        IndexError::AlreadyRunning => already_running().to_string(),
        IndexError::Authorization(msg) => format!("❌ Not allowed: {}", msg),
        IndexError::Validation(msg) => format!("⚠️ {}", msg),
        other => format!("⚠️ {}", other),
    }
}

pub fn single_outcome(outcome: &SingleOutcome) -> String {
    match outcome {
        SingleOutcome::Added(record) => {
            format!("✅ Saved \"{}\" to {}.", record.title, record.category)
        }
        SingleOutcome::Duplicate(record) => {
            format!("ℹ️ \"{}\" is already in {}.", record.title, record.category)
        }
        SingleOutcome::NoMedia => "⚠️ That message has no document or video.".to_string(),
    }
}

pub fn status(status: &IndexStatus, resume_offset: u64) -> String {
    let mut lines = Vec::new();
    match &status.current {
        Some(run) => lines.push(format!(
            "📡 Indexing {} from channel {} (message {}): {} files added so far.",
            run.category, run.channel, run.upper_message_id, run.found
        )),
        None => lines.push("💤 No indexing run in progress.".to_string()),
    }
    if let Some(last) = &status.last {
        let mut line = format!(
            "Last run: {} {} with {} files added",
            last.category,
            last.state.label(),
            last.found
        );
        if let Some(error) = &last.error {
            line.push_str(&format!(" ({})", error));
        }
        line.push('.');
        lines.push(line);
    }
    lines.push(format!("Next run skips the latest {} messages.", resume_offset));
    lines.join("\n")
}

/// Search results grouped by category; categories without hits are omitted.
pub fn search_results(query: &str, results: &[(Category, Vec<MediaRecord>)]) -> String {
    let sections: Vec<String> = results
        .iter()
        .filter(|(_, hits)| !hits.is_empty())
        .map(|(category, hits)| {
            let header = match category {
                Category::Movie => "🎬 Movies",
                Category::TvShow => "📺 TV shows",
            };
            let mut section = format!("{}:", header);
            for record in hits.iter().take(SEARCH_LIMIT) {
                section.push_str("\n• ");
                section.push_str(&record.title);
            }
            if hits.len() > SEARCH_LIMIT {
                section.push_str(&format!("\n… and {} more", hits.len() - SEARCH_LIMIT));
            }
            section
        })
        .collect();

    if sections.is_empty() {
        format!("🔍 Nothing found for \"{}\".", query.trim())
    } else {
        sections.join("\n\n")
    }
}
