//! Context assembly from retrieved segments

use crate::cli::output::truncate_str;
use crate::models::SegmentHit;

/// Packs ranked segments into a prompt context of at most
/// `max_context_length` characters
pub struct ContextAssembler {
    max_context_length: usize,
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self::new(8000)
    }
}

impl ContextAssembler {
    #[must_use]
    pub const fn new(max_context_length: usize) -> Self {
        Self { max_context_length }
    }

    /// Returns the context text and the hits that made it in, in rank order.
    ///
    /// Entries are added whole until the budget is reached. The top hit is
    /// truncated rather than dropped when it alone exceeds the budget.
    #[must_use]
    pub fn assemble<'a>(&self, results: &'a [SegmentHit]) -> (String, Vec<&'a SegmentHit>) {
        let mut context = String::new();
        let mut context_chars = 0;
        let mut used = Vec::new();

        for (idx, hit) in results.iter().enumerate() {
            let entry = Self::format_entry(idx + 1, hit);
            let entry_chars = entry.chars().count();

            if context_chars + entry_chars > self.max_context_length {
                if used.is_empty() {
                    // Leave room for the ellipsis truncate_str appends
                    let budget = self.max_context_length.saturating_sub(3);
                    context.push_str(&truncate_str(&entry, budget));
                    used.push(hit);
                }
                break;
            }

            context.push_str(&entry);
            context_chars += entry_chars;
            used.push(hit);
        }

        (context, used)
    }

    fn format_entry(number: usize, hit: &SegmentHit) -> String {
        format!(
            "[{}] {} (part {})\n{}\n\n",
            number,
            hit.filename,
            hit.ordinal + 1,
            hit.text
        )
    }
}
