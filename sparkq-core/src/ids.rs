/// Identifier generation
///
/// Produces short, typed-prefix identifiers and human-friendly task codes.
/// Generation is purely local — it never queries the database for
/// uniqueness. Collisions are astronomically unlikely at the scale this
/// system targets; an insert that does collide surfaces as `Conflict` at
/// the store layer and the caller is expected to retry with a fresh id.
use rand::Rng;

const ENTROPY_HEX_CHARS: usize = 12;
const FRIENDLY_SUFFIX_CHARS: usize = 4;

/// Entity-typed id prefixes, per the data model.
pub mod prefix {
    pub const PROJECT: &str = "prj_";
    pub const SESSION: &str = "ses_";
    pub const QUEUE: &str = "que_";
    pub const TASK: &str = "tsk_";
    pub const PROMPT: &str = "prm_";
}

/// Generates a new id with the given typed prefix plus 12 hex characters
/// of entropy, e.g. `tsk_4f9a1c02b7de`.
pub fn generate(prefix: &str) -> String {
    let mut rng = rand::thread_rng();
    let mut bytes = [0u8; (ENTROPY_HEX_CHARS + 1) / 2];
    rng.fill(&mut bytes);
    let mut hex = hex::encode(bytes);
    hex.truncate(ENTROPY_HEX_CHARS);
    format!("{prefix}{hex}")
}

/// Generates a human-friendly task code derived from the queue name plus a
/// short random uppercase suffix, e.g. `BUILD-7A3F`. Stable for the task's
/// lifetime; the caller retries with a fresh suffix on a uniqueness
/// conflict within the queue.
pub fn friendly_task_code(queue_name: &str) -> String {
    let slug: String = queue_name
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .to_uppercase();
    let slug = slug.trim_matches('-');
    let slug = if slug.is_empty() { "QUEUE" } else { slug };

    let mut rng = rand::thread_rng();
    let mut bytes = [0u8; (FRIENDLY_SUFFIX_CHARS + 1) / 2];
    rng.fill(&mut bytes);
    let mut suffix = hex::encode(bytes).to_uppercase();
    suffix.truncate(FRIENDLY_SUFFIX_CHARS);

    format!("{slug}-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_has_prefix_and_length() {
        let id = generate(prefix::TASK);
        assert!(id.starts_with("tsk_"));
        assert_eq!(id.len(), "tsk_".len() + ENTROPY_HEX_CHARS);
    }

    #[test]
    fn test_generate_is_not_constant() {
        let a = generate(prefix::SESSION);
        let b = generate(prefix::SESSION);
        assert_ne!(a, b);
    }

    #[test]
    fn test_friendly_task_code_shape() {
        let code = friendly_task_code("build");
        assert!(code.starts_with("BUILD-"));
        assert_eq!(code.len(), "BUILD-".len() + FRIENDLY_SUFFIX_CHARS);
    }

    #[test]
    fn test_friendly_task_code_sanitizes_queue_name() {
        let code = friendly_task_code("my queue!!");
        assert!(code.starts_with("MY-QUEUE"));
    }

    #[test]
    fn test_friendly_task_code_empty_queue_name() {
        let code = friendly_task_code("___");
        assert!(code.starts_with("QUEUE-"));
    }
}
